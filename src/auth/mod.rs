//! Bearer tokens and the login capability that produces them.

pub mod credentials;
pub mod prompt;
pub mod token;

pub use credentials::LoginHandler;
pub use prompt::{PasswordPrompt, TerminalPrompt};
pub use token::{Token, TokenCell};

pub use secrecy::SecretString;
