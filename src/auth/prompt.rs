use secrecy::SecretString;

use crate::error::Result;

/// Source of a password when `login` is called without one.
pub trait PasswordPrompt: Send + Sync {
    fn read_password(&self, user: &str) -> Result<SecretString>;
}

/// Reads the password from the controlling terminal without echoing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn read_password(&self, user: &str) -> Result<SecretString> {
        let password = rpassword::prompt_password(format!("Password for {user}: "))?;
        Ok(SecretString::from(password))
    }
}
