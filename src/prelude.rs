//! Convenience re-exports for common use.

pub use crate::auth::{SecretString, Token};
pub use crate::config::ClientConfig;
pub use crate::error::{OpencgaError, Result};
pub use crate::job::{JobStatus, JobStatusName, WaitTarget};
pub use crate::rest::{Category, RestResponse, RetryHandler};
pub use crate::session::{ClientOptions, OpencgaClient, SessionScope};
