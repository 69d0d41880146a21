//! Re-authentication policy applied when a request fails authentication.

use async_trait::async_trait;

use crate::auth::Token;
use crate::error::{OpencgaError, Result};

use super::category::Category;
use super::http::RestRequest;

/// Something that can obtain a fresh token for the session.
#[async_trait]
pub trait Reauthenticator: Send + Sync {
    /// Whether a credential handler exists to re-authenticate with.
    fn can_reauthenticate(&self) -> bool;

    /// Run the credential handler. `refresh == true` asks the server to
    /// extend the current session without re-submitting the password.
    async fn reauthenticate(&self, refresh: bool) -> Result<Token>;
}

/// Everything a [`RetryHandler`] may need to decide on a retry.
pub struct RetryContext<'a> {
    /// Category of the sub-client whose request failed.
    pub category: Category,
    pub error: &'a OpencgaError,
    /// The request the sub-client will re-issue with the returned token.
    pub request: &'a RestRequest,
    pub session: &'a dyn Reauthenticator,
}

/// Decides whether, and with which token, a failed request is re-issued.
///
/// Returning `Ok(Some(token))` makes the sub-client repeat the request once
/// with that token; `Ok(None)` surfaces the original error. A second
/// authentication failure is never retried.
#[async_trait]
pub trait RetryHandler: Send + Sync {
    async fn on_auth_failure(&self, context: RetryContext<'_>) -> Result<Option<Token>>;
}

/// Refresh the session token, when the session has logged in.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoRefresh;

#[async_trait]
impl RetryHandler for AutoRefresh {
    async fn on_auth_failure(&self, context: RetryContext<'_>) -> Result<Option<Token>> {
        if !context.session.can_reauthenticate() {
            return Ok(None);
        }
        tracing::warn!(
            category = %context.category,
            path = %context.request.path,
            error = %context.error,
            "Token rejected, refreshing session"
        );
        context.session.reauthenticate(true).await.map(Some)
    }
}

/// Never retry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

#[async_trait]
impl RetryHandler for NoRetry {
    async fn on_auth_failure(&self, _context: RetryContext<'_>) -> Result<Option<Token>> {
        Ok(None)
    }
}
