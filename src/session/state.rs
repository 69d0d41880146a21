use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use crate::auth::{LoginHandler, Token, TokenCell};
use crate::error::{OpencgaError, Result};
use crate::rest::Reauthenticator;

/// Authentication state shared between a session and its sub-clients.
///
/// Holds the login handler and the token cell, but never the sub-clients
/// themselves, so sub-clients can hold it without a reference cycle.
pub(crate) struct SessionState {
    token: TokenCell,
    handler: Mutex<Option<Arc<LoginHandler>>>,
    user_id: RwLock<Option<String>>,
    // Serializes login and refresh exchanges.
    exchange: tokio::sync::Mutex<()>,
}

impl SessionState {
    pub(crate) fn new(token: TokenCell) -> Self {
        Self {
            token,
            handler: Mutex::new(None),
            user_id: RwLock::new(None),
            exchange: tokio::sync::Mutex::new(()),
        }
    }

    pub(crate) fn token(&self) -> &TokenCell {
        &self.token
    }

    pub(crate) fn user_id(&self) -> Option<String> {
        self.user_id
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Log in with a new handler; on success it replaces any previous one.
    pub(crate) async fn login(&self, handler: LoginHandler) -> Result<Token> {
        let _exchange = self.exchange.lock().await;
        let token = handler.invoke(false, None).await?;
        let handler = Arc::new(handler);
        *self.lock_handler() = Some(handler.clone());
        self.record(&handler, &token);
        Ok(token)
    }

    pub(crate) fn logout(&self) {
        self.token.clear();
        let previous = self.lock_handler().take();
        let user = self
            .user_id
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if previous.is_some() {
            tracing::info!(user = user.as_deref().unwrap_or_default(), "OpenCGA logout");
        }
    }

    fn current_handler(&self) -> Option<Arc<LoginHandler>> {
        self.lock_handler().clone()
    }

    fn lock_handler(&self) -> std::sync::MutexGuard<'_, Option<Arc<LoginHandler>>> {
        self.handler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, handler: &LoginHandler, token: &Token) {
        *self
            .user_id
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(handler.user().to_string());
        self.token.set(Some(token.clone()));
    }
}

#[async_trait]
impl Reauthenticator for SessionState {
    fn can_reauthenticate(&self) -> bool {
        self.current_handler().is_some()
    }

    async fn reauthenticate(&self, refresh: bool) -> Result<Token> {
        let _exchange = self.exchange.lock().await;
        let handler = self.current_handler().ok_or_else(|| {
            OpencgaError::InvalidOperation(
                "cannot log in without a user: no previous login in this session".into(),
            )
        })?;

        let current = self.token.get();
        let token = handler.invoke(refresh, current.as_ref()).await?;

        // A logout while the exchange was in flight wins.
        let still_current = self
            .current_handler()
            .is_some_and(|active| Arc::ptr_eq(&active, &handler));
        if !still_current {
            return Err(OpencgaError::InvalidOperation(
                "session was logged out during re-authentication".into(),
            ));
        }

        self.record(&handler, &token);
        Ok(token)
    }
}
