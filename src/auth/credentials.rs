use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use crate::error::{OpencgaError, Result};
use crate::rest::{Category, Endpoint, HttpTransport, RestRequest, RestResponse};

use super::token::Token;

/// Login capability bound to one user and password.
///
/// The password is held only here and is only ever written into the body of
/// a login request. There is no accessor for it, and `Debug` redacts it.
pub struct LoginHandler {
    transport: HttpTransport,
    user: String,
    password: SecretString,
}

impl fmt::Debug for LoginHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginHandler")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl LoginHandler {
    pub fn new(transport: HttpTransport, user: impl Into<String>, password: SecretString) -> Self {
        Self {
            transport,
            user: user.into(),
            password,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Exchange credentials for a token.
    ///
    /// With `refresh == false` the stored password is sent. With
    /// `refresh == true` an empty body is sent, authenticated with `current`,
    /// and the server extends that session.
    pub async fn invoke(&self, refresh: bool, current: Option<&Token>) -> Result<Token> {
        let path = Endpoint::new(Category::Users)
            .ids(&self.user)
            .action("login")
            .path();
        let (request, bearer) = if refresh {
            (RestRequest::post(path, json!({})), current)
        } else {
            let body = json!({ "password": self.password.expose_secret() });
            (RestRequest::post(path, body), None)
        };

        let response = self
            .transport
            .send(&request, bearer)
            .await
            .map_err(|err| self.rejected(refresh, err))?;
        let token = extract_token(&response)?;

        tracing::info!(
            user = %self.user,
            refresh,
            expires_at = ?token.expires_at(),
            "OpenCGA login succeeded"
        );
        Ok(token)
    }

    fn rejected(&self, refresh: bool, err: OpencgaError) -> OpencgaError {
        let action = if refresh { "refresh" } else { "login" };
        match err {
            OpencgaError::Authentication(message) | OpencgaError::PermissionDenied(message) => {
                self.rejection(action, &message)
            }
            OpencgaError::Api { status, message } if (400..500).contains(&status) => {
                self.rejection(action, &message)
            }
            other => other,
        }
    }

    fn rejection(&self, action: &str, message: &str) -> OpencgaError {
        OpencgaError::Authentication(format!(
            "{action} rejected for user '{}': {message}",
            self.user
        ))
    }
}

fn extract_token(response: &RestResponse) -> Result<Token> {
    response
        .get_result(0)
        .and_then(|result| result.get("token"))
        .and_then(|token| token.as_str())
        .filter(|token| !token.is_empty())
        .map(Token::from)
        .ok_or_else(|| OpencgaError::Authentication("login response did not contain a token".into()))
}
