use std::fmt;
use std::sync::{Arc, RwLock};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque bearer credential issued by the server.
///
/// # Example
/// ```
/// use opencga::auth::Token;
///
/// let token = Token::new("eyJhbGciOiJIUzI1NiJ9.e30.sig");
/// assert_eq!(token.as_str(), "eyJhbGciOiJIUzI1NiJ9.e30.sig");
/// assert!(token.expires_at().is_none());
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Expiry encoded in the JWT `exp` claim, if the token is a JWT that carries one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let payload = self.0.split('.').nth(1)?;
        let decoded = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        let claims: JwtClaims = serde_json::from_slice(&decoded).ok()?;
        DateTime::<Utc>::from_timestamp(claims.exp?, 0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "Token({prefix}..)")
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Deserialize)]
struct JwtClaims {
    exp: Option<i64>,
}

/// The session's single current token, shared by every sub-client.
///
/// Cloning the cell clones the handle, not the token: a `set` through any
/// clone is observed by all of them once it returns.
#[derive(Clone, Default)]
pub struct TokenCell {
    inner: Arc<RwLock<Option<Token>>>,
}

impl TokenCell {
    pub fn new(token: Option<Token>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(token)),
        }
    }

    pub fn get(&self) -> Option<Token> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set(&self, token: Option<Token>) {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }

    pub fn clear(&self) {
        self.set(None);
    }

    pub fn is_set(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    /// Whether two handles point at the same cell.
    pub fn shares_with(&self, other: &TokenCell) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for TokenCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TokenCell").field(&self.get()).finish()
    }
}
