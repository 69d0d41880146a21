//! HTTP transport shared by every sub-client.

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;

use crate::auth::Token;
use crate::config::ClientConfig;
use crate::error::{OpencgaError, Result};

use super::response::RestResponse;

/// One REST call: method, resource path below `webservices/rest/{version}`,
/// query parameters, and an optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RestRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn query_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Sends [`RestRequest`]s to the configured host and decodes the envelope.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    pub fn new(config: Arc<ClientConfig>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.tls_allow_invalid_certificates())
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Issue `request`, authenticating with `token` when one is given.
    pub async fn send(&self, request: &RestRequest, token: Option<&Token>) -> Result<RestResponse> {
        let url = self.config.rest_url(&request.path)?;
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            authenticated = token.is_some(),
            "OpenCGA request"
        );

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .query(&request.query);
        if let Some(token) = token {
            builder = builder.bearer_auth(token.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        if !(200..300).contains(&status) {
            return Err(status_to_error(status, &text));
        }

        let envelope: RestResponse = if text.trim().is_empty() {
            RestResponse::default()
        } else {
            serde_json::from_str(&text)?
        };
        if let Some(message) = envelope.first_error() {
            return Err(OpencgaError::api(status, message));
        }
        Ok(envelope)
    }
}

/// Map a non-success status and its body to an error.
pub fn status_to_error(status: u16, body: &str) -> OpencgaError {
    let message = serde_json::from_str::<RestResponse>(body)
        .ok()
        .and_then(|envelope| envelope.first_error())
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("HTTP {status}")
            } else {
                trimmed.to_string()
            }
        });
    match status {
        401 => OpencgaError::Authentication(message),
        403 => OpencgaError::PermissionDenied(message),
        _ => OpencgaError::api(status, message),
    }
}
