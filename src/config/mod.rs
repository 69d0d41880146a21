//! Connection configuration (layered: code > env > config file).

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{OpencgaError, Result};

/// REST API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "v2";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Validated connection settings shared read-only by every sub-client.
///
/// # Example
/// ```
/// use opencga::config::ClientConfig;
///
/// let config = ClientConfig::new("ws.opencb.org/opencga-prod/")?;
/// assert_eq!(config.host(), "https://ws.opencb.org/opencga-prod");
/// assert_eq!(
///     config.rest_url("users/demo/login")?.as_str(),
///     "https://ws.opencb.org/opencga-prod/webservices/rest/v2/users/demo/login"
/// );
/// # Ok::<(), opencga::error::OpencgaError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientConfig {
    host: String,
    version: String,
    tls_allow_invalid_certificates: bool,
    timeout_secs: u64,
    user: Option<String>,
    study: Option<String>,
}

/// On-disk shape of the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    rest: RestSection,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    study: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestSection {
    host: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    tls_allow_invalid_certificates: bool,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Create a configuration for `host` with default settings.
    ///
    /// A host without a scheme is assumed to be `https://`.
    pub fn new(host: impl AsRef<str>) -> Result<Self> {
        let config = Self {
            host: normalize_host(host.as_ref()),
            version: DEFAULT_API_VERSION.to_string(),
            tls_allow_invalid_certificates: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user: None,
            study: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables (`OPENCGA_HOST`, `OPENCGA_VERSION`, ...).
    ///
    /// A `.env` file in the working directory is read first when present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let host = std::env::var("OPENCGA_HOST")
            .map_err(|_| OpencgaError::Configuration("OPENCGA_HOST is not set".into()))?;
        let mut config = Self::new(host)?;

        if let Ok(version) = std::env::var("OPENCGA_VERSION") {
            config = config.with_version(version);
        }
        if let Ok(raw) = std::env::var("OPENCGA_TLS_ALLOW_INVALID_CERTS") {
            config.tls_allow_invalid_certificates = parse_flag(&raw);
        }
        if let Ok(raw) = std::env::var("OPENCGA_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                OpencgaError::Configuration(format!("OPENCGA_TIMEOUT_SECS is not a number: {raw}"))
            })?;
            config.timeout_secs = secs;
        }
        config.user = std::env::var("OPENCGA_USER").ok().filter(|v| !v.is_empty());
        config.study = std::env::var("OPENCGA_STUDY").ok().filter(|v| !v.is_empty());

        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    ///
    /// ```toml
    /// user = "demo"
    /// study = "demo@family:platinum"
    ///
    /// [rest]
    /// host = "https://ws.opencb.org/opencga-prod"
    /// version = "v2"
    /// tlsAllowInvalidCertificates = false
    /// timeoutSecs = 90
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Parse a TOML document in the [`ClientConfig::from_file`] layout.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(raw)?;
        let config = Self {
            host: normalize_host(&file.rest.host),
            version: file
                .rest
                .version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            tls_allow_invalid_certificates: file.rest.tls_allow_invalid_certificates,
            timeout_secs: file.rest.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            user: file.user,
            study: file.study,
        };
        config.validate()?;
        Ok(config)
    }

    /// Default location of the configuration file (`~/.opencga/client.toml`).
    pub fn default_path() -> PathBuf {
        directories::UserDirs::new()
            .map(|dirs| dirs.home_dir().join(".opencga"))
            .unwrap_or_else(|| PathBuf::from(".opencga"))
            .join("client.toml")
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    pub fn with_tls_allow_invalid_certificates(mut self, allow: bool) -> Self {
        self.tls_allow_invalid_certificates = allow;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_study(mut self, study: impl Into<String>) -> Self {
        self.study = Some(study.into());
        self
    }

    /// Check that the configuration can address a REST server.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(OpencgaError::Configuration("host is empty".into()));
        }
        let url = Url::parse(&self.host).map_err(|e| {
            OpencgaError::Configuration(format!("invalid host '{}': {e}", self.host))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(OpencgaError::Configuration(format!(
                "unsupported scheme '{}' in host '{}'",
                url.scheme(),
                self.host
            )));
        }
        if self.version.trim().is_empty() {
            return Err(OpencgaError::Configuration("API version is empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(OpencgaError::Configuration("timeout must be positive".into()));
        }
        Ok(())
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn tls_allow_invalid_certificates(&self) -> bool {
        self.tls_allow_invalid_certificates
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn study(&self) -> Option<&str> {
        self.study.as_deref()
    }

    /// Absolute URL of a REST resource path such as `jobs/j1/info`.
    pub fn rest_url(&self, path: &str) -> Result<Url> {
        let raw = format!(
            "{}/webservices/rest/{}/{}",
            self.host,
            self.version,
            path.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|e| OpencgaError::Configuration(format!("invalid URL {raw}: {e}")))
    }
}

fn normalize_host(host: &str) -> String {
    let trimmed = host.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
