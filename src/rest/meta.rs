//! Server introspection: version string and the endpoint catalogue.

use serde::{Deserialize, Serialize};

use crate::error::{OpencgaError, Result};

use super::client::MetaClient;
use super::http::RestRequest;
use super::response::RestResponse;

/// One category of the server's endpoint catalogue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiCategory {
    pub name: String,
    pub endpoints: Vec<ApiEndpoint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEndpoint {
    pub path: String,
    pub method: String,
    pub description: String,
    pub parameters: Vec<ApiParameter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

impl MetaClient {
    /// `GET meta/about`.
    pub async fn about(&self) -> Result<RestResponse> {
        let path = self.endpoint().action("about").path();
        self.execute(RestRequest::get(path)).await
    }

    /// `GET meta/api`.
    pub async fn api(&self) -> Result<RestResponse> {
        let path = self.endpoint().action("api").path();
        self.execute(RestRequest::get(path)).await
    }

    /// The `Version` reported by `meta/about`, e.g. `2.0.0-rc1`.
    pub async fn server_version(&self) -> Result<String> {
        let response = self.about().await?;
        response
            .expect_result(0)?
            .get("Version")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| OpencgaError::api(200, "meta/about did not report a Version"))
    }

    /// The endpoint catalogue reported by `meta/api`.
    pub async fn api_categories(&self) -> Result<Vec<ApiCategory>> {
        let response = self.api().await?;
        let catalogue = response.expect_result(0)?.clone();
        Ok(serde_json::from_value(catalogue)?)
    }
}

/// Render the endpoint catalogue as indented text.
///
/// Without a category, lists the category names. With one, lists its
/// endpoints and, if `show_parameters`, each endpoint's parameters. An
/// unknown category renders as an empty string.
pub fn render_help(
    catalogue: &[ApiCategory],
    category: Option<&str>,
    show_parameters: bool,
) -> String {
    let mut lines = Vec::new();
    match category {
        None => {
            lines.push("Available categories:".to_string());
            lines.extend(catalogue.iter().map(|c| format!("    - {}", c.name)));
        }
        Some(name) => {
            for entry in catalogue.iter().filter(|c| c.name == name) {
                lines.push(format!("{} endpoints:", entry.name));
                for endpoint in &entry.endpoints {
                    lines.push(format!(
                        "    - {} ({}): {}",
                        endpoint.path, endpoint.method, endpoint.description
                    ));
                    if show_parameters {
                        lines.extend(endpoint.parameters.iter().map(|p| {
                            format!("        - {} ({}): {}", p.name, p.kind, p.description)
                        }));
                    }
                }
            }
        }
    }
    if lines.is_empty() {
        String::new()
    } else {
        lines.join("\n") + "\n"
    }
}
