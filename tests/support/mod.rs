//! Shared helpers for session tests against a mock OpenCGA server.

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use opencga::config::ClientConfig;
use opencga::session::{ClientOptions, OpencgaClient};

pub const REST: &str = "/webservices/rest/v2";

/// Full request path for a REST resource.
pub fn rest_path(resource: &str) -> String {
    format!("{REST}/{resource}")
}

/// Standard response envelope around `results`.
pub fn envelope(results: Value) -> Value {
    json!({
        "apiVersion": "v2",
        "time": 3,
        "events": [],
        "params": {},
        "responses": [{
            "time": 2,
            "events": [],
            "numResults": results.as_array().map_or(0, Vec::len),
            "numMatches": -1,
            "results": results
        }]
    })
}

/// Envelope of a successful login returning `token`.
pub fn login_body(token: &str) -> Value {
    envelope(json!([{ "token": token }]))
}

/// Envelope with an ERROR event.
pub fn error_body(message: &str) -> Value {
    json!({
        "events": [{"type": "ERROR", "name": "CatalogAuthenticationException", "message": message}],
        "responses": []
    })
}

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(server.uri()).expect("mock server config")
}

/// Session without the version check, talking to `server`.
pub fn client_for(server: &MockServer) -> OpencgaClient {
    let options = ClientOptions::builder().check_versions(false).build();
    OpencgaClient::new(config_for(server), options).expect("client")
}

/// Mount `meta/about` reporting `version`.
pub async fn mount_about(server: &MockServer, version: &str) {
    Mock::given(method("GET"))
        .and(path(rest_path("meta/about")))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{
            "Program": "OpenCGA (OpenCB)",
            "Version": version,
            "Git branch": "release-2.0.0",
        }]))))
        .mount(server)
        .await;
}
