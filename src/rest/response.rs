//! OpenCGA REST response envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OpencgaError, Result};

/// Severity of a server event attached to a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Info,
    Warning,
    Error,
}

/// Message attached to a response by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Results of one query inside a [`RestResponse`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryResponse {
    pub time: i64,
    pub events: Vec<Event>,
    pub num_results: i64,
    pub num_matches: i64,
    pub result_type: Option<String>,
    pub results: Vec<Value>,
}

/// Decoded body of every REST call.
///
/// A call may carry several query responses; the accessors without a
/// response position read the first one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RestResponse {
    pub api_version: Option<String>,
    pub time: i64,
    pub events: Vec<Event>,
    pub params: Value,
    pub responses: Vec<QueryResponse>,
}

impl RestResponse {
    /// Result at `index` of the first query response.
    pub fn get_result(&self, index: usize) -> Option<&Value> {
        self.get_result_at(0, index)
    }

    /// Result at `index` of the query response at `response`.
    pub fn get_result_at(&self, response: usize, index: usize) -> Option<&Value> {
        self.responses.get(response)?.results.get(index)
    }

    /// Like [`RestResponse::get_result`], but an absent result is an error.
    pub fn expect_result(&self, index: usize) -> Result<&Value> {
        self.get_result(index).ok_or_else(|| {
            OpencgaError::api(200, format!("response has no result at position {index}"))
        })
    }

    /// All results across every query response, in order.
    pub fn results(&self) -> impl Iterator<Item = &Value> {
        self.responses.iter().flat_map(|r| r.results.iter())
    }

    /// Number of results in the first query response.
    pub fn num_results(&self) -> i64 {
        self.responses.first().map(|r| r.num_results).unwrap_or(0)
    }

    /// First error message reported at envelope or query level.
    pub fn first_error(&self) -> Option<String> {
        self.events
            .iter()
            .chain(self.responses.iter().flat_map(|r| r.events.iter()))
            .find(|e| e.kind == EventType::Error)
            .map(|e| {
                e.message
                    .clone()
                    .or_else(|| e.name.clone())
                    .or_else(|| e.id.clone())
                    .unwrap_or_else(|| "unknown server error".to_string())
            })
    }
}
