//! Remote job status and waiting for jobs to finish.

pub mod waiter;

pub use waiter::{clamp_poll_interval, wait, JobStatusSource, MIN_POLL_INTERVAL};

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OpencgaError, Result};

/// Name of a job's status as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatusName {
    Pending,
    Queued,
    Running,
    Done,
    Error,
    Aborted,
    Unregistered,
    Registering,
    /// A name this client does not know; treated as non-terminal.
    Other(String),
}

impl JobStatusName {
    pub fn parse(name: &str) -> Self {
        match name {
            "PENDING" => Self::Pending,
            "QUEUED" => Self::Queued,
            "RUNNING" => Self::Running,
            "DONE" => Self::Done,
            "ERROR" => Self::Error,
            "ABORTED" => Self::Aborted,
            "UNREGISTERED" => Self::Unregistered,
            "REGISTERING" => Self::Registering,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Done => "DONE",
            Self::Error => "ERROR",
            Self::Aborted => "ABORTED",
            Self::Unregistered => "UNREGISTERED",
            Self::Registering => "REGISTERING",
            Self::Other(name) => name,
        }
    }

    /// `ERROR` and `ABORTED`.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Error | Self::Aborted)
    }

    /// No further transition happens after this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done) || self.is_failure()
    }
}

impl fmt::Display for JobStatusName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobStatusName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatusName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}

/// Status projection of a job (`include=status`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub name: JobStatusName,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub message: String,
}

impl JobStatus {
    pub fn new(name: JobStatusName, date: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name,
            date: date.into(),
            message: message.into(),
        }
    }

    /// Convert a failed status into [`OpencgaError::JobFailed`].
    pub fn into_failure(self) -> OpencgaError {
        OpencgaError::JobFailed {
            status: self.name.to_string(),
            date: self.date,
            message: self.message,
        }
    }
}

/// Which job to wait for.
///
/// When both a submission response and explicit ids are present, the ids in
/// the response win.
///
/// # Example
/// ```
/// use opencga::job::WaitTarget;
/// use serde_json::json;
///
/// let target = WaitTarget::ids("s1", "j1")
///     .with_response(json!({"studyUuid": "s2", "uuid": "j2"}));
/// assert_eq!(target.resolve().unwrap(), ("s2".to_string(), "j2".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaitTarget {
    pub response: Option<Value>,
    pub study: Option<String>,
    pub job_id: Option<String>,
}

impl WaitTarget {
    /// Wait for the job described by a job-submission result
    /// (`studyUuid` and `uuid` fields).
    pub fn response(response: Value) -> Self {
        Self {
            response: Some(response),
            ..Self::default()
        }
    }

    pub fn ids(study: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            response: None,
            study: Some(study.into()),
            job_id: Some(job_id.into()),
        }
    }

    pub fn with_response(mut self, response: Value) -> Self {
        self.response = Some(response);
        self
    }

    /// The `(study, job_id)` pair to poll.
    ///
    /// Fails with [`OpencgaError::InvalidArgument`] when either is missing or
    /// more than one job id is given.
    pub fn resolve(&self) -> Result<(String, String)> {
        let (study, job_id) = match &self.response {
            Some(response) => (
                response.get("studyUuid").and_then(Value::as_str),
                response.get("uuid").and_then(Value::as_str),
            ),
            None => (self.study.as_deref(), self.job_id.as_deref()),
        };

        let (study, job_id) = match (non_empty(study), non_empty(job_id)) {
            (Some(study), Some(job_id)) => (study, job_id),
            _ => {
                return Err(OpencgaError::InvalidArgument(
                    "a job submission response, or both a study and a job id, must be provided"
                        .into(),
                ))
            }
        };
        if job_id.contains(',') {
            return Err(OpencgaError::InvalidArgument(format!(
                "only one job id is allowed, got '{job_id}'"
            )));
        }
        Ok((study.to_string(), job_id.to_string()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
