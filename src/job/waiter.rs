//! Blocking poll loop over a job's status.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{OpencgaError, Result};
use crate::rest::JobClient;

use super::{JobStatus, JobStatusName, WaitTarget};

/// Lower bound on the time between two status polls.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Raise `interval` to [`MIN_POLL_INTERVAL`] if it is shorter.
pub fn clamp_poll_interval(interval: Duration) -> Duration {
    interval.max(MIN_POLL_INTERVAL)
}

/// Anything that can report the current status of a job.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn job_status(&self, study: &str, job_id: &str) -> Result<JobStatus>;
}

#[async_trait]
impl JobStatusSource for JobClient {
    async fn job_status(&self, study: &str, job_id: &str) -> Result<JobStatus> {
        let response = self
            .info(job_id, &[("study", study), ("include", "status")])
            .await?;
        let status = response
            .expect_result(0)?
            .get("status")
            .cloned()
            .ok_or_else(|| {
                OpencgaError::api(200, format!("job '{job_id}' info did not include a status"))
            })?;
        Ok(serde_json::from_value(status)?)
    }
}

/// Poll `source` until the job reaches a terminal status.
///
/// Returns the `DONE` status, or [`OpencgaError::JobFailed`] as soon as
/// `ERROR` or `ABORTED` is seen. There is no iteration cap: wrap the call in
/// `tokio::time::timeout` (or drop the future) to bound it.
pub async fn wait<S>(source: &S, study: &str, job_id: &str, poll_interval: Duration) -> Result<JobStatus>
where
    S: JobStatusSource + ?Sized,
{
    let (study, job_id) = WaitTarget::ids(study, job_id).resolve()?;
    let interval = clamp_poll_interval(poll_interval);

    loop {
        let status = source.job_status(&study, &job_id).await?;
        tracing::debug!(
            study = %study,
            job = %job_id,
            status = %status.name,
            "Polled job status"
        );

        if status.name.is_failure() {
            return Err(status.into_failure());
        }
        if status.name == JobStatusName::Done {
            return Ok(status);
        }
        tokio::time::sleep(interval).await;
    }
}
