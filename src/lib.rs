//! OpenCGA client: a session over the OpenCGA REST API.
//!
//! One [`session::OpencgaClient`] owns seventeen resource sub-clients
//! (users, projects, studies, files, jobs, ...) that all authenticate with
//! the same token. Logging in, refreshing, or logging out through the
//! session is immediately visible to every sub-client, and a request
//! rejected for authentication is re-issued once with a refreshed token.
//!
//! # Quick Start
//!
//! ```no_run
//! use opencga::prelude::*;
//!
//! # async fn example() -> opencga::error::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let client = OpencgaClient::connect(config, ClientOptions::default()).await?;
//! client.login(Some("demo"), None).await?;
//!
//! let study = "demo@family:platinum";
//! let samples = client.samples().search(&[("study", study), ("limit", "5")]).await?;
//! for sample in samples.results() {
//!     println!("{}", sample["id"]);
//! }
//! client.logout();
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod job;
pub mod prelude;
pub mod rest;
pub mod session;

#[cfg(feature = "cli")]
pub mod cli;
