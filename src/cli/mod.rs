//! Command-line front end for the OpenCGA client.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::ClientConfig;
use crate::error::Result;

/// OpenCGA command-line client
#[derive(Parser, Debug)]
#[command(
    name = "opencga",
    version,
    about = "OpenCGA REST client",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Server URL, e.g. https://ws.opencb.org/opencga-prod
    #[arg(long, global = true, env = "OPENCGA_HOST")]
    pub host: Option<String>,

    /// Configuration file (default: ~/.opencga/client.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Token from an earlier `opencga login`
    #[arg(long, global = true, env = "OPENCGA_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show server build information
    About,
    /// List endpoint categories, or the endpoints of one category
    Help(HelpArgs),
    /// Log in and print the session token
    Login(LoginArgs),
    /// Wait until a job finishes
    WaitJob(WaitJobArgs),
}

/// Arguments for `opencga help`.
#[derive(Parser, Debug)]
pub struct HelpArgs {
    /// Category to describe (e.g. files, jobs)
    pub category: Option<String>,

    /// Also list each endpoint's parameters
    #[arg(short, long)]
    pub parameters: bool,
}

/// Arguments for `opencga login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// User id; falls back to the configured user
    pub user: Option<String>,
}

/// Arguments for `opencga wait-job`.
#[derive(Parser, Debug)]
pub struct WaitJobArgs {
    /// Study FQN or uuid; falls back to the configured study
    #[arg(long)]
    pub study: Option<String>,

    /// Job id or uuid
    pub job: String,

    /// Seconds between status polls (minimum 10)
    #[arg(long, default_value_t = 10)]
    pub interval: u64,
}

impl Cli {
    /// Resolve the client configuration: `--host` first, then the config
    /// file when it exists, then the environment.
    pub fn client_config(&self) -> Result<ClientConfig> {
        if let Some(host) = &self.host {
            return ClientConfig::new(host);
        }
        let path = self.config.clone().unwrap_or_else(ClientConfig::default_path);
        if self.config.is_some() || path.exists() {
            tracing::debug!(path = %path.display(), "Loading configuration file");
            return ClientConfig::from_file(&path);
        }
        ClientConfig::from_env()
    }
}
