//! Handlers for the CLI subcommands.

use std::time::Duration;

use crate::auth::Token;
use crate::error::{OpencgaError, Result};
use crate::job::WaitTarget;
use crate::session::{ClientOptions, OpencgaClient, VersionCheck, COMPATIBLE_SERVER_VERSION};

use super::{Cli, Commands, HelpArgs, LoginArgs, WaitJobArgs};

/// Run the parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.client_config()?;
    let options = ClientOptions::builder()
        .maybe_token(cli.token.map(Token::new))
        // `about` reports the version itself.
        .check_versions(!matches!(cli.command, Commands::About))
        .build();
    let client = OpencgaClient::connect(config, options).await?;

    match cli.command {
        Commands::About => handle_about(&client).await,
        Commands::Help(args) => handle_help(&client, &args).await,
        Commands::Login(args) => handle_login(&client, &args).await,
        Commands::WaitJob(args) => handle_wait_job(&client, &args).await,
    }
}

/// Handle `opencga about`.
pub async fn handle_about(client: &OpencgaClient) -> Result<()> {
    let about = client.meta().about().await?;
    if let Some(info) = about.get_result(0) {
        println!("{}", serde_json::to_string_pretty(info)?);
    }
    println!("{}", version_summary(&client.check_versions().await));
    Ok(())
}

/// One line describing a version check, for terminal output.
pub fn version_summary(check: &VersionCheck) -> String {
    match check {
        VersionCheck::Compatible => {
            format!("Client version {COMPATIBLE_SERVER_VERSION} is compatible with the server")
        }
        VersionCheck::ClientNewer { client, server } => format!(
            "Client version {client} is newer than server version {server}; some features may be unavailable"
        ),
        VersionCheck::ClientOlder { client, server } => {
            format!("Client version {client} is older than server version {server}")
        }
        VersionCheck::Unknown { server: Some(server) } => {
            format!("Could not compare client version {COMPATIBLE_SERVER_VERSION} with server version {server}")
        }
        VersionCheck::Unknown { server: None } => "Server version unavailable".to_string(),
    }
}


/// Handle `opencga help [category] [--parameters]`.
pub async fn handle_help(client: &OpencgaClient, args: &HelpArgs) -> Result<()> {
    let text = client.help(args.category.as_deref(), args.parameters).await?;
    if text.is_empty() {
        if let Some(category) = &args.category {
            return Err(OpencgaError::InvalidArgument(format!(
                "unknown category '{category}'; run `opencga help` to list categories"
            )));
        }
    }
    print!("{text}");
    Ok(())
}

/// Handle `opencga login [user]`. Prints the token on stdout so it can be
/// exported as `OPENCGA_TOKEN`.
pub async fn handle_login(client: &OpencgaClient, args: &LoginArgs) -> Result<()> {
    let user = args
        .user
        .as_deref()
        .or(client.config().user())
        .ok_or_else(|| OpencgaError::InvalidArgument("no user given and none configured".into()))?
        .to_string();
    let token = client.login(Some(&user), None).await?;
    eprintln!("Logged in as {user}");
    println!("{}", token.as_str());
    Ok(())
}

/// Handle `opencga wait-job`.
pub async fn handle_wait_job(client: &OpencgaClient, args: &WaitJobArgs) -> Result<()> {
    let study = args
        .study
        .as_deref()
        .or(client.config().study())
        .unwrap_or_default();
    eprintln!("Waiting for job {}...", args.job);
    let status = client
        .wait_for_job(
            WaitTarget::ids(study, args.job.as_str()),
            Duration::from_secs(args.interval),
        )
        .await?;
    println!("{} {} {}", args.job, status.name, status.date);
    Ok(())
}
