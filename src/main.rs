//! OpenCGA CLI binary entry point.

use clap::Parser;
use opencga::cli::{commands, Cli};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = commands::run(cli).await {
        eprintln!("Error: {e}");
        if let Some(hint) = e.recovery_suggestion().hint() {
            eprintln!("Hint: {hint}");
        }
        std::process::exit(1);
    }
}
