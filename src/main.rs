use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "handoff")]
#[command(version, about = "Hands the top unassigned tracker issue to an AI assistant in chat")]
pub struct Cli {
    /// Raise log verbosity to debug
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Perform exactly one dispatch run
    Run,
    /// Select and print the message without posting or writing back
    Preview,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Run => cmd::cmd_run().await?,
        Commands::Preview => cmd::cmd_preview().await?,
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "handoff=debug" } else { "handoff=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
