//! `slackify` -- convert Markdown to Slack mrkdwn.
//!
//! Provides the following subcommands:
//!
//! - `slackify convert` -- Convert a Markdown document from a file or stdin.
//! - `slackify run` -- Run the Slackify Markdown node over a batch of JSON items.
//! - `slackify describe` -- Print the node description.
//! - `slackify config show` -- Show the resolved configuration.

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;

/// Markdown to Slack mrkdwn converter.
#[derive(Parser)]
#[command(name = "slackify", about = "Markdown to Slack mrkdwn converter", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (overrides auto-discovery).
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert a Markdown document and print the mrkdwn.
    Convert(commands::convert::ConvertArgs),

    /// Run the node over a JSON array of items.
    Run(commands::run::RunArgs),

    /// Print the node description as JSON.
    Describe,

    /// Show resolved configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCmd,
    },
}

/// Subcommands for `slackify config`.
#[derive(Subcommand)]
enum ConfigCmd {
    /// Show the full resolved configuration.
    Show,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // `describe` needs no config; load errors surface after logging is up.
    let loaded = commands::load_config(cli.config.as_deref());

    let default_filter = match &loaded {
        _ if cli.verbose => "debug".to_owned(),
        Ok(loaded) => loaded.config.logging.level.clone(),
        Err(_) => "info".to_owned(),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    if matches!(cli.command, Commands::Describe) {
        return commands::describe::run();
    }

    let loaded = loaded?;
    match &loaded.source {
        Some(path) => debug!(path = %path.display(), "loaded config"),
        None => debug!("no config file found, using defaults"),
    }
    let config = loaded.config;

    match cli.command {
        Commands::Convert(args) => commands::convert::run(args, &config)?,
        Commands::Run(args) => commands::run::run(args, &config)?,
        Commands::Describe => commands::describe::run()?,
        Commands::Config { action } => match action {
            ConfigCmd::Show => commands::config_cmd::config_show(&config)?,
        },
    }

    Ok(())
}
