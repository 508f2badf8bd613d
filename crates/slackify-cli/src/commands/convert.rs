//! `slackify convert` -- convert one Markdown document.
//!
//! # Examples
//!
//! ```text
//! slackify convert README.md
//! echo '**hi**' | slackify convert
//! ```

use std::path::PathBuf;

use clap::Args;
use slackify_core::{MarkdownConverter, SlackMarkdownConverter};
use slackify_types::Config;
use tracing::debug;

/// Arguments for the `convert` subcommand.
#[derive(Args)]
pub struct ConvertArgs {
    /// Markdown file to convert (reads stdin when omitted or `-`).
    pub file: Option<PathBuf>,
}

/// Convert the input and print the mrkdwn to stdout.
pub fn run(args: ConvertArgs, config: &Config) -> anyhow::Result<()> {
    let markdown = super::read_input(args.file.as_deref())?;
    let converted = convert(&markdown, config)?;
    println!("{converted}");
    Ok(())
}

fn convert(markdown: &str, config: &Config) -> anyhow::Result<String> {
    let converter = SlackMarkdownConverter::new(config.converter.clone());
    debug!(bytes = markdown.len(), "converting document");
    Ok(converter.convert(markdown)?)
}
