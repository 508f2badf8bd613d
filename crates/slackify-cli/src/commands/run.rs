//! `slackify run` -- run the node over a batch of items.
//!
//! Reads a JSON array of items (`{"json": {...}}` envelopes or bare
//! objects), converts each item and prints the output items as JSON.
//!
//! # Examples
//!
//! ```text
//! slackify run --input items.json --markdown-text '{{ $json.body }}'
//! cat items.json | slackify run --markdown-text '{{ $json.body }}' --continue-on-fail
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use slackify_core::{SlackifyMarkdownNode, TemplateParameters};
use slackify_types::{Config, Item, NodeSettings};
use tracing::info;

/// Arguments for the `run` subcommand.
#[derive(Args)]
pub struct RunArgs {
    /// JSON file holding the input items (reads stdin when omitted or `-`).
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Markdown to convert; may reference item fields, e.g. `{{ $json.text }}`.
    #[arg(long)]
    pub markdown_text: Option<String>,

    /// Field that receives the converted text.
    #[arg(long)]
    pub output_field: Option<String>,

    /// Record failures on the item instead of aborting the run.
    #[arg(long)]
    pub continue_on_fail: bool,

    /// Pretty-print the output items.
    #[arg(long)]
    pub pretty: bool,
}

impl RunArgs {
    /// Node settings from config with command-line overrides applied.
    fn settings(&self, config: &Config) -> NodeSettings {
        let mut settings = config.node.clone();
        if let Some(markdown) = &self.markdown_text {
            settings.markdown_text = Some(markdown.clone());
        }
        if let Some(field) = &self.output_field {
            settings.output_field = field.clone();
        }
        if self.continue_on_fail {
            settings.continue_on_fail = true;
        }
        settings
    }
}

/// Run the node and print the resulting items.
pub fn run(args: RunArgs, config: &Config) -> anyhow::Result<()> {
    let raw = super::read_input(args.input.as_deref())?;
    let output = execute(&raw, &args.settings(config), config)?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{json}");
    Ok(())
}

fn execute(raw: &str, settings: &NodeSettings, config: &Config) -> anyhow::Result<Vec<Item>> {
    let document: serde_json::Value =
        serde_json::from_str(raw).context("input is not valid JSON")?;
    let items = Item::parse_batch(document)?;
    info!(items = items.len(), "read input items");

    let node = SlackifyMarkdownNode::new(config.converter.clone());
    let params = TemplateParameters::from_settings(settings, &items);
    let output = node.execute(&items, &params, settings.failure_mode())?;
    Ok(output)
}
