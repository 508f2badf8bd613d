//! `slackify config` -- display resolved configuration.
//!
//! # Examples
//!
//! ```text
//! slackify config show
//! slackify --config ./slackify.json config show
//! ```

use slackify_types::Config;

/// Display the resolved configuration as formatted JSON.
pub fn config_show(config: &Config) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    println!("{json}");
    Ok(())
}
