//! `slackify describe` -- print the node description.

use slackify_core::node;

/// Print the node registration metadata as formatted JSON.
pub fn run() -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&node::description())?;
    println!("{json}");
    Ok(())
}
