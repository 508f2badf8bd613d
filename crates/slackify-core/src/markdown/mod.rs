//! Markdown conversion.
//!
//! The [`MarkdownConverter`] trait is the seam between the item processor
//! and whatever turns CommonMark into the target format. The processor only
//! ever sees the trait; [`slack::SlackMarkdownConverter`] is the built-in
//! implementation producing Slack `mrkdwn`.

pub mod slack;

pub use slack::SlackMarkdownConverter;

use slackify_types::ConversionError;

/// Trait for converting CommonMark input into a target markup.
pub trait MarkdownConverter: Send + Sync {
    /// Convert the given CommonMark `markdown` string.
    ///
    /// Implementations must not have side effects: the same input always
    /// yields the same result.
    fn convert(&self, markdown: &str) -> Result<String, ConversionError>;
}
