//! # slackify-core
//!
//! Markdown to Slack mrkdwn conversion for workflow items.
//!
//! Contains the converter, template expression evaluation for parameters,
//! the item processor and the node that ties them together.

pub mod expression;
pub mod markdown;
pub mod node;
pub mod params;
pub mod processor;

pub use markdown::{MarkdownConverter, SlackMarkdownConverter};
pub use node::SlackifyMarkdownNode;
pub use params::{ParameterSource, ResolvedParameters, TemplateParameters};
pub use processor::ItemProcessor;
