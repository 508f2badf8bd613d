//! The Slackify Markdown node.

use serde_json::Value;
use slackify_types::config::DEFAULT_OUTPUT_FIELD;
use slackify_types::node::{NodeDefaults, PARAM_MARKDOWN_TEXT, PARAM_OUTPUT_FIELD};
use slackify_types::{
    ConverterOptions, FailureMode, Item, NodeDescription, NodeOperationError, NodeProperty,
    PropertyType,
};

use crate::markdown::{MarkdownConverter, SlackMarkdownConverter};
use crate::params::ParameterSource;
use crate::processor::ItemProcessor;

const DISPLAY_NAME: &str = "Slackify Markdown";

/// Registration metadata of the node.
pub fn description() -> NodeDescription {
    NodeDescription {
        display_name: DISPLAY_NAME.into(),
        name: "slackifyMarkdown".into(),
        group: vec!["transform".into()],
        version: 1,
        description: "Converts Markdown to Slack-formatted text".into(),
        defaults: NodeDefaults {
            name: DISPLAY_NAME.into(),
        },
        inputs: vec!["main".into()],
        outputs: vec!["main".into()],
        properties: vec![
            NodeProperty {
                display_name: "Markdown Text".into(),
                name: PARAM_MARKDOWN_TEXT.into(),
                kind: PropertyType::String,
                default: Value::String(String::new()),
                required: true,
                description: "The markdown text to convert to Slack format".into(),
            },
            NodeProperty {
                display_name: "Output Field".into(),
                name: PARAM_OUTPUT_FIELD.into(),
                kind: PropertyType::String,
                default: Value::String(DEFAULT_OUTPUT_FIELD.into()),
                required: false,
                description: "The name of the field to store the converted Slack text".into(),
            },
        ],
    }
}

/// Node converting the markdown of each item to Slack mrkdwn.
pub struct SlackifyMarkdownNode {
    description: NodeDescription,
    converter: Box<dyn MarkdownConverter>,
}

impl SlackifyMarkdownNode {
    /// Node backed by the built-in Slack converter.
    pub fn new(options: ConverterOptions) -> Self {
        Self::with_converter(Box::new(SlackMarkdownConverter::new(options)))
    }

    /// Node backed by a caller-supplied converter.
    pub fn with_converter(converter: Box<dyn MarkdownConverter>) -> Self {
        Self {
            description: description(),
            converter,
        }
    }

    pub fn description(&self) -> &NodeDescription {
        &self.description
    }

    /// Run the node over a batch of items.
    ///
    /// Errors that abort the run are attributed to this node's default name.
    pub fn execute(
        &self,
        items: &[Item],
        params: &dyn ParameterSource,
        mode: FailureMode,
    ) -> Result<Vec<Item>, NodeOperationError> {
        ItemProcessor::new(&self.description.defaults.name, self.converter.as_ref())
            .process(items, params, mode)
    }
}

impl Default for SlackifyMarkdownNode {
    fn default() -> Self {
        Self::new(ConverterOptions::default())
    }
}
