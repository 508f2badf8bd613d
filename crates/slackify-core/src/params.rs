//! Per-item parameter resolution.
//!
//! The host supplies parameters through a [`ParameterSource`]; values can
//! differ per item because they may be templated. [`ResolvedParameters`]
//! applies the node's rules (required text, default output field) on top.

use std::collections::BTreeMap;

use serde_json::Value;
use slackify_types::config::DEFAULT_OUTPUT_FIELD;
use slackify_types::node::{PARAM_MARKDOWN_TEXT, PARAM_OUTPUT_FIELD};
use slackify_types::{ErrorContext, Item, NodeError, NodeSettings};

use crate::expression::{self, ExpressionContext};

/// Host-side access to node parameters.
pub trait ParameterSource {
    /// Value of parameter `name` for the item at `item_index`.
    ///
    /// Returns `Ok(None)` when the parameter is not set at all.
    fn node_parameter(&self, name: &str, item_index: usize) -> Result<Option<Value>, NodeError>;
}

impl<F> ParameterSource for F
where
    F: Fn(&str, usize) -> Result<Option<Value>, NodeError>,
{
    fn node_parameter(&self, name: &str, item_index: usize) -> Result<Option<Value>, NodeError> {
        self(name, item_index)
    }
}

/// Parameters given as (possibly templated) strings, evaluated per item.
#[derive(Debug, Clone)]
pub struct TemplateParameters<'a> {
    raw: BTreeMap<String, String>,
    items: &'a [Item],
}

impl<'a> TemplateParameters<'a> {
    /// A source with no parameters set.
    pub fn new(items: &'a [Item]) -> Self {
        Self {
            raw: BTreeMap::new(),
            items,
        }
    }

    /// Parameters taken from the configured node settings.
    pub fn from_settings(settings: &NodeSettings, items: &'a [Item]) -> Self {
        let mut params = Self::new(items).with(PARAM_OUTPUT_FIELD, &settings.output_field);
        if let Some(markdown) = &settings.markdown_text {
            params = params.with(PARAM_MARKDOWN_TEXT, markdown);
        }
        params
    }

    /// Set the raw value of a parameter.
    pub fn with(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.raw.insert(name.into(), template.into());
        self
    }
}

impl ParameterSource for TemplateParameters<'_> {
    fn node_parameter(&self, name: &str, item_index: usize) -> Result<Option<Value>, NodeError> {
        let Some(template) = self.raw.get(name) else {
            return Ok(None);
        };
        let Some(item) = self.items.get(item_index) else {
            return Err(NodeError::parameter(
                name,
                format!("no input item at index {item_index}"),
            ));
        };

        let ctx = ExpressionContext {
            json: &item.json,
            item_index,
        };
        expression::render(template, &ctx).map(Some).map_err(|err| {
            NodeError::parameter(name, &err).with_context(
                ErrorContext::for_parameter(name).with_expression(err.expression.clone()),
            )
        })
    }
}

/// Parameters of one item after resolution and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParameters {
    pub markdown_text: String,
    pub output_field: String,
}

impl ResolvedParameters {
    /// Resolve both node parameters for the item at `item_index`.
    ///
    /// `markdownText` is required; numbers and booleans are accepted and
    /// rendered as text. `outputField` falls back to `slackText`.
    pub fn resolve(source: &dyn ParameterSource, item_index: usize) -> Result<Self, NodeError> {
        let markdown_text = match source.node_parameter(PARAM_MARKDOWN_TEXT, item_index)? {
            Some(Value::String(text)) => text,
            Some(Value::Number(number)) => number.to_string(),
            Some(Value::Bool(flag)) => flag.to_string(),
            Some(other) => {
                return Err(NodeError::parameter(
                    PARAM_MARKDOWN_TEXT,
                    format!("expected text, got {}", type_name(&other)),
                ));
            }
            None => {
                return Err(
                    NodeError::parameter(PARAM_MARKDOWN_TEXT, "a value is required").with_context(
                        ErrorContext::for_parameter(PARAM_MARKDOWN_TEXT)
                            .with_description("set Markdown Text to the text to convert"),
                    ),
                );
            }
        };

        let output_field = match source.node_parameter(PARAM_OUTPUT_FIELD, item_index)? {
            None => DEFAULT_OUTPUT_FIELD.to_owned(),
            Some(Value::String(field)) if !field.trim().is_empty() => field,
            Some(Value::String(_)) => {
                return Err(NodeError::parameter(
                    PARAM_OUTPUT_FIELD,
                    "field name must not be empty",
                ));
            }
            Some(other) => {
                return Err(NodeError::parameter(
                    PARAM_OUTPUT_FIELD,
                    format!("expected a field name, got {}", type_name(&other)),
                ));
            }
        };

        Ok(Self {
            markdown_text,
            output_field,
        })
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
