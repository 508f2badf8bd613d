//! Error types for slackify.
//!
//! Two layers of errors exist:
//!
//! - [`NodeError`] is the per-item failure: a parameter that could not be
//!   resolved, or a [`ConversionError`] from the converter.
//! - [`NodeOperationError`] is what a fail-fast run surfaces to the host: the
//!   item failure plus the position of the item that caused it.
//!
//! [`SlackifyError`] covers everything around the node itself (config,
//! I/O, malformed input batches).

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Positional and diagnostic metadata attached to a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorContext {
    /// Position of the item being processed when the failure happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_index: Option<usize>,

    /// Parameter being resolved, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,

    /// Template expression that failed to evaluate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    /// Free-form hint for the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ErrorContext {
    /// Context naming the parameter that failed to resolve.
    pub fn for_parameter(name: impl Into<String>) -> Self {
        Self {
            parameter: Some(name.into()),
            ..Self::default()
        }
    }

    /// Context carrying only an item position.
    pub fn at_item(item_index: usize) -> Self {
        Self {
            item_index: Some(item_index),
            ..Self::default()
        }
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Failure reported by a markdown converter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConversionError {
    /// The input exceeds the configured size limit.
    #[error("markdown input is {len} bytes, exceeding the {limit} byte limit")]
    InputTooLarge {
        /// Size of the rejected input in bytes.
        len: usize,
        /// Configured maximum in bytes.
        limit: usize,
    },

    /// The converter rejected the input for another reason.
    #[error("{0}")]
    Rejected(String),
}

/// Failure while processing a single item.
///
/// Both variants are handled the same way by the item processor: the
/// message lands in the item's `error` field in continue mode, or the
/// whole run is aborted in fail-fast mode.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum NodeError {
    /// A parameter could not be read or evaluated for the item.
    #[error("{message}")]
    ParameterResolution {
        /// Human-readable reason.
        message: String,
        /// Which parameter and expression were involved.
        context: ErrorContext,
    },

    /// The converter failed on the resolved text.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl NodeError {
    /// Resolution failure for `parameter` with a reason.
    pub fn parameter(parameter: &str, reason: impl fmt::Display) -> Self {
        NodeError::ParameterResolution {
            message: format!("could not get parameter '{parameter}': {reason}"),
            context: ErrorContext::for_parameter(parameter),
        }
    }

    /// Context carried by the error, if the failing layer attached one.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            NodeError::ParameterResolution { context, .. } => Some(context),
            NodeError::Conversion(_) => None,
        }
    }

    pub fn context_mut(&mut self) -> Option<&mut ErrorContext> {
        match self {
            NodeError::ParameterResolution { context, .. } => Some(context),
            NodeError::Conversion(_) => None,
        }
    }

    /// Replace the context of a [`NodeError::ParameterResolution`].
    ///
    /// Conversion errors carry no context and are returned unchanged.
    pub fn with_context(mut self, new_context: ErrorContext) -> Self {
        if let Some(context) = self.context_mut() {
            *context = new_context;
        }
        self
    }
}

/// Failure that aborted a fail-fast run.
///
/// Always carries the index of the failing item in `context.item_index`.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOperationError {
    /// Name of the node that failed.
    pub node: String,
    /// Message of the underlying item failure.
    pub message: String,
    /// Merged context: whatever the failing layer attached, plus the item index.
    pub context: ErrorContext,
    source: NodeError,
}

impl NodeOperationError {
    /// Wrap an item failure with the position of the item.
    ///
    /// If the failure already carries context, only its `item_index` is
    /// set; the parameter and expression it names are kept.
    pub fn for_item(node: impl Into<String>, mut error: NodeError, item_index: usize) -> Self {
        let context = match error.context_mut() {
            Some(context) => {
                context.item_index = Some(item_index);
                context.clone()
            }
            None => ErrorContext::at_item(item_index),
        };
        Self {
            node: node.into(),
            message: error.to_string(),
            context,
            source: error,
        }
    }

    /// Index of the item that aborted the run.
    pub fn item_index(&self) -> Option<usize> {
        self.context.item_index
    }

    /// The per-item failure that was wrapped.
    pub fn cause(&self) -> &NodeError {
        &self.source
    }
}

impl fmt::Display for NodeOperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.node, self.message)?;
        if let Some(index) = self.context.item_index {
            write!(f, " [item {index}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for NodeOperationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Top-level error type for slackify.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SlackifyError {
    /// Configuration is malformed or semantically invalid.
    #[error("invalid config: {reason}")]
    ConfigInvalid {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// An input batch does not have the expected shape.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What is wrong with the input.
        reason: String,
    },

    /// A fail-fast run was aborted.
    #[error(transparent)]
    Node(#[from] NodeOperationError),

    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SlackifyError>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn conversion_error_display() {
        let err = ConversionError::InputTooLarge { len: 12, limit: 10 };
        assert_eq!(
            err.to_string(),
            "markdown input is 12 bytes, exceeding the 10 byte limit"
        );
    }

    #[test]
    fn parameter_error_names_parameter() {
        let err = NodeError::parameter("markdownText", "a value is required");
        assert_eq!(
            err.to_string(),
            "could not get parameter 'markdownText': a value is required"
        );
        assert_eq!(
            err.context().and_then(|c| c.parameter.as_deref()),
            Some("markdownText")
        );
    }

    #[test]
    fn conversion_variant_is_transparent() {
        let err = NodeError::from(ConversionError::Rejected("bad input".into()));
        assert_eq!(err.to_string(), "bad input");
        assert!(err.context().is_none());
    }

    #[test]
    fn for_item_creates_context_when_missing() {
        let err = NodeError::from(ConversionError::Rejected("boom".into()));
        let wrapped = NodeOperationError::for_item("Slackify Markdown", err, 3);
        assert_eq!(wrapped.item_index(), Some(3));
        assert_eq!(wrapped.context, ErrorContext::at_item(3));
        assert_eq!(wrapped.to_string(), "Slackify Markdown: boom [item 3]");
    }

    #[test]
    fn for_item_keeps_existing_context() {
        let context = ErrorContext::for_parameter("outputField")
            .with_expression("{{ $json.missing }}")
            .with_description("check the field name");
        let err = NodeError::parameter("outputField", "field 'missing' not found")
            .with_context(ErrorContext {
                item_index: Some(99),
                ..context.clone()
            });

        let wrapped = NodeOperationError::for_item("node", err, 1);
        assert_eq!(wrapped.item_index(), Some(1));
        assert_eq!(wrapped.context.parameter.as_deref(), Some("outputField"));
        assert_eq!(
            wrapped.context.expression.as_deref(),
            Some("{{ $json.missing }}")
        );
        assert_eq!(
            wrapped.context.description.as_deref(),
            Some("check the field name")
        );
        // The wrapped cause sees the overwritten index too.
        assert_eq!(
            wrapped.cause().context().and_then(|c| c.item_index),
            Some(1)
        );
    }

    #[test]
    fn operation_error_exposes_source() {
        let err = NodeError::from(ConversionError::Rejected("nope".into()));
        let wrapped = NodeOperationError::for_item("node", err, 0);
        let source = wrapped.source().expect("source should be set");
        assert_eq!(source.to_string(), "nope");
    }

    #[test]
    fn error_context_serializes_camel_case() {
        let context = ErrorContext::at_item(2).with_expression("{{ $json.a }}");
        let json = serde_json::to_value(&context).unwrap();
        assert_eq!(json["itemIndex"], 2);
        assert_eq!(json["expression"], "{{ $json.a }}");
        assert!(json.get("parameter").is_none());
    }

    #[test]
    fn slackify_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SlackifyError = io_err.into();
        assert!(matches!(err, SlackifyError::Io(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn slackify_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{{bad}}").unwrap_err();
        let err: SlackifyError = json_err.into();
        assert!(matches!(err, SlackifyError::Json(_)));
    }

    #[test]
    fn slackify_error_from_node_operation() {
        let err = NodeError::from(ConversionError::Rejected("x".into()));
        let err: SlackifyError = NodeOperationError::for_item("n", err, 4).into();
        assert_eq!(err.to_string(), "n: x [item 4]");
    }
}
