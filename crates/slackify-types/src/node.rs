//! Static node description.
//!
//! Mirrors what a workflow host needs to register the node: display
//! metadata, connection types and the parameters it accepts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameter holding the markdown to convert.
pub const PARAM_MARKDOWN_TEXT: &str = "markdownText";

/// Parameter naming the destination field.
pub const PARAM_OUTPUT_FIELD: &str = "outputField";

/// Value type of a node property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
}

/// One configurable parameter of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProperty {
    pub display_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyType,
    pub default: Value,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    pub description: String,
}

/// Defaults applied when the node is added to a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefaults {
    pub name: String,
}

/// Registration metadata for a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub display_name: String,
    pub name: String,
    pub group: Vec<String>,
    pub version: u32,
    pub description: String,
    pub defaults: NodeDefaults,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub properties: Vec<NodeProperty>,
}

impl NodeDescription {
    /// Look up a property by its parameter name.
    pub fn property(&self, name: &str) -> Option<&NodeProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}
