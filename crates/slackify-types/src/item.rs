//! Workflow items.
//!
//! An [`Item`] is the host envelope around one [`Record`]. Output items are
//! tagged with a [`PairedItem`] naming the input position they came from.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SlackifyError};

/// Field names mapped to JSON values.
pub type Record = serde_json::Map<String, Value>;

/// Field added to an item whose processing failed in continue mode.
pub const ERROR_FIELD: &str = "error";

/// Envelope keys recognised when parsing a batch.
const ENVELOPE_KEYS: [&str; 3] = ["json", "pairedItem", "binary"];

/// Index of the input item an output item was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairedItem(pub usize);

/// One unit of workflow data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// The record carried by this item.
    pub json: Record,

    /// Input position this item was derived from.
    #[serde(
        default,
        rename = "pairedItem",
        skip_serializing_if = "Option::is_none"
    )]
    pub paired_item: Option<PairedItem>,
}

impl Item {
    pub fn new(json: Record) -> Self {
        Self {
            json,
            paired_item: None,
        }
    }

    /// Build a new item holding a copy of this item's fields plus `key`.
    ///
    /// An existing field named `key` is overwritten. `self` is left untouched.
    pub fn derive(&self, key: &str, value: Value, item_index: usize) -> Item {
        let mut json = self.json.clone();
        json.insert(key.to_owned(), value);
        Item {
            json,
            paired_item: Some(PairedItem(item_index)),
        }
    }

    /// Copy of this item annotated with an `error` field.
    pub fn with_error(&self, message: impl Into<String>, item_index: usize) -> Item {
        self.derive(ERROR_FIELD, Value::String(message.into()), item_index)
    }

    /// Parse a batch of items from a JSON document.
    ///
    /// Accepts an array whose entries are either host envelopes
    /// (`{"json": {...}}`, optionally with `pairedItem`/`binary`) or bare
    /// objects, which are wrapped as-is. A single object is a batch of one.
    /// Incoming `pairedItem` tags are discarded.
    pub fn parse_batch(document: Value) -> Result<Vec<Item>> {
        match document {
            Value::Array(entries) => entries
                .into_iter()
                .enumerate()
                .map(|(index, entry)| Self::parse_entry(index, entry))
                .collect(),
            Value::Object(_) => Ok(vec![Self::parse_entry(0, document)?]),
            other => Err(SlackifyError::InvalidInput {
                reason: format!(
                    "expected an array of items, got {}",
                    json_type_name(&other)
                ),
            }),
        }
    }

    fn parse_entry(index: usize, entry: Value) -> Result<Item> {
        let mut map = match entry {
            Value::Object(map) => map,
            other => {
                return Err(SlackifyError::InvalidInput {
                    reason: format!(
                        "item {index} must be a JSON object, got {}",
                        json_type_name(&other)
                    ),
                });
            }
        };

        let is_envelope = matches!(map.get("json"), Some(Value::Object(_)))
            && map.keys().all(|key| ENVELOPE_KEYS.contains(&key.as_str()));
        if is_envelope && let Some(Value::Object(json)) = map.remove("json") {
            return Ok(Item::new(json));
        }
        Ok(Item::new(map))
    }
}

impl From<Record> for Item {
    fn from(json: Record) -> Self {
        Item::new(json)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
