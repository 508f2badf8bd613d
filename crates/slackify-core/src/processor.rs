//! Item processor: per-item parameter resolution, conversion and error
//! capture.

use serde_json::Value;
use slackify_types::{FailureMode, Item, NodeError, NodeOperationError};
use tracing::{debug, info, warn};

use crate::markdown::MarkdownConverter;
use crate::params::{ParameterSource, ResolvedParameters};

/// Runs a converter over a batch of items, in order.
pub struct ItemProcessor<'a> {
    node: &'a str,
    converter: &'a dyn MarkdownConverter,
}

impl<'a> ItemProcessor<'a> {
    /// `node` is the name attached to errors that abort a run.
    pub fn new(node: &'a str, converter: &'a dyn MarkdownConverter) -> Self {
        Self { node, converter }
    }

    /// Process `items` and return one output item per input.
    ///
    /// With [`FailureMode::Continue`] a failing item is copied with an
    /// `error` field and processing goes on. With [`FailureMode::FailFast`]
    /// the first failure aborts the run and no output is returned.
    pub fn process(
        &self,
        items: &[Item],
        params: &dyn ParameterSource,
        mode: FailureMode,
    ) -> Result<Vec<Item>, NodeOperationError> {
        let mut output = Vec::with_capacity(items.len());
        let mut failed = 0usize;

        for (index, item) in items.iter().enumerate() {
            match self.process_item(item, index, params) {
                Ok(converted) => output.push(converted),
                Err(err) if mode.continues() => {
                    warn!(node = self.node, item = index, error = %err, "item failed, continuing");
                    failed += 1;
                    output.push(item.with_error(err.to_string(), index));
                }
                Err(err) => {
                    warn!(node = self.node, item = index, error = %err, "item failed, aborting run");
                    return Err(NodeOperationError::for_item(self.node, err, index));
                }
            }
        }

        info!(
            node = self.node,
            items = items.len(),
            failed,
            "processed batch"
        );
        Ok(output)
    }

    fn process_item(
        &self,
        item: &Item,
        index: usize,
        params: &dyn ParameterSource,
    ) -> Result<Item, NodeError> {
        let resolved = ResolvedParameters::resolve(params, index)?;
        debug!(
            item = index,
            field = %resolved.output_field,
            bytes = resolved.markdown_text.len(),
            "converting item"
        );
        let converted = self.converter.convert(&resolved.markdown_text)?;
        Ok(item.derive(&resolved.output_field, Value::String(converted), index))
    }
}
