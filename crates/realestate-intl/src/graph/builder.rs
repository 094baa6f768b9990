//! Merge cache snapshots from a page's inline JSON blocks into one graph.

use super::{FragmentGraph, FragmentKey};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Property that holds a normalized cache snapshot wherever it appears.
pub const CACHE_SNAPSHOT_PROPERTY: &str = "apolloState";

/// Accumulates fragments across blocks with last-write-wins semantics.
///
/// A key overwritten by a later snapshot keeps its original position but takes
/// the later fragment whole; fields are never merged.
#[derive(Debug, Default)]
pub struct FragmentGraphBuilder {
    fragments: IndexMap<FragmentKey, Value>,
    blocks_parsed: usize,
    blocks_skipped: usize,
    snapshots_merged: usize,
}

impl FragmentGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from raw text blocks in page order.
    pub fn from_blocks<I, S>(blocks: I) -> FragmentGraph
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = Self::new();
        for block in blocks {
            builder.merge_block(block.as_ref());
        }
        builder.build()
    }

    /// Parse one block and merge every snapshot inside it.
    ///
    /// Blocks that are not JSON are expected noise and are skipped; returns
    /// whether the block parsed.
    pub fn merge_block(&mut self, block: &str) -> bool {
        match serde_json::from_str::<Value>(block.trim()) {
            Ok(document) => {
                self.blocks_parsed += 1;
                self.merge_document(&document);
                true
            }
            Err(e) => {
                self.blocks_skipped += 1;
                tracing::debug!("skipping inline block that is not JSON: {e}");
                false
            }
        }
    }

    /// Merge every snapshot found anywhere inside an already parsed document.
    pub fn merge_document(&mut self, document: &Value) {
        for snapshot in find_snapshots(document, Vec::new()) {
            self.snapshots_merged += 1;
            for (key, fragment) in snapshot {
                self.fragments
                    .insert(FragmentKey::new(key.as_str()), fragment.clone());
            }
        }
    }

    pub fn blocks_parsed(&self) -> usize {
        self.blocks_parsed
    }

    pub fn blocks_skipped(&self) -> usize {
        self.blocks_skipped
    }

    pub fn snapshots_merged(&self) -> usize {
        self.snapshots_merged
    }

    /// Seal the accumulated fragments into a classified graph.
    pub fn build(self) -> FragmentGraph {
        tracing::debug!(
            "fragment graph: {} fragments from {} snapshot(s), {} block(s) parsed, {} skipped",
            self.fragments.len(),
            self.snapshots_merged,
            self.blocks_parsed,
            self.blocks_skipped
        );
        FragmentGraph::seal(self.fragments)
    }
}

/// Pre-order walk collecting snapshot objects. An object's own snapshot comes
/// before any snapshot nested below it, so deeper ones win on collision.
fn find_snapshots<'a>(
    value: &'a Value,
    mut found: Vec<&'a Map<String, Value>>,
) -> Vec<&'a Map<String, Value>> {
    match value {
        Value::Object(fields) => {
            if let Some(Value::Object(snapshot)) = fields.get(CACHE_SNAPSHOT_PROPERTY) {
                found.push(snapshot);
            }
            for child in fields.values() {
                found = find_snapshots(child, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                found = find_snapshots(item, found);
            }
        }
        _ => {}
    }
    found
}
