//! Materialize fragments into fully nested JSON.

use super::{FragmentGraph, FragmentKey, Node};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Reference hops followed along one path before the key placeholder is
/// emitted instead. Keeps recursion depth bounded on long acyclic chains.
pub const MAX_REFERENCE_DEPTH: usize = 128;

/// Follows reference markers through a [`FragmentGraph`].
///
/// Resolution is total and never mutates the graph. Keys being resolved on the
/// current path are tracked; re-entering one yields the key string itself as a
/// placeholder, which bounds the output for cyclic graphs. The same
/// placeholder stands in once a path is [`MAX_REFERENCE_DEPTH`] hops deep.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'g> {
    graph: &'g FragmentGraph,
}

impl<'g> ReferenceResolver<'g> {
    pub fn new(graph: &'g FragmentGraph) -> Self {
        Self { graph }
    }

    /// Resolve the fragment stored under `key`, or `None` if there is none.
    ///
    /// The key itself counts as in progress, so a fragment that points back
    /// at itself gets a placeholder rather than a second copy.
    pub fn resolve_key(&self, key: &str) -> Option<Value> {
        let (key, _) = self.graph.get_key_value(key)?;
        let mut path = HashSet::new();
        Some(self.follow(key, &mut path))
    }

    /// Resolve an arbitrary JSON value against the graph.
    pub fn resolve_value(&self, value: &Value) -> Value {
        self.resolve(&self.graph.classify(value))
    }

    /// Resolve an already classified node.
    pub fn resolve(&self, node: &Node) -> Value {
        let mut path = HashSet::new();
        self.resolve_node(node, &mut path)
    }

    fn resolve_node(&self, node: &Node, path: &mut HashSet<&'g str>) -> Value {
        match node {
            Node::Scalar(value) => value.clone(),
            Node::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.resolve_node(item, path))
                    .collect(),
            ),
            Node::Object(fields) => {
                let mut out = Map::with_capacity(fields.len());
                for (name, child) in fields {
                    out.insert(name.clone(), self.resolve_node(child, path));
                }
                Value::Object(out)
            }
            Node::Reference(key) => self.follow(key, path),
        }
    }

    fn follow(&self, key: &FragmentKey, path: &mut HashSet<&'g str>) -> Value {
        let graph: &'g FragmentGraph = self.graph;
        let Some((stored, target)) = graph.get_key_value(key.as_str()) else {
            return Value::String(key.to_string());
        };
        if path.len() >= MAX_REFERENCE_DEPTH || !path.insert(stored.as_str()) {
            return Value::String(stored.to_string());
        }
        let resolved = self.resolve_node(target, path);
        path.remove(stored.as_str());
        resolved
    }
}
