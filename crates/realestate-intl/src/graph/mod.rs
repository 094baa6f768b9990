//! Normalized fragment graph recovered from a page's embedded cache snapshots.
//!
//! Server-rendered listing pages ship the client-side Apollo cache as a flat
//! table of fragments keyed by `"<TypeName>:<id>"`. Fragments point at each
//! other through reference markers: any object whose `id` field names another
//! key in the table. [`FragmentGraph`] holds that table after every snapshot on
//! a page has been merged, with each fragment already classified into
//! [`Node`]s so resolution never re-inspects raw JSON.

pub mod builder;
pub mod resolve;

pub use builder::FragmentGraphBuilder;
pub use resolve::ReferenceResolver;

use indexmap::IndexMap;
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;

/// Type name of the primary listing fragment.
pub const LISTING_TYPE: &str = "ListingDetail";
/// Type name of the listing agent fragment.
pub const AGENT_TYPE: &str = "Agent";
/// Field that turns an object into a reference marker.
pub const REFERENCE_FIELD: &str = "id";

/// Type-qualified fragment identifier, `"<TypeName>:<id>"`.
///
/// Keys are stored verbatim. Cache bookkeeping entries such as `ROOT_QUERY`
/// carry no `:` and therefore have no id portion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentKey(String);

impl FragmentKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before the first `:`, or the whole key when there is none.
    pub fn type_name(&self) -> &str {
        self.0.split_once(':').map(|(ty, _)| ty).unwrap_or(&self.0)
    }

    /// The part after the first `:`.
    pub fn id(&self) -> Option<&str> {
        self.0.split_once(':').map(|(_, id)| id)
    }

    /// True when the key reads `"<type_name>:<something>"`.
    pub fn is_type(&self, type_name: &str) -> bool {
        self.id().is_some() && self.type_name() == type_name
    }
}

impl Borrow<str> for FragmentKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FragmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FragmentKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// A JSON value classified against the keys of one graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// String, number, bool or null.
    Scalar(Value),
    List(Vec<Node>),
    Object(IndexMap<String, Node>),
    /// An object whose `id` names a fragment in the graph. The marker's other
    /// fields are dropped at classification time.
    Reference(FragmentKey),
}

impl Node {
    /// Classify `value`, turning every object whose `id` is one of `keys`
    /// into a [`Node::Reference`].
    pub fn classify<V>(value: &Value, keys: &IndexMap<FragmentKey, V>) -> Node {
        match value {
            Value::Object(fields) => {
                if let Some(Value::String(target)) = fields.get(REFERENCE_FIELD) {
                    if let Some((key, _)) = keys.get_key_value(target.as_str()) {
                        return Node::Reference(key.clone());
                    }
                }
                Node::Object(
                    fields
                        .iter()
                        .map(|(name, child)| (name.clone(), Node::classify(child, keys)))
                        .collect(),
                )
            }
            Value::Array(items) => {
                Node::List(items.iter().map(|item| Node::classify(item, keys)).collect())
            }
            scalar => Node::Scalar(scalar.clone()),
        }
    }

    /// Whether the source object carried a usable `id`: a scalar that is not
    /// null, `false`, zero or the empty string.
    pub fn has_id(&self) -> bool {
        match self {
            Node::Reference(_) => true,
            Node::Object(fields) => match fields.get(REFERENCE_FIELD) {
                Some(Node::Scalar(Value::String(id))) => !id.is_empty(),
                Some(Node::Scalar(Value::Number(id))) => id.as_f64() != Some(0.0),
                Some(Node::Scalar(Value::Bool(id))) => *id,
                _ => false,
            },
            Node::Scalar(_) | Node::List(_) => false,
        }
    }
}

/// Flat fragment table for one page, sealed and classified.
///
/// Iteration follows first-insertion order of each key across the merged
/// snapshots, so "first fragment of type X" is stable for a given page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FragmentGraph {
    nodes: IndexMap<FragmentKey, Node>,
}

impl FragmentGraph {
    /// Seal a raw fragment table. Classification needs the full key set, so
    /// this runs once after every snapshot has been merged.
    pub fn seal(raw: IndexMap<FragmentKey, Value>) -> Self {
        let nodes = raw
            .iter()
            .map(|(key, value)| (key.clone(), Self::classify_fragment(key, value, &raw)))
            .collect();
        Self { nodes }
    }

    /// A fragment body whose `id` names its own key is the fragment itself,
    /// not a reference to it.
    fn classify_fragment<V>(
        key: &FragmentKey,
        value: &Value,
        keys: &IndexMap<FragmentKey, V>,
    ) -> Node {
        match value {
            Value::Object(fields)
                if fields.get(REFERENCE_FIELD).and_then(Value::as_str) == Some(key.as_str()) =>
            {
                Node::Object(
                    fields
                        .iter()
                        .map(|(name, child)| (name.clone(), Node::classify(child, keys)))
                        .collect(),
                )
            }
            _ => Node::classify(value, keys),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn get_key_value(&self, key: &str) -> Option<(&FragmentKey, &Node)> {
        self.nodes.get_key_value(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FragmentKey, &Node)> {
        self.nodes.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FragmentKey> {
        self.nodes.keys()
    }

    /// First key of the given type, in graph order.
    pub fn first_of_type(&self, type_name: &str) -> Option<&FragmentKey> {
        self.nodes.keys().find(|key| key.is_type(type_name))
    }

    /// Classify a value that did not come from the graph, e.g. a marker built
    /// by the caller.
    pub fn classify(&self, value: &Value) -> Node {
        Node::classify(value, &self.nodes)
    }
}
