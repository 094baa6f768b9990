//! Assemble a [`ListingRecord`] from a page's fragment graph.

use super::record::{BuildingFeature, ListingRecord};
use crate::acquisition::page::PageText;
use crate::graph::{FragmentGraph, FragmentKey, ReferenceResolver, AGENT_TYPE, LISTING_TYPE};
use serde_json::{Map, Value};

/// Land size field, as the cache stores it with its query arguments.
pub const LAND_SIZE_FIELD: &str = r#"landSize({"language":"en","unit":"SQUARE_METERS"})"#;
/// Building size field, as the cache stores it with its query arguments.
pub const BUILDING_SIZE_FIELD: &str = r#"buildingSize({"language":"en","unit":"SQUARE_METERS"})"#;

pub const PRICE_SELECTOR: &str = ".property-price";
pub const ADDRESS_SELECTOR: &str = ".display-address";
pub const DESCRIPTION_SELECTOR: &str = ".property-description";

/// Builds listing records from one sealed graph.
pub struct ListingRecordBuilder<'g> {
    graph: &'g FragmentGraph,
    resolver: ReferenceResolver<'g>,
}

impl<'g> ListingRecordBuilder<'g> {
    pub fn new(graph: &'g FragmentGraph) -> Self {
        Self {
            graph,
            resolver: ReferenceResolver::new(graph),
        }
    }

    /// Key of the primary listing: the first listing-typed fragment that
    /// carries a non-blank `id`.
    pub fn listing_key(&self) -> Option<&'g FragmentKey> {
        let graph: &'g FragmentGraph = self.graph;
        graph
            .iter()
            .find(|(key, node)| key.is_type(LISTING_TYPE) && node.has_id())
            .map(|(key, _)| key)
    }

    /// Build the record for the page at `url`, or `None` when the graph holds
    /// no listing. Graph values always win; `page` is only consulted for
    /// price, location and description the graph left empty.
    pub fn build(&self, url: &str, page: &dyn PageText) -> Option<ListingRecord> {
        let key = self.listing_key()?;
        let listing_id = key.id()?.to_string();

        let main = match self.resolver.resolve_key(key.as_str()) {
            Some(Value::Object(fields)) => fields,
            _ => Map::new(),
        };

        let price = present(main.get("price"))
            .or_else(|| page.own_text(PRICE_SELECTOR).map(Value::String));
        let location = present(main.get("location"))
            .or_else(|| page.own_text(ADDRESS_SELECTOR).map(Value::String));
        let description =
            present(main.get("description")).or_else(|| fallback_description(page));

        let building_feature = match main.get("buildingFeature") {
            Some(Value::Object(group)) => BuildingFeature {
                indoor_feature: field(group, "indoorFeature"),
                outdoor_feature: field(group, "outdoorFeature"),
                energy_efficiency_feature: field(group, "energyEfficiencyFeature"),
            },
            _ => BuildingFeature::default(),
        };

        let agent = self
            .graph
            .first_of_type(AGENT_TYPE)
            .and_then(|agent_key| self.resolver.resolve_key(agent_key.as_str()))
            .filter(|agent| !agent.is_null());

        Some(ListingRecord {
            listing_id,
            url: url.to_string(),
            price,
            location,
            multilingual: field(&main, "multilingual"),
            building_feature,
            listhub_feature: field(&main, "listhubFeature"),
            realtor_features: field(&main, "realtorFeatures"),
            geo_location: field(&main, "geoLocation"),
            agent,
            description,
            published_at: field(&main, "publishedAt"),
            updated_at: field(&main, "updatedAt"),
            agency: present(main.get("agency")),
            land_size: field(&main, LAND_SIZE_FIELD),
            building_size: field(&main, BUILDING_SIZE_FIELD),
        })
    }
}

/// A field as-is, with JSON `null` folded into absence.
fn field(fields: &Map<String, Value>, name: &str) -> Option<Value> {
    fields.get(name).filter(|v| !v.is_null()).cloned()
}

/// A field only when it carries something.
fn present(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| !is_blank(v)).cloned()
}

/// Null, `false`, zero, or an empty string, array or object.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

fn fallback_description(page: &dyn PageText) -> Option<Value> {
    let joined = page.descendant_texts(DESCRIPTION_SELECTOR).join(" ");
    let text = joined.trim();
    (!text.is_empty()).then(|| Value::String(text.to_string()))
}
