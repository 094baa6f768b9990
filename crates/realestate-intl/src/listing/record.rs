//! The denormalized listing record handed to sinks.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One fully resolved listing.
///
/// Every field is always present in the serialized form; anything the page
/// could not supply is `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    #[serde(rename = "listing_id")]
    pub listing_id: String,
    pub url: String,
    pub price: Option<Value>,
    pub location: Option<Value>,
    pub multilingual: Option<Value>,
    pub building_feature: BuildingFeature,
    pub listhub_feature: Option<Value>,
    pub realtor_features: Option<Value>,
    pub geo_location: Option<Value>,
    pub agent: Option<Value>,
    pub description: Option<Value>,
    pub published_at: Option<Value>,
    pub updated_at: Option<Value>,
    pub agency: Option<Value>,
    pub land_size: Option<Value>,
    pub building_size: Option<Value>,
}

/// Feature groups nested under `buildingFeature`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingFeature {
    pub indoor_feature: Option<Value>,
    pub outdoor_feature: Option<Value>,
    pub energy_efficiency_feature: Option<Value>,
}
