//! Product model.

use bson::oid::ObjectId;
use bson::serde_helpers::{
    serialize_bson_datetime_as_rfc3339_string, serialize_object_id_as_hex_string,
};
use serde::{Deserialize, Serialize};

use super::{LocalizedText, Model, serialize_object_ids_as_hex};
use crate::listing::ResourceKind;

/// Inventory item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(
        rename(deserialize = "_id"),
        serialize_with = "serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,

    pub names: LocalizedText,

    #[serde(default)]
    pub barcode: Option<String>,

    /// Unit price in the site's currency.
    pub price: f64,

    /// Sites the product is sold at.
    #[serde(default, serialize_with = "serialize_object_ids_as_hex")]
    pub sites: Vec<ObjectId>,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub created_at: bson::DateTime,

    #[serde(default, skip_serializing)]
    pub removed: bool,
}

fn default_active() -> bool {
    true
}

impl Model for Product {
    const RESOURCE: ResourceKind = ResourceKind::Products;
}
