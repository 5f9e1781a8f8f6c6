//! Currency model.

use bson::oid::ObjectId;
use bson::serde_helpers::serialize_object_id_as_hex_string;
use serde::{Deserialize, Serialize};

use super::{LocalizedText, Model};
use crate::listing::ResourceKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    #[serde(
        rename(deserialize = "_id"),
        serialize_with = "serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,
    pub names: LocalizedText,
    /// ISO 4217 code.
    pub code: String,
    #[serde(default)]
    pub symbol: String,
    /// Minor-unit digits (2 for EUR, 0 for JPY).
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    #[serde(default, skip_serializing)]
    pub removed: bool,
}

fn default_decimals() -> u32 {
    2
}

impl Model for Currency {
    const RESOURCE: ResourceKind = ResourceKind::Currencies;
}
