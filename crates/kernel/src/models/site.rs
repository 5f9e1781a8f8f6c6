//! Site model.

use bson::oid::ObjectId;
use bson::serde_helpers::{
    serialize_bson_datetime_as_rfc3339_string, serialize_object_id_as_hex_string,
};
use serde::{Deserialize, Serialize};

use super::{LocalizedText, Model};
use crate::listing::ResourceKind;

/// A physical shop or warehouse location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    #[serde(
        rename(deserialize = "_id"),
        serialize_with = "serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,

    pub names: LocalizedText,

    #[serde(default)]
    pub address: Option<String>,

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

impl Model for Site {
    const RESOURCE: ResourceKind = ResourceKind::Sites;
}
