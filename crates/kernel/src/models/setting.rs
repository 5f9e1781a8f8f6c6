//! Application setting model.

use bson::Bson;
use bson::oid::ObjectId;
use bson::serde_helpers::serialize_object_id_as_hex_string;
use serde::{Deserialize, Serialize};

use super::Model;
use crate::listing::ResourceKind;

/// A key/value setting. Settings are never soft-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    #[serde(
        rename(deserialize = "_id"),
        serialize_with = "serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,

    /// Unique setting key (e.g. `"invoice.prefix"`).
    pub key: String,

    /// Settings page the key is shown on.
    #[serde(default)]
    pub group: String,

    /// Stored value; any BSON type.
    #[serde(default)]
    pub value: Bson,
}

impl Model for Setting {
    const RESOURCE: ResourceKind = ResourceKind::Settings;
}
