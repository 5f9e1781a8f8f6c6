//! User role model.

use bson::oid::ObjectId;
use bson::serde_helpers::serialize_object_id_as_hex_string;
use serde::{Deserialize, Serialize};

use super::{LocalizedText, Model};
use crate::listing::ResourceKind;

/// Role record.
///
/// Lower `priority` values outrank higher ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    #[serde(
        rename(deserialize = "_id"),
        serialize_with = "serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,
    pub names: LocalizedText,
    pub priority: i64,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing)]
    pub removed: bool,
}

fn default_active() -> bool {
    true
}

impl Model for UserRole {
    const RESOURCE: ResourceKind = ResourceKind::UserRoles;
}
