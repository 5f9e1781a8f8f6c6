//! User model.

use bson::oid::ObjectId;
use bson::serde_helpers::{
    serialize_bson_datetime_as_rfc3339_string, serialize_object_id_as_hex_string,
};
use serde::{Deserialize, Serialize};

use super::{Model, serialize_object_ids_as_hex};
use crate::listing::ResourceKind;

/// User record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(
        rename(deserialize = "_id"),
        serialize_with = "serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Password hash. Excluded from list queries and never serialized.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default, serialize_with = "serialize_object_ids_as_hex")]
    pub roles: Vec<ObjectId>,
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

impl Model for User {
    const RESOURCE: ResourceKind = ResourceKind::Users;
}
