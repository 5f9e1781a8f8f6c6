//! Money transaction model.

use bson::oid::ObjectId;
use bson::serde_helpers::{
    serialize_bson_datetime_as_rfc3339_string, serialize_object_id_as_hex_string,
};
use serde::{Deserialize, Serialize};

use super::Model;
use crate::listing::ResourceKind;

/// A cash movement recorded against a register.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyTransaction {
    #[serde(
        rename(deserialize = "_id"),
        serialize_with = "serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,

    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    pub cash_register: ObjectId,

    /// Movement type: `"sale"`, `"refund"`, `"deposit"`, `"withdrawal"`.
    pub kind: String,

    /// Signed amount; outgoing movements are negative.
    pub amount: f64,

    #[serde(default)]
    pub note: Option<String>,

    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub created_at: bson::DateTime,

    #[serde(default, skip_serializing)]
    pub removed: bool,
}

impl Model for MoneyTransaction {
    const RESOURCE: ResourceKind = ResourceKind::MoneyTransactions;
}
