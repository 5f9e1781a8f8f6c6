//! Domain models returned by resource list endpoints.
//!
//! Every model deserializes from its stored BSON document and serializes to
//! the API shape: `_id` is exposed as a hex `id`, dates as RFC 3339 strings,
//! and the soft-delete flag is never serialized.

mod cash_register;
mod currency;
mod money_transaction;
mod product;
mod setting;
mod site;
mod user;
mod user_role;

use std::collections::BTreeMap;

use bson::oid::ObjectId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};

use crate::listing::ResourceKind;

pub use cash_register::CashRegister;
pub use currency::Currency;
pub use money_transaction::MoneyTransaction;
pub use product::Product;
pub use setting::Setting;
pub use site::Site;
pub use user::User;
pub use user_role::UserRole;

/// A model listed through the listing service.
pub trait Model: DeserializeOwned + Serialize + Send + 'static {
    /// Resource whose definition lists this model.
    const RESOURCE: ResourceKind;
}

/// A per-language string map (`{"en": "Admin", "de": "Verwalter"}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a translation (builder style).
    pub fn with(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(language.into(), text.into());
        self
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Serialize object ids as hex strings.
pub(crate) fn serialize_object_ids_as_hex<S: Serializer>(
    ids: &[ObjectId],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(ids.iter().map(|id| id.to_hex()))
}
