//! Sort compiler.

use bson::Document;
use serde::{Deserialize, Serialize};

use super::types::SortValues;

/// Sort direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `"asc"` is ascending; anything else, including unknown strings, is
    /// descending.
    pub fn from_request(direction: &str) -> Self {
        if direction == "asc" {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    /// `1` for ascending, `-1` for descending.
    pub fn as_i32(self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

/// One `(field, direction)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// When a resource appends its tiebreak to caller-supplied sorts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiebreakPolicy {
    /// Only when the caller supplies no sort fields.
    WhenEmpty,
    /// After the caller's fields as well.
    #[default]
    Always,
}

/// Document id, unique within a collection; every list plan ends on it.
pub const UNIQUE_SORT_FIELD: &str = "_id";

/// Ordered sort specification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompiledSort(Vec<SortKey>);

impl CompiledSort {
    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    /// `$sort` argument: `{ field: 1 | -1, ... }` in key order.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for key in &self.0 {
            doc.insert(key.field.clone(), key.direction.as_i32());
        }
        doc
    }

    /// Append `field` ascending unless it is already a key.
    pub fn then_unique(mut self, field: &str) -> Self {
        if !self.0.iter().any(|k| k.field == field) {
            self.0.push(SortKey::asc(field));
        }
        self
    }
}

/// Compile a caller sort request.
///
/// Fields keep the caller's order; a repeated field keeps its first
/// position. An empty request compiles to exactly `[tiebreak]`.
pub fn compile_sort(
    values: &SortValues,
    tiebreak: &SortKey,
    policy: TiebreakPolicy,
) -> CompiledSort {
    let mut keys: Vec<SortKey> = Vec::with_capacity(values.len() + 1);
    for (field, direction) in values.iter() {
        if keys.iter().any(|k| k.field == field) {
            continue;
        }
        keys.push(SortKey::new(field, SortDirection::from_request(direction)));
    }

    let append = keys.is_empty() || policy == TiebreakPolicy::Always;
    if append && !keys.iter().any(|k| k.field == tiebreak.field) {
        keys.push(tiebreak.clone());
    }
    CompiledSort(keys)
}
