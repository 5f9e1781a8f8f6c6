//! Listing query types.
//!
//! Provides type definitions for the list-endpoint query compiler:
//! - ListRequest: filters, sorters and pagination as sent by callers
//! - FilterValue: dynamically-typed filter input
//! - SortValues: ordered field → direction input
//! - Pagination / QueryResult: page bounds and the paged result

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Operator applied by a filter rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    /// Case-insensitive prefix match.
    String,
    /// Equality with a scalar.
    Exact,
    /// Membership in a list of values.
    Array,
    /// Equality with a number.
    Number,
    /// Inclusive `{from, to}` range; both bounds required.
    DateRange,
    /// Membership in a list of booleans.
    BooleanArray,
}

/// Filter value as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Explicit `null`.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// Integer value.
    Integer(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
    /// List of booleans (tri-state flags).
    Booleans(Vec<bool>),
    /// List of strings.
    Strings(Vec<String>),
    /// Date range.
    Range(DateRange),
}

impl FilterValue {
    /// Whether this value means "not filtering on this field".
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Null => true,
            FilterValue::String(s) => s.is_empty(),
            FilterValue::Booleans(v) => v.is_empty(),
            FilterValue::Strings(v) => v.is_empty(),
            FilterValue::Range(range) => range.from.is_none() && range.to.is_none(),
            FilterValue::Boolean(_) | FilterValue::Integer(_) | FilterValue::Float(_) => false,
        }
    }

    /// Borrow the string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FilterValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Both bounds, when both are present.
    pub fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.from?, self.to?))
    }
}

/// Raw filter values by field name.
pub type RawFilterValues = HashMap<String, FilterValue>;

/// Requested sort: field → `"asc"`/`"desc"`, in the order given by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortValues(Vec<(String, String)>);

impl SortValues {
    /// Create an empty sort request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field (builder style).
    pub fn then(mut self, field: impl Into<String>, direction: impl Into<String>) -> Self {
        self.0.push((field.into(), direction.into()));
        self
    }

    /// Iterate fields in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, d)| (f.as_str(), d.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SortValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, direction) in &self.0 {
            map.serialize_entry(field, direction)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SortValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SortValuesVisitor;

        impl<'de> Visitor<'de> for SortValuesVisitor {
            type Value = SortValues;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field names to sort directions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<SortValues, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((field, direction)) =
                    map.next_entry::<String, serde_json::Value>()?
                {
                    // Non-string directions fall through to descending.
                    let direction = match direction {
                        serde_json::Value::String(s) => s,
                        _ => String::new(),
                    };
                    entries.push((field, direction));
                }
                Ok(SortValues(entries))
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<SortValues, E> {
                Ok(SortValues::default())
            }
        }

        deserializer.deserialize_any(SortValuesVisitor)
    }
}

/// Pagination as sent by the caller; every field optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationRequest {
    pub current: Option<u64>,
    pub page_size: Option<u64>,
    #[serde(default)]
    pub full: bool,
}

/// Resolved page bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number, 1-indexed.
    pub current: u64,
    /// Documents per page.
    pub page_size: u64,
    /// Return every match, ignoring `current` and `page_size`.
    pub full: bool,
}

impl Pagination {
    /// A bounded page. Zero values are raised to 1.
    pub fn page(current: u64, page_size: u64) -> Self {
        Self {
            current: current.max(1),
            page_size: page_size.max(1),
            full: false,
        }
    }

    /// Every matching document, unpaginated.
    pub fn unbounded() -> Self {
        Self {
            current: 1,
            page_size: 1,
            full: true,
        }
    }

    /// Resolve a caller request against the configured page sizes.
    pub fn resolve(
        request: &PaginationRequest,
        default_page_size: u64,
        max_page_size: u64,
    ) -> Self {
        if request.full {
            return Self::unbounded();
        }
        let requested = request.page_size.unwrap_or(default_page_size);
        let page_size = if requested > max_page_size {
            tracing::warn!(
                requested = requested,
                capped = max_page_size,
                "page_size exceeds maximum, capping"
            );
            max_page_size
        } else {
            requested
        };
        Self::page(request.current.unwrap_or(1), page_size)
    }

    /// Documents skipped before the page starts.
    pub fn skip(&self) -> u64 {
        self.current.saturating_sub(1).saturating_mul(self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::page(1, 10)
    }
}

/// Body of a list request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRequest {
    /// Filter values by field name.
    #[serde(default)]
    pub filters: RawFilterValues,

    /// Sort fields in priority order.
    #[serde(default)]
    pub sorters: SortValues,

    /// Page bounds.
    #[serde(default)]
    pub pagination: PaginationRequest,
}

/// One page of results plus the total match count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<T> {
    /// Documents on this page.
    pub items: Vec<T>,

    /// Matching documents before pagination.
    pub total_count: u64,

    /// Current page number (1-indexed).
    pub page: u64,

    /// Documents per page.
    pub page_size: u64,

    /// Total number of pages.
    pub total_pages: u64,

    /// Whether there's a next page.
    pub has_next: bool,

    /// Whether there's a previous page.
    pub has_prev: bool,
}

impl<T> QueryResult<T> {
    /// Create a result with paging calculations.
    pub fn new(items: Vec<T>, total_count: u64, pagination: &Pagination) -> Self {
        if pagination.full {
            return Self {
                page_size: items.len() as u64,
                items,
                total_count,
                page: 1,
                total_pages: u64::from(total_count > 0),
                has_next: false,
                has_prev: false,
            };
        }

        let total_pages = total_count.div_ceil(pagination.page_size.max(1));
        Self {
            items,
            total_count,
            page: pagination.current,
            page_size: pagination.page_size,
            total_pages,
            has_next: pagination.current < total_pages,
            has_prev: pagination.current > 1,
        }
    }

    /// Convert every item, keeping the paging metadata.
    pub fn try_map<U, E>(
        self,
        f: impl FnOnce(Vec<T>) -> Result<Vec<U>, E>,
    ) -> Result<QueryResult<U>, E> {
        Ok(QueryResult {
            items: f(self.items)?,
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        })
    }
}
