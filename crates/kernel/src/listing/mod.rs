//! Resource listing engine.
//!
//! This module provides:
//! - Registry: per-resource filter rules, lifecycle and tiebreak
//! - Predicate and sort compilers
//! - Executor: one `$facet` aggregation per page
//! - Hydrator: raw documents into typed models
//! - ListingService: the entry point tying them together

mod error;
mod executor;
mod hydrate;
mod predicate;
mod registry;
mod resources;
mod service;
mod sort;
pub mod types;

pub use error::ListingError;
pub use executor::{QueryPlan, execute};
pub use hydrate::hydrate;
pub use predicate::{Predicate, REMOVED_FIELD, compile_predicate};
pub use registry::{
    FilterRule, FilterRuleSet, ResourceDefinition, ResourceKind, ResourceRegistry, UnknownResource,
};
pub use service::{DEFAULT_PAGE_SIZE, ListingService, MAX_PAGE_SIZE};
pub use sort::{
    CompiledSort, SortDirection, SortKey, TiebreakPolicy, UNIQUE_SORT_FIELD, compile_sort,
};
pub use types::{
    DateRange, FilterValue, ListRequest, OperatorKind, Pagination, PaginationRequest,
    QueryResult, RawFilterValues, SortValues,
};
