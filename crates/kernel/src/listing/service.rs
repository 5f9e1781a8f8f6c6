//! Listing service.
//!
//! Resolves a resource definition, compiles the caller's request into a
//! [`QueryPlan`], runs it against the store and hydrates the page.

use std::sync::Arc;

use bson::Document;

use super::error::ListingError;
use super::executor::{self, QueryPlan};
use super::hydrate::hydrate;
use super::predicate::compile_predicate;
use super::registry::{ResourceKind, ResourceRegistry};
use super::sort::{UNIQUE_SORT_FIELD, compile_sort};
use super::types::{ListRequest, Pagination, QueryResult};
use crate::models::Model;
use crate::store::DocumentStore;

/// Default page size when the request carries none.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Hard cap on page size.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Service listing registered resources.
pub struct ListingService {
    store: Arc<dyn DocumentStore>,
    registry: Arc<ResourceRegistry>,
    default_page_size: u64,
    max_page_size: u64,
}

impl ListingService {
    /// Create a new ListingService with the default page sizes.
    pub fn new(store: Arc<dyn DocumentStore>, registry: Arc<ResourceRegistry>) -> Self {
        Self {
            store,
            registry,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }

    /// Override the page sizes. `max_page_size` is raised to at least
    /// `default_page_size`.
    pub fn with_page_sizes(mut self, default_page_size: u64, max_page_size: u64) -> Self {
        self.default_page_size = default_page_size.max(1);
        self.max_page_size = max_page_size.max(self.default_page_size);
        self
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Compile `request` for `kind` without running it.
    pub fn plan(
        &self,
        kind: ResourceKind,
        request: &ListRequest,
    ) -> Result<QueryPlan, ListingError> {
        let definition = self
            .registry
            .get(kind)
            .ok_or(ListingError::NotRegistered(kind))?;

        Ok(QueryPlan {
            predicate: compile_predicate(
                &definition.rules,
                &request.filters,
                definition.enforce_not_removed,
            ),
            // Tiebreaks like `priority` or `createdAt` can tie; `_id` cannot.
            sort: compile_sort(
                &request.sorters,
                &definition.tiebreak,
                definition.tiebreak_policy,
            )
            .then_unique(UNIQUE_SORT_FIELD),
            pagination: Pagination::resolve(
                &request.pagination,
                self.default_page_size,
                self.max_page_size,
            ),
            exclusions: definition.excluded_fields.clone(),
        })
    }

    /// List `kind` and return the raw page documents.
    pub async fn list_raw(
        &self,
        kind: ResourceKind,
        request: &ListRequest,
    ) -> Result<QueryResult<Document>, ListingError> {
        let plan = self.plan(kind, request)?;
        let collection = self
            .registry
            .get(kind)
            .map(|definition| definition.collection.as_str())
            .ok_or(ListingError::NotRegistered(kind))?;

        tracing::debug!(
            resource = %kind,
            collection = collection,
            filter = %plan.predicate.as_document(),
            sort = %plan.sort.to_document(),
            page = plan.pagination.current,
            page_size = plan.pagination.page_size,
            full = plan.pagination.full,
            "executing list query"
        );

        let result = executor::execute(self.store.as_ref(), collection, &plan).await?;

        tracing::debug!(
            resource = %kind,
            returned = result.items.len(),
            total = result.total_count,
            "list query complete"
        );
        Ok(result)
    }

    /// List the model's resource and hydrate every page document.
    pub async fn list<T: Model>(
        &self,
        request: &ListRequest,
    ) -> Result<QueryResult<T>, ListingError> {
        let raw = self.list_raw(T::RESOURCE, request).await?;
        raw.try_map(hydrate::<T>)
    }

    /// Whether the backing store answers.
    pub async fn store_healthy(&self) -> bool {
        self.store.health().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::listing::types::{PaginationRequest, SortValues};
    use crate::store::MemoryStore;
    use bson::doc;

    fn service() -> ListingService {
        let registry = ResourceRegistry::builtin(vec!["en".to_string()]);
        ListingService::new(Arc::new(MemoryStore::new()), Arc::new(registry))
    }

    #[test]
    fn plan_applies_lifecycle_and_tiebreak() {
        let plan = service()
            .plan(ResourceKind::UserRoles, &ListRequest::default())
            .unwrap();
        assert_eq!(plan.predicate.as_document(), &doc! { "removed": false });
        assert_eq!(plan.sort.to_document(), doc! { "priority": 1, "_id": 1 });
        assert_eq!(plan.pagination, Pagination::page(1, DEFAULT_PAGE_SIZE));
        assert!(plan.exclusions.is_empty());
    }

    #[test]
    fn plan_caps_page_size() {
        let request = ListRequest {
            pagination: PaginationRequest {
                current: Some(2),
                page_size: Some(5_000),
                full: false,
            },
            ..Default::default()
        };
        let plan = service()
            .with_page_sizes(20, 50)
            .plan(ResourceKind::Settings, &request)
            .unwrap();
        assert_eq!(plan.pagination, Pagination::page(2, 50));
        assert!(plan.predicate.is_match_all());
    }

    #[test]
    fn plan_keeps_caller_sort_before_tiebreak() {
        let request = ListRequest {
            sorters: SortValues::new().then("email", "asc"),
            ..Default::default()
        };
        let plan = service().plan(ResourceKind::Users, &request).unwrap();
        assert_eq!(
            plan.sort.to_document(),
            doc! { "email": 1, "createdAt": 1, "_id": 1 }
        );
        assert_eq!(plan.exclusions, vec!["password".to_string()]);
    }

    #[test]
    fn caller_sort_without_tiebreak_still_ends_on_id() {
        let request = ListRequest {
            sorters: SortValues::new().then("active", "asc"),
            ..Default::default()
        };
        let listing = service();

        let roles = listing.plan(ResourceKind::UserRoles, &request).unwrap();
        assert_eq!(roles.sort.to_document(), doc! { "active": 1, "_id": 1 });

        let request = ListRequest {
            sorters: SortValues::new().then("symbol", "asc"),
            ..Default::default()
        };
        let currencies = listing.plan(ResourceKind::Currencies, &request).unwrap();
        assert_eq!(currencies.sort.to_document(), doc! { "symbol": 1, "_id": 1 });
    }

    #[test]
    fn caller_sort_on_id_is_not_repeated() {
        let request = ListRequest {
            sorters: SortValues::new().then("_id", "desc"),
            ..Default::default()
        };
        let plan = service().plan(ResourceKind::Settings, &request).unwrap();
        assert_eq!(plan.sort.to_document(), doc! { "_id": -1, "key": 1 });
    }

    #[test]
    fn unregistered_resource_is_an_error() {
        let listing = ListingService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(ResourceRegistry::new(vec![])),
        );
        let err = listing
            .plan(ResourceKind::Sites, &ListRequest::default())
            .unwrap_err();
        assert!(matches!(err, ListingError::NotRegistered(ResourceKind::Sites)));
    }
}
