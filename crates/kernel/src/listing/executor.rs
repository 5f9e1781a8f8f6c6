//! Pagination/aggregation executor.
//!
//! Combines a compiled predicate, sort and page bounds into one aggregation
//! whose `$facet` stage returns the requested page and the total match count
//! from the same matched-and-sorted input, in one round trip.

use bson::{Bson, Document, doc};

use super::error::ListingError;
use super::predicate::Predicate;
use super::sort::CompiledSort;
use super::types::{Pagination, QueryResult};
use crate::store::DocumentStore;

/// Facet branch holding the page of documents.
const ITEMS_FACET: &str = "items";
/// Facet branch holding `[{count: n}]`, or `[]` when nothing matched.
const COUNT_FACET: &str = "totalCount";
const COUNT_FIELD: &str = "count";

/// A fully compiled list query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub predicate: Predicate,
    pub sort: CompiledSort,
    pub pagination: Pagination,
    /// Fields projected out of the page branch only.
    pub exclusions: Vec<String>,
}

impl QueryPlan {
    /// Build the aggregation pipeline.
    pub fn pipeline(&self) -> Vec<Document> {
        let mut items: Vec<Document> = Vec::new();
        if !self.pagination.full {
            items.push(doc! { "$skip": count_bson(self.pagination.skip()) });
            items.push(doc! { "$limit": count_bson(self.pagination.page_size) });
        }
        if !self.exclusions.is_empty() {
            let mut projection = Document::new();
            for field in &self.exclusions {
                projection.insert(field.clone(), 0);
            }
            items.push(doc! { "$project": projection });
        }
        if items.is_empty() {
            items.push(doc! { "$match": {} });
        }

        let mut facet = Document::new();
        facet.insert(ITEMS_FACET, items);
        facet.insert(COUNT_FACET, vec![doc! { "$count": COUNT_FIELD }]);

        let mut pipeline = vec![doc! { "$match": self.predicate.as_document().clone() }];
        if !self.sort.keys().is_empty() {
            pipeline.push(doc! { "$sort": self.sort.to_document() });
        }
        pipeline.push(doc! { "$facet": facet });
        pipeline
    }
}

fn count_bson(n: u64) -> Bson {
    i64::try_from(n).map_or(Bson::Int64(i64::MAX), Bson::Int64)
}

/// Run `plan` against `collection` and return the raw page.
///
/// Store failures are returned as-is; nothing is retried here.
pub async fn execute(
    store: &dyn DocumentStore,
    collection: &str,
    plan: &QueryPlan,
) -> Result<QueryResult<Document>, ListingError> {
    let output = store.aggregate(collection, plan.pipeline()).await?;
    let (items, total_count) = read_facet(output)?;
    Ok(QueryResult::new(items, total_count, &plan.pagination))
}

/// Split the single facet output document into page items and total count.
fn read_facet(mut output: Vec<Document>) -> Result<(Vec<Document>, u64), ListingError> {
    if output.len() != 1 {
        return Err(ListingError::MalformedResult(format!(
            "expected one facet document, got {}",
            output.len()
        )));
    }
    let mut facet = output.remove(0);

    let items = match facet.remove(ITEMS_FACET) {
        Some(Bson::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Bson::Document(doc) => Ok(doc),
                other => Err(ListingError::MalformedResult(format!(
                    "page entry is not a document: {other}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => {
            return Err(ListingError::MalformedResult(format!(
                "missing '{ITEMS_FACET}' branch"
            )));
        }
    };

    let total_count = match facet.get(COUNT_FACET) {
        Some(Bson::Array(counts)) => match counts.first() {
            None => 0,
            Some(Bson::Document(entry)) => read_count(entry)?,
            Some(other) => {
                return Err(ListingError::MalformedResult(format!(
                    "count entry is not a document: {other}"
                )));
            }
        },
        _ => {
            return Err(ListingError::MalformedResult(format!(
                "missing '{COUNT_FACET}' branch"
            )));
        }
    };

    Ok((items, total_count))
}

fn read_count(entry: &Document) -> Result<u64, ListingError> {
    let count = match entry.get(COUNT_FIELD) {
        None => return Ok(0),
        Some(Bson::Int32(n)) => u64::try_from(*n).ok(),
        Some(Bson::Int64(n)) => u64::try_from(*n).ok(),
        Some(Bson::Double(d)) if *d >= 0.0 && d.fract() == 0.0 => Some(*d as u64),
        Some(_) => None,
    };
    count.ok_or_else(|| ListingError::MalformedResult(format!("invalid count: {entry}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::listing::sort::{SortKey, TiebreakPolicy, compile_sort};
    use crate::listing::types::SortValues;
    use crate::store::MemoryStore;

    fn plan(pagination: Pagination, exclusions: Vec<String>) -> QueryPlan {
        QueryPlan {
            predicate: Predicate::all_of(vec![doc! { "removed": false }]),
            sort: compile_sort(
                &SortValues::new().then("priority", "asc"),
                &SortKey::asc("_id"),
                TiebreakPolicy::Always,
            ),
            pagination,
            exclusions,
        }
    }

    #[test]
    fn pipeline_shape_for_a_page() {
        let pipeline = plan(Pagination::page(3, 10), vec!["password".to_string()]).pipeline();
        assert_eq!(
            pipeline,
            vec![
                doc! { "$match": { "removed": false } },
                doc! { "$sort": { "priority": 1, "_id": 1 } },
                doc! { "$facet": {
                    "items": [
                        { "$skip": 20_i64 },
                        { "$limit": 10_i64 },
                        { "$project": { "password": 0 } },
                    ],
                    "totalCount": [ { "$count": "count" } ],
                } },
            ]
        );
    }

    #[test]
    fn full_pagination_omits_skip_and_limit() {
        let pipeline = plan(Pagination::unbounded(), vec![]).pipeline();
        assert_eq!(
            pipeline[2],
            doc! { "$facet": {
                "items": [ { "$match": {} } ],
                "totalCount": [ { "$count": "count" } ],
            } }
        );

        let pipeline = plan(Pagination::unbounded(), vec!["password".to_string()]).pipeline();
        let facet = pipeline[2].get_document("$facet").unwrap();
        assert_eq!(
            facet.get_array("items").unwrap(),
            &vec![Bson::Document(doc! { "$project": { "password": 0 } })]
        );
    }

    #[test]
    fn read_facet_handles_empty_count_branch() {
        let output = vec![doc! { "items": [], "totalCount": [] }];
        let (items, total) = read_facet(output).unwrap();
        assert!(items.is_empty());
        assert_eq!(total, 0);
    }

    #[test]
    fn read_facet_accepts_integer_widths() {
        let output = vec![doc! { "items": [ { "a": 1 } ], "totalCount": [ { "count": 7_i64 } ] }];
        let (items, total) = read_facet(output).unwrap();
        assert_eq!(items, vec![doc! { "a": 1 }]);
        assert_eq!(total, 7);
    }

    #[test]
    fn read_facet_rejects_malformed_output() {
        assert!(matches!(
            read_facet(vec![]),
            Err(ListingError::MalformedResult(_))
        ));
        assert!(matches!(
            read_facet(vec![doc! { "totalCount": [] }]),
            Err(ListingError::MalformedResult(_))
        ));
        assert!(matches!(
            read_facet(vec![doc! { "items": [1], "totalCount": [] }]),
            Err(ListingError::MalformedResult(_))
        ));
        assert!(matches!(
            read_facet(vec![doc! { "items": [], "totalCount": [ { "count": -1 } ] }]),
            Err(ListingError::MalformedResult(_))
        ));
    }

    #[tokio::test]
    async fn page_beyond_last_is_empty_with_true_count() {
        let store = MemoryStore::new();
        store.insert_many(
            "userroles",
            (0..3).map(|n| doc! { "priority": n, "removed": false }),
        );

        let result = execute(&store, "userroles", &plan(Pagination::page(5, 10), vec![]))
            .await
            .unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total_count, 3);
    }

    #[tokio::test]
    async fn store_errors_propagate() {
        let store = MemoryStore::new();
        store.insert("userroles", doc! { "priority": 1, "removed": false });
        let mut bad = plan(Pagination::page(1, 10), vec![]);
        bad.predicate = Predicate::all_of(vec![doc! { "$where": "true" }]);

        let err = execute(&store, "userroles", &bad).await.unwrap_err();
        assert!(matches!(err, ListingError::Store(_)));
    }
}
