#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Listing engine integration tests.
//!
//! Runs list requests end to end through the listing service and the
//! in-memory store: predicate, sort, pagination and hydration together.

mod common;

use std::sync::Arc;

use backoffice_kernel::listing::{ListRequest, ListingError, ResourceKind};
use backoffice_kernel::models::{Site, User, UserRole};
use backoffice_kernel::store::MemoryStore;
use backoffice_test_utils::{BASE_CREATED_AT_MILLIS, fixtures, object_id, test_document};
use serde_json::json;

fn request(body: serde_json::Value) -> ListRequest {
    serde_json::from_value(body).unwrap()
}

// -------------------------------------------------------------------------
// Predicate behavior
// -------------------------------------------------------------------------

#[tokio::test]
async fn empty_filters_return_every_live_document() {
    let store = Arc::new(MemoryStore::new());
    store.insert_many(
        "userroles",
        vec![
            fixtures::user_role(1, "Admin", 1).build(),
            fixtures::user_role(2, "Guest", 2).removed().build(),
            fixtures::user_role(3, "Cashier", 3).build(),
        ],
    );
    let listing = common::listing_service(store, &["en"]);

    let result = listing
        .list::<UserRole>(&ListRequest::default())
        .await
        .unwrap();
    assert_eq!(result.total_count, 2);
    let ids: Vec<_> = result.items.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![object_id(1), object_id(3)]);
}

#[tokio::test]
async fn names_and_priority_select_only_the_matching_role() {
    let store = Arc::new(MemoryStore::new());
    store.insert_many(
        "userroles",
        vec![
            fixtures::user_role(1, "admin", 1).build(),
            fixtures::user_role(2, "guest", 1).build(),
        ],
    );
    let listing = common::listing_service(store, &["en"]);

    let result = listing
        .list::<UserRole>(&request(json!({
            "filters": { "names": "adm", "priority": 1 }
        })))
        .await
        .unwrap();

    assert_eq!(result.total_count, 1);
    assert_eq!(result.items[0].id, object_id(1));
    assert_eq!(result.items[0].names.get("en"), Some("admin"));
}

#[tokio::test]
async fn string_filters_are_case_insensitive_prefixes() {
    let store = Arc::new(MemoryStore::new());
    store.insert_many(
        "users",
        vec![
            fixtures::user(1, "Ada@example.com").build(),
            fixtures::user(2, "grace@example.com").build(),
            fixtures::user(3, "x.ada@example.com").build(),
        ],
    );
    let listing = common::listing_service(store, &["en"]);

    let result = listing
        .list::<User>(&request(json!({ "filters": { "email": "ADA" } })))
        .await
        .unwrap();

    let emails: Vec<_> = result.items.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, vec!["Ada@example.com"]);
}

#[tokio::test]
async fn prefix_filters_treat_regex_characters_literally() {
    let store = Arc::new(MemoryStore::new());
    store.insert_many(
        "users",
        vec![
            fixtures::user(1, "a.b@example.com").build(),
            fixtures::user(2, "axb@example.com").build(),
        ],
    );
    let listing = common::listing_service(store, &["en"]);

    let result = listing
        .list::<User>(&request(json!({ "filters": { "email": "a.b" } })))
        .await
        .unwrap();

    assert_eq!(result.total_count, 1);
    assert_eq!(result.items[0].email, "a.b@example.com");
}

#[tokio::test]
async fn localized_filter_matches_any_configured_language() {
    let store = Arc::new(MemoryStore::new());
    store.insert_many(
        "sites",
        vec![
            fixtures::site(1, &[("en", "Main store"), ("de", "Hauptladen")]).build(),
            fixtures::site(2, &[("en", "Warehouse"), ("de", "Lager")]).build(),
            fixtures::site(3, &[("fr", "Haute ville")]).build(),
        ],
    );
    let listing = common::listing_service(store, &["en", "de"]);

    let result = listing
        .list::<Site>(&request(json!({ "filters": { "names": "haupt" } })))
        .await
        .unwrap();

    // "fr" is not a configured language, so site 3 never matches
    let ids: Vec<_> = result.items.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![object_id(1)]);
}

#[tokio::test]
async fn one_sided_date_range_applies_no_constraint() {
    let store = Arc::new(MemoryStore::new());
    store.insert_many("sites", (1..=3).map(|n| fixtures::site(n, &[("en", "Site")]).build()));
    let listing = common::listing_service(store, &["en"]);

    let result = listing
        .list::<Site>(&request(json!({
            "filters": { "createdAt": { "from": "2030-01-01T00:00:00Z" } }
        })))
        .await
        .unwrap();
    assert_eq!(result.total_count, 3);
}

#[tokio::test]
async fn bounded_date_range_is_inclusive() {
    let store = Arc::new(MemoryStore::new());
    store.insert_many(
        "sites",
        (1..=5).map(|n| {
            fixtures::site(n, &[("en", "Site")])
                .created_at(BASE_CREATED_AT_MILLIS + i64::from(n) * 86_400_000)
                .build()
        }),
    );
    let listing = common::listing_service(store, &["en"]);

    // base + 2 days .. base + 4 days
    let result = listing
        .list::<Site>(&request(json!({
            "filters": { "createdAt": {
                "from": "2024-01-03T00:00:00Z",
                "to": "2024-01-05T00:00:00Z",
            } }
        })))
        .await
        .unwrap();

    let ids: Vec<_> = result.items.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![object_id(2), object_id(3), object_id(4)]);
}

#[tokio::test]
async fn id_and_boolean_filters() {
    let store = Arc::new(MemoryStore::new());
    store.insert_many(
        "sites",
        vec![
            fixtures::site(1, &[("en", "A")]).build(),
            fixtures::site(2, &[("en", "B")]).with("active", false).build(),
            fixtures::site(3, &[("en", "C")]).build(),
        ],
    );
    let listing = common::listing_service(store, &["en"]);

    let result = listing
        .list::<Site>(&request(json!({
            "filters": {
                "ids": [object_id(1).to_hex(), object_id(2).to_hex()],
                "active": [false],
            }
        })))
        .await
        .unwrap();

    let ids: Vec<_> = result.items.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![object_id(2)]);
}

#[tokio::test]
async fn unknown_filter_fields_are_ignored() {
    let store = Arc::new(MemoryStore::new());
    store.insert_many("userroles", (1..=3).map(|n| fixtures::user_role(n, "Role", 1).build()));
    let listing = common::listing_service(store, &["en"]);

    let result = listing
        .list::<UserRole>(&request(json!({ "filters": { "color": "red", "names": "" } })))
        .await
        .unwrap();
    assert_eq!(result.total_count, 3);
}

// -------------------------------------------------------------------------
// Sorting and pagination
// -------------------------------------------------------------------------

#[tokio::test]
async fn second_page_of_twenty_five() {
    let store = Arc::new(MemoryStore::new());
    store.insert_many("sites", (1..=25).map(|n| fixtures::site(n, &[("en", "Site")]).build()));
    let listing = common::listing_service(store, &["en"]);

    let result = listing
        .list::<Site>(&request(json!({
            "pagination": { "current": 2, "pageSize": 10 }
        })))
        .await
        .unwrap();

    assert_eq!(result.total_count, 25);
    assert_eq!(result.total_pages, 3);
    assert!(result.has_next);
    assert!(result.has_prev);
    let ids: Vec<_> = result.items.iter().map(|s| s.id).collect();
    assert_eq!(ids, (11..=20).map(object_id).collect::<Vec<_>>());
}

#[tokio::test]
async fn two_lowest_priorities_of_five() {
    let store = Arc::new(MemoryStore::new());
    for (n, priority) in [(1, 40), (2, 10), (3, 50), (4, 20), (5, 30)] {
        store.insert("userroles", fixtures::user_role(n, "Role", priority).build());
    }
    let listing = common::listing_service(store, &["en"]);

    let result = listing
        .list::<UserRole>(&request(json!({
            "sorters": { "priority": "asc" },
            "pagination": { "current": 1, "pageSize": 2 }
        })))
        .await
        .unwrap();

    assert_eq!(result.total_count, 5);
    let priorities: Vec<_> = result.items.iter().map(|r| r.priority).collect();
    assert_eq!(priorities, vec![10, 20]);
}

#[tokio::test]
async fn tied_sort_keys_page_in_id_order() {
    let store = Arc::new(MemoryStore::new());
    // Inserted in reverse so insertion order cannot stand in for `_id` order
    for n in (1..=5).rev() {
        store.insert("userroles", fixtures::user_role(n, "Role", 1).build());
    }
    let listing = common::listing_service(store, &["en"]);

    let mut seen = Vec::new();
    for page in 1..=3 {
        let result = listing
            .list::<UserRole>(&request(json!({
                "sorters": { "priority": "asc" },
                "pagination": { "current": page, "pageSize": 2 }
            })))
            .await
            .unwrap();
        seen.extend(result.items.into_iter().map(|r| r.id));
    }

    assert_eq!(seen, (1..=5).map(object_id).collect::<Vec<_>>());
}

#[tokio::test]
async fn descending_sort_with_tiebreak_is_stable_across_pages() {
    let store = Arc::new(MemoryStore::new());
    store.insert_many(
        "users",
        (1..=6).map(|n| {
            fixtures::user(n, &format!("user{n}@example.com"))
                .with("lastName", if n % 2 == 0 { "Even" } else { "Odd" })
                .build()
        }),
    );
    let listing = common::listing_service(store, &["en"]);

    let mut seen = Vec::new();
    for page in 1..=3 {
        let result = listing
            .list::<User>(&request(json!({
                "sorters": { "lastName": "desc" },
                "pagination": { "current": page, "pageSize": 2 }
            })))
            .await
            .unwrap();
        seen.extend(result.items.into_iter().map(|u| u.id));
    }

    // Odd before Even, createdAt ascending within each group
    let expected: Vec<_> = [1, 3, 5, 2, 4, 6].into_iter().map(object_id).collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn money_transactions_default_to_newest_first() {
    let store = Arc::new(MemoryStore::new());
    let register = object_id(100);
    store.insert_many(
        "moneytransactions",
        (1..=3).map(|n| {
            test_document(n)
                .with("cashRegister", register)
                .with("kind", "sale")
                .with("amount", 9.5 * f64::from(n))
                .build()
        }),
    );
    let listing = common::listing_service(store, &["en"]);

    let result = listing
        .list_raw(
            ResourceKind::MoneyTransactions,
            &request(json!({ "filters": { "cashRegister": register.to_hex() } })),
        )
        .await
        .unwrap();

    let ids: Vec<_> = result
        .items
        .iter()
        .map(|d| d.get_object_id("_id").unwrap())
        .collect();
    assert_eq!(ids, vec![object_id(3), object_id(2), object_id(1)]);
}

#[tokio::test]
async fn full_pagination_returns_everything() {
    let store = Arc::new(MemoryStore::new());
    store.insert_many("sites", (1..=30).map(|n| fixtures::site(n, &[("en", "Site")]).build()));
    let listing = common::listing_service(store, &["en"]);

    let result = listing
        .list::<Site>(&request(json!({ "pagination": { "full": true, "pageSize": 5 } })))
        .await
        .unwrap();

    assert_eq!(result.items.len(), 30);
    assert_eq!(result.total_count, 30);
    assert_eq!(result.total_pages, 1);
    assert!(!result.has_next);
}

#[tokio::test]
async fn zero_matches_is_an_empty_page() {
    let store = Arc::new(MemoryStore::new());
    let listing = common::listing_service(store, &["en"]);

    let result = listing
        .list::<Site>(&ListRequest::default())
        .await
        .unwrap();
    assert!(result.items.is_empty());
    assert_eq!(result.total_count, 0);
    assert_eq!(result.total_pages, 0);
}

// -------------------------------------------------------------------------
// Hydration
// -------------------------------------------------------------------------

#[tokio::test]
async fn listed_users_never_expose_passwords() {
    let store = Arc::new(MemoryStore::new());
    store.insert("users", fixtures::user(1, "admin@example.com").build());
    let listing = common::listing_service(store.clone(), &["en"]);

    let raw = listing
        .list_raw(ResourceKind::Users, &ListRequest::default())
        .await
        .unwrap();
    assert!(!raw.items[0].contains_key("password"));

    let users = listing.list::<User>(&ListRequest::default()).await.unwrap();
    let json = serde_json::to_value(&users).unwrap();
    let user = &json["items"][0];
    assert_eq!(user["id"], object_id(1).to_hex());
    assert!(user.get("password").is_none());
    assert!(user.get("removed").is_none());
}

#[tokio::test]
async fn malformed_document_fails_the_whole_page() {
    let store = Arc::new(MemoryStore::new());
    store.insert_many(
        "userroles",
        vec![
            fixtures::user_role(1, "Admin", 1).build(),
            fixtures::user_role(2, "Broken", 2).with("priority", "high").build(),
        ],
    );
    let listing = common::listing_service(store, &["en"]);

    let err = listing
        .list::<UserRole>(&ListRequest::default())
        .await
        .unwrap_err();
    match err {
        ListingError::Hydration { index, id, .. } => {
            assert_eq!(index, 1);
            assert_eq!(id, Some(object_id(2).to_hex()));
        }
        other => panic!("unexpected error: {other}"),
    }
}
