#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! [`TestApp`] wires the REAL router and listing service over an in-memory
//! store that each test seeds directly.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use bson::Document;
use http_body_util::BodyExt;
use tower::ServiceExt;

use backoffice_kernel::config::Config;
use backoffice_kernel::listing::{ListingService, ResourceRegistry};
use backoffice_kernel::routes;
use backoffice_kernel::state::AppState;
use backoffice_kernel::store::MemoryStore;

/// Test application over a fresh in-memory store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::with_store(store.clone(), &config);
        let router = routes::build_router(state.clone(), &config);
        Self {
            router,
            store,
            state,
        }
    }

    /// Seed a collection.
    pub fn seed(&self, collection: &str, documents: impl IntoIterator<Item = Document>) {
        self.store.insert_many(collection, documents);
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// POST a JSON body to `/api/{resource}/list`.
    pub async fn list(
        &self,
        resource: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let response = self
            .request(
                Request::post(format!("/api/{resource}/list"))
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await;
        let status = response.status();
        (status, body_json(response).await)
    }
}

/// Listing service over `store` with the built-in registry.
pub fn listing_service(store: Arc<MemoryStore>, languages: &[&str]) -> ListingService {
    let registry = ResourceRegistry::builtin(languages.iter().map(|l| l.to_string()).collect());
    ListingService::new(store, Arc::new(registry))
}

/// Read a response body as JSON (`Null` for non-JSON bodies).
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}

/// Read a response body as text.
pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
