//! Resource list API routes.
//!
//! `POST /api/{resource}/list` runs a list request against one resource;
//! `GET /api/resources` describes what each resource accepts.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::listing::{
    FilterRule, ListRequest, ListingService, ResourceKind, SortKey, TiebreakPolicy,
};
use crate::models::{
    CashRegister, Currency, Model, MoneyTransaction, Product, Setting, Site, User, UserRole,
};
use crate::state::AppState;

/// Create the listing router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/resources", get(list_resources))
        .route("/api/{resource}/list", post(list_resource))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceSummary<'a> {
    resource: &'static str,
    collection: &'a str,
    filters: Vec<&'a FilterRule>,
    tiebreak: &'a SortKey,
    tiebreak_policy: TiebreakPolicy,
    enforce_not_removed: bool,
}

async fn list_resources(State(state): State<AppState>) -> Response {
    let registry = state.listing().registry();
    let summaries: Vec<ResourceSummary<'_>> = registry
        .definitions()
        .into_iter()
        .map(|definition| ResourceSummary {
            resource: definition.kind.slug(),
            collection: &definition.collection,
            filters: definition.rules.iter().collect(),
            tiebreak: &definition.tiebreak,
            tiebreak_policy: definition.tiebreak_policy,
            enforce_not_removed: definition.enforce_not_removed,
        })
        .collect();
    Json(summaries).into_response()
}

async fn list_resource(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    body: Result<Json<ListRequest>, JsonRejection>,
) -> AppResult<Response> {
    let kind: ResourceKind = resource.parse()?;
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let listing = state.listing();

    match kind {
        ResourceKind::Sites => list_model::<Site>(listing, &request).await,
        ResourceKind::UserRoles => list_model::<UserRole>(listing, &request).await,
        ResourceKind::Settings => list_model::<Setting>(listing, &request).await,
        ResourceKind::Users => list_model::<User>(listing, &request).await,
        ResourceKind::Currencies => list_model::<Currency>(listing, &request).await,
        ResourceKind::Products => list_model::<Product>(listing, &request).await,
        ResourceKind::CashRegisters => list_model::<CashRegister>(listing, &request).await,
        ResourceKind::MoneyTransactions => {
            list_model::<MoneyTransaction>(listing, &request).await
        }
    }
}

async fn list_model<T: Model>(
    listing: &ListingService,
    request: &ListRequest,
) -> AppResult<Response> {
    let result = listing.list::<T>(request).await?;
    Ok(Json(result).into_response())
}
