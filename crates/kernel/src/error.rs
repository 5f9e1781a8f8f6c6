//! Application error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::listing::{ListingError, UnknownResource};

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("listing error")]
    Listing(#[from] ListingError),
}

impl From<UnknownResource> for AppError {
    fn from(_: UnknownResource) -> Self {
        AppError::NotFound
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Listing(ListingError::NotRegistered(_)) => StatusCode::NOT_FOUND,
            AppError::Listing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Store and hydration details stay in the log
        let body = match &self {
            AppError::Listing(ListingError::NotRegistered(_)) => "not found".to_string(),
            AppError::Listing(e) => {
                tracing::error!(error = %e, "listing error");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::ResourceKind;
    use crate::store::StoreError;

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::NotFound, StatusCode::NOT_FOUND),
            (
                AppError::BadRequest("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(UnknownResource("orders".to_string())),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::Listing(ListingError::NotRegistered(ResourceKind::Sites)),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::Listing(ListingError::Store(StoreError::Unsupported(
                    "$where".to_string(),
                ))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
