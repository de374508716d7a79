//! # REST API Interface Layer
//!
//! JSON endpoints over the storage collections:
//!
//! - **record_apis** - add/view/edit/delete for each entity table
//! - **traversal_apis** - the join views (a student's activities, a class's students, ...)
//! - **relation_apis** - memberships and participations (relation pairs)
//!
//! Status mapping: validation failures are 422, a refused insert is 409,
//! an update or delete of a missing key is 404, database failures are 500
//! with details kept in the log.

pub mod extractors;
pub mod mappers;
pub mod record_apis;
pub mod relation_apis;
pub mod traversal_apis;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use shared::ErrorResponse;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::storage::{EntityKind, RelationKind, Storage, StorageError};

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
}

impl AppState {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let mut api_routes = Router::new().merge(traversal_apis::routes());
    for kind in EntityKind::ALL {
        api_routes = api_routes.merge(record_apis::routes(kind));
    }
    for kind in RelationKind::ALL {
        api_routes = api_routes.merge(relation_apis::routes(kind));
    }

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

/// Translate an unexpected storage failure into a response
pub(crate) fn storage_error_response(context: &str, e: StorageError) -> Response {
    match e {
        StorageError::Validation(err) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        StorageError::Database(err) => {
            error!("{}: {}", context, err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
    }
}
