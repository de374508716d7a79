//! # REST API for Relations
//!
//! CCA memberships, activity participation and subject enrolment. Pairs are
//! sent as JSON objects with the relation's two fields, e.g.
//! `{"student_id": "S1", "cca_id": "2"}`.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use shared::{ExistsResponse, Record, RecordListResponse, UpdatePairRequest};
use tracing::info;

use super::extractors::JsonBody;
use super::mappers::FormMapper;
use super::{error_response, storage_error_response, AppState};
use crate::storage::RelationKind;

pub fn routes(kind: RelationKind) -> Router<AppState> {
    Router::new()
        .route(
            &format!("/relations/{}", kind.path()),
            get(move |state: State<AppState>| list_pairs(state, kind))
                .post(move |state: State<AppState>, body: JsonBody<Record>| {
                    create_pair(state, kind, body)
                })
                .put(move |state: State<AppState>, body: JsonBody<UpdatePairRequest>| {
                    update_pair(state, kind, body)
                })
                .delete(move |state: State<AppState>, body: JsonBody<Record>| {
                    delete_pair(state, kind, body)
                }),
        )
        .route(
            &format!("/relations/{}/exists", kind.path()),
            get(
                move |state: State<AppState>, query: Query<HashMap<String, String>>| {
                    pair_exists(state, kind, query)
                },
            ),
        )
}

fn normalize(kind: RelationKind, pair: Record) -> Record {
    FormMapper::normalize(kind.relation().columns, pair)
}

/// GET /api/relations/{relation}
pub async fn list_pairs(State(state): State<AppState>, kind: RelationKind) -> Response {
    info!("GET /api/relations/{}", kind.path());

    match state.storage.pairs(kind).find_all().await {
        Ok(records) => (StatusCode::OK, Json(RecordListResponse { records })).into_response(),
        Err(e) => storage_error_response(&format!("Failed to list {}", kind.path()), e),
    }
}

/// GET /api/relations/{relation}/exists?student_id=..&cca_id=..
pub async fn pair_exists(
    State(state): State<AppState>,
    kind: RelationKind,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    info!("GET /api/relations/{}/exists - {:?}", kind.path(), params);
    let pair = normalize(kind, params.into_iter().collect());

    match state.storage.pairs(kind).exists(&pair).await {
        Ok(exists) => (StatusCode::OK, Json(ExistsResponse { exists })).into_response(),
        Err(e) => storage_error_response(&format!("Failed to check {}", kind.path()), e),
    }
}

/// POST /api/relations/{relation}
pub async fn create_pair(
    State(state): State<AppState>,
    kind: RelationKind,
    JsonBody(pair): JsonBody<Record>,
) -> Response {
    info!("POST /api/relations/{} - {:?}", kind.path(), pair);
    let pair = normalize(kind, pair);

    match state.storage.pairs(kind).insert(&pair).await {
        Ok(true) => (StatusCode::CREATED, Json(pair)).into_response(),
        Ok(false) => error_response(
            StatusCode::CONFLICT,
            "Error: The new record already exists in the database!",
        ),
        Err(e) => storage_error_response(&format!("Failed to add to {}", kind.path()), e),
    }
}

/// PUT /api/relations/{relation}
pub async fn update_pair(
    State(state): State<AppState>,
    kind: RelationKind,
    JsonBody(request): JsonBody<UpdatePairRequest>,
) -> Response {
    info!("PUT /api/relations/{} - {:?}", kind.path(), request);
    let old = normalize(kind, request.old);
    let new = normalize(kind, request.new);

    match state.storage.pairs(kind).update(&old, &new).await {
        Ok(true) => (StatusCode::OK, Json(new)).into_response(),
        Ok(false) => error_response(
            StatusCode::NOT_FOUND,
            "The old record does not exist, or the new record already exists",
        ),
        Err(e) => storage_error_response(&format!("Failed to update {}", kind.path()), e),
    }
}

/// DELETE /api/relations/{relation}
pub async fn delete_pair(
    State(state): State<AppState>,
    kind: RelationKind,
    JsonBody(pair): JsonBody<Record>,
) -> Response {
    info!("DELETE /api/relations/{} - {:?}", kind.path(), pair);
    let pair = normalize(kind, pair);

    match state.storage.pairs(kind).delete(&pair).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Record not found"),
        Err(e) => storage_error_response(&format!("Failed to delete from {}", kind.path()), e),
    }
}
