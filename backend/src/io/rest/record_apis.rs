//! # REST API for Entity Records
//!
//! The same five endpoints for every entity table, mounted once per
//! [`EntityKind`]:
//!
//! - `GET    /api/{entity}`      all records
//! - `POST   /api/{entity}`      add a record
//! - `GET    /api/{entity}/:id`  view one record
//! - `PUT    /api/{entity}/:id`  replace a record (may rename it)
//! - `DELETE /api/{entity}/:id`  remove a record

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use shared::{Record, RecordListResponse};
use tracing::info;

use super::extractors::JsonBody;
use super::mappers::FormMapper;
use super::{error_response, storage_error_response, AppState};
use crate::storage::EntityKind;

pub fn routes(kind: EntityKind) -> Router<AppState> {
    Router::new()
        .route(
            &format!("/{}", kind.path()),
            get(move |state: State<AppState>| list_records(state, kind)).post(
                move |state: State<AppState>, body: JsonBody<Record>| create_record(state, kind, body),
            ),
        )
        .route(
            &format!("/{}/:id", kind.path()),
            get(move |state: State<AppState>, id: Path<String>| get_record(state, kind, id))
                .put(
                    move |state: State<AppState>, id: Path<String>, body: JsonBody<Record>| {
                        update_record(state, kind, id, body)
                    },
                )
                .delete(move |state: State<AppState>, id: Path<String>| {
                    delete_record(state, kind, id)
                }),
        )
}

/// List every record of one entity
pub async fn list_records(State(state): State<AppState>, kind: EntityKind) -> Response {
    info!("GET /api/{}", kind.path());

    match state.storage.records(kind).find_all().await {
        Ok(records) => (StatusCode::OK, Json(RecordListResponse { records })).into_response(),
        Err(e) => storage_error_response(&format!("Failed to list {}", kind.path()), e),
    }
}

/// View one record by id
pub async fn get_record(
    State(state): State<AppState>,
    kind: EntityKind,
    Path(id): Path<String>,
) -> Response {
    info!("GET /api/{}/{}", kind.path(), id);
    let id = id.trim();

    match state.storage.records(kind).find(id).await {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("{} ID {} not found", kind, id),
        ),
        Err(e) => storage_error_response(&format!("Failed to get {} {}", kind, id), e),
    }
}

/// Add a new record; refused with 409 when the id is already taken
pub async fn create_record(
    State(state): State<AppState>,
    kind: EntityKind,
    JsonBody(record): JsonBody<Record>,
) -> Response {
    let record = FormMapper::normalize(kind.table().columns, record);
    let records = state.storage.records(kind);
    let id = record
        .text(records.key_field())
        .unwrap_or_default()
        .to_string();
    info!("POST /api/{} - id: {}", kind.path(), id);

    match records.insert(&record).await {
        Ok(true) => (StatusCode::CREATED, Json(record)).into_response(),
        Ok(false) => error_response(
            StatusCode::CONFLICT,
            format!("A {} record with ID {} already exists", kind, id),
        ),
        Err(e) => storage_error_response(&format!("Failed to create {} {}", kind, id), e),
    }
}

/// Replace the record stored under `id`
pub async fn update_record(
    State(state): State<AppState>,
    kind: EntityKind,
    Path(id): Path<String>,
    JsonBody(record): JsonBody<Record>,
) -> Response {
    info!("PUT /api/{}/{}", kind.path(), id);
    let id = id.trim();
    let record = FormMapper::normalize(kind.table().columns, record);

    match state.storage.records(kind).update(id, &record).await {
        Ok(true) => (StatusCode::OK, Json(record)).into_response(),
        Ok(false) => error_response(
            StatusCode::NOT_FOUND,
            format!("{} ID {} not found, or the new ID is already taken", kind, id),
        ),
        Err(e) => storage_error_response(&format!("Failed to update {} {}", kind, id), e),
    }
}

/// Remove the record stored under `id`
pub async fn delete_record(
    State(state): State<AppState>,
    kind: EntityKind,
    Path(id): Path<String>,
) -> Response {
    info!("DELETE /api/{}/{}", kind.path(), id);
    let id = id.trim();

    match state.storage.records(kind).delete(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => error_response(
            StatusCode::NOT_FOUND,
            format!("{} ID {} not found", kind, id),
        ),
        Err(e) => storage_error_response(&format!("Failed to delete {} {}", kind, id), e),
    }
}
