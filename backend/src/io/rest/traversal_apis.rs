//! # REST API for Join Views
//!
//! Read-only views that walk relations out from one record. Each view first
//! checks that the starting record exists (404 otherwise); an existing record
//! with nothing related gives an empty list.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use shared::{CcaNamesResponse, ClassNameResponse, Record, RecordListResponse};
use tracing::{info, warn};

use super::{error_response, storage_error_response, AppState};
use crate::storage::{EntityKind, StorageResult};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/students/:id/activities", get(student_activities))
        .route("/students/:id/class", get(student_class))
        .route("/students/:id/ccas", get(student_ccas))
        .route("/students/:id/subjects", get(student_subjects))
        .route("/overview/students", get(student_overview))
        .route("/classes/:id/students", get(class_students))
        .route("/ccas/:id/students", get(cca_students))
        .route("/activities/:id/students", get(activity_students))
        .route("/subjects/:id/students", get(subject_students))
}

/// 404 response when the starting record is missing, `None` when it exists
async fn require(state: &AppState, kind: EntityKind, id: &str) -> Option<Response> {
    match state.storage.records(kind).find(id).await {
        Ok(Some(_)) => None,
        Ok(None) => {
            warn!("{} {} not found", kind, id);
            Some(error_response(
                StatusCode::NOT_FOUND,
                format!("{} ID {} not found", kind, id),
            ))
        }
        Err(e) => Some(storage_error_response(&format!("Failed to get {} {}", kind, id), e)),
    }
}

fn list_response(context: &str, result: StorageResult<Vec<Record>>) -> Response {
    match result {
        Ok(records) => (StatusCode::OK, Json(RecordListResponse { records })).into_response(),
        Err(e) => storage_error_response(context, e),
    }
}

/// GET /api/students/:id/activities
pub async fn student_activities(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    info!("GET /api/students/{}/activities", id);
    let id = id.trim();
    if let Some(response) = require(&state, EntityKind::Student, id).await {
        return response;
    }

    let result = state.storage.students.activities(id).await;
    list_response("Failed to list student activities", result)
}

/// GET /api/students/:id/class
pub async fn student_class(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("GET /api/students/{}/class", id);
    let id = id.trim();
    if let Some(response) = require(&state, EntityKind::Student, id).await {
        return response;
    }

    match state.storage.students.class_name(id).await {
        Ok(class_name) => (
            StatusCode::OK,
            Json(ClassNameResponse {
                student_id: id.to_string(),
                class_name,
            }),
        )
            .into_response(),
        Err(e) => storage_error_response("Failed to look up student class", e),
    }
}

/// GET /api/students/:id/ccas
pub async fn student_ccas(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("GET /api/students/{}/ccas", id);
    let id = id.trim();
    if let Some(response) = require(&state, EntityKind::Student, id).await {
        return response;
    }

    match state.storage.students.cca_names(id).await {
        Ok(cca_names) => (
            StatusCode::OK,
            Json(CcaNamesResponse {
                student_id: id.to_string(),
                cca_names,
            }),
        )
            .into_response(),
        Err(e) => storage_error_response("Failed to list student CCAs", e),
    }
}

/// GET /api/students/:id/subjects
pub async fn student_subjects(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("GET /api/students/{}/subjects", id);
    let id = id.trim();
    if let Some(response) = require(&state, EntityKind::Student, id).await {
        return response;
    }

    let result = state.storage.students.subjects(id).await;
    list_response("Failed to list student subjects", result)
}

/// GET /api/overview/students
pub async fn student_overview(State(state): State<AppState>) -> Response {
    info!("GET /api/overview/students");
    let result = state.storage.students.view_all().await;
    list_response("Failed to build student overview", result)
}

/// GET /api/classes/:id/students
pub async fn class_students(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("GET /api/classes/{}/students", id);
    let id = id.trim();
    if let Some(response) = require(&state, EntityKind::Class, id).await {
        return response;
    }

    let result = state.storage.classes.students(id).await;
    list_response("Failed to list class students", result)
}

/// GET /api/ccas/:id/students
pub async fn cca_students(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("GET /api/ccas/{}/students", id);
    let id = id.trim();
    if let Some(response) = require(&state, EntityKind::Cca, id).await {
        return response;
    }

    let result = state.storage.ccas.students(id).await;
    list_response("Failed to list CCA members", result)
}

/// GET /api/activities/:id/students
pub async fn activity_students(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("GET /api/activities/{}/students", id);
    let id = id.trim();
    if let Some(response) = require(&state, EntityKind::Activity, id).await {
        return response;
    }

    let result = state.storage.activities.students(id).await;
    list_response("Failed to list activity participants", result)
}

/// GET /api/subjects/:id/students
pub async fn subject_students(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("GET /api/subjects/{}/students", id);
    let id = id.trim();
    if let Some(response) = require(&state, EntityKind::Subject, id).await {
        return response;
    }

    let result = state.storage.subjects.students(id).await;
    list_response("Failed to list subject students", result)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{send, test_router};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_class_view_lists_its_students() {
        let router = test_router().await;

        send(
            &router,
            "POST",
            "/api/classes",
            Some(json!({ "id": "Y1234", "name": "2227", "level": "JC2" })),
        )
        .await;
        for (id, name) in [("S2", "Nolan"), ("S1", "John")] {
            send(
                &router,
                "POST",
                "/api/students",
                Some(json!({
                    "id": id,
                    "name": name,
                    "student_age": 18,
                    "year_enrolled": 2022,
                    "graduating_year": 2023,
                    "class_id": "Y1234"
                })),
            )
            .await;
        }

        let (status, body) = send(&router, "GET", "/api/classes/Y1234/students", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"][0]["id"], json!("S1"));
        assert_eq!(body["records"][1]["id"], json!("S2"));

        let (status, body) = send(&router, "GET", "/api/students/S1/class", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["class_name"], json!("2227"));
    }

    #[tokio::test]
    async fn test_views_of_missing_records_are_not_found() {
        let router = test_router().await;

        let (status, _) = send(&router, "GET", "/api/students/S9/activities", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&router, "GET", "/api/ccas/9/students", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&router, "GET", "/api/overview/students", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"], json!([]));
    }

    #[tokio::test]
    async fn test_views_trim_the_path_id_like_record_lookups() {
        let router = test_router().await;

        send(
            &router,
            "POST",
            "/api/students",
            Some(json!({
                "id": "S1",
                "name": "John",
                "student_age": 18,
                "year_enrolled": 2022,
                "graduating_year": 2023,
                "class_id": "Y1234"
            })),
        )
        .await;

        let (status, _) = send(&router, "GET", "/api/students/%20S1", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&router, "GET", "/api/students/%20S1/activities", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"], json!([]));

        let (status, body) = send(&router, "GET", "/api/students/%20S1/ccas", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["student_id"], json!("S1"));
    }
}
