//! Request extractors that answer malformed input with the usual
//! `{"error": ...}` body instead of axum's plain-text rejection.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::Response,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use super::error_response;

/// JSON request body, e.g. `JsonBody(record): JsonBody<Record>`
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                warn!("Rejected request body: {}", rejection.body_text());
                error_response(rejection.status(), rejection.body_text())
            })?;

        Ok(JsonBody(body))
    }
}
