use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiError;

/// The `:uuid` path segment. A segment that does not parse names no user,
/// so lookups read as empty and writes as not found.
#[derive(Debug)]
pub struct UserKey(pub Option<Uuid>);

#[async_trait]
impl<S> FromRequestParts<S> for UserKey
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(segment) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.body_text()))?;

        let uuid = Uuid::parse_str(&segment).ok();
        if uuid.is_none() {
            debug!(%segment, "path segment is not a uuid");
        }
        Ok(UserKey(uuid))
    }
}

/// JSON body whose rejections answer 400 with `{"msg": ...}`.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                let msg = rejection.body_text();
                warn!(error = %msg, "request body rejected");
                ApiError::new(StatusCode::BAD_REQUEST, msg)
            })?;
        Ok(JsonBody(value))
    }
}
