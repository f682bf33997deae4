use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::users::error::UserError;

/// Error response carrying `{"msg": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            msg: msg.into(),
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Like `From<UserError>`, but backend failures get `status` and `msg`
    /// instead of the generic 500.
    pub fn from_user_with(err: UserError, status: StatusCode, msg: &str) -> Self {
        match err {
            UserError::Hash(_) | UserError::Store(_) => {
                error!(error = %err, %status, "user operation failed");
                Self::new(status, msg)
            }
            other => other.into(),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            e if e.is_validation() => Self::new(StatusCode::BAD_REQUEST, e.to_string()),
            e => {
                error!(error = %e, "user operation failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error.")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "msg": self.msg }))).into_response()
    }
}
