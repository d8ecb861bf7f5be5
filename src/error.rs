use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::error;

/// Application error taxonomy. Every service and repo failure funnels into
/// one of these; the HTTP mapping lives in a single `IntoResponse` impl.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller's fault: malformed time, missing required field.
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<Value>,
    },

    /// Interval overlap or duplicate (user, date) plan. Carries the
    /// conflicting entity for display.
    #[error("{message}")]
    Conflict {
        message: String,
        details: Option<Value>,
    },

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Any failure during the atomic plan copy. The transaction is rolled
    /// back before this surfaces; partial copies are never observable.
    #[error("plan copy failed")]
    CopyFailed,

    /// Aggregated row data that does not parse into its typed form.
    #[error("malformed aggregated data: {0}")]
    Parse(String),

    /// Persistence collaborator failure, surfaced as-is and never retried.
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn validation_with(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            details: None,
        }
    }

    pub fn conflict_with(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details: Some(details),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: message,
                    details,
                },
            ),
            ApiError::Conflict { message, details } => (
                StatusCode::CONFLICT,
                ErrorBody {
                    error: message,
                    details,
                },
            ),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: format!("{what} not found"),
                    details: None,
                },
            ),
            ApiError::CopyFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "plan copy failed".into(),
                    details: None,
                },
            ),
            ApiError::Parse(detail) => {
                error!(%detail, "aggregated data failed to parse");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "malformed aggregated data".into(),
                        details: None,
                    },
                )
            }
            // Opaque on the wire; the cause goes to the log only.
            ApiError::Db(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "database error".into(),
                        details: None,
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validation_maps_to_400_with_details() {
        let err = ApiError::validation_with("missing fields", json!({"type": "required"}));
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn conflict_maps_to_409() {
        let err = ApiError::conflict("interval overlaps an existing block");
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError::NotFound("meal plan");
        assert_eq!(err.to_string(), "meal plan not found");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn copy_failure_is_opaque_500() {
        let resp = ApiError::CopyFailed.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn db_error_is_opaque_500() {
        let resp = ApiError::Db(sqlx::Error::RowNotFound).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_body_omits_absent_details() {
        let body = ErrorBody {
            error: "database error".into(),
            details: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"database error"}"#);
    }
}
