//! Maps `sdsc_core::Error` onto the HTTP status table (§7).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

// Layer 3: Internal module imports
use sdsc_core::{ControllerError, DslError, Error as CoreError, PolicyError, StoreError};

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Wraps a core error together with the flag that decides whether a parse
/// failure answers 401 (legacy) or 400 (§9 Open Questions).
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Translate a core error using `legacy_401_on_parse_error` to decide
    /// the status for DSL parse failures (§7, §9).
    pub fn from_core(err: CoreError, legacy_401_on_parse_error: bool) -> Self {
        let status = status_for(&err, legacy_401_on_parse_error);
        Self {
            status,
            message: err.to_string(),
        }
    }
}

fn status_for(err: &CoreError, legacy_401_on_parse_error: bool) -> StatusCode {
    match err {
        CoreError::Store(StoreError::StoreUnavailable) => StatusCode::INTERNAL_SERVER_ERROR,
        CoreError::Store(StoreError::ConflictError(_)) => StatusCode::CONFLICT,
        CoreError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        CoreError::Dsl(DslError::ParseError(_)) => {
            if legacy_401_on_parse_error {
                StatusCode::UNAUTHORIZED
            } else {
                StatusCode::BAD_REQUEST
            }
        }
        CoreError::Dsl(DslError::UnknownReference(_)) => StatusCode::BAD_REQUEST,
        CoreError::Policy(PolicyError::Store(inner)) => {
            status_for(&CoreError::Store(clone_store_error(inner)), legacy_401_on_parse_error)
        }
        CoreError::Policy(PolicyError::InvalidRule(inner)) => {
            status_for(&CoreError::Dsl(clone_dsl_error(inner)), legacy_401_on_parse_error)
        }
        CoreError::Policy(PolicyError::ActorLifecycle(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        CoreError::Policy(PolicyError::Conflict(_)) => StatusCode::FORBIDDEN,
        CoreError::Policy(PolicyError::NotFound(_)) => StatusCode::NOT_FOUND,
        CoreError::Controller(ControllerError::Store(inner)) => {
            status_for(&CoreError::Store(clone_store_error(inner)), legacy_401_on_parse_error)
        }
        CoreError::Controller(ControllerError::ActorLifecycle(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        CoreError::Controller(ControllerError::NotFound(_)) => StatusCode::NOT_FOUND,
        CoreError::Controller(ControllerError::MetricUnavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        CoreError::FileSync(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn clone_store_error(err: &StoreError) -> StoreError {
    match err {
        StoreError::StoreUnavailable => StoreError::StoreUnavailable,
        StoreError::ConflictError(key) => StoreError::ConflictError(key.clone()),
        StoreError::NotFound(key) => StoreError::NotFound(key.clone()),
    }
}

fn clone_dsl_error(err: &DslError) -> DslError {
    match err {
        DslError::ParseError(msg) => DslError::ParseError(msg.clone()),
        DslError::UnknownReference(msg) => DslError::UnknownReference(msg.clone()),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
