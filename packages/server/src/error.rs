use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use engine::EngineError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `PERMISSION_DENIED`, `NOT_FOUND`, `CONFLICT`,
    /// `INVALID_TRANSITION`, `SUBMISSION_REJECTED`, `JOIN_CLOSED`,
    /// `STALE_CUTOFF`, `CONTEST_HALTED`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "duration must be positive")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    PermissionDenied,
    NotFound(String),
    Conflict(String),
    /// Admin command not valid in the contest's current state.
    InvalidTransition(String),
    /// Verdict refused admission to the ledger; the message names the reason.
    SubmissionRejected(String),
    JoinClosed(String),
    /// Requested standings cutoff predates retained history.
    StaleCutoff(String),
    /// The contest was halted after an integrity violation.
    ContestHalted(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "PERMISSION_DENIED",
                    message: "Insufficient permissions".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::InvalidTransition(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "INVALID_TRANSITION",
                    message: msg,
                },
            ),
            AppError::SubmissionRejected(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "SUBMISSION_REJECTED",
                    message: msg,
                },
            ),
            AppError::JoinClosed(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "JOIN_CLOSED",
                    message: msg,
                },
            ),
            AppError::StaleCutoff(msg) => {
                tracing::error!("Stale cutoff served: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "STALE_CUTOFF",
                        message: msg,
                    },
                )
            }
            AppError::ContestHalted(msg) => {
                tracing::error!("Halted contest touched: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorBody {
                        code: "CONTEST_HALTED",
                        message: msg,
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownContest(_)
            | EngineError::UnknownParticipant { .. }
            | EngineError::UnknownProblem { .. }
            | EngineError::UnknownRecord { .. } => AppError::NotFound(err.to_string()),
            EngineError::DuplicateContest(_) | EngineError::AlreadyJoined { .. } => {
                AppError::Conflict(err.to_string())
            }
            EngineError::InvalidTransition { .. } => AppError::InvalidTransition(err.to_string()),
            EngineError::Rejected(_) => AppError::SubmissionRejected(err.to_string()),
            EngineError::JoinClosed(_) => AppError::JoinClosed(err.to_string()),
            EngineError::InvalidConfig(_)
            | EngineError::InvalidVerdict(_)
            | EngineError::CutoffBeyondHead { .. } => AppError::Validation(err.to_string()),
            EngineError::StaleCutoff { .. } => AppError::StaleCutoff(err.to_string()),
            EngineError::Corrupt { .. } => AppError::ContestHalted(err.to_string()),
        }
    }
}
