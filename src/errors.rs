//! # Error Handling for Grid Endpoints
//!
//! One error type covers everything the grid pipeline can reject:
//! - Malformed requests (order directives pointing outside the column list)
//! - Undecodable column configuration payloads
//! - Backend execution failures on any of the three query shapes
//! - Ambiguous aggregate results from a count query
//! - Side-channel lookup failures
//!
//! ## Philosophy
//!
//! **Never expose internal errors to users**. Database errors and lookup
//! failures are logged server-side via `tracing` but clients only ever see a
//! sanitized message with the mapped HTTP status code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

/// Grid pipeline error with automatic logging and sanitized responses.
#[derive(Debug)]
pub enum GridError {
    /// 400 Bad Request - an order directive or column reference indexes
    /// outside the declared column list
    InvalidRequest {
        /// User-facing error message
        message: String,
    },

    /// 400 Bad Request - a `dataColumns` payload was supplied but failed to
    /// decode
    Configuration {
        /// User-facing error message
        message: String,
    },

    /// 500 Internal Server Error - backend execution failure on the data,
    /// filtered-count or total-count query (details logged, not exposed)
    Backend {
        /// User-facing generic message
        message: String,
        /// Internal error (logged, not sent to user)
        internal: DbErr,
    },

    /// 500 Internal Server Error - a count query produced more than one
    /// aggregate row; never resolved by picking the first
    AmbiguousAggregate {
        /// Number of rows the aggregate produced
        rows: usize,
    },

    /// 500 Internal Server Error - the key-value side-channel failed
    SideChannel {
        /// Internal error details (logged, not sent to user)
        message: String,
    },
}

impl GridError {
    /// Create a 400 Bad Request error for an out-of-range request reference.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a 400 Bad Request error for an undecodable configuration
    /// payload.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a 500 Internal Server Error from a backend failure.
    ///
    /// The database error details are logged but NOT sent to the user.
    #[must_use]
    pub fn backend(err: DbErr) -> Self {
        Self::Backend {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    /// Create a 500 Internal Server Error for a count query that returned
    /// more than one aggregate row.
    #[must_use]
    pub fn ambiguous_aggregate(rows: usize) -> Self {
        Self::AmbiguousAggregate { rows }
    }

    /// Create a 500 Internal Server Error from a side-channel failure.
    pub fn side_channel(message: impl Into<String>) -> Self {
        Self::SideChannel {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { .. } | Self::Configuration { .. } => StatusCode::BAD_REQUEST,
            Self::Backend { .. } | Self::AmbiguousAggregate { .. } | Self::SideChannel { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the user-facing error message (sanitized)
    fn user_message(&self) -> String {
        match self {
            Self::InvalidRequest { message } | Self::Configuration { message } => message.clone(),
            Self::Backend { message, .. } => message.clone(),
            Self::AmbiguousAggregate { .. } => "Record count could not be determined".to_string(),
            Self::SideChannel { .. } => "A lookup error occurred".to_string(),
        }
    }

    /// Log internal error details (not sent to user)
    ///
    /// Uses the `tracing` crate - only produces output if the caller has a
    /// subscriber installed.
    fn log_internal(&self) {
        match self {
            Self::Backend { internal, .. } => {
                tracing::error!(
                    error = ?internal,
                    "Backend error during grid query execution"
                );
            }
            Self::AmbiguousAggregate { rows } => {
                tracing::error!(
                    rows = %rows,
                    "Count query produced an ambiguous aggregate result"
                );
            }
            Self::SideChannel { message } => {
                tracing::error!(
                    details = %message,
                    "Side-channel lookup failed"
                );
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "Grid request rejected"
                );
            }
        }
    }
}

/// Error response sent to users (sanitized)
#[derive(Serialize)]
struct ErrorResponse {
    /// Error message
    error: String,
}

impl IntoResponse for GridError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let response = ErrorResponse {
            error: self.user_message(),
        };

        (status, Json(response)).into_response()
    }
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for GridError {}

/// Convert Sea-ORM `DbErr` into a sanitized backend error.
impl From<DbErr> for GridError {
    fn from(err: DbErr) -> Self {
        Self::backend(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request() {
        let err = GridError::invalid_request("order directive targets column 9");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), "order directive targets column 9");
    }

    #[test]
    fn test_configuration() {
        let err = GridError::configuration("dataColumns payload failed to decode");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), "dataColumns payload failed to decode");
    }

    #[test]
    fn test_backend_error_is_sanitized() {
        let err = GridError::backend(DbErr::Type("decimal conversion failed".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "A database error occurred");
    }

    #[test]
    fn test_ambiguous_aggregate() {
        let err = GridError::ambiguous_aggregate(3);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.user_message().contains('3'));
    }

    #[test]
    fn test_side_channel_is_sanitized() {
        let err = GridError::side_channel("connection refused at redis:6379");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "A lookup error occurred");
    }

    #[test]
    fn test_dberr_conversion() {
        let err: GridError = DbErr::Json("unexpected token".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "A database error occurred");
    }

    #[test]
    fn test_display_trait() {
        let err = GridError::invalid_request("bad column index");
        assert_eq!(format!("{err}"), "bad column index");
    }

    #[test]
    fn test_error_trait() {
        let err = GridError::invalid_request("bad column index");
        let _: &dyn std::error::Error = &err;
    }
}
