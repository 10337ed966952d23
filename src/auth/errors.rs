use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::validate::FieldViolation;

/// Domain error taxonomy. Every failure is classified exactly once, in the
/// service layer; the transport mapping below is the only place that turns
/// these into status codes.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation error")]
    Validation(Vec<FieldViolation>),
    #[error("email already exists")]
    EmailTaken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("invalid credentials")]
    Unauthenticated,
    #[error("edit conflict")]
    EditConflict,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldViolation>,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AuthError::Validation(violations) => {
                warn!(violations = violations.len(), "validation error");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        error: self.to_string(),
                        fields: violations.clone(),
                    },
                )
            }
            AuthError::EmailTaken => {
                warn!("email already exists");
                (
                    StatusCode::CONFLICT,
                    ErrorBody {
                        error: self.to_string(),
                        fields: Vec::new(),
                    },
                )
            }
            AuthError::InvalidToken => {
                warn!("invalid or expired token");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        error: self.to_string(),
                        fields: Vec::new(),
                    },
                )
            }
            AuthError::Unauthenticated => {
                warn!("unauthenticated");
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorBody {
                        error: self.to_string(),
                        fields: Vec::new(),
                    },
                )
            }
            AuthError::EditConflict => {
                warn!("edit conflict");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: self.to_string(),
                        fields: Vec::new(),
                    },
                )
            }
            // The cause is logged here and never leaks to the client.
            AuthError::Internal(err) => {
                error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "internal error".to_string(),
                        fields: Vec::new(),
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
    use anyhow::anyhow;

    #[test]
    fn maps_domain_errors_to_statuses() {
        let cases = [
            (
                AuthError::Validation(vec![FieldViolation {
                    field: "email".into(),
                    message: "must be provided".into(),
                }]),
                StatusCode::BAD_REQUEST,
            ),
            (AuthError::EmailTaken, StatusCode::CONFLICT),
            (AuthError::InvalidToken, StatusCode::BAD_REQUEST),
            (AuthError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (AuthError::EditConflict, StatusCode::INTERNAL_SERVER_ERROR),
            (
                AuthError::Internal(anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
