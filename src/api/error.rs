//! HTTP mapping of crate errors.
//!
//! Validation failures are sent as a `{"field": ["message", ...]}` map, login
//! failures under `non_field_errors`, and everything else as `{"detail": "..."}`.
//! Server-side failures are logged and reported without their internal text.

use crate::errors::Error;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::error;

/// Detail sent for any 500 response.
pub const SERVER_ERROR_DETAIL: &str = "A server error occurred.";

impl Error {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidCredentials | Self::MalformedBody { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound { .. } | Self::InvalidPage => StatusCode::NOT_FOUND,
            Self::Integrity { .. }
            | Self::Database { .. }
            | Self::Internal { .. }
            | Self::Config { .. }
            | Self::Io(_)
            | Self::EnvVar(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::Validation(errors) => json!(errors),
            Self::InvalidCredentials => {
                json!({"non_field_errors": ["Unable to log in with provided credentials."]})
            }
            Self::Unauthorized => {
                json!({"detail": "Authentication credentials were not provided."})
            }
            Self::InvalidToken => json!({"detail": "Invalid token."}),
            Self::Forbidden => {
                json!({"detail": "You do not have permission to perform this action."})
            }
            Self::NotFound { .. } => json!({"detail": "Not found."}),
            Self::InvalidPage => json!({"detail": "Invalid page."}),
            Self::MalformedBody { .. } => json!({"detail": self.to_string()}),
            _ => json!({"detail": SERVER_ERROR_DETAIL}),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let mut response = (status, Json(self.body())).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Token"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::validation::FieldErrors;

    async fn body_of(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_is_field_map() {
        let response = Error::from(FieldErrors::single("color", "No color with this name.")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_of(response).await,
            json!({"color": ["No color with this name."]})
        );
    }

    #[tokio::test]
    async fn test_integrity_error_hides_sql() {
        let response = Error::Integrity {
            message: "NOT NULL constraint failed: cats.birth_year".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await, json!({"detail": SERVER_ERROR_DETAIL}));
    }

    #[tokio::test]
    async fn test_unauthorized_carries_challenge() {
        let response = Error::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Token"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(Error::InvalidPage.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(Error::not_found("Cat", 3).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(Error::InvalidCredentials.status_code(), StatusCode::BAD_REQUEST);
    }
}
