//! HTTP layer - axum router, shared state and request plumbing.
//!
//! Handlers parse and validate the request, call into [`crate::core`] and turn
//! the result into a response. Errors convert through [`error`].

/// Token authentication extractors
pub mod auth;
/// Error to response mapping
pub mod error;
/// Page-number pagination
pub mod pagination;
/// Endpoint handlers
pub mod routes;

use crate::{
    config::AppConfig,
    errors::{Error, Result},
};
use axum::{Router, body::Bytes};
use sea_orm::DatabaseConnection;
use serde_json::{Map, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Shared data available to all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Loaded application settings
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Creates the handler state from a connection and settings.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let media = ServeDir::new(&state.config.media.root);
    let mount = state.config.media.url.trim_end_matches('/').to_string();

    let api = Router::new()
        .merge(routes::accounts::router())
        .merge(routes::achievements::router())
        .merge(routes::cats::router());
    let app = if mount.is_empty() {
        api.fallback_service(media)
    } else {
        api.nest_service(&mount, media)
    };

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Parses a request body as JSON. An empty body reads as `{}`.
pub fn parse_json(body: &Bytes) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|e| Error::MalformedBody {
        message: e.to_string(),
    })
}

/// Parses a path id; anything but an integer is an unknown record.
pub fn parse_id(raw: &str, resource: &'static str) -> Result<i64> {
    raw.parse().map_err(|_| Error::not_found(resource, raw))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json() {
        assert_eq!(parse_json(&Bytes::from_static(b"")).unwrap(), json!({}));
        assert_eq!(
            parse_json(&Bytes::from_static(br#"{"name": "Murzik"}"#)).unwrap(),
            json!({"name": "Murzik"})
        );
        assert!(matches!(
            parse_json(&Bytes::from_static(b"{name")),
            Err(Error::MalformedBody { .. })
        ));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42", "Cat").unwrap(), 42);
        assert!(matches!(parse_id("abc", "Cat"), Err(Error::NotFound { .. })));
    }
}
