//! Shared test utilities for Kittygram.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults, plus a small driver for
//! exercising the HTTP router without a socket.

#![allow(clippy::unwrap_used)]

use crate::{
    api::{self, AppState},
    config::AppConfig,
    core::{account, cat, validation::CatInput},
    entities,
    errors::Result,
};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::path::PathBuf;
use tower::ServiceExt;

/// Password used by every account created through these helpers.
pub const TEST_PASSWORD: &str = "testpass123";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Media root for tests, unique per call so parallel tests never share files.
pub fn test_media_root() -> PathBuf {
    std::env::temp_dir().join(format!("kittygram-test-{}", uuid::Uuid::new_v4().simple()))
}

/// Creates a regular (non-staff) account with [`TEST_PASSWORD`].
pub async fn create_test_account(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::account::Model> {
    account::register_account(db, username, TEST_PASSWORD, false).await
}

/// Creates a test cat with sensible defaults.
///
/// # Defaults
/// * color: `#000000` (black)
/// * `birth_year`: 2020
/// * no achievements, no image
pub async fn create_test_cat(
    db: &DatabaseConnection,
    owner_id: i64,
    name: &str,
) -> Result<entities::cat::Model> {
    let input = CatInput {
        name: Some(name.to_string()),
        color: Some("#000000".to_string()),
        birth_year: Some(2020),
        ..CatInput::default()
    };
    cat::create_cat(db, &test_media_root(), owner_id, input).await
}

/// Creates a database with one account ("owner") and one cat ("Murzik").
pub async fn setup_with_cat() -> Result<(
    DatabaseConnection,
    entities::account::Model,
    entities::cat::Model,
)> {
    let db = setup_test_db().await?;
    let owner = create_test_account(&db, "owner").await?;
    let cat = create_test_cat(&db, owner.id, "Murzik").await?;
    Ok((db, owner, cat))
}

/// Router over `db` with default settings and a private media root.
pub fn test_app(db: DatabaseConnection) -> Router {
    let mut config = AppConfig::default();
    config.media.root = test_media_root();
    api::router(AppState::new(db, config))
}

/// Logs in an account created by these helpers and returns its token key.
pub async fn login_token(db: &DatabaseConnection, username: &str) -> Result<String> {
    Ok(account::login(db, username, TEST_PASSWORD).await?.key)
}

/// Sends one request through `app` and returns the status and JSON body
/// (`Value::Null` for an empty body).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
