//! Registration, the current account and token login/logout.

use crate::{
    api::{AppState, auth::CurrentAccount, parse_json},
    core::{
        account, image,
        validation::{expect_object, validate_login, validate_registration},
    },
    entities::account as account_entity,
    errors::Result,
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRepresentation {
    /// Account id, as shown in a cat's `owner`
    pub id: i64,
    /// Login name
    pub username: String,
}

impl From<account_entity::Model> for AccountRepresentation {
    fn from(model: account_entity::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
        }
    }
}

/// Body returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Key to send as `Authorization: Token <key>`
    pub auth_token: String,
}

/// Routes under `/api/users/` and `/api/token/`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/", post(register))
        .route("/api/users/me/", get(me).delete(delete_me))
        .route("/api/token/login/", post(login))
        .route("/api/token/logout/", post(logout))
}

async fn register(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<AccountRepresentation>)> {
    let payload = parse_json(&body)?;
    let credentials = validate_registration(expect_object(&payload)?)?;
    let created =
        account::register_account(&state.db, &credentials.username, &credentials.password, false)
            .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn me(current: CurrentAccount) -> Json<AccountRepresentation> {
    Json(current.account.into())
}

async fn delete_me(State(state): State<AppState>, current: CurrentAccount) -> Result<StatusCode> {
    let images = account::delete_account(&state.db, current.account.id).await?;
    for path in images {
        image::remove(&state.config.media.root, &path).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn login(State(state): State<AppState>, body: Bytes) -> Result<Json<TokenResponse>> {
    let payload = parse_json(&body)?;
    let credentials = validate_login(expect_object(&payload)?)?;
    let token = account::login(&state.db, &credentials.username, &credentials.password).await?;
    Ok(Json(TokenResponse {
        auth_token: token.key,
    }))
}

async fn logout(State(state): State<AppState>, current: CurrentAccount) -> Result<StatusCode> {
    account::logout(&state.db, &current.token).await?;
    Ok(StatusCode::NO_CONTENT)
}
