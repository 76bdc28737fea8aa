//! Achievement catalog endpoints.
//!
//! Anyone may read the catalog. Any authenticated account may write; there is
//! no per-achievement owner.

use crate::{
    api::{
        AppState,
        auth::{CurrentAccount, MaybeAccount},
        parse_id, parse_json,
    },
    core::{
        achievement,
        representation::AchievementRepresentation,
        validation::{WriteMode, expect_object, validate_achievement},
    },
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use tracing::info;

const RESOURCE: &str = "Achievement";

/// Routes under `/api/achievements/`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/achievements/", get(list).post(create))
        .route(
            "/api/achievements/:id/",
            get(retrieve).put(replace).patch(partial_update).delete(destroy),
        )
}

async fn list(
    State(state): State<AppState>,
    _caller: MaybeAccount,
) -> Result<Json<Vec<AchievementRepresentation>>> {
    let achievements = achievement::list_achievements(&state.db).await?;
    Ok(Json(achievements.into_iter().map(Into::into).collect()))
}

async fn create(
    State(state): State<AppState>,
    CurrentAccount { account, .. }: CurrentAccount,
    body: Bytes,
) -> Result<(StatusCode, Json<AchievementRepresentation>)> {
    let payload = parse_json(&body)?;
    let name = validate_achievement(expect_object(&payload)?, WriteMode::Create)?
        .ok_or_else(|| Error::Internal {
            message: "validated create payload without a name".to_string(),
        })?;

    let created = achievement::create_achievement(&state.db, &name).await?;
    info!("Account {} created achievement {}", account.id, created.id);
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn retrieve(
    State(state): State<AppState>,
    _caller: MaybeAccount,
    Path(id): Path<String>,
) -> Result<Json<AchievementRepresentation>> {
    let id = parse_id(&id, RESOURCE)?;
    let found = achievement::get_achievement_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::not_found(RESOURCE, id))?;
    Ok(Json(found.into()))
}

async fn update(
    state: &AppState,
    id: &str,
    body: &Bytes,
    mode: WriteMode,
) -> Result<Json<AchievementRepresentation>> {
    let id = parse_id(id, RESOURCE)?;
    let payload = parse_json(body)?;
    let name = validate_achievement(expect_object(&payload)?, mode)?;

    let updated = match name {
        Some(name) => achievement::rename_achievement(&state.db, id, &name).await?,
        None => achievement::get_achievement_by_id(&state.db, id)
            .await?
            .ok_or_else(|| Error::not_found(RESOURCE, id))?,
    };
    Ok(Json(updated.into()))
}

async fn replace(
    State(state): State<AppState>,
    _account: CurrentAccount,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<AchievementRepresentation>> {
    update(&state, &id, &body, WriteMode::Replace).await
}

async fn partial_update(
    State(state): State<AppState>,
    _account: CurrentAccount,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<AchievementRepresentation>> {
    update(&state, &id, &body, WriteMode::Partial).await
}

async fn destroy(
    State(state): State<AppState>,
    _account: CurrentAccount,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id, RESOURCE)?;
    achievement::delete_achievement(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use axum::http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_achievement() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "achiever").await?;
        let token = login_token(&db, "achiever").await?;
        let app = test_app(db);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/achievements/",
            Some(&token),
            Some(json!({"achievement_name": "Catch a mouse"})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["achievement_name"], "Catch a mouse");
        assert!(body["id"].is_i64());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_requires_name() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "achiever").await?;
        let token = login_token(&db, "achiever").await?;
        let app = test_app(db);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/achievements/",
            Some(&token),
            Some(json!({"achievement_name": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["achievement_name"].is_array());

        let (status, body) = send(&app, Method::POST, "/api/achievements/", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["achievement_name"].is_array());
        Ok(())
    }

    #[tokio::test]
    async fn test_anonymous_can_read_but_not_write() -> Result<()> {
        let db = setup_test_db().await?;
        let created = achievement::create_achievement(&db, "Catch a mouse").await?;
        let app = test_app(db);

        let (status, body) = send(&app, Method::GET, "/api/achievements/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"id": created.id, "achievement_name": "Catch a mouse"}]));

        let uri = format!("/api/achievements/{}/", created.id);
        let (status, _) = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/achievements/",
            None,
            Some(json!({"achievement_name": "Sneak"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Authentication credentials were not provided.");

        let (status, _) = send(&app, Method::DELETE, &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn test_bad_token_is_rejected_on_reads() -> Result<()> {
        let app = test_app(setup_test_db().await?);

        let (status, body) = send(&app, Method::GET, "/api/achievements/", Some("nope"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Invalid token.");
        Ok(())
    }

    #[tokio::test]
    async fn test_list_in_creation_order() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "achiever").await?;
        achievement::create_achievement(&db, "Sleep all day").await?;
        achievement::create_achievement(&db, "Catch a mouse").await?;
        let token = login_token(&db, "achiever").await?;
        let app = test_app(db);

        let (status, body) = send(&app, Method::GET, "/api/achievements/", Some(&token), None).await;

        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|a| a["achievement_name"].as_str())
            .collect();
        assert_eq!(names, vec!["Sleep all day", "Catch a mouse"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_rename_and_delete() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "achiever").await?;
        let created = achievement::create_achievement(&db, "Jumper").await?;
        let token = login_token(&db, "achiever").await?;
        let app = test_app(db);
        let uri = format!("/api/achievements/{}/", created.id);

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"achievement_name": "High jumper"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"id": created.id, "achievement_name": "High jumper"}));

        let (status, body) = send(&app, Method::PATCH, &uri, Some(&token), Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["achievement_name"], "High jumper");

        let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Not found.");
        Ok(())
    }
}
