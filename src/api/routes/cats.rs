//! Cat endpoints.
//!
//! Lists are paginated. Updates and deletes are limited to the owner or staff;
//! the cat is looked up and checked before the body is validated.

use crate::{
    api::{
        AppState,
        auth::{CurrentAccount, Reader},
        pagination::{PageQuery, Paginated},
        parse_id, parse_json,
    },
    core::{
        cat,
        representation::CatRepresentation,
        validation::{WriteMode, expect_object, validate_cat},
    },
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

const RESOURCE: &str = "Cat";
const LIST_PATH: &str = "/api/cats/";

/// Routes under `/api/cats/`.
pub fn router() -> Router<AppState> {
    Router::new().route(LIST_PATH, get(list).post(create)).route(
        "/api/cats/:id/",
        get(retrieve).put(replace).patch(partial_update).delete(destroy),
    )
}

async fn list(
    State(state): State<AppState>,
    _reader: Reader,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<CatRepresentation>>> {
    let page_number = query.number()?;
    let page = cat::get_cats_page(&state.db, page_number, state.config.api.page_size).await?;
    let results = cat::represent_cats(&state.db, page.cats, &state.config.media).await?;
    Ok(Json(Paginated::new(
        results,
        page.count,
        page_number,
        page.num_pages,
        LIST_PATH,
    )))
}

async fn create(
    State(state): State<AppState>,
    CurrentAccount { account, .. }: CurrentAccount,
    body: Bytes,
) -> Result<(StatusCode, Json<CatRepresentation>)> {
    let payload = parse_json(&body)?;
    let input = validate_cat(expect_object(&payload)?, WriteMode::Create)?;

    let created = cat::create_cat(&state.db, &state.config.media.root, account.id, input).await?;
    let repr = cat::represent_cat(&state.db, created, &state.config.media).await?;
    Ok((StatusCode::CREATED, Json(repr)))
}

async fn retrieve(
    State(state): State<AppState>,
    _reader: Reader,
    Path(id): Path<String>,
) -> Result<Json<CatRepresentation>> {
    let id = parse_id(&id, RESOURCE)?;
    let found = cat::get_cat_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::not_found(RESOURCE, id))?;
    Ok(Json(cat::represent_cat(&state.db, found, &state.config.media).await?))
}

async fn update(
    state: &AppState,
    actor: &CurrentAccount,
    id: &str,
    body: &Bytes,
    mode: WriteMode,
) -> Result<Json<CatRepresentation>> {
    let id = parse_id(id, RESOURCE)?;
    cat::get_modifiable_cat(&state.db, &actor.account, id).await?;
    let payload = parse_json(body)?;
    let input = validate_cat(expect_object(&payload)?, mode)?;

    let updated =
        cat::update_cat(&state.db, &state.config.media.root, &actor.account, id, input).await?;
    Ok(Json(cat::represent_cat(&state.db, updated, &state.config.media).await?))
}

async fn replace(
    State(state): State<AppState>,
    actor: CurrentAccount,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<CatRepresentation>> {
    update(&state, &actor, &id, &body, WriteMode::Replace).await
}

async fn partial_update(
    State(state): State<AppState>,
    actor: CurrentAccount,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<CatRepresentation>> {
    update(&state, &actor, &id, &body, WriteMode::Partial).await
}

async fn destroy(
    State(state): State<AppState>,
    actor: CurrentAccount,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id, RESOURCE)?;
    cat::delete_cat(&state.db, &state.config.media.root, &actor.account, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entities::Cat, test_utils::*};
    use axum::http::Method;
    use sea_orm::{EntityTrait, PaginatorTrait};
    use serde_json::json;

    #[tokio::test]
    async fn test_create_cat() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_account(&db, "owner").await?;
        let token = login_token(&db, "owner").await?;
        let app = test_app(db);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/cats/",
            Some(&token),
            Some(json!({
                "name": "Barsik",
                "color": "Gray",
                "birth_year": 2021,
                "achievements": [{"achievement_name": "Catch a mouse"}],
                "owner": 9999,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Barsik");
        assert_eq!(body["color"], "gray");
        assert_eq!(body["owner"], owner.id);
        assert_eq!(body["achievements"][0]["achievement_name"], "Catch a mouse");
        assert_eq!(body["image"], serde_json::Value::Null);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_color_persists_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "owner").await?;
        let token = login_token(&db, "owner").await?;
        let app = test_app(db.clone());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/cats/",
            Some(&token),
            Some(json!({
                "name": "Barsik",
                "color": "plaid",
                "birth_year": 2021,
                "achievements": [{"achievement_name": "Never saved"}],
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["color"].is_array());
        assert_eq!(Cat::find().count(&db).await?, 0);
        assert_eq!(crate::entities::Achievement::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_requires_authentication() -> Result<()> {
        let (db, _, _) = setup_with_cat().await?;
        let app = test_app(db);

        let (status, _) = send(&app, Method::GET, "/api/cats/", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_cats() -> Result<()> {
        let (db, owner, _) = setup_with_cat().await?;
        create_test_cat(&db, owner.id, "Barsik").await?;
        let token = login_token(&db, "owner").await?;
        let app = test_app(db);

        let (status, body) = send(&app, Method::GET, "/api/cats/", Some(&token), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["next"], serde_json::Value::Null);
        assert_eq!(body["previous"], serde_json::Value::Null);
        assert_eq!(body["results"][0]["name"], "Murzik");
        assert_eq!(body["results"][1]["name"], "Barsik");
        assert_eq!(body["results"][0]["color"], "black");

        let (status, body) = send(&app, Method::GET, "/api/cats/?page=5", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Invalid page.");
        Ok(())
    }

    #[tokio::test]
    async fn test_owner_updates_and_deletes() -> Result<()> {
        let (db, _, cat) = setup_with_cat().await?;
        let token = login_token(&db, "owner").await?;
        let app = test_app(db.clone());
        let uri = format!("/api/cats/{}/", cat.id);

        let (status, body) = send(
            &app,
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({"color": "white", "achievements": [{"achievement_name": "A"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["color"], "white");
        assert_eq!(body["name"], "Murzik");

        let (status, body) = send(&app, Method::PUT, &uri, Some(&token), Some(json!({"name": "Murzik"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["birth_year"].is_array());

        let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, serde_json::Value::Null);
        assert_eq!(Cat::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden() -> Result<()> {
        let (db, _, cat) = setup_with_cat().await?;
        create_test_account(&db, "stranger").await?;
        let token = login_token(&db, "stranger").await?;
        let app = test_app(db.clone());
        let uri = format!("/api/cats/{}/", cat.id);

        let (status, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, Method::PATCH, &uri, Some(&token), Some(json!({"name": "Mine"}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body["detail"],
            "You do not have permission to perform this action."
        );

        let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(Cat::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_stranger_gets_forbidden_before_validation() -> Result<()> {
        let (db, _, cat) = setup_with_cat().await?;
        create_test_account(&db, "stranger").await?;
        let token = login_token(&db, "stranger").await?;
        let app = test_app(db.clone());
        let uri = format!("/api/cats/{}/", cat.id);

        let (status, body) = send(&app, Method::PATCH, &uri, Some(&token), Some(json!({"color": "plaid"}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.get("color").is_none());

        let (status, _) = send(&app, Method::PUT, &uri, Some(&token), Some(json!({}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_cat_update_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "owner").await?;
        let token = login_token(&db, "owner").await?;
        let app = test_app(db);

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/api/cats/999/",
            Some(&token),
            Some(json!({"color": "plaid"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Not found.");
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_cat() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "owner").await?;
        let token = login_token(&db, "owner").await?;
        let app = test_app(db);

        let (status, body) = send(&app, Method::GET, "/api/cats/77/", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Not found.");

        let (status, _) = send(&app, Method::GET, "/api/cats/abc/", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }
}
