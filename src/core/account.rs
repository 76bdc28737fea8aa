//! Account business logic - Registration, token login and authentication.
//!
//! Passwords are stored as Argon2 PHC strings. Each account holds at most one
//! opaque API token, issued on login and revoked on logout.

use crate::{
    config::admin::AdminCredentials,
    core::validation::FieldErrors,
    entities::{Account, AchievementCat, AuthToken, Cat, account, achievement_cat, auth_token, cat},
    errors::{Error, Result},
};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use sea_orm::{QuerySelect, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// Message for a username that is already registered.
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// Hashes a password into an Argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal {
            message: format!("Failed to hash password: {e}"),
        })
}

/// Checks a password against a stored PHC string.
///
/// Unparseable hashes never verify.
#[must_use]
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    PasswordHash::new(stored_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Finds an account by its unique ID.
pub async fn get_account_by_id<C: ConnectionTrait>(
    db: &C,
    account_id: i64,
) -> Result<Option<account::Model>> {
    Account::find_by_id(account_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an account by username.
pub async fn get_account_by_username<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> Result<Option<account::Model>> {
    Account::find()
        .filter(account::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Registers a new account.
///
/// # Errors
/// Returns a validation error on `username` if the name is taken.
#[instrument(skip(db, password))]
pub async fn register_account<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
    is_staff: bool,
) -> Result<account::Model> {
    if get_account_by_username(db, username).await?.is_some() {
        return Err(FieldErrors::single("username", USERNAME_TAKEN).into());
    }

    let account = account::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(hash_password(password)?),
        is_staff: Set(is_staff),
        date_joined: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let account = account.insert(db).await?;
    info!("Registered account {} ({})", account.username, account.id);
    Ok(account)
}

/// Exchanges credentials for the account's API token.
///
/// An existing token is returned as-is; otherwise a new one is issued.
#[instrument(skip(db, password))]
pub async fn login(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<auth_token::Model> {
    let account = get_account_by_username(db, username)
        .await?
        .filter(|account| verify_password(&account.password_hash, password))
        .ok_or_else(|| {
            warn!("Failed login for {username}");
            Error::InvalidCredentials
        })?;

    if let Some(token) = AuthToken::find()
        .filter(auth_token::Column::AccountId.eq(account.id))
        .one(db)
        .await?
    {
        return Ok(token);
    }

    let token = auth_token::ActiveModel {
        key: Set(uuid::Uuid::new_v4().simple().to_string()),
        account_id: Set(account.id),
        created: Set(chrono::Utc::now()),
    };
    token.insert(db).await.map_err(Into::into)
}

/// Revokes a token.
pub async fn logout(db: &DatabaseConnection, key: &str) -> Result<()> {
    AuthToken::delete_by_id(key.to_string()).exec(db).await?;
    Ok(())
}

/// Resolves a presented token to its account.
///
/// # Errors
/// Returns [`Error::InvalidToken`] for unknown keys.
pub async fn authenticate(db: &DatabaseConnection, key: &str) -> Result<account::Model> {
    AuthToken::find_by_id(key.to_string())
        .find_also_related(Account)
        .one(db)
        .await?
        .and_then(|(_, account)| account)
        .ok_or(Error::InvalidToken)
}

/// Deletes an account with its tokens, its cats and their achievement links.
///
/// Returns the image paths of the deleted cats so the caller can remove the files.
#[instrument(skip(db))]
pub async fn delete_account(db: &DatabaseConnection, account_id: i64) -> Result<Vec<String>> {
    let txn = db.begin().await?;

    let account = get_account_by_id(&txn, account_id)
        .await?
        .ok_or_else(|| Error::not_found("Account", account_id))?;

    let owned: Vec<(i64, Option<String>)> = Cat::find()
        .select_only()
        .column(cat::Column::Id)
        .column(cat::Column::Image)
        .filter(cat::Column::OwnerId.eq(account_id))
        .into_tuple()
        .all(&txn)
        .await?;
    let cat_ids: Vec<i64> = owned.iter().map(|(id, _)| *id).collect();

    if !cat_ids.is_empty() {
        AchievementCat::delete_many()
            .filter(achievement_cat::Column::CatId.is_in(cat_ids.iter().copied()))
            .exec(&txn)
            .await?;
        Cat::delete_many()
            .filter(cat::Column::Id.is_in(cat_ids.iter().copied()))
            .exec(&txn)
            .await?;
    }
    AuthToken::delete_many()
        .filter(auth_token::Column::AccountId.eq(account_id))
        .exec(&txn)
        .await?;
    account.delete(&txn).await?;

    txn.commit().await?;
    info!("Deleted account {} and {} cats", account_id, cat_ids.len());
    Ok(owned.into_iter().filter_map(|(_, image)| image).collect())
}

/// Creates the configured staff account, or promotes and re-keys an existing one.
pub async fn ensure_staff_account(
    db: &DatabaseConnection,
    credentials: &AdminCredentials,
) -> Result<account::Model> {
    match get_account_by_username(db, &credentials.username).await? {
        Some(existing) => {
            let mut account: account::ActiveModel = existing.into();
            account.is_staff = Set(true);
            account.password_hash = Set(hash_password(&credentials.password)?);
            let account = account.update(db).await?;
            info!("Staff account {} is up to date", account.username);
            Ok(account)
        }
        None => register_account(db, &credentials.username, &credentials.password, true).await,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::PaginatorTrait;

    #[test]
    fn test_password_hash_round_trip() -> Result<()> {
        let hash = hash_password("supersecret123")?;
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "supersecret123"));
        assert!(!verify_password(&hash, "wrong"));
        assert!(!verify_password("not a hash", "supersecret123"));
        Ok(())
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_username() -> Result<()> {
        let db = setup_test_db().await?;

        register_account(&db, "testowner", "12345678", false).await?;
        let result = register_account(&db, "testowner", "87654321", false).await;

        match result {
            Err(Error::Validation(errors)) => assert!(errors.contains("username")),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(Account::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_login_issues_and_reuses_token() -> Result<()> {
        let db = setup_test_db().await?;
        let account = register_account(&db, "achiever", "supersecret123", false).await?;

        let first = login(&db, "achiever", "supersecret123").await?;
        let second = login(&db, "achiever", "supersecret123").await?;
        assert_eq!(first.key, second.key);
        assert_eq!(first.key.len(), 32);

        let resolved = authenticate(&db, &first.key).await?;
        assert_eq!(resolved.id, account.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_login_with_bad_credentials() -> Result<()> {
        let db = setup_test_db().await?;
        register_account(&db, "achiever", "supersecret123", false).await?;

        let result = login(&db, "achiever", "wrong password").await;
        assert!(matches!(result, Err(Error::InvalidCredentials)));

        let result = login(&db, "nobody", "supersecret123").await;
        assert!(matches!(result, Err(Error::InvalidCredentials)));
        Ok(())
    }

    #[tokio::test]
    async fn test_logout_revokes_token() -> Result<()> {
        let db = setup_test_db().await?;
        register_account(&db, "achiever", "supersecret123", false).await?;
        let token = login(&db, "achiever", "supersecret123").await?;

        logout(&db, &token.key).await?;

        let result = authenticate(&db, &token.key).await;
        assert!(matches!(result, Err(Error::InvalidToken)));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_account_cascades_to_cats() -> Result<()> {
        let (db, owner, cat) = setup_with_cat().await?;
        let achievement = crate::core::achievement::create_achievement(&db, "Jumper").await?;
        crate::core::achievement::replace_cat_achievements(
            &db,
            cat.id,
            std::slice::from_ref(&achievement),
        )
        .await?;
        login(&db, &owner.username, TEST_PASSWORD).await?;

        let images = delete_account(&db, owner.id).await?;

        assert!(images.is_empty());
        assert_eq!(Cat::find().count(&db).await?, 0);
        assert_eq!(AchievementCat::find().count(&db).await?, 0);
        assert_eq!(AuthToken::find().count(&db).await?, 0);
        assert_eq!(crate::entities::Achievement::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_staff_account_promotes() -> Result<()> {
        let db = setup_test_db().await?;
        register_account(&db, "admin", "old password", false).await?;

        let credentials = AdminCredentials {
            username: "admin".to_string(),
            password: "adminpass".to_string(),
        };
        let account = ensure_staff_account(&db, &credentials).await?;

        assert!(account.is_staff);
        assert!(verify_password(&account.password_hash, "adminpass"));
        assert_eq!(Account::find().count(&db).await?, 1);
        Ok(())
    }
}
