//! Token authentication extractors.
//!
//! Clients send `Authorization: Token <key>`. Headers using another scheme are
//! treated as absent; a `Token` header with a missing, extra or unknown key is
//! rejected with 401.

use crate::{
    api::AppState,
    core::account,
    entities::account as account_entity,
    errors::Error,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

const SCHEME: &str = "Token";

/// An authenticated caller. Rejects anonymous requests.
#[derive(Debug, Clone)]
pub struct CurrentAccount {
    /// The account the token belongs to
    pub account: account_entity::Model,
    /// The presented token key
    pub token: String,
}

/// A caller allowed to read: authenticated, or anonymous when the
/// configuration opens reads to everyone.
#[derive(Debug, Clone)]
pub struct Reader(pub Option<account_entity::Model>);

/// Any caller. Anonymous requests pass; a presented token must still be valid.
#[derive(Debug, Clone)]
pub struct MaybeAccount(pub Option<account_entity::Model>);

/// Extracts the token key from the `Authorization` header.
///
/// # Errors
/// Returns [`Error::InvalidToken`] for a `Token` header that does not carry
/// exactly one key.
pub fn token_from_parts(parts: &Parts) -> Result<Option<String>, Error> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| Error::InvalidToken)?;

    let mut words = value.split_whitespace();
    match words.next() {
        Some(scheme) if scheme.eq_ignore_ascii_case(SCHEME) => {}
        _ => return Ok(None),
    }
    match (words.next(), words.next()) {
        (Some(key), None) => Ok(Some(key.to_string())),
        _ => Err(Error::InvalidToken),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts)?.ok_or(Error::Unauthorized)?;
        let account = account::authenticate(&state.db, &token).await?;
        Ok(Self { account, token })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Reader {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match token_from_parts(parts)? {
            Some(token) => Ok(Self(Some(account::authenticate(&state.db, &token).await?))),
            None if state.config.api.anonymous_reads => Ok(Self(None)),
            None => Err(Error::Unauthorized),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeAccount {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match token_from_parts(parts)? {
            Some(token) => Ok(Self(Some(account::authenticate(&state.db, &token).await?))),
            None => Ok(Self(None)),
        }
    }
}
