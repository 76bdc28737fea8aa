//! Account entity - An authenticated user of the API.
//!
//! Accounts own cats and hold API tokens. Deleting an account cascades to both.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique across accounts
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 PHC string, never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Staff accounts may modify cats they do not own
    pub is_staff: bool,
    /// When the account was registered
    pub date_joined: DateTimeUtc,
}

/// Defines relationships between Account and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One account owns many cats
    #[sea_orm(has_many = "super::cat::Entity")]
    Cats,
    /// One account has at most one token in practice
    #[sea_orm(has_many = "super::auth_token::Entity")]
    AuthTokens,
}

impl Related<super::cat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cats.def()
    }
}

impl Related<super::auth_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthTokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
