//! Cat entity - A pet record owned by exactly one account.
//!
//! The color is stored as a lowercase `#rrggbb` hex code; the HTTP layer
//! exchanges a human-readable name instead. Age is never stored.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cat database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cats")]
pub struct Model {
    /// Unique identifier for the cat
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Cat name (e.g., "Murzik")
    pub name: String,
    /// Seven-character hex code, e.g. `#000000`
    pub color: String,
    /// Year of birth; age is derived from it on read
    pub birth_year: i32,
    /// Owning account
    pub owner_id: i64,
    /// Path of the uploaded image relative to the media root
    pub image: Option<String>,
}

/// Defines relationships between Cat and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each cat belongs to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::OwnerId",
        to = "super::account::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Owner,
    /// One cat has many achievement links
    #[sea_orm(has_many = "super::achievement_cat::Entity")]
    Links,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::achievement_cat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Links.def()
    }
}

impl Related<super::achievement::Entity> for Entity {
    fn to() -> RelationDef {
        super::achievement_cat::Relation::Achievement.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::achievement_cat::Relation::Cat.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
