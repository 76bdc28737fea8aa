//! Achievement entity - A named badge from the shared catalog.
//!
//! Achievements are independent of cats. They are attached to cats through the
//! `achievement_cats` link table and are never deleted when a cat goes away.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Achievement database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "achievements")]
pub struct Model {
    /// Unique identifier for the achievement
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Badge name (e.g., "Caught a mouse"); exposed as `achievement_name` over HTTP
    pub name: String,
}

/// Defines relationships between Achievement and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One achievement has many cat links
    #[sea_orm(has_many = "super::achievement_cat::Entity")]
    Links,
}

impl Related<super::achievement_cat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Links.def()
    }
}

impl Related<super::cat::Entity> for Entity {
    fn to() -> RelationDef {
        super::achievement_cat::Relation::Cat.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::achievement_cat::Relation::Achievement.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
