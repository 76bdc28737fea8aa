//! Link entity - One achievement-to-cat association.
//!
//! Rows go away with either side. Duplicate pairs are not rejected at the
//! storage level; the resolver never writes them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Achievement link database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "achievement_cats")]
pub struct Model {
    /// Unique identifier for the link
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Linked achievement
    pub achievement_id: i64,
    /// Linked cat
    pub cat_id: i64,
}

/// Defines relationships between a link and the rows it joins
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each link points at one achievement
    #[sea_orm(
        belongs_to = "super::achievement::Entity",
        from = "Column::AchievementId",
        to = "super::achievement::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Achievement,
    /// Each link points at one cat
    #[sea_orm(
        belongs_to = "super::cat::Entity",
        from = "Column::CatId",
        to = "super::cat::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Cat,
}

impl Related<super::achievement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Achievement.def()
    }
}

impl Related<super::cat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cat.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
