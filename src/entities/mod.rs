//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod account;
pub mod achievement;
pub mod achievement_cat;
pub mod auth_token;
pub mod cat;

// Re-export specific types to avoid conflicts
pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel};
pub use achievement::{
    Column as AchievementColumn, Entity as Achievement, Model as AchievementModel,
};
pub use achievement_cat::{
    Column as AchievementCatColumn, Entity as AchievementCat, Model as AchievementCatModel,
};
pub use auth_token::{Column as AuthTokenColumn, Entity as AuthToken, Model as AuthTokenModel};
pub use cat::{Column as CatColumn, Entity as Cat, Model as CatModel};
