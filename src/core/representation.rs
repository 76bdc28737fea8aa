//! External representations of stored records.
//!
//! The stored attribute names stay stable; the renames clients see
//! (`name` -> `achievement_name`, `owner_id` -> `owner`, hex -> color name,
//! `birth_year` -> derived `age`) all happen here and nowhere else.

use crate::{
    config::settings::MediaConfig,
    core::{age, color, image},
    entities::{achievement, cat},
};
use serde::{Deserialize, Serialize};

/// An achievement as sent to clients, standalone or nested in a cat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementRepresentation {
    pub id: i64,
    #[serde(rename = "achievement_name")]
    pub name: String,
}

impl From<achievement::Model> for AchievementRepresentation {
    fn from(model: achievement::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// A cat as sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatRepresentation {
    pub id: i64,
    pub name: String,
    /// Palette name, or the raw hex code when it has no name
    pub color: String,
    pub birth_year: i32,
    pub achievements: Vec<AchievementRepresentation>,
    /// Owning account id
    pub owner: i64,
    /// Years since `birth_year`, computed at serialization time
    pub age: i64,
    pub image: Option<String>,
    pub image_url: Option<String>,
}

impl CatRepresentation {
    /// Builds the representation as of `current_year`.
    #[must_use]
    pub fn build(
        model: cat::Model,
        achievements: Vec<achievement::Model>,
        media: &MediaConfig,
        current_year: i32,
    ) -> Self {
        let image = model
            .image
            .as_deref()
            .map(|path| image::media_url(media, path));
        let image_url = model
            .image
            .as_deref()
            .map(|path| image::public_url(media, path));

        Self {
            id: model.id,
            color: color::display_name(&model.color),
            age: age::age_in(current_year, model.birth_year),
            name: model.name,
            birth_year: model.birth_year,
            achievements: achievements.into_iter().map(Into::into).collect(),
            owner: model.owner_id,
            image,
            image_url,
        }
    }
}
