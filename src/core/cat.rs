//! Cat business logic - Owned pet records and their nested achievement writes.
//!
//! Every create, update and delete runs in a single database transaction that
//! covers the cat row, any achievements created on the fly and the link table,
//! so a failure at any step leaves nothing behind. Destructive operations are
//! restricted to the owner or a staff account.

use crate::{
    config::settings::MediaConfig,
    core::{
        achievement, age, color, image,
        representation::CatRepresentation,
        validation::{CatInput, FieldErrors, ImageField, REQUIRED},
    },
    entities::{AchievementCat, Cat, account, achievement_cat, cat},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use std::path::Path;
use tracing::{debug, info, instrument};

/// One page of cats plus the total number of cats.
#[derive(Debug, Clone)]
pub struct CatPage {
    /// Cats on the requested page, ordered by id
    pub cats: Vec<cat::Model>,
    /// Total number of cats across all pages
    pub count: u64,
    /// Number of pages (at least 1)
    pub num_pages: u64,
}

/// Whether `actor` may update or delete `cat`.
#[must_use]
pub fn can_modify(actor: &account::Model, cat: &cat::Model) -> bool {
    actor.is_staff || actor.id == cat.owner_id
}

/// Finds a cat by its unique ID.
pub async fn get_cat_by_id<C: ConnectionTrait>(db: &C, cat_id: i64) -> Result<Option<cat::Model>> {
    Cat::find_by_id(cat_id).one(db).await.map_err(Into::into)
}

/// Loads a cat that `actor` is allowed to update or delete.
///
/// # Errors
/// - [`Error::NotFound`] if the cat does not exist
/// - [`Error::Forbidden`] if `actor` is neither the owner nor staff
pub async fn get_modifiable_cat<C: ConnectionTrait>(
    db: &C,
    actor: &account::Model,
    cat_id: i64,
) -> Result<cat::Model> {
    let cat = get_cat_by_id(db, cat_id)
        .await?
        .ok_or_else(|| Error::not_found("Cat", cat_id))?;
    if !can_modify(actor, &cat) {
        return Err(Error::Forbidden);
    }
    Ok(cat)
}

/// Retrieves the 1-based `page` of cats, ordered by id.
///
/// # Errors
/// Returns [`Error::InvalidPage`] when `page` is 0 or past the last page. An
/// empty table still has one (empty) page.
pub async fn get_cats_page(db: &DatabaseConnection, page: u64, page_size: u64) -> Result<CatPage> {
    let paginator = Cat::find()
        .order_by_asc(cat::Column::Id)
        .paginate(db, page_size.max(1));
    let totals = paginator.num_items_and_pages().await?;
    let num_pages = totals.number_of_pages.max(1);

    if page == 0 || page > num_pages {
        return Err(Error::InvalidPage);
    }

    let cats = paginator.fetch_page(page - 1).await?;
    Ok(CatPage {
        cats,
        count: totals.number_of_items,
        num_pages,
    })
}

/// Creates a cat owned by `owner_id` from a validated payload.
///
/// Achievement names are resolved with get-or-create semantics and become the
/// cat's complete achievement set. A missing color is stored as black.
#[instrument(skip(db, media_root, input))]
pub async fn create_cat(
    db: &DatabaseConnection,
    media_root: &Path,
    owner_id: i64,
    input: CatInput,
) -> Result<cat::Model> {
    let (name, birth_year) = match (input.name, input.birth_year) {
        (Some(name), Some(birth_year)) => (name, birth_year),
        (name, birth_year) => {
            let mut errors = FieldErrors::new();
            if name.is_none() {
                errors.add("name", REQUIRED);
            }
            if birth_year.is_none() {
                errors.add("birth_year", REQUIRED);
            }
            return Err(errors.into());
        }
    };

    let stored_image = match &input.image {
        Some(ImageField::Upload(upload)) => Some(image::store(media_root, upload).await?),
        _ => None,
    };

    let new_cat = cat::ActiveModel {
        name: Set(name),
        color: Set(input.color.unwrap_or_else(|| color::DEFAULT_HEX.to_string())),
        birth_year: Set(birth_year),
        owner_id: Set(owner_id),
        image: Set(stored_image.clone()),
        ..Default::default()
    };
    let achievements = input.achievements.unwrap_or_default();

    let result = async {
        let txn = db.begin().await?;
        let cat = new_cat.insert(&txn).await?;
        let resolved = achievement::resolve_achievements(&txn, &achievements).await?;
        achievement::replace_cat_achievements(&txn, cat.id, &resolved).await?;
        txn.commit().await?;
        Ok::<_, Error>(cat)
    }
    .await;

    match result {
        Ok(cat) => {
            info!("Created cat {} for account {}", cat.id, owner_id);
            Ok(cat)
        }
        Err(e) => {
            if let Some(path) = stored_image {
                image::remove(media_root, &path).await;
            }
            Err(e)
        }
    }
}

/// Applies a validated payload to an existing cat.
///
/// Only fields present in `input` change. A present achievement list replaces
/// the whole set; dropped achievements are unlinked, never deleted.
///
/// # Errors
/// - [`Error::NotFound`] if the cat does not exist
/// - [`Error::Forbidden`] if `actor` is neither the owner nor staff
#[instrument(skip(db, media_root, actor, input), fields(actor = actor.id))]
pub async fn update_cat(
    db: &DatabaseConnection,
    media_root: &Path,
    actor: &account::Model,
    cat_id: i64,
    input: CatInput,
) -> Result<cat::Model> {
    let existing = get_modifiable_cat(db, actor, cat_id).await?;

    let previous_image = existing.image.clone();
    let new_image = match &input.image {
        Some(ImageField::Upload(upload)) => Some(image::store(media_root, upload).await?),
        _ => None,
    };

    let mut changes: cat::ActiveModel = existing.clone().into();
    if let Some(name) = input.name {
        changes.name = Set(name);
    }
    if let Some(hex) = input.color {
        changes.color = Set(hex);
    }
    if let Some(birth_year) = input.birth_year {
        changes.birth_year = Set(birth_year);
    }
    match &input.image {
        Some(ImageField::Upload(_)) => changes.image = Set(new_image.clone()),
        Some(ImageField::Clear) => changes.image = Set(None),
        None => {}
    }
    let achievements = input.achievements;

    let result = async {
        let txn = db.begin().await?;
        let cat = if changes.is_changed() {
            changes.update(&txn).await?
        } else {
            existing
        };
        if let Some(names) = &achievements {
            let resolved = achievement::resolve_achievements(&txn, names).await?;
            achievement::replace_cat_achievements(&txn, cat.id, &resolved).await?;
        }
        txn.commit().await?;
        Ok::<_, Error>(cat)
    }
    .await;

    match result {
        Ok(cat) => {
            if cat.image != previous_image {
                if let Some(old) = previous_image {
                    image::remove(media_root, &old).await;
                }
            }
            debug!("Updated cat {}", cat.id);
            Ok(cat)
        }
        Err(e) => {
            if let Some(path) = new_image {
                image::remove(media_root, &path).await;
            }
            Err(e)
        }
    }
}

/// Deletes a cat and its achievement links; the achievements themselves stay.
///
/// # Errors
/// - [`Error::NotFound`] if the cat does not exist
/// - [`Error::Forbidden`] if `actor` is neither the owner nor staff
#[instrument(skip(db, media_root, actor), fields(actor = actor.id))]
pub async fn delete_cat(
    db: &DatabaseConnection,
    media_root: &Path,
    actor: &account::Model,
    cat_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;

    let cat = get_modifiable_cat(&txn, actor, cat_id).await?;

    AchievementCat::delete_many()
        .filter(achievement_cat::Column::CatId.eq(cat.id))
        .exec(&txn)
        .await?;
    let image = cat.image.clone();
    cat.delete(&txn).await?;
    txn.commit().await?;

    if let Some(path) = image {
        image::remove(media_root, &path).await;
    }
    info!("Deleted cat {}", cat_id);
    Ok(())
}

/// Builds the external representation of one cat.
pub async fn represent_cat<C: ConnectionTrait>(
    db: &C,
    cat: cat::Model,
    media: &MediaConfig,
) -> Result<CatRepresentation> {
    let achievements = achievement::achievements_for_cat(db, cat.id).await?;
    Ok(CatRepresentation::build(
        cat,
        achievements,
        media,
        age::current_year(),
    ))
}

/// Builds external representations for several cats with one link query.
pub async fn represent_cats<C: ConnectionTrait>(
    db: &C,
    cats: Vec<cat::Model>,
    media: &MediaConfig,
) -> Result<Vec<CatRepresentation>> {
    let ids: Vec<i64> = cats.iter().map(|c| c.id).collect();
    let mut by_cat = achievement::achievements_for_cats(db, &ids).await?;
    let current_year = age::current_year();
    Ok(cats
        .into_iter()
        .map(|cat| {
            let achievements = by_cat.remove(&cat.id).unwrap_or_default();
            CatRepresentation::build(cat, achievements, media, current_year)
        })
        .collect())
}
