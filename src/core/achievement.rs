//! Achievement business logic - The shared badge catalog and cat links.
//!
//! Besides plain catalog CRUD this module resolves achievement names coming in
//! with a cat payload: each name is looked up and created when missing, then
//! the cat's link set is replaced. Callers run the resolution and the link
//! replacement on the same transaction as the cat write so that a failed save
//! leaves no achievements behind.

use crate::{
    config::settings::AchievementSeed,
    core::validation::{BLANK, FieldErrors},
    entities::{Achievement, AchievementCat, achievement, achievement_cat},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info};

/// Retrieves every achievement, oldest first.
pub async fn list_achievements<C: ConnectionTrait>(db: &C) -> Result<Vec<achievement::Model>> {
    Achievement::find()
        .order_by_asc(achievement::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an achievement by its unique ID.
pub async fn get_achievement_by_id<C: ConnectionTrait>(
    db: &C,
    achievement_id: i64,
) -> Result<Option<achievement::Model>> {
    Achievement::find_by_id(achievement_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the oldest achievement with exactly this name.
pub async fn get_achievement_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<achievement::Model>> {
    Achievement::find()
        .filter(achievement::Column::Name.eq(name))
        .order_by_asc(achievement::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

fn clean_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FieldErrors::single("name", BLANK).into());
    }
    Ok(trimmed.to_string())
}

/// Creates a new achievement. Names are trimmed and must not be blank.
pub async fn create_achievement<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<achievement::Model> {
    let achievement = achievement::ActiveModel {
        name: Set(clean_name(name)?),
        ..Default::default()
    };
    achievement.insert(db).await.map_err(Into::into)
}

/// Renames an existing achievement.
pub async fn rename_achievement<C: ConnectionTrait>(
    db: &C,
    achievement_id: i64,
    new_name: &str,
) -> Result<achievement::Model> {
    let name = clean_name(new_name)?;
    let mut achievement: achievement::ActiveModel = get_achievement_by_id(db, achievement_id)
        .await?
        .ok_or_else(|| Error::not_found("Achievement", achievement_id))?
        .into();
    achievement.name = Set(name);
    achievement.update(db).await.map_err(Into::into)
}

/// Deletes an achievement together with all of its cat links.
///
/// Linked cats are left untouched.
pub async fn delete_achievement(db: &DatabaseConnection, achievement_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let achievement = get_achievement_by_id(&txn, achievement_id)
        .await?
        .ok_or_else(|| Error::not_found("Achievement", achievement_id))?;

    let unlinked = AchievementCat::delete_many()
        .filter(achievement_cat::Column::AchievementId.eq(achievement.id))
        .exec(&txn)
        .await?;
    achievement.delete(&txn).await?;

    txn.commit().await?;
    debug!(
        "Deleted achievement {} and {} links",
        achievement_id, unlinked.rows_affected
    );
    Ok(())
}

/// Returns the achievement named `name`, creating it if needed.
///
/// The flag is `true` when a new row was inserted.
pub async fn get_or_create_achievement<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<(achievement::Model, bool)> {
    let name = clean_name(name)?;
    if let Some(existing) = get_achievement_by_name(db, &name).await? {
        return Ok((existing, false));
    }
    let created = create_achievement(db, &name).await?;
    Ok((created, true))
}

/// Resolves every name to an achievement row, creating the missing ones.
///
/// Output order follows `names`; repeated names resolve to the same row once.
pub async fn resolve_achievements<C: ConnectionTrait>(
    db: &C,
    names: &[String],
) -> Result<Vec<achievement::Model>> {
    let mut resolved: Vec<achievement::Model> = Vec::with_capacity(names.len());
    for name in names {
        let (achievement, created) = get_or_create_achievement(db, name).await?;
        if created {
            debug!("Created achievement {:?} while resolving", achievement.name);
        }
        if !resolved.iter().any(|a| a.id == achievement.id) {
            resolved.push(achievement);
        }
    }
    Ok(resolved)
}

/// Makes `achievements` the complete link set of a cat.
///
/// Links to achievements not in the new set are removed (the achievement rows
/// stay); missing links are added in the given order.
pub async fn replace_cat_achievements<C: ConnectionTrait>(
    db: &C,
    cat_id: i64,
    achievements: &[achievement::Model],
) -> Result<()> {
    let existing = AchievementCat::find()
        .filter(achievement_cat::Column::CatId.eq(cat_id))
        .all(db)
        .await?;

    let wanted: Vec<i64> = achievements.iter().map(|a| a.id).collect();
    let stale: Vec<i64> = existing
        .iter()
        .filter(|link| !wanted.contains(&link.achievement_id))
        .map(|link| link.id)
        .collect();

    if !stale.is_empty() {
        AchievementCat::delete_many()
            .filter(achievement_cat::Column::Id.is_in(stale))
            .exec(db)
            .await?;
    }

    for achievement_id in wanted {
        if existing.iter().any(|link| link.achievement_id == achievement_id) {
            continue;
        }
        achievement_cat::ActiveModel {
            achievement_id: Set(achievement_id),
            cat_id: Set(cat_id),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Achievements linked to one cat, in link order.
pub async fn achievements_for_cat<C: ConnectionTrait>(
    db: &C,
    cat_id: i64,
) -> Result<Vec<achievement::Model>> {
    let mut by_cat = achievements_for_cats(db, &[cat_id]).await?;
    Ok(by_cat.remove(&cat_id).unwrap_or_default())
}

/// Achievements linked to each of `cat_ids`, in link order.
///
/// Cats without links are absent from the map.
pub async fn achievements_for_cats<C: ConnectionTrait>(
    db: &C,
    cat_ids: &[i64],
) -> Result<HashMap<i64, Vec<achievement::Model>>> {
    let mut by_cat: HashMap<i64, Vec<achievement::Model>> = HashMap::new();
    if cat_ids.is_empty() {
        return Ok(by_cat);
    }

    let rows = AchievementCat::find()
        .filter(achievement_cat::Column::CatId.is_in(cat_ids.iter().copied()))
        .order_by_asc(achievement_cat::Column::Id)
        .find_also_related(Achievement)
        .all(db)
        .await?;

    for (link, achievement) in rows {
        if let Some(achievement) = achievement {
            by_cat.entry(link.cat_id).or_default().push(achievement);
        }
    }
    Ok(by_cat)
}

/// Get-or-creates the achievements listed in config.toml.
///
/// Returns how many were newly created.
pub async fn seed_achievements(db: &DatabaseConnection, seeds: &[AchievementSeed]) -> Result<usize> {
    let txn = db.begin().await?;
    let mut created_count = 0;
    for seed in seeds {
        let (_, created) = get_or_create_achievement(&txn, &seed.name).await?;
        if created {
            created_count += 1;
        }
    }
    txn.commit().await?;
    info!("Seeded {created_count} new achievements");
    Ok(created_count)
}
