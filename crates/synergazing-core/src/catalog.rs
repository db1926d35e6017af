//! Find-or-create lookups for the skill, tag, benefit, and timeline catalogs
//!
//! Catalog rows are unique by a normalized key (trimmed, lowercased name), so
//! "Rust", " rust" and "RUST" all resolve to the row created first. The name
//! as first submitted is kept for display.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use synergazing_db::entities::{benefit, skill, tag, timeline};
use tracing::debug;
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{ServiceError, ServiceResult};

/// A resolved catalog row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CatalogEntry {
    pub id: Uuid,
    pub name: String,
}

/// Lookup key for a catalog name, `None` for blank input
pub fn catalog_key(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// A table that behaves as a find-or-create catalog
pub trait CatalogEntity: EntityTrait {
    type Active: ActiveModelTrait<Entity = Self> + ActiveModelBehavior + Send;

    /// Human-readable catalog name for error messages
    const LABEL: &'static str;

    fn key_column() -> Self::Column;

    fn name_column() -> Self::Column;

    fn to_entry(model: Self::Model) -> CatalogEntry;

    fn new_row(entry: &CatalogEntry, key: &str) -> Self::Active;
}

macro_rules! catalog_entity {
    ($module:ident, $label:literal) => {
        impl CatalogEntity for $module::Entity {
            type Active = $module::ActiveModel;

            const LABEL: &'static str = $label;

            fn key_column() -> Self::Column {
                $module::Column::NameKey
            }

            fn name_column() -> Self::Column {
                $module::Column::Name
            }

            fn to_entry(model: $module::Model) -> CatalogEntry {
                CatalogEntry {
                    id: model.id,
                    name: model.name,
                }
            }

            fn new_row(entry: &CatalogEntry, key: &str) -> $module::ActiveModel {
                let now = Utc::now();
                $module::ActiveModel {
                    id: Set(entry.id),
                    name: Set(entry.name.clone()),
                    name_key: Set(key.to_string()),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
            }
        }
    };
}

catalog_entity!(skill, "Skill");
catalog_entity!(tag, "Tag");
catalog_entity!(benefit, "Benefit");
catalog_entity!(timeline, "Timeline");

/// Return the catalog row for `name`, creating it on first reference
pub async fn find_or_create<E, C>(conn: &C, name: &str) -> ServiceResult<CatalogEntry>
where
    E: CatalogEntity,
    E::Model: IntoActiveModel<E::Active>,
    C: ConnectionTrait,
{
    let key = catalog_key(name)
        .ok_or_else(|| ServiceError::validation(format!("{} name cannot be empty", E::LABEL)))?;

    if let Some(existing) = find_by_key::<E, C>(conn, &key).await? {
        return Ok(E::to_entry(existing));
    }

    let entry = CatalogEntry {
        id: Uuid::new_v4(),
        name: name.trim().to_string(),
    };
    insert_or_fetch::<E, C>(conn, entry, &key).await
}

/// Insert `entry` under `key`. A concurrent writer may create the same key
/// between the lookup and the insert; the unique index turns that into a
/// no-op and the existing row is read back.
async fn insert_or_fetch<E, C>(conn: &C, entry: CatalogEntry, key: &str) -> ServiceResult<CatalogEntry>
where
    E: CatalogEntity,
    E::Model: IntoActiveModel<E::Active>,
    C: ConnectionTrait,
{
    let inserted = E::insert(E::new_row(&entry, key))
        .on_conflict(OnConflict::column(E::key_column()).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await?;

    if inserted > 0 {
        debug!("Created {} catalog entry '{}'", E::LABEL, entry.name);
        return Ok(entry);
    }

    let existing = find_by_key::<E, C>(conn, key).await?.ok_or_else(|| {
        ServiceError::Internal(format!("{} '{}' vanished after insert", E::LABEL, key))
    })?;
    debug!("Reused concurrently created {} catalog entry '{}'", E::LABEL, key);
    Ok(E::to_entry(existing))
}

async fn find_by_key<E, C>(conn: &C, key: &str) -> ServiceResult<Option<E::Model>>
where
    E: CatalogEntity,
    C: ConnectionTrait,
{
    Ok(E::find()
        .filter(E::key_column().eq(key))
        .one(conn)
        .await?)
}

/// Resolve a list of names, skipping blanks and case-insensitive duplicates.
/// Order of first appearance is kept.
pub async fn find_or_create_all<E, C>(conn: &C, names: &[String]) -> ServiceResult<Vec<CatalogEntry>>
where
    E: CatalogEntity,
    E::Model: IntoActiveModel<E::Active>,
    C: ConnectionTrait,
{
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for name in names {
        let Some(key) = catalog_key(name) else {
            continue;
        };
        if !seen.insert(key) {
            continue;
        }
        entries.push(find_or_create::<E, C>(conn, name).await?);
    }

    Ok(entries)
}

/// Every row of one catalog, alphabetically
pub async fn list_all<E, C>(conn: &C) -> ServiceResult<Vec<CatalogEntry>>
where
    E: CatalogEntity,
    C: ConnectionTrait,
{
    let rows = E::find().order_by_asc(E::name_column()).all(conn).await?;
    Ok(rows.into_iter().map(E::to_entry).collect())
}
