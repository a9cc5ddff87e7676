//! PostgreSQL-backed `ItemRepository` implementation using Diesel ORM.
//!
//! Owner-initiated writes filter on both the item id and the expected owner,
//! so an update racing an accepted trade touches zero rows instead of
//! overwriting the new owner's item.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ItemRepository, ItemRepositoryError};
use crate::domain::{Item, ItemFilter, ItemId, ItemPatch, UserId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{ItemChangeset, ItemRow, NewItemRow};
use super::pool::{DbPool, PoolError};
use super::schema::items;

/// Diesel-backed implementation of the `ItemRepository` port.
#[derive(Clone)]
pub struct DieselItemRepository {
    pool: DbPool,
}

impl DieselItemRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ItemRepositoryError {
    ItemRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error, operation: &'static str) -> ItemRepositoryError {
    match classify_diesel_error(&error, operation) {
        DieselFailure::Connection(message) => ItemRepositoryError::connection(message),
        DieselFailure::Query(message) => ItemRepositoryError::query(message),
        DieselFailure::UniqueViolation(_) => ItemRepositoryError::query("unique constraint violated"),
        DieselFailure::Contention => ItemRepositoryError::query("transaction aborted"),
    }
}

fn to_items(rows: Vec<ItemRow>) -> Result<Vec<Item>, ItemRepositoryError> {
    rows.into_iter()
        .map(Item::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ItemRepositoryError::query)
}

/// Escape `%`, `_` and the escape character itself for a `LIKE` pattern.
fn like_contains(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl ItemRepository for DieselItemRepository {
    async fn insert(&self, item: &Item) -> Result<(), ItemRepositoryError> {
        let row = NewItemRow::try_from(item).map_err(ItemRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(items::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "insert item"))
    }

    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>, ItemRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ItemRow> = items::table
            .filter(items::id.eq(id.as_uuid()))
            .select(ItemRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find item"))?;

        row.map(Item::try_from)
            .transpose()
            .map_err(ItemRepositoryError::query)
    }

    async fn find_by_ids(&self, ids: &[ItemId]) -> Result<Vec<Item>, ItemRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<ItemRow> = items::table
            .filter(items::id.eq_any(uuids))
            .select(ItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "find items by ids"))?;

        to_items(rows)
    }

    async fn list(
        &self,
        filter: &ItemFilter,
        owner: Option<UserId>,
    ) -> Result<Vec<Item>, ItemRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = items::table
            .select(ItemRow::as_select())
            .order_by((items::created_at.asc(), items::id.asc()))
            .into_boxed();
        if let Some(owner_id) = owner {
            query = query.filter(items::owner_id.eq(*owner_id.as_uuid()));
        }
        if let Some(name) = filter.name() {
            query = query.filter(items::name.like(like_contains(name)).escape('\\'));
        }
        if let Some(system) = filter.system() {
            query = query.filter(items::system.eq(system.to_owned()));
        }

        let rows: Vec<ItemRow> = query
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list items"))?;

        to_items(rows)
    }

    async fn update_owned(
        &self,
        id: &ItemId,
        owner: &UserId,
        patch: &ItemPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Item>, ItemRepositoryError> {
        let changeset = ItemChangeset::from_patch(patch, now).map_err(ItemRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ItemRow> = diesel::update(
            items::table
                .filter(items::id.eq(id.as_uuid()))
                .filter(items::owner_id.eq(owner.as_uuid())),
        )
        .set(&changeset)
        .returning(ItemRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, "update owned item"))?;

        row.map(Item::try_from)
            .transpose()
            .map_err(ItemRepositoryError::query)
    }

    async fn delete_owned(&self, id: &ItemId, owner: &UserId) -> Result<bool, ItemRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            items::table
                .filter(items::id.eq(id.as_uuid()))
                .filter(items::owner_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, "delete owned item"))?;

        Ok(deleted > 0)
    }
}
