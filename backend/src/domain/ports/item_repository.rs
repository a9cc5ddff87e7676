//! Driven port for catalogue item persistence.
//!
//! Owner-initiated mutations are conditioned on the expected owner so they
//! cannot overwrite a concurrent trade.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Item, ItemFilter, ItemId, ItemPatch, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by item repository adapters.
    pub enum ItemRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "item repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "item repository query failed: {message}",
    }
}

/// Storage for catalogue items.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Insert a new item.
    async fn insert(&self, item: &Item) -> Result<(), ItemRepositoryError>;

    /// Fetch an item by identifier.
    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>, ItemRepositoryError>;

    /// Fetch every item whose id is listed. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[ItemId]) -> Result<Vec<Item>, ItemRepositoryError>;

    /// List items matching `filter`, optionally scoped to one owner.
    async fn list(
        &self,
        filter: &ItemFilter,
        owner: Option<UserId>,
    ) -> Result<Vec<Item>, ItemRepositoryError>;

    /// Apply `patch` when the item is still owned by `owner`.
    ///
    /// Returns `Ok(None)` when no row matched the id and owner.
    async fn update_owned(
        &self,
        id: &ItemId,
        owner: &UserId,
        patch: &ItemPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Item>, ItemRepositoryError>;

    /// Delete the item when it is still owned by `owner`.
    ///
    /// Returns whether a row was removed.
    async fn delete_owned(&self, id: &ItemId, owner: &UserId) -> Result<bool, ItemRepositoryError>;
}
