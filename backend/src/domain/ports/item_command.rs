//! Driving port for owner-initiated item changes.
use async_trait::async_trait;

use crate::domain::{Error, Item, ItemDraft, ItemId, ItemPatch, UserId};

/// Domain use-case port for creating, editing and removing items.
#[async_trait]
pub trait ItemCommand: Send + Sync {
    /// Create an item owned by `owner`.
    async fn create_item(&self, owner: &UserId, draft: ItemDraft) -> Result<Item, Error>;

    /// Merge `patch` into an item the caller owns.
    async fn update_item(
        &self,
        item_id: &ItemId,
        caller: &UserId,
        patch: &ItemPatch,
    ) -> Result<Item, Error>;

    /// Delete an item the caller owns.
    async fn delete_item(&self, item_id: &ItemId, caller: &UserId) -> Result<(), Error>;
}
