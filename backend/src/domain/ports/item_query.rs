//! Driving port for catalogue reads.
use async_trait::async_trait;

use crate::domain::{Error, Item, ItemFilter, ItemId, UserId};

/// Domain use-case port for item lookups and listings.
#[async_trait]
pub trait ItemQuery: Send + Sync {
    /// Fetch a single item.
    async fn get_item(&self, item_id: &ItemId) -> Result<Item, Error>;

    /// List every item matching `filter`.
    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, Error>;

    /// List the items of one owner, failing with `not_found` for unknown users.
    async fn list_items_owned_by(
        &self,
        owner: &UserId,
        filter: &ItemFilter,
    ) -> Result<Vec<Item>, Error>;
}
