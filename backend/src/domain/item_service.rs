//! Item catalogue domain service.
//!
//! Owner checks happen twice: once against the item as read, and again in the
//! repository, which only writes when the stored owner still matches. The
//! second check closes the window in which an accepted trade could move the
//! item between the read and the write.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::identity_service::map_user_persistence_error;
use crate::domain::ports::{
    ItemCommand, ItemQuery, ItemRepository, ItemRepositoryError, UserRepository,
};
use crate::domain::{Error, Item, ItemDraft, ItemFilter, ItemId, ItemPatch, UserId};

pub(crate) const ITEM_NOT_FOUND: &str = "Item not found";
const NOT_ITEM_OWNER: &str = "Not item owner";

/// Catalogue service implementing the item driving ports.
#[derive(Clone)]
pub struct ItemCatalogueService<I, U> {
    items: Arc<I>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<I, U> ItemCatalogueService<I, U> {
    /// Create a service over the given repositories.
    pub fn new(items: Arc<I>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            items,
            users,
            clock,
        }
    }
}

pub(crate) fn map_item_repository_error(error: ItemRepositoryError) -> Error {
    match error {
        ItemRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("item repository unavailable: {message}"))
        }
        ItemRepositoryError::Query { message } => {
            Error::internal(format!("item repository error: {message}"))
        }
    }
}

impl<I, U> ItemCatalogueService<I, U>
where
    I: ItemRepository,
    U: UserRepository,
{
    async fn owned_item(&self, item_id: &ItemId, caller: &UserId) -> Result<Item, Error> {
        let item = self.get_item(item_id).await?;
        if item.owner_id != *caller {
            return Err(Error::forbidden(NOT_ITEM_OWNER));
        }
        Ok(item)
    }

    /// Explain why an owner-conditioned write touched nothing.
    async fn lost_ownership(&self, item_id: &ItemId) -> Error {
        match self.items.find_by_id(item_id).await {
            Ok(Some(_)) => Error::forbidden(NOT_ITEM_OWNER),
            Ok(None) => Error::not_found(ITEM_NOT_FOUND),
            Err(err) => map_item_repository_error(err),
        }
    }
}

#[async_trait]
impl<I, U> ItemQuery for ItemCatalogueService<I, U>
where
    I: ItemRepository,
    U: UserRepository,
{
    async fn get_item(&self, item_id: &ItemId) -> Result<Item, Error> {
        self.items
            .find_by_id(item_id)
            .await
            .map_err(map_item_repository_error)?
            .ok_or_else(|| Error::not_found(ITEM_NOT_FOUND))
    }

    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, Error> {
        self.items
            .list(filter, None)
            .await
            .map_err(map_item_repository_error)
    }

    async fn list_items_owned_by(
        &self,
        owner: &UserId,
        filter: &ItemFilter,
    ) -> Result<Vec<Item>, Error> {
        let user = self
            .users
            .find_by_id(owner)
            .await
            .map_err(map_user_persistence_error)?;
        if user.is_none() {
            return Err(Error::not_found("User not found"));
        }
        self.items
            .list(filter, Some(*owner))
            .await
            .map_err(map_item_repository_error)
    }
}

#[async_trait]
impl<I, U> ItemCommand for ItemCatalogueService<I, U>
where
    I: ItemRepository,
    U: UserRepository,
{
    async fn create_item(&self, owner: &UserId, draft: ItemDraft) -> Result<Item, Error> {
        let item = draft.into_item(ItemId::random(), *owner, self.clock.utc());
        self.items
            .insert(&item)
            .await
            .map_err(map_item_repository_error)?;
        Ok(item)
    }

    async fn update_item(
        &self,
        item_id: &ItemId,
        caller: &UserId,
        patch: &ItemPatch,
    ) -> Result<Item, Error> {
        self.owned_item(item_id, caller).await?;
        let updated = self
            .items
            .update_owned(item_id, caller, patch, self.clock.utc())
            .await
            .map_err(map_item_repository_error)?;
        match updated {
            Some(item) => Ok(item),
            None => Err(self.lost_ownership(item_id).await),
        }
    }

    async fn delete_item(&self, item_id: &ItemId, caller: &UserId) -> Result<(), Error> {
        self.owned_item(item_id, caller).await?;
        let deleted = self
            .items
            .delete_owned(item_id, caller)
            .await
            .map_err(map_item_repository_error)?;
        if deleted {
            Ok(())
        } else {
            Err(self.lost_ownership(item_id).await)
        }
    }
}

#[cfg(test)]
#[path = "item_service_tests.rs"]
mod tests;
