//! Mutex-guarded store backing the in-memory repositories.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    ItemRepository, ItemRepositoryError, TradeOfferRepository, TradeOfferRepositoryError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    EmailAddress, Item, ItemFilter, ItemId, ItemPatch, OfferDecision, OfferId, OfferResolution,
    ProfileUpdate, TradeOffer, User, UserAccount, UserId,
};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Default)]
struct StoreState {
    next_sequence: u64,
    users: HashMap<UserId, UserAccount>,
    user_ids_by_email: HashMap<String, UserId>,
    items: HashMap<ItemId, (u64, Item)>,
    offers: HashMap<OfferId, (u64, TradeOffer)>,
}

impl StoreState {
    fn sequence(&mut self) -> u64 {
        self.next_sequence += 1;
        self.next_sequence
    }

    fn item_owner(&self, id: &ItemId) -> Option<UserId> {
        self.items.get(id).map(|(_, item)| item.owner_id)
    }

    fn move_item(&mut self, id: &ItemId, new_owner: UserId, now: DateTime<Utc>) {
        if let Some((_, item)) = self.items.get_mut(id) {
            item.owner_id = new_owner;
            item.updated_at = now;
        }
    }

    fn owned_item_mut(&mut self, id: &ItemId, owner: &UserId) -> Option<&mut Item> {
        self.items
            .get_mut(id)
            .map(|(_, item)| item)
            .filter(|item| item.owner_id == *owner)
    }
}

/// Shared in-process store. Clones share the same state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<E>(&self, poisoned: impl FnOnce(&'static str) -> E) -> Result<MutexGuard<'_, StoreState>, E> {
        self.state.lock().map_err(|_| poisoned(POISONED))
    }
}

fn sorted<T: Clone>(mut entries: Vec<(u64, T)>) -> Vec<T> {
    entries.sort_by_key(|(sequence, _)| *sequence);
    entries.into_iter().map(|(_, value)| value).collect()
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::query)?;
        let email = account.user.email.as_str();
        if state.user_ids_by_email.contains_key(email) {
            return Err(UserPersistenceError::duplicate_email(email));
        }
        state
            .user_ids_by_email
            .insert(email.to_owned(), account.user.id);
        state.users.insert(account.user.id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::query)?;
        Ok(state.users.get(id).map(|account| account.user.clone()))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::query)?;
        Ok(state
            .user_ids_by_email
            .get(email.as_str())
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::query)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id))
            .map(|account| account.user.clone())
            .collect())
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::query)?;
        Ok(state.users.get_mut(id).map(|account| {
            update.apply_to(&mut account.user);
            account.user.clone()
        }))
    }
}

#[async_trait]
impl ItemRepository for InMemoryStore {
    async fn insert(&self, item: &Item) -> Result<(), ItemRepositoryError> {
        let mut state = self.lock(ItemRepositoryError::query)?;
        let sequence = state.sequence();
        state.items.insert(item.id, (sequence, item.clone()));
        Ok(())
    }

    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>, ItemRepositoryError> {
        let state = self.lock(ItemRepositoryError::query)?;
        Ok(state.items.get(id).map(|(_, item)| item.clone()))
    }

    async fn find_by_ids(&self, ids: &[ItemId]) -> Result<Vec<Item>, ItemRepositoryError> {
        let state = self.lock(ItemRepositoryError::query)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.items.get(id))
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn list(
        &self,
        filter: &ItemFilter,
        owner: Option<UserId>,
    ) -> Result<Vec<Item>, ItemRepositoryError> {
        let state = self.lock(ItemRepositoryError::query)?;
        let matching = state
            .items
            .values()
            .filter(|(_, item)| owner.is_none_or(|owner_id| item.owner_id == owner_id))
            .filter(|(_, item)| filter.matches(item))
            .cloned()
            .collect();
        Ok(sorted(matching))
    }

    async fn update_owned(
        &self,
        id: &ItemId,
        owner: &UserId,
        patch: &ItemPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Item>, ItemRepositoryError> {
        let mut state = self.lock(ItemRepositoryError::query)?;
        Ok(state.owned_item_mut(id, owner).map(|item| {
            patch.apply_to(item, now);
            item.clone()
        }))
    }

    async fn delete_owned(&self, id: &ItemId, owner: &UserId) -> Result<bool, ItemRepositoryError> {
        let mut state = self.lock(ItemRepositoryError::query)?;
        if state.item_owner(id) != Some(*owner) {
            return Ok(false);
        }
        Ok(state.items.remove(id).is_some())
    }
}

#[async_trait]
impl TradeOfferRepository for InMemoryStore {
    async fn insert(&self, offer: &TradeOffer) -> Result<(), TradeOfferRepositoryError> {
        let mut state = self.lock(TradeOfferRepositoryError::query)?;
        let sequence = state.sequence();
        state.offers.insert(offer.id, (sequence, offer.clone()));
        Ok(())
    }

    async fn find_by_id(&self, id: &OfferId) -> Result<Option<TradeOffer>, TradeOfferRepositoryError> {
        let state = self.lock(TradeOfferRepositoryError::query)?;
        Ok(state.offers.get(id).map(|(_, offer)| offer.clone()))
    }

    async fn list_for_recipient(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<TradeOffer>, TradeOfferRepositoryError> {
        let state = self.lock(TradeOfferRepositoryError::query)?;
        let incoming = state
            .offers
            .values()
            .filter(|(_, offer)| offer.offered_to == *recipient)
            .cloned()
            .collect();
        Ok(sorted(incoming))
    }

    async fn resolve(
        &self,
        resolution: &OfferResolution,
    ) -> Result<TradeOffer, TradeOfferRepositoryError> {
        let offer_id = resolution.offer.id;
        let mut state = self.lock(TradeOfferRepositoryError::query)?;

        let current = state
            .offers
            .get(&offer_id)
            .map(|(_, offer)| offer.status)
            .ok_or_else(|| TradeOfferRepositoryError::not_found(offer_id.to_string()))?;
        if !current.is_pending() {
            return Err(TradeOfferRepositoryError::already_resolved(current.as_str()));
        }

        if resolution.decision == OfferDecision::Accept {
            let moves = resolution.offer.swap_moves();
            if let Some((stale, _, _)) = moves
                .iter()
                .find(|(item_id, from, _)| state.item_owner(item_id) != Some(*from))
            {
                return Err(TradeOfferRepositoryError::stale_item(stale.to_string()));
            }
            for (item_id, _, to) in moves {
                state.move_item(&item_id, to, resolution.resolved_at);
            }
        }

        let (_, offer) = state
            .offers
            .get_mut(&offer_id)
            .ok_or_else(|| TradeOfferRepositoryError::not_found(offer_id.to_string()))?;
        offer.status = resolution.decision.target_status();
        offer.updated_at = resolution.resolved_at;
        Ok(offer.clone())
    }
}
