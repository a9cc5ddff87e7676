//! Trade engine: proposes, lists and resolves trade offers.
//!
//! Resolution checks run in a fixed order (existence, recipient authority,
//! pending state, decision value) so callers always see the most specific
//! failure. The status compare-and-swap and the two ownership moves are
//! delegated to [`TradeOfferRepository::resolve`], which applies them
//! atomically.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::identity_service::map_user_persistence_error;
use crate::domain::item_service::{ITEM_NOT_FOUND, map_item_repository_error};
use crate::domain::ports::{
    ItemRepository, TradeOfferCommand, TradeOfferQuery, TradeOfferRepository,
    TradeOfferRepositoryError, UserRepository,
};
use crate::domain::{
    Error, IncomingOffer, Item, ItemId, OfferDecision, OfferId, OfferResolution, TradeOffer,
    UserId, UserSummary,
};

/// Upper bound on attempts when the store reports transaction contention.
pub const MAX_RESOLVE_ATTEMPTS: u32 = 3;

const OFFER_NOT_FOUND: &str = "Offer not found";
const ALREADY_PROCESSED: &str = "Offer already processed";

/// Trade engine implementing the offer driving ports.
#[derive(Clone)]
pub struct TradeOfferService<I, O, U> {
    items: Arc<I>,
    offers: Arc<O>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<I, O, U> TradeOfferService<I, O, U> {
    /// Create a trade engine over the given repositories.
    pub fn new(items: Arc<I>, offers: Arc<O>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            items,
            offers,
            users,
            clock,
        }
    }
}

fn map_offer_repository_error(error: TradeOfferRepositoryError) -> Error {
    match error {
        TradeOfferRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("trade offer repository unavailable: {message}"))
        }
        TradeOfferRepositoryError::Query { message } => {
            Error::internal(format!("trade offer repository error: {message}"))
        }
        TradeOfferRepositoryError::NotFound { .. } => Error::not_found(OFFER_NOT_FOUND),
        TradeOfferRepositoryError::AlreadyResolved { .. } => {
            Error::already_processed(ALREADY_PROCESSED)
        }
        TradeOfferRepositoryError::StaleItem { item_id } => {
            Error::conflict("Trade target no longer valid").with_details(json!({
                "itemId": item_id,
                "code": "stale_trade_item",
            }))
        }
        TradeOfferRepositoryError::Contention { .. } => {
            Error::conflict("Offer is being resolved concurrently; retry later")
        }
    }
}

impl<I, O, U> TradeOfferService<I, O, U>
where
    I: ItemRepository,
    O: TradeOfferRepository,
    U: UserRepository,
{
    async fn item(&self, item_id: &ItemId) -> Result<Item, Error> {
        self.items
            .find_by_id(item_id)
            .await
            .map_err(map_item_repository_error)?
            .ok_or_else(|| {
                Error::not_found(ITEM_NOT_FOUND).with_details(json!({ "itemId": item_id }))
            })
    }

    async fn apply_resolution(&self, resolution: &OfferResolution) -> Result<TradeOffer, Error> {
        let mut attempt = 1;
        loop {
            match self.offers.resolve(resolution).await {
                Ok(offer) => return Ok(offer),
                Err(TradeOfferRepositoryError::Contention { message })
                    if attempt < MAX_RESOLVE_ATTEMPTS =>
                {
                    warn!(
                        offer_id = %resolution.offer.id,
                        attempt,
                        %message,
                        "retrying contended offer resolution"
                    );
                    attempt += 1;
                }
                Err(err) => return Err(map_offer_repository_error(err)),
            }
        }
    }
}

#[async_trait]
impl<I, O, U> TradeOfferCommand for TradeOfferService<I, O, U>
where
    I: ItemRepository,
    O: TradeOfferRepository,
    U: UserRepository,
{
    async fn create_offer(
        &self,
        proposer: &UserId,
        requested: &ItemId,
        offered: &ItemId,
    ) -> Result<TradeOffer, Error> {
        let requested_item = self.item(requested).await?;
        let offered_item = self.item(offered).await?;

        if offered_item.owner_id != *proposer {
            return Err(Error::forbidden("You don't own the offered item"));
        }
        if requested_item.owner_id == *proposer {
            return Err(Error::invalid_offer("Cannot trade with yourself"));
        }

        let offer = TradeOffer::propose(
            OfferId::random(),
            *proposer,
            &requested_item,
            &offered_item,
            self.clock.utc(),
        );
        self.offers
            .insert(&offer)
            .await
            .map_err(map_offer_repository_error)?;
        info!(
            offer_id = %offer.id,
            offered_by = %offer.offered_by,
            offered_to = %offer.offered_to,
            "trade offer created"
        );
        Ok(offer)
    }

    async fn resolve_offer(
        &self,
        offer_id: &OfferId,
        caller: &UserId,
        decision: &str,
    ) -> Result<TradeOffer, Error> {
        let offer = self
            .offers
            .find_by_id(offer_id)
            .await
            .map_err(map_offer_repository_error)?
            .ok_or_else(|| Error::not_found(OFFER_NOT_FOUND))?;

        if offer.offered_to != *caller {
            return Err(Error::forbidden("Not authorized"));
        }
        if !offer.status.is_pending() {
            return Err(Error::already_processed(ALREADY_PROCESSED));
        }
        let decision = OfferDecision::parse(decision)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let resolution = OfferResolution {
            offer,
            decision,
            resolved_at: self.clock.utc(),
        };
        let resolved = self.apply_resolution(&resolution).await?;
        info!(
            offer_id = %resolved.id,
            status = %resolved.status,
            "trade offer resolved"
        );
        Ok(resolved)
    }
}

#[async_trait]
impl<I, O, U> TradeOfferQuery for TradeOfferService<I, O, U>
where
    I: ItemRepository,
    O: TradeOfferRepository,
    U: UserRepository,
{
    async fn list_incoming(&self, recipient: &UserId) -> Result<Vec<IncomingOffer>, Error> {
        let offers = self
            .offers
            .list_for_recipient(recipient)
            .await
            .map_err(map_offer_repository_error)?;
        if offers.is_empty() {
            return Ok(Vec::new());
        }

        let proposer_ids: Vec<UserId> = offers
            .iter()
            .map(|offer| offer.offered_by)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let item_ids: Vec<ItemId> = offers
            .iter()
            .flat_map(|offer| [offer.requested_item, offer.offered_item])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let proposers: HashMap<UserId, UserSummary> = self
            .users
            .find_by_ids(&proposer_ids)
            .await
            .map_err(map_user_persistence_error)?
            .iter()
            .map(|user| (user.id, UserSummary::from(user)))
            .collect();
        let items: HashMap<ItemId, Item> = self
            .items
            .find_by_ids(&item_ids)
            .await
            .map_err(map_item_repository_error)?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        Ok(offers
            .into_iter()
            .map(|offer| IncomingOffer {
                offered_by: proposers.get(&offer.offered_by).cloned(),
                requested_item: items.get(&offer.requested_item).cloned(),
                offered_item: items.get(&offer.offered_item).cloned(),
                offer,
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "trade_service_tests.rs"]
mod tests;
