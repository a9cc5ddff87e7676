//! Driving port for proposing and resolving trades.
use async_trait::async_trait;

use crate::domain::{Error, ItemId, OfferId, TradeOffer, UserId};

/// Domain use-case port for the trade workflow.
#[async_trait]
pub trait TradeOfferCommand: Send + Sync {
    /// Propose swapping `offered` (owned by `proposer`) for `requested`.
    async fn create_offer(
        &self,
        proposer: &UserId,
        requested: &ItemId,
        offered: &ItemId,
    ) -> Result<TradeOffer, Error>;

    /// Accept or reject an offer addressed to `caller`.
    ///
    /// `decision` is the raw wire value; it is validated only after the
    /// offer, the caller's authority and the pending state have been checked.
    async fn resolve_offer(
        &self,
        offer_id: &OfferId,
        caller: &UserId,
        decision: &str,
    ) -> Result<TradeOffer, Error>;
}
