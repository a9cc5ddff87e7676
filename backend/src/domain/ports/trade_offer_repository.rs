//! Driven port for trade offer persistence.
//!
//! [`TradeOfferRepository::resolve`] is the only place where offer status and
//! item ownership change together. Adapters must apply the status
//! compare-and-swap and both ownership moves atomically.
use async_trait::async_trait;

use crate::domain::{OfferId, OfferResolution, TradeOffer, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by trade offer repository adapters.
    pub enum TradeOfferRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "trade offer repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "trade offer repository query failed: {message}",
        /// The offer does not exist.
        NotFound { offer_id: String } => "trade offer not found: {offer_id}",
        /// The offer left the pending state before this resolution applied.
        AlreadyResolved { status: String } => "trade offer already {status}",
        /// An item no longer belongs to the party the offer recorded.
        StaleItem { item_id: String } => "trade item {item_id} changed hands or was removed",
        /// The store aborted the transaction because of concurrent writers.
        Contention { message: String } => "trade offer transaction contention: {message}",
    }
}

/// Storage for trade offers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TradeOfferRepository: Send + Sync {
    /// Insert a new pending offer.
    async fn insert(&self, offer: &TradeOffer) -> Result<(), TradeOfferRepositoryError>;

    /// Fetch an offer by identifier.
    async fn find_by_id(&self, id: &OfferId) -> Result<Option<TradeOffer>, TradeOfferRepositoryError>;

    /// List offers addressed to `recipient`, oldest first.
    async fn list_for_recipient(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<TradeOffer>, TradeOfferRepositoryError>;

    /// Move a pending offer to its terminal status.
    ///
    /// The status update applies only if the stored status is still pending.
    /// For an acceptance both items must still belong to the parties recorded
    /// on the offer; otherwise nothing is written and `StaleItem` is returned.
    async fn resolve(
        &self,
        resolution: &OfferResolution,
    ) -> Result<TradeOffer, TradeOfferRepositoryError>;
}
