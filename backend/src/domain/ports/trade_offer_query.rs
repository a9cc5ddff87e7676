//! Driving port for reading a user's incoming offers.
use async_trait::async_trait;

use crate::domain::{Error, IncomingOffer, UserId};

/// Domain use-case port for offer listings.
#[async_trait]
pub trait TradeOfferQuery: Send + Sync {
    /// List offers addressed to `recipient`, joined with proposer and items.
    async fn list_incoming(&self, recipient: &UserId) -> Result<Vec<IncomingOffer>, Error>;
}
