//! Trade offer model and its state machine.
//!
//! An offer starts `pending` and moves exactly once to `accepted` or
//! `rejected`. Terminal offers are immutable.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{Item, ItemId, OfferId, UserId, UserSummary};

/// Lifecycle state of a trade offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OfferStatus {
    /// Awaiting a decision from the recipient.
    Pending,
    /// The recipient accepted; ownership has been swapped.
    Accepted,
    /// The recipient declined; nothing changed hands.
    Rejected,
}

impl OfferStatus {
    /// Stable lowercase name used in storage and payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Whether the offer can still be resolved.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored status value is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown offer status: {0}")]
pub struct UnknownOfferStatus(pub String);

impl FromStr for OfferStatus {
    type Err = UnknownOfferStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownOfferStatus(other.to_owned())),
        }
    }
}

/// Recipient's verdict on a pending offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferDecision {
    /// Swap the two items.
    Accept,
    /// Decline without changing ownership.
    Reject,
}

/// Error returned when a decision is neither `accepted` nor `rejected`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid status: {0}. Must be accepted or rejected")]
pub struct InvalidDecision(pub String);

impl OfferDecision {
    /// Parse the wire form of a decision.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::OfferDecision;
    ///
    /// assert_eq!(OfferDecision::parse("accepted"), Ok(OfferDecision::Accept));
    /// assert!(OfferDecision::parse("pending").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, InvalidDecision> {
        match raw {
            "accepted" => Ok(Self::Accept),
            "rejected" => Ok(Self::Reject),
            other => Err(InvalidDecision(other.to_owned())),
        }
    }

    /// Status the offer ends in after this decision.
    #[must_use]
    pub const fn target_status(self) -> OfferStatus {
        match self {
            Self::Accept => OfferStatus::Accepted,
            Self::Reject => OfferStatus::Rejected,
        }
    }
}

/// A proposed swap of two items between two users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeOffer {
    /// Stable identifier.
    pub id: OfferId,
    /// Proposer; owned `offered_item` when the offer was made.
    pub offered_by: UserId,
    /// Recipient; owned `requested_item` when the offer was made.
    pub offered_to: UserId,
    /// Item the proposer wants.
    pub requested_item: ItemId,
    /// Item the proposer gives up.
    pub offered_item: ItemId,
    /// Lifecycle state.
    pub status: OfferStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last transition timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TradeOffer {
    /// Create a pending offer. The recipient is the requested item's owner now.
    #[must_use]
    pub fn propose(
        id: OfferId,
        offered_by: UserId,
        requested: &Item,
        offered: &Item,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            offered_by,
            offered_to: requested.owner_id,
            requested_item: requested.id,
            offered_item: offered.id,
            status: OfferStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Ownership moves an acceptance performs, as `(item, from, to)`.
    #[must_use]
    pub const fn swap_moves(&self) -> [(ItemId, UserId, UserId); 2] {
        [
            (self.requested_item, self.offered_to, self.offered_by),
            (self.offered_item, self.offered_by, self.offered_to),
        ]
    }
}

/// Request to move a pending offer into a terminal state.
///
/// The swap is derived from the offer snapshot, never from current item
/// ownership, so a later transfer cannot redirect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferResolution {
    /// Offer as observed before resolving.
    pub offer: TradeOffer,
    /// Recipient's verdict.
    pub decision: OfferDecision,
    /// Transition timestamp.
    pub resolved_at: DateTime<Utc>,
}

/// Incoming offer joined with its proposer and both items.
///
/// Items deleted since the offer was made are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingOffer {
    /// The offer itself.
    pub offer: TradeOffer,
    /// Proposer details.
    pub offered_by: Option<UserSummary>,
    /// Item the proposer wants.
    pub requested_item: Option<Item>,
    /// Item the proposer gives up.
    pub offered_item: Option<Item>,
}
