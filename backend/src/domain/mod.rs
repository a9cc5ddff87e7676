//! Domain primitives, services and ports.
//!
//! Purpose: define the strongly typed entities of the exchange (users, items,
//! trade offers), the services that enforce their invariants, and the ports
//! adapters plug into. Nothing here depends on HTTP or SQL.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failure taxonomy.
//! - `User`, `Item`, `TradeOffer` and their identifiers.
//! - `IdentityService`, `ItemCatalogueService`, `TradeOfferService`.

pub mod auth;
pub mod error;
pub mod identity_service;
pub mod ids;
pub mod item;
pub mod item_service;
pub mod ports;
pub mod trade_offer;
pub mod trade_service;
pub mod trace_id;
pub mod user;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::auth::{CredentialsValidationError, LoginCredentials, Registration};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::identity_service::IdentityService;
pub use self::ids::{IdParseError, ItemId, OfferId, UserId};
pub use self::item::{Item, ItemDraft, ItemFields, ItemFilter, ItemPatch, ItemValidationError};
pub use self::item_service::ItemCatalogueService;
pub use self::trace_id::TraceId;
pub use self::trade_offer::{
    IncomingOffer, InvalidDecision, OfferDecision, OfferResolution, OfferStatus, TradeOffer,
    UnknownOfferStatus,
};
pub use self::trade_service::{MAX_RESOLVE_ATTEMPTS, TradeOfferService};
pub use self::user::{
    EmailAddress, PasswordHash, ProfileUpdate, StreetAddress, User, UserAccount, UserName,
    UserSummary, UserValidationError,
};
