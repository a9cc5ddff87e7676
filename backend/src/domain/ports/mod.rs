//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`, `LoginService`, `UserRegistration`)
//! are called by inbound adapters. Driven ports (`*Repository`,
//! `PasswordHasher`, `AccessTokenService`) are implemented by outbound
//! adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod access_token_service;
mod item_command;
mod item_query;
mod item_repository;
mod login_service;
mod password_hasher;
mod trade_offer_command;
mod trade_offer_query;
mod trade_offer_repository;
mod user_profile_command;
mod user_profile_query;
mod user_registration;
mod user_repository;

#[cfg(test)]
pub use access_token_service::MockAccessTokenService;
pub use access_token_service::{AccessToken, AccessTokenError, AccessTokenService};
pub use item_command::ItemCommand;
pub use item_query::ItemQuery;
#[cfg(test)]
pub use item_repository::MockItemRepository;
pub use item_repository::{ItemRepository, ItemRepositoryError};
pub use login_service::LoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use trade_offer_command::TradeOfferCommand;
pub use trade_offer_query::TradeOfferQuery;
#[cfg(test)]
pub use trade_offer_repository::MockTradeOfferRepository;
pub use trade_offer_repository::{TradeOfferRepository, TradeOfferRepositoryError};
pub use user_profile_command::UserProfileCommand;
pub use user_profile_query::UserProfileQuery;
pub use user_registration::UserRegistration;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
