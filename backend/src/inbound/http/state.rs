//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccessTokenService, ItemCommand, ItemQuery, ItemRepository, LoginService, PasswordHasher,
    TradeOfferCommand, TradeOfferQuery, TradeOfferRepository, UserProfileCommand,
    UserProfileQuery, UserRegistration, UserRepository,
};
use crate::domain::{IdentityService, ItemCatalogueService, TradeOfferService};

/// Driven adapters the domain services are built from.
pub struct Repositories<U, I, O> {
    pub users: Arc<U>,
    pub items: Arc<I>,
    pub offers: Arc<O>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn AccessTokenService>,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registration: Arc<dyn UserRegistration>,
    pub login: Arc<dyn LoginService>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub profile_command: Arc<dyn UserProfileCommand>,
    pub items: Arc<dyn ItemQuery>,
    pub items_command: Arc<dyn ItemCommand>,
    pub offers: Arc<dyn TradeOfferCommand>,
    pub offers_query: Arc<dyn TradeOfferQuery>,
    pub tokens: Arc<dyn AccessTokenService>,
}

impl HttpState {
    /// Wire the domain services over one set of repositories.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// use backend::inbound::http::state::{HttpState, Repositories};
    /// use backend::outbound::memory::InMemoryStore;
    /// use backend::outbound::security::{Argon2PasswordHasher, JwtTokenService};
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let clock = Arc::new(DefaultClock);
    /// let tokens = JwtTokenService::new(b"secret", Duration::from_secs(60), clock.clone())
    ///     .expect("token service");
    /// let _state = HttpState::from_repositories(Repositories {
    ///     users: store.clone(),
    ///     items: store.clone(),
    ///     offers: store,
    ///     hasher: Arc::new(Argon2PasswordHasher::default()),
    ///     tokens: Arc::new(tokens),
    ///     clock,
    /// });
    /// ```
    pub fn from_repositories<U, I, O>(repositories: Repositories<U, I, O>) -> Self
    where
        U: UserRepository + 'static,
        I: ItemRepository + 'static,
        O: TradeOfferRepository + 'static,
    {
        let Repositories {
            users,
            items,
            offers,
            hasher,
            tokens,
            clock,
        } = repositories;

        let identity = Arc::new(IdentityService::new(users.clone(), hasher));
        let catalogue = Arc::new(ItemCatalogueService::new(
            items.clone(),
            users.clone(),
            clock.clone(),
        ));
        let trades = Arc::new(TradeOfferService::new(items, offers, users, clock));

        Self {
            registration: identity.clone(),
            login: identity.clone(),
            profile: identity.clone(),
            profile_command: identity,
            items: catalogue.clone(),
            items_command: catalogue,
            offers: trades.clone(),
            offers_query: trades,
            tokens,
        }
    }
}
