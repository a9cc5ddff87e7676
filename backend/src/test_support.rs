//! Test utilities for integration tests.
//!
//! Compiled only with the `test-support` feature. [`TestExchange`] wires the
//! full HTTP stack over an [`InMemoryStore`] so suites under `tests/` can
//! drive real requests without a database.

use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use mockable::DefaultClock;

use crate::Trace;
use crate::domain::ports::{AccessTokenService, ItemRepository, UserRepository};
use crate::domain::{
    EmailAddress, Item, ItemDraft, ItemFields, ItemId, PasswordHash, StreetAddress, User,
    UserAccount, UserId, UserName,
};
use crate::inbound::http::api_scope;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::{HttpState, Repositories};
use crate::outbound::memory::InMemoryStore;
use crate::outbound::security::{Argon2PasswordHasher, JwtTokenService};

const TEST_SECRET: &[u8] = b"integration-test-secret";

/// In-memory exchange with helpers for seeding and authenticating.
pub struct TestExchange {
    /// Backing store shared by every repository port.
    pub store: Arc<InMemoryStore>,
    /// Wired domain services.
    pub state: HttpState,
    tokens: JwtTokenService,
    health: web::Data<HealthState>,
}

impl Default for TestExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl TestExchange {
    /// Build an exchange over an empty store.
    ///
    /// # Panics
    ///
    /// Panics if the token service rejects the fixed test secret.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(DefaultClock);
        let tokens = JwtTokenService::new(TEST_SECRET, Duration::from_secs(3600), clock.clone())
            .unwrap_or_else(|err| panic!("test token service: {err}"));
        let state = HttpState::from_repositories(Repositories {
            users: store.clone(),
            items: store.clone(),
            offers: store.clone(),
            hasher: Arc::new(Argon2PasswordHasher::new()),
            tokens: Arc::new(tokens.clone()),
            clock,
        });
        let health = web::Data::new(HealthState::new());
        health.mark_ready();
        Self {
            store,
            state,
            tokens,
            health,
        }
    }

    /// Insert a user directly, bypassing registration and password hashing.
    ///
    /// The email is the lower-cased name at `example.com`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is blank or the store rejects the insert.
    pub async fn seed_user(&self, name: &str) -> User {
        let email = format!("{}@example.com", name.to_lowercase());
        let user = User {
            id: UserId::random(),
            name: UserName::new(name).unwrap_or_else(|err| panic!("seed name: {err}")),
            email: EmailAddress::new(&email).unwrap_or_else(|err| panic!("seed email: {err}")),
            address: StreetAddress::new("1 Test Street")
                .unwrap_or_else(|err| panic!("seed address: {err}")),
        };
        let account = UserAccount {
            user: user.clone(),
            password_hash: PasswordHash::new("not-a-phc-string"),
        };
        UserRepository::insert(&*self.store, &account)
            .await
            .unwrap_or_else(|err| panic!("seed user: {err}"));
        user
    }

    /// Insert an item owned by `owner`.
    ///
    /// # Panics
    ///
    /// Panics if `name` or `system` is blank or the store rejects the insert.
    pub async fn seed_item(&self, owner: &UserId, name: &str, system: &str) -> Item {
        let item = ItemDraft::try_from_fields(ItemFields {
            name: Some(name.to_owned()),
            publisher: Some("Nintendo".to_owned()),
            year_published: Some(1991),
            system: Some(system.to_owned()),
            condition: Some("Good".to_owned()),
            previous_owners: None,
        })
        .unwrap_or_else(|err| panic!("seed item fields: {err}"))
        .into_item(ItemId::random(), *owner, chrono::Utc::now());
        ItemRepository::insert(&*self.store, &item)
            .await
            .unwrap_or_else(|err| panic!("seed item: {err}"));
        item
    }

    /// Current owner of `item`, or `None` once deleted.
    ///
    /// # Panics
    ///
    /// Panics if the store lookup fails.
    pub async fn owner_of(&self, item: &ItemId) -> Option<UserId> {
        ItemRepository::find_by_id(&*self.store, item)
            .await
            .unwrap_or_else(|err| panic!("item lookup: {err}"))
            .map(|found| found.owner_id)
    }

    /// `Authorization` header pair carrying a fresh token for `user`.
    ///
    /// # Panics
    ///
    /// Panics if signing fails.
    #[must_use]
    pub fn bearer(&self, user: &UserId) -> (&'static str, String) {
        let issued = self
            .tokens
            .issue(user)
            .unwrap_or_else(|err| panic!("issue token: {err}"));
        ("Authorization", format!("Bearer {}", issued.token.as_str()))
    }

    /// Application equivalent to the production one, minus Swagger UI.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.health.clone())
            .app_data(web::Data::new(self.state.clone()))
            .wrap(Trace)
            .service(api_scope())
            .service(ready)
            .service(live)
    }
}
