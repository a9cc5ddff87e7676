//! Test helpers for inbound HTTP components.

use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use mockable::DefaultClock;

use crate::domain::ports::{AccessTokenService, ItemRepository, UserRepository};
use crate::domain::{
    EmailAddress, Item, ItemDraft, ItemFields, ItemId, PasswordHash, StreetAddress, User,
    UserAccount, UserId, UserName,
};
use crate::outbound::memory::InMemoryStore;
use crate::outbound::security::{Argon2PasswordHasher, JwtTokenService};

use super::state::{HttpState, Repositories};

const TEST_SECRET: &[u8] = b"inbound-http-test-secret";

/// HTTP state over an empty in-memory store and the given token service.
pub fn state_with_tokens(tokens: impl AccessTokenService + 'static) -> HttpState {
    let store = Arc::new(InMemoryStore::new());
    HttpState::from_repositories(Repositories {
        users: store.clone(),
        items: store.clone(),
        offers: store,
        hasher: Arc::new(Argon2PasswordHasher::new()),
        tokens: Arc::new(tokens),
        clock: Arc::new(DefaultClock),
    })
}

/// In-memory fixture shared by handler tests.
pub struct TestWorld {
    pub store: Arc<InMemoryStore>,
    pub state: HttpState,
    tokens: JwtTokenService,
}

impl TestWorld {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let tokens = JwtTokenService::new(
            TEST_SECRET,
            Duration::from_secs(3600),
            Arc::new(DefaultClock),
        )
        .expect("token service");
        let state = HttpState::from_repositories(Repositories {
            users: store.clone(),
            items: store.clone(),
            offers: store.clone(),
            hasher: Arc::new(Argon2PasswordHasher::new()),
            tokens: Arc::new(tokens.clone()),
            clock: Arc::new(DefaultClock),
        });
        Self {
            store,
            state,
            tokens,
        }
    }

    /// Insert a user directly, skipping password hashing.
    pub async fn user(&self, name: &str) -> User {
        let user = User {
            id: UserId::random(),
            name: UserName::new(name).expect("name"),
            email: EmailAddress::new(&format!("{}@example.com", name.to_lowercase()))
                .expect("email"),
            address: StreetAddress::new("1 Test Street").expect("address"),
        };
        let account = UserAccount {
            user: user.clone(),
            password_hash: PasswordHash::new("unused"),
        };
        UserRepository::insert(&*self.store, &account)
            .await
            .expect("insert user");
        user
    }

    /// Insert an item owned by `owner`.
    pub async fn item(&self, owner: &UserId, name: &str, system: &str) -> Item {
        let item = ItemDraft::try_from_fields(ItemFields {
            name: Some(name.to_owned()),
            publisher: Some("Nintendo".to_owned()),
            year_published: Some(1990),
            system: Some(system.to_owned()),
            condition: Some("Good".to_owned()),
            previous_owners: None,
        })
        .expect("draft")
        .into_item(ItemId::random(), *owner, chrono::Utc::now());
        ItemRepository::insert(&*self.store, &item)
            .await
            .expect("insert item");
        item
    }

    /// `Authorization` header value for `user`.
    pub fn bearer(&self, user: &UserId) -> (&'static str, String) {
        let token = self.tokens.issue(user).expect("issue token");
        ("Authorization", format!("Bearer {}", token.token.as_str()))
    }

    /// Application serving the versioned API over this world's state.
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
            .app_data(web::Data::new(self.state.clone()))
            .service(super::api_scope())
    }
}
