//! Builders wiring repositories and credential adapters into [`HttpState`].

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;

use backend::domain::ports::AccessTokenError;
use backend::inbound::http::state::{HttpState, Repositories};
use backend::outbound::memory::InMemoryStore;
use backend::outbound::persistence::{
    DbPool, DieselItemRepository, DieselTradeOfferRepository, DieselUserRepository,
};
use backend::outbound::security::{Argon2PasswordHasher, JwtTokenService};

use super::ServerConfig;

/// Build the shared HTTP state, using PostgreSQL when a pool is configured
/// and the in-memory store otherwise.
///
/// # Errors
///
/// Returns [`AccessTokenError`] when the token service rejects the signing
/// parameters.
pub(crate) fn build_http_state(
    config: &ServerConfig,
) -> Result<web::Data<HttpState>, AccessTokenError> {
    let clock = Arc::new(DefaultClock);
    let tokens = Arc::new(JwtTokenService::new(
        &config.token_secret,
        config.token_ttl,
        clock.clone(),
    )?);
    let hasher = Arc::new(Argon2PasswordHasher::new());

    let state = match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL repositories");
            HttpState::from_repositories(diesel_repositories(pool, hasher, tokens, clock))
        }
        None => {
            info!("no database configured; using in-memory repositories");
            let store = Arc::new(InMemoryStore::new());
            HttpState::from_repositories(Repositories {
                users: store.clone(),
                items: store.clone(),
                offers: store,
                hasher,
                tokens,
                clock,
            })
        }
    };
    Ok(web::Data::new(state))
}

fn diesel_repositories(
    pool: &DbPool,
    hasher: Arc<Argon2PasswordHasher>,
    tokens: Arc<JwtTokenService>,
    clock: Arc<DefaultClock>,
) -> Repositories<DieselUserRepository, DieselItemRepository, DieselTradeOfferRepository> {
    Repositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        items: Arc::new(DieselItemRepository::new(pool.clone())),
        offers: Arc::new(DieselTradeOfferRepository::new(pool.clone())),
        hasher,
        tokens,
        clock,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::time::Duration;

    use backend::domain::UserId;
    use rstest::rstest;
    use zeroize::Zeroizing;

    fn config(secret: &[u8]) -> ServerConfig {
        ServerConfig::new(
            SocketAddr::from(([127, 0, 0, 1], 0)),
            Zeroizing::new(secret.to_vec()),
            Duration::from_secs(60),
        )
    }

    #[rstest]
    fn in_memory_state_issues_verifiable_tokens() {
        let state = build_http_state(&config(b"server-test-secret")).expect("state");
        let user = UserId::random();
        let token = state.tokens.issue(&user).expect("issue");
        let resolved = state
            .tokens
            .resolve_identity(token.token.as_str())
            .expect("resolve");
        assert_eq!(resolved, user);
    }

    #[rstest]
    fn empty_secret_is_rejected() {
        assert!(build_http_state(&config(b"")).is_err());
    }
}
