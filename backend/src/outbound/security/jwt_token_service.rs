//! HS256 JSON Web Token implementation of the `AccessTokenService` port.
//!
//! Tokens carry `sub` (the user id), `iat` and `exp`. Issuance reads the
//! injected clock; verification checks the signature and expiry against the
//! system clock with no leeway.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::UserId;
use crate::domain::ports::{AccessToken, AccessTokenError, AccessTokenService};

const EPHEMERAL_SECRET_LEN: usize = 64;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies bearer tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// Create a service signing with `secret` and issuing tokens valid for
    /// `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessTokenError::Signing`] when `secret` is empty or `ttl`
    /// is zero or out of range.
    pub fn new(
        secret: &[u8],
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AccessTokenError> {
        if secret.is_empty() {
            return Err(AccessTokenError::signing("signing secret must not be empty"));
        }
        let ttl = TimeDelta::from_std(ttl)
            .ok()
            .filter(|delta| *delta > TimeDelta::zero())
            .ok_or_else(|| AccessTokenError::signing("token ttl must be positive"))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
            clock,
        })
    }
}

impl AccessTokenService for JwtTokenService {
    fn issue(&self, user_id: &UserId) -> Result<AccessToken, AccessTokenError> {
        let issued_at = self.clock.utc();
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| AccessTokenError::signing(err.to_string()))?;
        Ok(AccessToken {
            token: Zeroizing::new(token),
            expires_at,
        })
    }

    fn resolve_identity(&self, token: &str) -> Result<UserId, AccessTokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => AccessTokenError::expired(),
                _ => AccessTokenError::invalid(err.to_string()),
            }
        })?;
        UserId::new(&data.claims.sub).map_err(|err| AccessTokenError::invalid(err.to_string()))
    }
}

/// Generate a random signing secret for processes without a configured one.
///
/// Tokens signed with it stop verifying when the process restarts.
#[must_use]
pub fn ephemeral_secret() -> Zeroizing<Vec<u8>> {
    let mut secret = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_LEN]);
    OsRng.fill_bytes(&mut secret);
    secret
}
