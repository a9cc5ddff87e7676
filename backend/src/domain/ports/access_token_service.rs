//! Driven port for bearer credential issuance and verification.
use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by access token adapters.
    pub enum AccessTokenError {
        /// The token is malformed, tampered with or signed by another key.
        Invalid { message: String } => "access token invalid: {message}",
        /// The token was valid but has expired.
        Expired => "access token expired",
        /// A token could not be signed.
        Signing { message: String } => "access token signing failed: {message}",
    }
}

/// A freshly issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Encoded token handed to the client.
    pub token: Zeroizing<String>,
    /// Instant after which the token no longer verifies.
    pub expires_at: DateTime<Utc>,
}

/// Issues bearer tokens and resolves them back to a user id.
#[cfg_attr(test, mockall::automock)]
pub trait AccessTokenService: Send + Sync {
    /// Issue a token asserting `user_id`.
    fn issue(&self, user_id: &UserId) -> Result<AccessToken, AccessTokenError>;

    /// Verify `token` and return the user it asserts. Pure: no side effects.
    fn resolve_identity(&self, token: &str) -> Result<UserId, AccessTokenError>;
}
