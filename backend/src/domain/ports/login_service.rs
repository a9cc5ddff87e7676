//! Driving port for credential verification.
use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    ///
    /// Unknown emails and wrong passwords fail with the same
    /// `invalid_credentials` error.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}
