//! Driving port for account registration.
use async_trait::async_trait;

use crate::domain::{Error, Registration, UserId};

/// Domain use-case port for creating accounts.
#[async_trait]
pub trait UserRegistration: Send + Sync {
    /// Create an account and return its identifier.
    async fn register(&self, registration: &Registration) -> Result<UserId, Error>;
}
