//! Driving port for reading user profiles.
use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Domain use-case port for profile lookups.
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Fetch a profile, failing with `not_found` when absent.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error>;
}
