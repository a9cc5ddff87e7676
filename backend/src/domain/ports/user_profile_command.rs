//! Driving port for editing the caller's own profile.
use async_trait::async_trait;

use crate::domain::{Error, ProfileUpdate, User, UserId};

/// Domain use-case port for profile edits.
#[async_trait]
pub trait UserProfileCommand: Send + Sync {
    /// Apply a partial update and return the stored profile.
    async fn update_profile(&self, user_id: &UserId, update: &ProfileUpdate)
    -> Result<User, Error>;
}
