//! Identity domain service.
//!
//! Implements registration, credential verification and profile access on
//! top of the [`UserRepository`] and [`PasswordHasher`] driven ports.
//! Hashing runs on the blocking pool because Argon2 is deliberately slow.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};
use zeroize::Zeroizing;

use crate::domain::ports::{
    LoginService, PasswordHashError, PasswordHasher, UserPersistenceError, UserProfileCommand,
    UserProfileQuery, UserRegistration, UserRepository,
};
use crate::domain::{
    Error, LoginCredentials, PasswordHash, ProfileUpdate, Registration, User, UserAccount, UserId,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const USER_NOT_FOUND: &str = "User not found";

/// Identity service implementing the account driving ports.
#[derive(Clone)]
pub struct IdentityService<U> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
}

impl<U> IdentityService<U> {
    /// Create a service over the given repository and hasher.
    pub fn new(users: Arc<U>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }
}

pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::duplicate_email("Email already exists")
        }
    }
}

fn map_hash_error(error: &PasswordHashError) -> Error {
    error!(%error, "password hashing failed");
    Error::internal("password hashing failed")
}

impl<U> IdentityService<U>
where
    U: UserRepository,
{
    async fn hash_password(&self, password: &str) -> Result<PasswordHash, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(|err| map_hash_error(&err))
    }

    async fn verify_password(&self, password: &str, hash: PasswordHash) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|err| Error::internal(format!("password verification task failed: {err}")))
    }
}

#[async_trait]
impl<U> UserRegistration for IdentityService<U>
where
    U: UserRepository,
{
    async fn register(&self, registration: &Registration) -> Result<UserId, Error> {
        let existing = self
            .users
            .find_by_email(registration.email())
            .await
            .map_err(map_user_persistence_error)?;
        if existing.is_some() {
            return Err(Error::duplicate_email("Email already exists"));
        }

        let password_hash = self.hash_password(registration.password()).await?;
        let account = UserAccount {
            user: User {
                id: UserId::random(),
                name: registration.name().clone(),
                email: registration.email().clone(),
                address: registration.address().clone(),
            },
            password_hash,
        };

        // The unique index still guards against a concurrent registration.
        self.users
            .insert(&account)
            .await
            .map_err(map_user_persistence_error)?;
        debug!(user_id = %account.user.id, "registered user");
        Ok(account.user.id)
    }
}

#[async_trait]
impl<U> LoginService for IdentityService<U>
where
    U: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let account = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_persistence_error)?;
        let Some(account) = account else {
            let placeholder = self.hasher.placeholder_hash();
            self.verify_password(credentials.password(), placeholder).await?;
            return Err(Error::invalid_credentials(INVALID_CREDENTIALS));
        };

        let user_id = account.user.id;
        if self
            .verify_password(credentials.password(), account.password_hash)
            .await?
        {
            Ok(user_id)
        } else {
            Err(Error::invalid_credentials(INVALID_CREDENTIALS))
        }
    }
}

#[async_trait]
impl<U> UserProfileQuery for IdentityService<U>
where
    U: UserRepository,
{
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }
}

#[async_trait]
impl<U> UserProfileCommand for IdentityService<U>
where
    U: UserRepository,
{
    async fn update_profile(
        &self,
        user_id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<User, Error> {
        if update.is_empty() {
            return self.fetch_profile(user_id).await;
        }
        self.users
            .update_profile(user_id, update)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
