//! Driven port for one-way password hashing.
use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// The hash could not be computed.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

/// Produces and checks irreversible password hashes.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password with a fresh salt.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError>;

    /// Check a plaintext password against a stored hash in constant time.
    ///
    /// Malformed hashes never verify.
    fn verify(&self, password: &str, hash: &PasswordHash) -> bool;

    /// A well-formed hash with the adapter's cost parameters that no
    /// password matches.
    ///
    /// Logins for unknown accounts verify against it so they cost the same
    /// as a wrong password.
    fn placeholder_hash(&self) -> PasswordHash;
}
