//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashes are stored in PHC string format, so the algorithm parameters and
//! salt travel with the hash and older hashes keep verifying if the defaults
//! change.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash as PhcHash, PasswordHasher as _, PasswordVerifier, SaltString,
};

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Random digest at the default cost. Checking any password against it runs a
/// full Argon2id pass and fails.
const PLACEHOLDER_PHC: &str = "$argon2id$v=19$m=19456,t=2,p=1$Z2FtZS1leGNoYW5nZS1sb2dpbg$hK4Ir+8yL7ZHaZy37g9LNsUYTssGCEcXAhBLj7xFUmA";

/// Argon2id hasher using the crate's recommended parameters.
#[derive(Clone, Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Create a hasher with default Argon2id parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|phc| PasswordHash::new(phc.to_string()))
            .map_err(|err| PasswordHashError::hashing(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> bool {
        PhcHash::new(hash.as_str()).is_ok_and(|parsed| {
            self.argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }

    fn placeholder_hash(&self) -> PasswordHash {
        PasswordHash::new(PLACEHOLDER_PHC)
    }
}
