//! Credential payloads for registration and login.
//!
//! Plaintext passwords are held in [`Zeroizing`] buffers so they are wiped
//! once the hasher has consumed them.

use std::fmt;

use zeroize::Zeroizing;

use super::{EmailAddress, StreetAddress, UserName, UserValidationError};

/// Validation errors for login and registration payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// A profile field failed validation.
    Profile(UserValidationError),
    /// Password was empty.
    EmptyPassword,
}

impl CredentialsValidationError {
    /// Name of the payload field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Profile(inner) => inner.field(),
            Self::EmptyPassword => "password",
        }
    }
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile(inner) => fmt::Display::fmt(inner, f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

impl From<UserValidationError> for CredentialsValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::Profile(value)
    }
}

fn password(raw: &str) -> Result<Zeroizing<String>, CredentialsValidationError> {
    if raw.is_empty() {
        return Err(CredentialsValidationError::EmptyPassword);
    }
    Ok(Zeroizing::new(raw.to_owned()))
}

/// Validated login credentials.
///
/// The password keeps caller-provided whitespace so comparisons are exact.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@example.com", "pw").unwrap();
/// assert_eq!(creds.email().as_str(), "ada@example.com");
/// assert_eq!(creds.password(), "pw");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password_raw: &str) -> Result<Self, CredentialsValidationError> {
        Ok(Self {
            email: EmailAddress::new(email)?,
            password: password(password_raw)?,
        })
    }

    /// Email used for the account lookup.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    name: UserName,
    email: EmailAddress,
    password: Zeroizing<String>,
    address: StreetAddress,
}

impl Registration {
    /// Construct a registration from raw inputs.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password_raw: &str,
        address: &str,
    ) -> Result<Self, CredentialsValidationError> {
        Ok(Self {
            name: UserName::new(name)?,
            email: EmailAddress::new(email)?,
            password: password(password_raw)?,
            address: StreetAddress::new(address)?,
        })
    }

    /// Display name of the new account.
    #[must_use]
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Login email of the new account.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Plaintext password; only ever handed to the hasher.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Street address of the new account.
    #[must_use]
    pub fn address(&self) -> &StreetAddress {
        &self.address
    }
}
