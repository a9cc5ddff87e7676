//! User account model.
//!
//! Values arriving from adapters are validated here before they reach a port.
//! The password hash never leaves [`UserAccount`]; profile responses are
//! built from [`User`] alone.

use std::fmt;

use super::UserId;

/// Validation errors raised while constructing user values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Name was missing or blank once trimmed.
    EmptyName,
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Email did not look like `local@domain`.
    InvalidEmail,
    /// Street address was missing or blank once trimmed.
    EmptyAddress,
}

impl UserValidationError {
    /// Name of the payload field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyName => "name",
            Self::EmptyEmail | Self::InvalidEmail => "email",
            Self::EmptyAddress => "address",
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyAddress => write!(f, "address must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

fn non_blank(value: &str, error: UserValidationError) -> Result<String, UserValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(error)
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Display name chosen at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    pub fn new(name: &str) -> Result<Self, UserValidationError> {
        non_blank(name, UserValidationError::EmptyName).map(Self)
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Unique login email, stored trimmed and lower-cased.
///
/// # Examples
/// ```
/// use backend::domain::EmailAddress;
///
/// let email = EmailAddress::new("  Ada@Example.COM ").unwrap();
/// assert_eq!(email.as_str(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    pub fn new(email: &str) -> Result<Self, UserValidationError> {
        let normalised = non_blank(email, UserValidationError::EmptyEmail)?.to_lowercase();
        match normalised.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(normalised))
            }
            _ => Err(UserValidationError::InvalidEmail),
        }
    }

    /// Borrow the normalised address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Postal address shown to trading partners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetAddress(String);

impl StreetAddress {
    /// Validate and construct a [`StreetAddress`].
    pub fn new(address: &str) -> Result<Self, UserValidationError> {
        non_blank(address, UserValidationError::EmptyAddress).map(Self)
    }

    /// Borrow the address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Irreversible password hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a password hasher.
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Borrow the encoded hash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Public profile of a registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Display name.
    pub name: UserName,
    /// Login email.
    pub email: EmailAddress,
    /// Street address.
    pub address: StreetAddress,
}

/// Stored account: the profile plus its credential hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Public profile.
    pub user: User,
    /// Hash of the account password.
    pub password_hash: PasswordHash,
}

/// Proposer details attached to incoming offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    /// Stable identifier.
    pub id: UserId,
    /// Display name.
    pub name: UserName,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
        }
    }
}

/// Partial profile update.
///
/// `None` leaves a field unchanged. A field that is present must be valid:
/// an explicitly empty value is rejected, not treated as omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// Replacement display name.
    pub name: Option<UserName>,
    /// Replacement street address.
    pub address: Option<StreetAddress>,
}

impl ProfileUpdate {
    /// Build an update from optional raw inputs.
    pub fn try_from_parts(
        name: Option<&str>,
        address: Option<&str>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            name: name.map(UserName::new).transpose()?,
            address: address.map(StreetAddress::new).transpose()?,
        })
    }

    /// Whether the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.address.is_none()
    }

    /// Apply the update to a profile.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(address) = &self.address {
            user.address = address.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ada() -> User {
        User {
            id: UserId::random(),
            name: UserName::new("Ada").expect("name"),
            email: EmailAddress::new("ada@example.com").expect("email"),
            address: StreetAddress::new("1 Analytical Row").expect("address"),
        }
    }

    #[rstest]
    #[case("ada@example.com", "ada@example.com")]
    #[case(" Ada@Example.com\n", "ada@example.com")]
    fn email_is_normalised(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(EmailAddress::new(raw).expect("valid").as_str(), expected);
    }

    #[rstest]
    #[case("", UserValidationError::EmptyEmail)]
    #[case("   ", UserValidationError::EmptyEmail)]
    #[case("ada", UserValidationError::InvalidEmail)]
    #[case("@example.com", UserValidationError::InvalidEmail)]
    #[case("ada@", UserValidationError::InvalidEmail)]
    #[case("a@b@c", UserValidationError::InvalidEmail)]
    fn email_rejects_bad_input(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(EmailAddress::new(raw), Err(expected));
    }

    #[rstest]
    fn password_hash_debug_is_redacted() {
        let hash = PasswordHash::new("$argon2id$v=19$secret");
        assert!(!format!("{hash:?}").contains("secret"));
    }

    #[rstest]
    fn omitted_fields_leave_profile_unchanged() {
        let mut user = ada();
        let before = user.clone();
        let update = ProfileUpdate::try_from_parts(None, None).expect("empty update");
        assert!(update.is_empty());
        update.apply_to(&mut user);
        assert_eq!(user, before);
    }

    #[rstest]
    fn present_fields_replace_values() {
        let mut user = ada();
        let update =
            ProfileUpdate::try_from_parts(None, Some("2 Difference Lane")).expect("valid update");
        update.apply_to(&mut user);
        assert_eq!(user.name.as_str(), "Ada");
        assert_eq!(user.address.as_str(), "2 Difference Lane");
    }

    #[rstest]
    fn empty_field_is_rejected_not_ignored() {
        let err = ProfileUpdate::try_from_parts(Some(""), None).expect_err("empty name");
        assert_eq!(err, UserValidationError::EmptyName);
        assert_eq!(err.field(), "name");
    }
}
