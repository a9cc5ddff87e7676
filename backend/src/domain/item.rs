//! Catalogue item model.
//!
//! An item always has exactly one owner. Owners change through accepted
//! trades only, so neither [`ItemDraft`] nor [`ItemPatch`] carries an owner.

use std::fmt;

use chrono::{DateTime, Utc};

use super::{ItemId, UserId};

/// Validation errors raised while building item values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    /// A required field was absent from the payload.
    MissingField {
        /// Payload field name.
        field: &'static str,
    },
    /// A text field was present but blank once trimmed.
    BlankField {
        /// Payload field name.
        field: &'static str,
    },
    /// The publication year was zero or negative.
    InvalidYear,
}

impl ItemValidationError {
    /// Name of the payload field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } | Self::BlankField { field } => field,
            Self::InvalidYear => "yearPublished",
        }
    }
}

impl fmt::Display for ItemValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "{field} is required"),
            Self::BlankField { field } => write!(f, "{field} must not be empty"),
            Self::InvalidYear => write!(f, "yearPublished must be a positive year"),
        }
    }
}

impl std::error::Error for ItemValidationError {}

/// A tradeable catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Stable identifier.
    pub id: ItemId,
    /// Title of the game.
    pub name: String,
    /// Publishing company.
    pub publisher: String,
    /// Year of first publication.
    pub year_published: i32,
    /// Platform, for example `SNES`.
    pub system: String,
    /// Free-form condition description.
    pub condition: String,
    /// Number of owners before the current one.
    pub previous_owners: u32,
    /// Current owner.
    pub owner_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

fn text(field: &'static str, value: &str) -> Result<String, ItemValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ItemValidationError::BlankField { field });
    }
    Ok(trimmed.to_owned())
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, ItemValidationError> {
    value.ok_or(ItemValidationError::MissingField { field })
}

fn year(value: i32) -> Result<i32, ItemValidationError> {
    if value <= 0 {
        return Err(ItemValidationError::InvalidYear);
    }
    Ok(value)
}

/// Raw item attributes as received from an adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFields {
    /// Title of the game.
    pub name: Option<String>,
    /// Publishing company.
    pub publisher: Option<String>,
    /// Year of first publication.
    pub year_published: Option<i32>,
    /// Platform.
    pub system: Option<String>,
    /// Condition description.
    pub condition: Option<String>,
    /// Number of earlier owners.
    pub previous_owners: Option<u32>,
}

/// Validated attributes for a new item.
///
/// # Examples
/// ```
/// use backend::domain::{ItemDraft, ItemFields};
///
/// let draft = ItemDraft::try_from_fields(ItemFields {
///     name: Some("Super Mario World".into()),
///     publisher: Some("Nintendo".into()),
///     year_published: Some(1990),
///     system: Some("SNES".into()),
///     condition: Some("Good".into()),
///     previous_owners: None,
/// })
/// .unwrap();
/// assert_eq!(draft.previous_owners, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    /// Title of the game.
    pub name: String,
    /// Publishing company.
    pub publisher: String,
    /// Year of first publication.
    pub year_published: i32,
    /// Platform.
    pub system: String,
    /// Condition description.
    pub condition: String,
    /// Number of earlier owners, zero when omitted.
    pub previous_owners: u32,
}

impl ItemDraft {
    /// Validate raw fields. Every text field and the year are required.
    pub fn try_from_fields(fields: ItemFields) -> Result<Self, ItemValidationError> {
        let ItemFields {
            name,
            publisher,
            year_published,
            system,
            condition,
            previous_owners,
        } = fields;
        Ok(Self {
            name: text("name", &required("name", name)?)?,
            publisher: text("publisher", &required("publisher", publisher)?)?,
            year_published: year(required("yearPublished", year_published)?)?,
            system: text("system", &required("system", system)?)?,
            condition: text("condition", &required("condition", condition)?)?,
            previous_owners: previous_owners.unwrap_or(0),
        })
    }

    /// Materialise the draft as an item owned by `owner_id`.
    #[must_use]
    pub fn into_item(self, id: ItemId, owner_id: UserId, now: DateTime<Utc>) -> Item {
        Item {
            id,
            name: self.name,
            publisher: self.publisher,
            year_published: self.year_published,
            system: self.system,
            condition: self.condition,
            previous_owners: self.previous_owners,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated partial update of an item's attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    /// Replacement title.
    pub name: Option<String>,
    /// Replacement publisher.
    pub publisher: Option<String>,
    /// Replacement publication year.
    pub year_published: Option<i32>,
    /// Replacement platform.
    pub system: Option<String>,
    /// Replacement condition.
    pub condition: Option<String>,
    /// Replacement previous-owner count.
    pub previous_owners: Option<u32>,
}

impl ItemPatch {
    /// Validate the fields that are present; absent fields stay untouched.
    pub fn try_from_fields(fields: ItemFields) -> Result<Self, ItemValidationError> {
        let ItemFields {
            name,
            publisher,
            year_published,
            system,
            condition,
            previous_owners,
        } = fields;
        Ok(Self {
            name: name.map(|value| text("name", &value)).transpose()?,
            publisher: publisher.map(|value| text("publisher", &value)).transpose()?,
            year_published: year_published.map(year).transpose()?,
            system: system.map(|value| text("system", &value)).transpose()?,
            condition: condition.map(|value| text("condition", &value)).transpose()?,
            previous_owners,
        })
    }

    /// Merge the patch into `item`.
    pub fn apply_to(&self, item: &mut Item, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            item.name.clone_from(name);
        }
        if let Some(publisher) = &self.publisher {
            item.publisher.clone_from(publisher);
        }
        if let Some(year_published) = self.year_published {
            item.year_published = year_published;
        }
        if let Some(system) = &self.system {
            item.system.clone_from(system);
        }
        if let Some(condition) = &self.condition {
            item.condition.clone_from(condition);
        }
        if let Some(previous_owners) = self.previous_owners {
            item.previous_owners = previous_owners;
        }
        item.updated_at = now;
    }
}

/// Listing filter. Absent criteria match every item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    name: Option<String>,
    system: Option<String>,
}

impl ItemFilter {
    /// Build a filter; empty strings impose no constraint.
    #[must_use]
    pub fn new(name: Option<String>, system: Option<String>) -> Self {
        Self {
            name: name.filter(|value| !value.is_empty()),
            system: system.filter(|value| !value.is_empty()),
        }
    }

    /// Case-sensitive substring the name must contain.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Exact platform the item must match.
    #[must_use]
    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    /// Whether `item` satisfies every present criterion.
    #[must_use]
    pub fn matches(&self, item: &Item) -> bool {
        self.name().is_none_or(|needle| item.name.contains(needle))
            && self.system().is_none_or(|system| item.system == system)
    }
}
