//! Internal Diesel row structs.
//!
//! Rows never cross into the domain. Conversions validate stored values and
//! report a `String` describing the first inconsistency so each repository
//! can wrap it in its own error type.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    EmailAddress, Item, ItemId, ItemPatch, OfferId, OfferStatus, PasswordHash, StreetAddress,
    TradeOffer, User, UserAccount, UserId, UserName, UserValidationError,
};

use super::schema::{items, trade_offers, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub address: String,
}

impl UserRow {
    pub(crate) fn into_account(self) -> Result<UserAccount, String> {
        let id = self.id;
        let invalid = |err: UserValidationError| format!("stored user {id} is invalid: {err}");
        let user = User {
            id: UserId::from_uuid(self.id),
            name: UserName::new(&self.name).map_err(invalid)?,
            email: EmailAddress::new(&self.email).map_err(invalid)?,
            address: StreetAddress::new(&self.address).map_err(invalid)?,
        };
        Ok(UserAccount {
            user,
            password_hash: PasswordHash::new(self.password_hash),
        })
    }

    pub(crate) fn into_user(self) -> Result<User, String> {
        self.into_account().map(|account| account.user)
    }
}

/// Insertable struct for new accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub address: &'a str,
}

impl<'a> From<&'a UserAccount> for NewUserRow<'a> {
    fn from(account: &'a UserAccount) -> Self {
        Self {
            id: *account.user.id.as_uuid(),
            name: account.user.name.as_str(),
            email: account.user.email.as_str(),
            password_hash: account.password_hash.as_str(),
            address: account.user.address.as_str(),
        }
    }
}

/// Partial profile changeset. `None` columns are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct ProfileChangeset<'a> {
    pub name: Option<&'a str>,
    pub address: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Row struct for reading from the items table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ItemRow {
    pub id: Uuid,
    pub name: String,
    pub publisher: String,
    pub year_published: i32,
    pub system: String,
    pub condition: String,
    pub previous_owners: i32,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = String;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let previous_owners = u32::try_from(row.previous_owners).map_err(|_| {
            format!(
                "stored item {} has negative previous_owners {}",
                row.id, row.previous_owners
            )
        })?;
        Ok(Self {
            id: ItemId::from_uuid(row.id),
            name: row.name,
            publisher: row.publisher,
            year_published: row.year_published,
            system: row.system,
            condition: row.condition,
            previous_owners,
            owner_id: UserId::from_uuid(row.owner_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for new items.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = items)]
pub(crate) struct NewItemRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub publisher: &'a str,
    pub year_published: i32,
    pub system: &'a str,
    pub condition: &'a str,
    pub previous_owners: i32,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> TryFrom<&'a Item> for NewItemRow<'a> {
    type Error = String;

    fn try_from(item: &'a Item) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *item.id.as_uuid(),
            name: &item.name,
            publisher: &item.publisher,
            year_published: item.year_published,
            system: &item.system,
            condition: &item.condition,
            previous_owners: previous_owners_for_db(item.previous_owners)?,
            owner_id: *item.owner_id.as_uuid(),
            created_at: item.created_at,
            updated_at: item.updated_at,
        })
    }
}

/// Attribute changeset built from an [`ItemPatch`]. Never touches the owner.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = items)]
pub(crate) struct ItemChangeset<'a> {
    pub name: Option<&'a str>,
    pub publisher: Option<&'a str>,
    pub year_published: Option<i32>,
    pub system: Option<&'a str>,
    pub condition: Option<&'a str>,
    pub previous_owners: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> ItemChangeset<'a> {
    pub(crate) fn from_patch(patch: &'a ItemPatch, now: DateTime<Utc>) -> Result<Self, String> {
        Ok(Self {
            name: patch.name.as_deref(),
            publisher: patch.publisher.as_deref(),
            year_published: patch.year_published,
            system: patch.system.as_deref(),
            condition: patch.condition.as_deref(),
            previous_owners: patch.previous_owners.map(previous_owners_for_db).transpose()?,
            updated_at: now,
        })
    }
}

fn previous_owners_for_db(count: u32) -> Result<i32, String> {
    i32::try_from(count).map_err(|_| format!("previous_owners {count} exceeds storage range"))
}

// ---------------------------------------------------------------------------
// Trade offers
// ---------------------------------------------------------------------------

/// Row struct for reading from the trade_offers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = trade_offers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TradeOfferRow {
    pub id: Uuid,
    pub offered_by: Uuid,
    pub offered_to: Uuid,
    pub requested_item: Uuid,
    pub offered_item: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TradeOfferRow> for TradeOffer {
    type Error = String;

    fn try_from(row: TradeOfferRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<OfferStatus>()
            .map_err(|err| format!("stored offer {} is invalid: {err}", row.id))?;
        Ok(Self {
            id: OfferId::from_uuid(row.id),
            offered_by: UserId::from_uuid(row.offered_by),
            offered_to: UserId::from_uuid(row.offered_to),
            requested_item: ItemId::from_uuid(row.requested_item),
            offered_item: ItemId::from_uuid(row.offered_item),
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for new offers.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = trade_offers)]
pub(crate) struct NewTradeOfferRow {
    pub id: Uuid,
    pub offered_by: Uuid,
    pub offered_to: Uuid,
    pub requested_item: Uuid,
    pub offered_item: Uuid,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&TradeOffer> for NewTradeOfferRow {
    fn from(offer: &TradeOffer) -> Self {
        Self {
            id: *offer.id.as_uuid(),
            offered_by: *offer.offered_by.as_uuid(),
            offered_to: *offer.offered_to.as_uuid(),
            requested_item: *offer.requested_item.as_uuid(),
            offered_item: *offer.offered_item.as_uuid(),
            status: offer.status.as_str(),
            created_at: offer.created_at,
            updated_at: offer.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn item_row(previous_owners: i32) -> ItemRow {
        let now = Utc::now();
        ItemRow {
            id: Uuid::new_v4(),
            name: "Chrono Trigger".to_owned(),
            publisher: "Square".to_owned(),
            year_published: 1995,
            system: "SNES".to_owned(),
            condition: "Good".to_owned(),
            previous_owners,
            owner_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn item_row_converts_to_domain() {
        let row = item_row(2);
        let owner = row.owner_id;
        let item = Item::try_from(row).expect("valid row");
        assert_eq!(item.previous_owners, 2);
        assert_eq!(item.owner_id, UserId::from_uuid(owner));
    }

    #[rstest]
    fn negative_previous_owners_is_rejected() {
        let err = Item::try_from(item_row(-1)).expect_err("negative count");
        assert!(err.contains("negative previous_owners"));
    }

    #[rstest]
    #[case("pending", Some(OfferStatus::Pending))]
    #[case("accepted", Some(OfferStatus::Accepted))]
    #[case("cancelled", None)]
    fn offer_status_is_parsed(#[case] stored: &str, #[case] expected: Option<OfferStatus>) {
        let now = Utc::now();
        let row = TradeOfferRow {
            id: Uuid::new_v4(),
            offered_by: Uuid::new_v4(),
            offered_to: Uuid::new_v4(),
            requested_item: Uuid::new_v4(),
            offered_item: Uuid::new_v4(),
            status: stored.to_owned(),
            created_at: now,
            updated_at: now,
        };
        let converted = TradeOffer::try_from(row).ok().map(|offer| offer.status);
        assert_eq!(converted, expected);
    }

    #[rstest]
    fn blank_stored_name_is_reported() {
        let row = UserRow {
            id: Uuid::new_v4(),
            name: "  ".to_owned(),
            email: "ada@example.com".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            address: "1 Analytical Row".to_owned(),
        };
        let err = row.into_user().expect_err("blank name");
        assert!(err.contains("name must not be empty"));
    }
}
