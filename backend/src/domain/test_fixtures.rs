//! Shared builders for domain unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::{Item, ItemDraft, ItemFields, ItemId, TradeOffer, UserId};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn item_owned_by(owner: UserId, name: &str) -> Item {
    ItemDraft::try_from_fields(ItemFields {
        name: Some(name.to_owned()),
        publisher: Some("Nintendo".to_owned()),
        year_published: Some(1990),
        system: Some("SNES".to_owned()),
        condition: Some("Good".to_owned()),
        previous_owners: None,
    })
    .expect("valid fixture item")
    .into_item(ItemId::random(), owner, fixture_timestamp())
}

pub(crate) fn pending_offer(requested: &Item, offered: &Item) -> TradeOffer {
    TradeOffer::propose(
        super::OfferId::random(),
        offered.owner_id,
        requested,
        offered,
        fixture_timestamp(),
    )
}
