//! Integration tests for `DieselTradeOfferRepository` against embedded
//! PostgreSQL.
//!
//! Resolution is one transaction: the status compare-and-swap plus both
//! owner-conditioned item moves. These tests check that an accept commits all
//! of it and that every failure leaves the rows as they were.

use backend::domain::ports::{
    ItemRepository, TradeOfferRepository, TradeOfferRepositoryError, UserRepository,
};
use backend::domain::{
    EmailAddress, Item, ItemDraft, ItemFields, ItemId, OfferDecision, OfferId, OfferResolution,
    OfferStatus, PasswordHash, StreetAddress, TradeOffer, User, UserAccount, UserId, UserName,
};
use backend::outbound::persistence::{
    DbPool, DieselItemRepository, DieselTradeOfferRepository, DieselUserRepository, PoolConfig,
};
use chrono::Utc;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

mod support;

use support::{handle_cluster_setup_failure, migrated_database};

struct TestContext {
    runtime: Runtime,
    users: DieselUserRepository,
    items: DieselItemRepository,
    offers: DieselTradeOfferRepository,
    _database: TemporaryDatabase,
}

impl TestContext {
    fn user(&self, name: &str) -> User {
        let user = User {
            id: UserId::random(),
            name: UserName::new(name).expect("name"),
            email: EmailAddress::new(&format!("{}@example.com", name.to_lowercase()))
                .expect("email"),
            address: StreetAddress::new("1 Test Street").expect("address"),
        };
        let account = UserAccount {
            user: user.clone(),
            password_hash: PasswordHash::new("$argon2id$unused"),
        };
        self.runtime
            .block_on(self.users.insert(&account))
            .expect("insert user");
        user
    }

    fn item(&self, owner: &User, name: &str) -> Item {
        let item = ItemDraft::try_from_fields(ItemFields {
            name: Some(name.to_owned()),
            publisher: Some("Nintendo".to_owned()),
            year_published: Some(1991),
            system: Some("SNES".to_owned()),
            condition: Some("Boxed".to_owned()),
            previous_owners: None,
        })
        .expect("draft")
        .into_item(ItemId::random(), owner.id, Utc::now());
        self.runtime
            .block_on(self.items.insert(&item))
            .expect("insert item");
        item
    }

    fn offer(&self, proposer: &User, requested: &Item, offered: &Item) -> TradeOffer {
        let offer =
            TradeOffer::propose(OfferId::random(), proposer.id, requested, offered, Utc::now());
        self.runtime
            .block_on(self.offers.insert(&offer))
            .expect("insert offer");
        offer
    }

    fn resolve(
        &self,
        offer: &TradeOffer,
        decision: OfferDecision,
    ) -> Result<TradeOffer, TradeOfferRepositoryError> {
        let resolution = OfferResolution {
            offer: offer.clone(),
            decision,
            resolved_at: Utc::now(),
        };
        self.runtime.block_on(self.offers.resolve(&resolution))
    }

    fn owner_of(&self, item: &Item) -> Option<UserId> {
        self.runtime
            .block_on(self.items.find_by_id(&item.id))
            .expect("item lookup")
            .map(|stored| stored.owner_id)
    }

    fn status_of(&self, offer: &TradeOffer) -> OfferStatus {
        self.runtime
            .block_on(self.offers.find_by_id(&offer.id))
            .expect("offer lookup")
            .expect("offer stored")
            .status
    }
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let database = migrated_database(&runtime)?;

    let config = PoolConfig::new(database.url())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        users: DieselUserRepository::new(pool.clone()),
        items: DieselItemRepository::new(pool.clone()),
        offers: DieselTradeOfferRepository::new(pool),
        _database: database,
    })
}

/// Ada owns Zelda, Grace owns Metroid, and Grace has offered Metroid for Zelda.
struct Trade {
    context: TestContext,
    ada: User,
    grace: User,
    zelda: Item,
    metroid: Item,
    offer: TradeOffer,
}

#[fixture]
fn trade() -> Option<Trade> {
    let context = match setup_context() {
        Ok(context) => context,
        Err(reason) => return handle_cluster_setup_failure(reason),
    };
    let ada = context.user("Ada");
    let grace = context.user("Grace");
    let zelda = context.item(&ada, "Zelda");
    let metroid = context.item(&grace, "Metroid");
    let offer = context.offer(&grace, &zelda, &metroid);
    Some(Trade {
        context,
        ada,
        grace,
        zelda,
        metroid,
        offer,
    })
}

#[rstest]
fn accept_swaps_both_owners(trade: Option<Trade>) {
    let Some(Trade {
        context,
        ada,
        grace,
        zelda,
        metroid,
        offer,
    }) = trade
    else {
        eprintln!("SKIP-TEST-CLUSTER: accept_swaps_both_owners skipped");
        return;
    };

    let resolved = context
        .resolve(&offer, OfferDecision::Accept)
        .expect("accepted");

    assert_eq!(resolved.status, OfferStatus::Accepted);
    assert_eq!(context.owner_of(&zelda), Some(grace.id));
    assert_eq!(context.owner_of(&metroid), Some(ada.id));
    assert_eq!(context.status_of(&offer), OfferStatus::Accepted);
}

#[derive(Clone, Copy, Debug)]
enum Staleness {
    RequestedItemDeleted,
    OfferedItemTradedAway,
}

#[rstest]
#[case::requested_item_deleted(Staleness::RequestedItemDeleted)]
#[case::offered_item_traded_away(Staleness::OfferedItemTradedAway)]
fn stale_accept_rolls_back_and_leaves_offer_pending(
    trade: Option<Trade>,
    #[case] staleness: Staleness,
) {
    let Some(Trade {
        context,
        ada,
        grace,
        zelda,
        metroid,
        offer,
    }) = trade
    else {
        eprintln!("SKIP-TEST-CLUSTER: stale_accept_rolls_back_and_leaves_offer_pending skipped");
        return;
    };

    let stale_item = match staleness {
        Staleness::RequestedItemDeleted => {
            let deleted = context
                .runtime
                .block_on(context.items.delete_owned(&zelda.id, &ada.id))
                .expect("delete");
            assert!(deleted);
            zelda.id
        }
        Staleness::OfferedItemTradedAway => {
            let linus = context.user("Linus");
            let kirby = context.item(&linus, "Kirby");
            let rival = context.offer(&grace, &kirby, &metroid);
            context
                .resolve(&rival, OfferDecision::Accept)
                .expect("rival accepted");
            metroid.id
        }
    };

    let err = context
        .resolve(&offer, OfferDecision::Accept)
        .expect_err("stale accept");

    assert_eq!(err, TradeOfferRepositoryError::stale_item(stale_item.to_string()));
    assert_eq!(context.status_of(&offer), OfferStatus::Pending);
    if matches!(staleness, Staleness::OfferedItemTradedAway) {
        assert_eq!(context.owner_of(&zelda), Some(ada.id));
    } else {
        assert_eq!(context.owner_of(&metroid), Some(grace.id));
    }
}

#[rstest]
#[case::after_accept(OfferDecision::Accept, "accepted")]
#[case::after_reject(OfferDecision::Reject, "rejected")]
fn second_resolution_reports_the_winning_status(
    trade: Option<Trade>,
    #[case] first: OfferDecision,
    #[case] recorded: &str,
) {
    let Some(Trade {
        context,
        ada,
        grace,
        zelda,
        metroid,
        offer,
    }) = trade
    else {
        eprintln!("SKIP-TEST-CLUSTER: second_resolution_reports_the_winning_status skipped");
        return;
    };

    context.resolve(&offer, first).expect("first resolution");
    let (zelda_owner, metroid_owner) = (context.owner_of(&zelda), context.owner_of(&metroid));

    let err = context
        .resolve(&offer, OfferDecision::Accept)
        .expect_err("already resolved");

    assert_eq!(err, TradeOfferRepositoryError::already_resolved(recorded));
    assert_eq!(context.owner_of(&zelda), zelda_owner);
    assert_eq!(context.owner_of(&metroid), metroid_owner);
    let expected_zelda = if first == OfferDecision::Accept {
        grace.id
    } else {
        ada.id
    };
    assert_eq!(zelda_owner, Some(expected_zelda));
}

#[rstest]
fn unknown_offer_is_not_found(trade: Option<Trade>) {
    let Some(Trade {
        context,
        grace,
        zelda,
        metroid,
        ..
    }) = trade
    else {
        eprintln!("SKIP-TEST-CLUSTER: unknown_offer_is_not_found skipped");
        return;
    };

    let unsaved = TradeOffer::propose(OfferId::random(), grace.id, &zelda, &metroid, Utc::now());
    let err = context
        .resolve(&unsaved, OfferDecision::Accept)
        .expect_err("missing offer");

    assert_eq!(err, TradeOfferRepositoryError::not_found(unsaved.id.to_string()));
    assert_eq!(context.owner_of(&zelda), Some(zelda.owner_id));
}
