//! Tests for the trade offer handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::ItemRepository;
use crate::domain::{Item, User};
use crate::inbound::http::test_utils::TestWorld;

struct Trade {
    world: TestWorld,
    ada: User,
    grace: User,
    wanted: Item,
    offered: Item,
}

/// Grace offers her Metroid for Ada's Zelda.
async fn trade() -> Trade {
    let world = TestWorld::new();
    let ada = world.user("Ada").await;
    let grace = world.user("Grace").await;
    let wanted = world.item(&ada.id, "Zelda", "SNES").await;
    let offered = world.item(&grace.id, "Metroid", "NES").await;
    Trade {
        world,
        ada,
        grace,
        wanted,
        offered,
    }
}

async fn owner_of(world: &TestWorld, id: &ItemId) -> crate::domain::UserId {
    ItemRepository::find_by_id(&*world.store, id)
        .await
        .expect("lookup")
        .expect("item present")
        .owner_id
}

#[actix_web::test]
async fn create_accepts_game_aliases_and_returns_pending() {
    let Trade {
        world,
        ada,
        grace,
        wanted,
        offered,
    } = trade().await;
    let app = actix_test::init_service(world.app()).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/offers")
        .insert_header(world.bearer(&grace.id))
        .set_json(json!({
            "requestedGameId": wanted.id.to_string(),
            "offeredGameId": offered.id.to_string()
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let offer: OfferResponse = actix_test::read_body_json(response).await;
    assert_eq!(offer.status, "pending");
    assert_eq!(offer.offered_by, grace.id.to_string());
    assert_eq!(offer.offered_to, ada.id.to_string());
}

#[rstest]
#[case::offering_anothers_item(true, false, StatusCode::FORBIDDEN, "forbidden")]
#[case::trading_with_self(false, true, StatusCode::BAD_REQUEST, "invalid_offer")]
#[actix_web::test]
async fn create_rejects_bad_pairings(
    #[case] offer_wanted: bool,
    #[case] request_own: bool,
    #[case] status: StatusCode,
    #[case] code: &str,
) {
    let Trade {
        world,
        grace,
        wanted,
        offered,
        ..
    } = trade().await;
    let extra = world.item(&grace.id, "Kid Icarus", "NES").await;
    let app = actix_test::init_service(world.app()).await;

    let offered_id = if offer_wanted { wanted.id } else { offered.id };
    let requested_id = if request_own { extra.id } else { wanted.id };
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/offers")
        .insert_header(world.bearer(&grace.id))
        .set_json(json!({
            "requestedItemId": requested_id.to_string(),
            "offeredItemId": offered_id.to_string()
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), status);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], code);
}

/// Create an offer without going through HTTP.
async fn propose(
    world: &TestWorld,
    proposer: &User,
    wanted: &Item,
    offered: &Item,
) -> OfferResponse {
    world
        .state
        .offers
        .create_offer(&proposer.id, &wanted.id, &offered.id)
        .await
        .map(OfferResponse::from)
        .expect("create offer")
}

#[actix_web::test]
async fn incoming_offers_expand_proposer_and_items() {
    let Trade {
        world,
        ada,
        grace,
        wanted,
        offered,
    } = trade().await;
    let app = actix_test::init_service(world.app()).await;
    let created = propose(&world, &grace, &wanted, &offered).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/offers/incoming")
        .insert_header(world.bearer(&ada.id))
        .to_request();
    let incoming: Vec<IncomingOfferResponse> =
        actix_test::call_and_read_body_json(&app, request).await;

    assert_eq!(incoming.len(), 1);
    let entry = &incoming[0];
    assert_eq!(entry.offer.id, created.id);
    assert_eq!(
        entry.proposer.as_ref().map(|p| p.name.as_str()),
        Some("Grace")
    );
    assert_eq!(
        entry.requested_item.as_ref().map(|i| i.name.as_str()),
        Some("Zelda")
    );
    assert_eq!(
        entry.offered_item.as_ref().map(|i| i.name.as_str()),
        Some("Metroid")
    );

    let proposer_view = actix_test::TestRequest::get()
        .uri("/api/v1/offers/incoming")
        .insert_header(world.bearer(&grace.id))
        .to_request();
    let none: Vec<IncomingOfferResponse> =
        actix_test::call_and_read_body_json(&app, proposer_view).await;
    assert!(none.is_empty());
}

#[actix_web::test]
async fn accept_swaps_owners_once() {
    let Trade {
        world,
        ada,
        grace,
        wanted,
        offered,
    } = trade().await;
    let app = actix_test::init_service(world.app()).await;
    let created = propose(&world, &grace, &wanted, &offered).await;
    let uri = format!("/api/v1/offers/{}", created.id);

    let accept = actix_test::TestRequest::put()
        .uri(&uri)
        .insert_header(world.bearer(&ada.id))
        .set_json(json!({"status": "accepted"}))
        .to_request();
    let resolved: OfferResponse = actix_test::call_and_read_body_json(&app, accept).await;
    assert_eq!(resolved.status, "accepted");
    assert_eq!(owner_of(&world, &wanted.id).await, grace.id);
    assert_eq!(owner_of(&world, &offered.id).await, ada.id);

    let again = actix_test::TestRequest::put()
        .uri(&uri)
        .insert_header(world.bearer(&ada.id))
        .set_json(json!({"status": "rejected"}))
        .to_request();
    let response = actix_test::call_service(&app, again).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "already_processed");
    assert_eq!(owner_of(&world, &wanted.id).await, grace.id);
}

#[actix_web::test]
async fn proposer_cannot_resolve_a_settled_offer() {
    let Trade {
        world,
        ada,
        grace,
        wanted,
        offered,
    } = trade().await;
    let app = actix_test::init_service(world.app()).await;
    let created = propose(&world, &grace, &wanted, &offered).await;
    let uri = format!("/api/v1/offers/{}", created.id);

    let accept = actix_test::TestRequest::put()
        .uri(&uri)
        .insert_header(world.bearer(&ada.id))
        .set_json(json!({"status": "accepted"}))
        .to_request();
    let response = actix_test::call_service(&app, accept).await;
    assert_eq!(response.status(), StatusCode::OK);

    let proposer_retry = actix_test::TestRequest::put()
        .uri(&uri)
        .insert_header(world.bearer(&grace.id))
        .set_json(json!({"status": "accepted"}))
        .to_request();
    let response = actix_test::call_service(&app, proposer_retry).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "forbidden");
    assert_eq!(owner_of(&world, &wanted.id).await, grace.id);
    assert_eq!(owner_of(&world, &offered.id).await, ada.id);
}

#[derive(Clone, Copy, Debug)]
enum Caller {
    Recipient,
    Stranger,
}

#[rstest]
#[case::unknown_offer(Caller::Recipient, false, StatusCode::NOT_FOUND, "not_found")]
#[case::stranger(Caller::Stranger, true, StatusCode::FORBIDDEN, "forbidden")]
#[case::recipient(Caller::Recipient, true, StatusCode::BAD_REQUEST, "invalid_request")]
#[actix_web::test]
async fn bodyless_resolve_reports_lookup_and_authorisation_first(
    #[case] caller: Caller,
    #[case] known_offer: bool,
    #[case] status: StatusCode,
    #[case] code: &str,
) {
    let Trade {
        world,
        ada,
        grace,
        wanted,
        offered,
    } = trade().await;
    let app = actix_test::init_service(world.app()).await;
    let created = propose(&world, &grace, &wanted, &offered).await;
    let offer_id = if known_offer {
        created.id
    } else {
        OfferId::random().to_string()
    };
    let caller_id = match caller {
        Caller::Recipient => ada.id,
        Caller::Stranger => world.user("Linus").await.id,
    };

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/offers/{offer_id}"))
        .insert_header(world.bearer(&caller_id))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), status);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], code);
    assert_eq!(owner_of(&world, &wanted.id).await, ada.id);
}

#[rstest]
#[case::proposer_cannot_resolve(false, "accepted", StatusCode::FORBIDDEN, "forbidden")]
#[case::unknown_status(true, "maybe", StatusCode::BAD_REQUEST, "invalid_request")]
#[actix_web::test]
async fn resolve_rejects_bad_callers_and_statuses(
    #[case] as_recipient: bool,
    #[case] status_value: &str,
    #[case] status: StatusCode,
    #[case] code: &str,
) {
    let Trade {
        world,
        ada,
        grace,
        wanted,
        offered,
    } = trade().await;
    let app = actix_test::init_service(world.app()).await;
    let created = propose(&world, &grace, &wanted, &offered).await;
    let caller = if as_recipient { &ada } else { &grace };

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/offers/{}", created.id))
        .insert_header(world.bearer(&caller.id))
        .set_json(json!({"status": status_value}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), status);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], code);
    assert_eq!(owner_of(&world, &wanted.id).await, ada.id);
}

#[actix_web::test]
async fn stale_accept_conflicts_and_leaves_offer_pending() {
    let Trade {
        world,
        ada,
        grace,
        wanted,
        offered,
    } = trade().await;
    let app = actix_test::init_service(world.app()).await;
    let created = propose(&world, &grace, &wanted, &offered).await;

    let linus = world.user("Linus").await;
    let kirby = world.item(&linus.id, "Kirby", "GB").await;
    let rival = propose(&world, &grace, &kirby, &offered).await;
    let rival_id = OfferId::new(&rival.id).expect("offer id");
    world
        .state
        .offers
        .resolve_offer(&rival_id, &linus.id, "accepted")
        .await
        .expect("rival accepted");
    assert_eq!(owner_of(&world, &offered.id).await, linus.id);

    let accept = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/offers/{}", created.id))
        .insert_header(world.bearer(&ada.id))
        .set_json(json!({"status": "accepted"}))
        .to_request();
    let response = actix_test::call_service(&app, accept).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(owner_of(&world, &wanted.id).await, ada.id);

    let listing = actix_test::TestRequest::get()
        .uri("/api/v1/offers/incoming")
        .insert_header(world.bearer(&ada.id))
        .to_request();
    let incoming: Vec<IncomingOfferResponse> =
        actix_test::call_and_read_body_json(&app, listing).await;
    assert_eq!(incoming[0].offer.status, "pending");
}
