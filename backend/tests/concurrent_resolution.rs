//! Racing resolutions of one offer settle exactly once.

use backend::domain::ErrorCode;
use backend::test_support::TestExchange;
use rstest::rstest;

const RACERS: usize = 8;

#[rstest]
#[case::all_accept(&["accepted"])]
#[case::accept_and_reject(&["accepted", "rejected"])]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn only_one_resolution_wins(#[case] decisions: &[&str]) {
    let exchange = TestExchange::new();
    let ada = exchange.seed_user("Ada").await;
    let grace = exchange.seed_user("Grace").await;
    let zelda = exchange.seed_item(&ada.id, "Zelda", "SNES").await;
    let metroid = exchange.seed_item(&grace.id, "Metroid", "NES").await;
    let offer = exchange
        .state
        .offers
        .create_offer(&grace.id, &zelda.id, &metroid.id)
        .await
        .expect("create offer");

    let mut handles = Vec::with_capacity(RACERS);
    for racer in 0..RACERS {
        let offers = exchange.state.offers.clone();
        let decision = decisions[racer % decisions.len()].to_owned();
        let (offer_id, recipient) = (offer.id, ada.id);
        handles.push(tokio::spawn(async move {
            offers.resolve_offer(&offer_id, &recipient, &decision).await
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        match handle.await.expect("task joined") {
            Ok(resolved) => winners.push(resolved),
            Err(err) => assert_eq!(err.code(), ErrorCode::AlreadyProcessed, "{err}"),
        }
    }

    assert_eq!(winners.len(), 1);
    let swapped = winners[0].status.as_str() == "accepted";
    let (zelda_owner, metroid_owner) = if swapped {
        (grace.id, ada.id)
    } else {
        (ada.id, grace.id)
    };
    assert_eq!(exchange.owner_of(&zelda.id).await, Some(zelda_owner));
    assert_eq!(exchange.owner_of(&metroid.id).await, Some(metroid_owner));
}
