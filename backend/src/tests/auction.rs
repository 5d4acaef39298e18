use chrono::{TimeDelta, Utc};
use ulid::Ulid;

use crate::{
    errors::{AuctionError, BidRejection},
    models::{
        auction::{Auction, AuctionStatus, CreateAuctionRequest},
        bid::BidRequest,
    },
};

fn vase() -> Auction {
    Auction::new(Ulid::new(), CreateAuctionRequest::new("Vase", 10))
}

fn active_vase() -> Auction {
    let mut auction = vase();
    auction
        .start(Utc::now(), TimeDelta::minutes(5))
        .expect("waiting auction starts");
    auction
}

fn bid(amount: u64) -> BidRequest {
    BidRequest::new("bidder-1", "Alice", amount)
}

#[test]
fn test_new_auction_is_waiting() {
    let auction = vase();

    assert_eq!(auction.status(), AuctionStatus::Waiting);
    assert_eq!(auction.title(), "Vase");
    assert_eq!(auction.description(), "");
    assert_eq!(auction.image_url(), None);
    assert_eq!(auction.starting_price(), 10);
    assert_eq!(auction.current_price(), 10);
    assert!(auction.bids().is_empty());
    assert!(auction.winner().is_none());
    assert!(auction.end_time().is_none());
}

#[test]
fn test_start_sets_end_time() {
    let mut auction = vase();
    let now = Utc::now();

    auction.start(now, TimeDelta::minutes(5)).unwrap();

    assert_eq!(auction.status(), AuctionStatus::Active);
    assert_eq!(auction.end_time(), Some(now + TimeDelta::minutes(5)));
}

#[test]
fn test_start_twice_is_invalid_transition() {
    let mut auction = active_vase();
    let end_time = auction.end_time();

    let err = auction
        .start(Utc::now() + TimeDelta::minutes(1), TimeDelta::minutes(5))
        .unwrap_err();

    assert_eq!(
        err,
        AuctionError::InvalidTransition {
            status: AuctionStatus::Active,
        }
    );
    assert_eq!(err.to_string(), "Cannot start auction, it is already active");
    assert_eq!(auction.end_time(), end_time);
}

#[test]
fn test_start_with_unrepresentable_end_time() {
    let mut auction = vase();

    let err = auction.start(Utc::now(), TimeDelta::MAX).unwrap_err();

    assert_eq!(err, AuctionError::EndTimeOutOfRange(auction.id().to_string()));
    assert_eq!(auction.status(), AuctionStatus::Waiting);
    assert!(auction.end_time().is_none());

    // Still startable with a sane duration.
    auction.start(Utc::now(), TimeDelta::minutes(5)).unwrap();
    assert_eq!(auction.status(), AuctionStatus::Active);
}

#[test]
fn test_start_after_finish_is_invalid_transition() {
    let mut auction = active_vase();
    auction.finish();

    let err = auction.start(Utc::now(), TimeDelta::minutes(5)).unwrap_err();

    assert!(matches!(
        err,
        AuctionError::InvalidTransition {
            status: AuctionStatus::Finished,
        }
    ));
    assert_eq!(auction.status(), AuctionStatus::Finished);
}

#[test]
fn test_bid_rejected_unless_active() {
    let mut waiting = vase();
    assert_eq!(
        waiting.add_bid(bid(1_000), Utc::now()),
        Err(BidRejection::NotActive(AuctionStatus::Waiting))
    );

    let mut finished = active_vase();
    finished.finish();
    assert_eq!(
        finished.add_bid(bid(1_000), Utc::now()),
        Err(BidRejection::NotActive(AuctionStatus::Finished))
    );

    assert!(waiting.bids().is_empty());
    assert!(finished.bids().is_empty());
    assert_eq!(finished.current_price(), 10);
}

#[test]
fn test_bid_must_exceed_current_price() {
    let mut auction = active_vase();

    assert_eq!(
        auction.add_bid(bid(10), Utc::now()),
        Err(BidRejection::TooLow {
            amount: 10,
            current_price: 10
        })
    );
    assert_eq!(
        auction.add_bid(bid(3), Utc::now()),
        Err(BidRejection::TooLow {
            amount: 3,
            current_price: 10
        })
    );
    assert!(auction.bids().is_empty());

    let accepted = auction.add_bid(bid(11), Utc::now()).unwrap();
    assert_eq!(accepted.amount, 11);
    assert_eq!(accepted.bidder_name, "Alice");
    assert_eq!(auction.current_price(), 11);
    assert_eq!(auction.bids(), &[accepted]);
}

#[test]
fn test_price_tracks_last_bid() {
    let mut auction = active_vase();

    for amount in [12, 11, 15, 15, 30, 29, 31] {
        let before = auction.current_price();
        match auction.add_bid(bid(amount), Utc::now()) {
            Ok(accepted) => assert!(accepted.amount > before),
            Err(_) => assert_eq!(auction.current_price(), before),
        }
        assert!(auction.current_price() >= before);
        let last = auction.bids().last().map(|b| b.amount);
        assert_eq!(auction.current_price(), last.unwrap_or(auction.starting_price()));
    }

    let amounts: Vec<u64> = auction.bids().iter().map(|b| b.amount).collect();
    assert_eq!(amounts, vec![12, 15, 30, 31]);
}

#[test]
fn test_finish_picks_last_bid() {
    let mut auction = active_vase();
    auction.add_bid(bid(15), Utc::now()).unwrap();
    let last = auction
        .add_bid(BidRequest::new("bidder-2", "Bob", 20), Utc::now())
        .unwrap();

    assert!(auction.finish());
    assert_eq!(auction.status(), AuctionStatus::Finished);
    assert_eq!(auction.winner(), Some(&last));

    // Finishing again changes nothing.
    assert!(!auction.finish());
    assert_eq!(auction.winner(), Some(&last));
}

#[test]
fn test_finish_without_bids_has_no_winner() {
    let mut auction = active_vase();

    assert!(auction.finish());
    assert!(auction.winner().is_none());
    assert!(!auction.finish());
    assert!(auction.winner().is_none());
}

#[test]
fn test_finish_from_waiting() {
    let mut auction = vase();

    assert!(auction.finish());
    assert_eq!(auction.status(), AuctionStatus::Finished);
    assert!(auction.winner().is_none());
    assert!(auction.end_time().is_none());
}

#[test]
fn test_is_expired() {
    let now = Utc::now();
    let mut auction = vase();
    assert!(!auction.is_expired(now + TimeDelta::hours(1)));

    auction.start(now, TimeDelta::minutes(5)).unwrap();
    assert!(!auction.is_expired(now + TimeDelta::minutes(4)));
    assert!(auction.is_expired(now + TimeDelta::minutes(5)));

    auction.finish();
    assert!(!auction.is_expired(now + TimeDelta::minutes(10)));
}

#[test]
fn test_auction_wire_format() {
    let mut auction = active_vase();
    auction.add_bid(bid(15), Utc::now()).unwrap();

    let value = serde_json::to_value(&auction).unwrap();

    assert_eq!(value["status"], "active");
    assert_eq!(value["startingPrice"], 10);
    assert_eq!(value["currentPrice"], 15);
    assert_eq!(value["bids"][0]["bidderName"], "Alice");
    assert!(value["winner"].is_null());
    assert!(value["endTime"].is_string());
}
