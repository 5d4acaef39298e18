use chrono::Utc;
use serde_json::json;
use ulid::Ulid;

use crate::models::{
    auction::{Auction, CreateAuctionRequest},
    bid::{Bid, BidRequest},
    event::{ClientEvent, PlaceBid, ServerEvent},
};

#[test]
fn test_decode_join_and_leave() {
    let id = Ulid::new().to_string();

    let join: ClientEvent =
        serde_json::from_value(json!({"event": "joinAuction", "data": {"auctionId": id}})).unwrap();
    let leave: ClientEvent =
        serde_json::from_value(json!({"event": "leaveAuction", "data": {"auctionId": id}})).unwrap();

    assert_eq!(join, ClientEvent::JoinAuction { auction_id: id.clone() });
    assert_eq!(leave, ClientEvent::LeaveAuction { auction_id: id });
}

#[test]
fn test_decode_place_bid() {
    let frame = r#"{"event":"placeBid","data":{"auctionId":"01JFDQ42PN3MDE6QMPZ98TCTJE","bidderId":"b-1","bidderName":"Alice","amount":1500}}"#;

    let event: ClientEvent = serde_json::from_str(frame).unwrap();

    assert_eq!(
        event,
        ClientEvent::PlaceBid(PlaceBid {
            auction_id: "01JFDQ42PN3MDE6QMPZ98TCTJE".to_string(),
            bidder_id: "b-1".to_string(),
            bidder_name: "Alice".to_string(),
            amount: 1500,
        })
    );
}

#[test]
fn test_reject_bad_amounts() {
    for amount in [json!(-5), json!(15.5), json!("15"), json!(null)] {
        let frame = json!({
            "event": "placeBid",
            "data": {"auctionId": "x", "bidderId": "b-1", "bidderName": "Alice", "amount": amount},
        });

        assert!(
            serde_json::from_value::<ClientEvent>(frame).is_err(),
            "amount {} should not decode",
            amount
        );
    }
}

#[test]
fn test_reject_unknown_or_snake_case_events() {
    let frames = [
        json!({"event": "startAuction", "data": {"auctionId": "x"}}),
        json!({"event": "join_auction", "data": {"auctionId": "x"}}),
        json!({"event": "joinAuction", "data": {"auction_id": "x"}}),
        json!({"event": "joinAuction"}),
    ];

    for frame in frames {
        assert!(serde_json::from_value::<ClientEvent>(frame).is_err());
    }
}

#[test]
fn test_encode_server_events() {
    let mut auction = Auction::new(Ulid::new(), CreateAuctionRequest::new("Vase", 10));
    auction.start(Utc::now(), chrono::TimeDelta::minutes(5)).unwrap();
    let bid: Bid = auction
        .add_bid(BidRequest::new("b-1", "Alice", 15), Utc::now())
        .unwrap();

    let value = serde_json::to_value(ServerEvent::NewBid {
        auction: auction.clone(),
        bid,
    })
    .unwrap();
    assert_eq!(value["event"], "newBid");
    assert_eq!(value["data"]["auction"]["currentPrice"], 15);
    assert_eq!(value["data"]["bid"]["bidderName"], "Alice");
    assert_eq!(value["data"]["bid"]["amount"], 15);

    for (event, name) in [
        (ServerEvent::AuctionData(auction.clone()), "auctionData"),
        (ServerEvent::AuctionStarted(auction.clone()), "auctionStarted"),
        (ServerEvent::AuctionFinished(auction), "auctionFinished"),
    ] {
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], name);
        assert_eq!(event.name(), name);
        assert_eq!(value["data"]["status"], "active");
    }
}

#[test]
fn test_encode_error_event() {
    let value = serde_json::to_value(ServerEvent::error("invalid bid", None)).unwrap();
    assert_eq!(value, json!({"event": "error", "data": {"message": "invalid bid"}}));

    let value =
        serde_json::to_value(ServerEvent::error("invalid bid", Some("too low".to_string())))
            .unwrap();
    assert_eq!(value["data"]["detail"], "too low");
}
