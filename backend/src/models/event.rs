//! Messages exchanged over the realtime socket.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        INTERNAL_MESSAGE, INVALID_BID_MESSAGE, INVALID_TRANSITION_MESSAGE, MALFORMED_MESSAGE,
        NOT_FOUND_MESSAGE,
    },
    errors::AuctionError,
};

use super::{auction::Auction, bid::Bid};

/// Inbound events sent by bidders and displays.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    JoinAuction { auction_id: String },
    LeaveAuction { auction_id: String },
    PlaceBid(PlaceBid),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBid {
    pub auction_id: String,
    pub bidder_id: String,
    pub bidder_name: String,
    pub amount: u64,
}

/// Outbound events.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Full snapshot, sent only to a channel that just joined.
    AuctionData(Auction),
    /// Broadcast to the room after an accepted bid.
    NewBid { auction: Auction, bid: Bid },
    AuctionStarted(Auction),
    AuctionFinished(Auction),
    /// Private to the channel whose request failed.
    Error(ErrorMessage),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ServerEvent {
    pub fn error<S: Into<String>>(message: S, detail: Option<String>) -> Self {
        Self::Error(ErrorMessage {
            message: message.into(),
            detail,
        })
    }

    pub fn malformed(detail: String) -> Self {
        Self::error(MALFORMED_MESSAGE, Some(detail))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::AuctionData(_) => "auctionData",
            ServerEvent::NewBid { .. } => "newBid",
            ServerEvent::AuctionStarted(_) => "auctionStarted",
            ServerEvent::AuctionFinished(_) => "auctionFinished",
            ServerEvent::Error(_) => "error",
        }
    }
}

impl From<&AuctionError> for ServerEvent {
    fn from(value: &AuctionError) -> Self {
        let message = match value {
            AuctionError::NotFound(_) => NOT_FOUND_MESSAGE,
            AuctionError::InvalidTransition { .. } => INVALID_TRANSITION_MESSAGE,
            AuctionError::Rejected(_) => INVALID_BID_MESSAGE,
            AuctionError::EndTimeOutOfRange(_) => INTERNAL_MESSAGE,
        };
        Self::error(message, Some(value.to_string()))
    }
}
