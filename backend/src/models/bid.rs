use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;
use utoipa::ToSchema;

/// An accepted bid. Bids are only created by a successful `Auction::add_bid`
/// and are never modified afterwards.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    /// Ulid, unique per bid
    pub id: Ulid,
    /// Caller supplied bidder id, not verified.
    pub bidder_id: String,
    /// Display name of the bidder.
    pub bidder_name: String,
    /// Bid amount, in the smallest currency unit.
    pub amount: u64,
    /// Server time of acceptance. Display only, arbitration uses arrival order.
    pub timestamp: DateTime<Utc>,
}

impl Bid {
    pub(crate) fn accept(req: BidRequest, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Ulid::new(),
            bidder_id: req.bidder_id,
            bidder_name: req.bidder_name,
            amount: req.amount,
            timestamp,
        }
    }
}

/// What a bidder offers, before it is validated against an auction.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BidRequest {
    pub bidder_id: String,
    pub bidder_name: String,
    /// Offered amount, in the smallest currency unit.
    pub amount: u64,
}

impl BidRequest {
    #[cfg(test)]
    pub fn new<S: Into<String>>(bidder_id: S, bidder_name: S, amount: u64) -> Self {
        Self {
            bidder_id: bidder_id.into(),
            bidder_name: bidder_name.into(),
            amount,
        }
    }
}
