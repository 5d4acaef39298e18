use core::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;
use utoipa::ToSchema;

use crate::errors::{AuctionError, BidRejection};

use super::bid::{Bid, BidRequest};

pub type AuctionId = Ulid;

/// Auction lifecycle. Transitions only move forward:
/// `waiting -> active -> finished`, or `waiting -> finished` on early termination.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    Waiting,
    Active,
    Finished,
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let out = match *self {
            AuctionStatus::Waiting => "waiting",
            AuctionStatus::Active => "active",
            AuctionStatus::Finished => "finished",
        };
        write!(f, "{}", out)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Auction {
    /// Ulid, assigned at creation
    #[schema(value_type = String, format = Ulid)]
    id: AuctionId,
    /// Auction title
    title: String,
    /// Auction description
    description: String,
    /// Picture of the lot, if any
    image_url: Option<String>,
    /// Price the auction opens at, in the smallest currency unit (e.g. cents)
    starting_price: u64,
    /// Amount of the last accepted bid, or the starting price, in the smallest currency unit
    current_price: u64,
    /// Lifecycle state, see enum def.
    status: AuctionStatus,
    /// Accepted bids in acceptance order
    bids: Vec<Bid>,
    /// Last accepted bid, set once finished
    winner: Option<Bid>,
    /// Some once started
    end_time: Option<DateTime<Utc>>,
}

impl Auction {
    pub fn new(id: AuctionId, req: CreateAuctionRequest) -> Self {
        Self {
            id,
            title: req.title,
            description: req.description,
            image_url: req.image_url,
            starting_price: req.starting_price,
            current_price: req.starting_price,
            status: AuctionStatus::Waiting,
            bids: Vec::new(),
            winner: None,
            end_time: None,
        }
    }

    pub fn id(&self) -> AuctionId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    #[cfg(test)]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[cfg(test)]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn starting_price(&self) -> u64 {
        self.starting_price
    }

    pub fn current_price(&self) -> u64 {
        self.current_price
    }

    pub fn status(&self) -> AuctionStatus {
        self.status
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    pub fn winner(&self) -> Option<&Bid> {
        self.winner.as_ref()
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Opens the auction for bidding until `now + duration`.
    ///
    /// Only legal from `waiting`. Any other state is left untouched and reported
    /// as [`AuctionError::InvalidTransition`]. An end time past the representable
    /// range leaves the auction waiting.
    pub fn start(&mut self, now: DateTime<Utc>, duration: TimeDelta) -> Result<(), AuctionError> {
        if self.status != AuctionStatus::Waiting {
            return Err(AuctionError::InvalidTransition {
                status: self.status,
            });
        }
        let end_time = now
            .checked_add_signed(duration)
            .ok_or_else(|| AuctionError::EndTimeOutOfRange(self.id.to_string()))?;
        self.status = AuctionStatus::Active;
        self.end_time = Some(end_time);
        Ok(())
    }

    /// Closes the auction and records the last accepted bid as the winner.
    ///
    /// Allowed from `active` and, for early termination, from `waiting`.
    /// Returns `false` without touching anything if the auction is already finished.
    pub fn finish(&mut self) -> bool {
        if self.status == AuctionStatus::Finished {
            return false;
        }
        self.status = AuctionStatus::Finished;
        // Bids only ever raise the price, so the last one is also the highest.
        self.winner = self.bids.last().cloned();
        true
    }

    /// Validates `req` against the current price and appends it on success.
    ///
    /// The caller must hold exclusive access to the auction for the whole call;
    /// the store's `mutate` provides that.
    pub fn add_bid(&mut self, req: BidRequest, now: DateTime<Utc>) -> Result<Bid, BidRejection> {
        if self.status != AuctionStatus::Active {
            return Err(BidRejection::NotActive(self.status));
        }
        if req.amount <= self.current_price {
            return Err(BidRejection::TooLow {
                amount: req.amount,
                current_price: self.current_price,
            });
        }

        let bid = Bid::accept(req, now);
        self.current_price = bid.amount;
        self.bids.push(bid.clone());
        Ok(bid)
    }

    /// Active auction whose advertised end time has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == AuctionStatus::Active && self.end_time.is_some_and(|end| end <= now)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuctionRequest {
    /// Auction title, required
    pub title: String,
    /// Auction description
    #[serde(default)]
    pub description: String,
    /// Opening price, in the smallest currency unit (e.g. cents)
    pub starting_price: u64,
    /// Picture of the lot
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CreateAuctionRequest {
    #[cfg(test)]
    pub fn new<S: Into<String>>(title: S, starting_price: u64) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            starting_price,
            image_url: None,
        }
    }
}
