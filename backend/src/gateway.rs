use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};

use crate::{
    errors::AuctionError,
    models::{
        auction::{Auction, AuctionId, CreateAuctionRequest},
        bid::{Bid, BidRequest},
        event::{ClientEvent, PlaceBid, ServerEvent},
    },
    rooms::{Rooms, Subscriber},
    store::{AuctionStore, MemoryStore},
};

/// Per-connection state owned by the connection task.
#[derive(Debug)]
pub struct Session {
    subscriber: Subscriber,
    joined: HashSet<AuctionId>,
}

impl Session {
    pub fn new(subscriber: Subscriber) -> Self {
        Self {
            subscriber,
            joined: HashSet::new(),
        }
    }

    pub fn subscriber(&self) -> &Subscriber {
        &self.subscriber
    }

    pub fn joined(&self) -> impl Iterator<Item = &AuctionId> {
        self.joined.iter()
    }
}

fn parse_auction_id(raw: &str) -> Result<AuctionId, AuctionError> {
    AuctionId::from_string(raw).map_err(|_| AuctionError::NotFound(raw.to_string()))
}

/// Entry point for everything that changes an auction or follows one.
///
/// Every change is applied and broadcast inside the store's per-auction
/// critical section, so room members observe updates in acceptance order.
pub struct Gateway<S: AuctionStore = MemoryStore> {
    store: S,
    rooms: Rooms,
    auction_duration: TimeDelta,
}

impl<S: AuctionStore> Gateway<S> {
    pub fn new(store: S, auction_duration: TimeDelta) -> Self {
        Self {
            store,
            rooms: Rooms::new(),
            auction_duration,
        }
    }

    #[cfg(test)]
    pub fn rooms(&self) -> &Rooms {
        &self.rooms
    }

    pub fn create(&self, req: CreateAuctionRequest) -> Auction {
        let auction = self.store.create(req);
        tracing::info!(
            auction = %auction.id(),
            title = auction.title(),
            starting_price = auction.starting_price(),
            "Auction created"
        );
        auction
    }

    pub fn get(&self, id: &AuctionId) -> Result<Auction, AuctionError> {
        self.store.get(id)
    }

    pub fn list(&self) -> Vec<Auction> {
        self.store.list()
    }

    /// Handles one inbound event from a connection.
    pub fn dispatch(&self, session: &mut Session, event: ClientEvent) {
        match event {
            ClientEvent::JoinAuction { auction_id } => {
                let _ = self.join(session, &auction_id);
            }
            ClientEvent::LeaveAuction { auction_id } => self.leave(session, &auction_id),
            ClientEvent::PlaceBid(req) => {
                let _ = self.place_bid(session.subscriber(), req);
            }
        }
    }

    /// Subscribes the session to an auction's room and sends it a snapshot,
    /// or a private error if the auction does not exist.
    pub fn join(&self, session: &mut Session, auction_id: &str) -> Result<(), AuctionError> {
        let subscriber = session.subscriber.clone();
        let result = parse_auction_id(auction_id).and_then(|id| {
            session.joined.insert(id);
            // Joining under the auction lock orders the snapshot before any later update.
            self.store
                .mutate(&id, |auction| {
                    self.rooms.join(id, &subscriber);
                    subscriber.send(ServerEvent::AuctionData(auction.clone()));
                })
                .inspect_err(|_| {
                    self.rooms.join(id, &subscriber);
                })
        });

        match &result {
            Ok(()) => tracing::debug!(
                connection = subscriber.id(),
                auction_id = %auction_id,
                "Joined auction"
            ),
            Err(e) => {
                tracing::debug!(
                    connection = subscriber.id(),
                    auction_id = %auction_id,
                    error = %e,
                    "Join failed"
                );
                subscriber.send(ServerEvent::from(e));
            }
        }
        result
    }

    pub fn leave(&self, session: &mut Session, auction_id: &str) {
        if let Ok(id) = AuctionId::from_string(auction_id) {
            session.joined.remove(&id);
            self.rooms.leave(&id, session.subscriber.id());
        }
    }

    /// Arbitrates a bid. On acceptance the room receives the updated auction
    /// and the new bid; on rejection only `submitter` hears about it.
    pub fn place_bid(&self, submitter: &Subscriber, req: PlaceBid) -> Result<Bid, AuctionError> {
        let PlaceBid {
            auction_id,
            bidder_id,
            bidder_name,
            amount,
        } = req;
        let bid_req = BidRequest {
            bidder_id,
            bidder_name,
            amount,
        };

        let result = parse_auction_id(&auction_id).and_then(|id| {
            self.store.mutate(&id, |auction| -> Result<Bid, AuctionError> {
                let bid = auction.add_bid(bid_req, Utc::now())?;
                let delivered = self.rooms.broadcast(
                    &id,
                    &ServerEvent::NewBid {
                        auction: auction.clone(),
                        bid: bid.clone(),
                    },
                );
                tracing::info!(
                    auction = %id,
                    bid = %bid.id,
                    amount = bid.amount,
                    delivered,
                    "Bid accepted"
                );
                Ok(bid)
            })?
        });

        if let Err(e) = &result {
            tracing::debug!(
                connection = submitter.id(),
                auction_id = %auction_id,
                amount,
                error = %e,
                "Bid rejected"
            );
            submitter.send(ServerEvent::from(e));
        }
        result
    }

    /// Opens an auction and announces it to its room.
    pub fn start(&self, id: &AuctionId) -> Result<Auction, AuctionError> {
        self.store.mutate(id, |auction| -> Result<Auction, AuctionError> {
            auction.start(Utc::now(), self.auction_duration)?;
            let snapshot = auction.clone();
            let delivered = self
                .rooms
                .broadcast(id, &ServerEvent::AuctionStarted(snapshot.clone()));
            tracing::info!(
                auction = %id,
                end_time = ?snapshot.end_time(),
                delivered,
                "Auction started"
            );
            Ok(snapshot)
        })?
    }

    /// Closes an auction. The room is only notified when the status actually changed.
    pub fn finish(&self, id: &AuctionId) -> Result<Auction, AuctionError> {
        self.store.mutate(id, |auction| {
            self.finish_locked(auction);
            auction.clone()
        })
    }

    /// Finishes every active auction whose end time is at or before `now`.
    pub fn finish_expired(&self, now: DateTime<Utc>) -> Vec<AuctionId> {
        self.store
            .ids()
            .into_iter()
            .filter(|id| {
                match self.store.mutate(id, |auction| {
                    auction.is_expired(now) && self.finish_locked(auction)
                }) {
                    Ok(finished) => finished,
                    Err(e) => {
                        tracing::warn!(auction = %id, error = %e, "Failed to finish expired auction");
                        false
                    }
                }
            })
            .collect()
    }

    fn finish_locked(&self, auction: &mut Auction) -> bool {
        if !auction.finish() {
            return false;
        }
        let id = auction.id();
        let delivered = self
            .rooms
            .broadcast(&id, &ServerEvent::AuctionFinished(auction.clone()));
        tracing::info!(
            auction = %id,
            winner = ?auction.winner().map(|bid| &bid.bidder_id),
            price = auction.current_price(),
            bids = auction.bids().len(),
            delivered,
            "Auction finished"
        );
        true
    }

    /// Drops the connection from every room it joined.
    pub fn disconnect(&self, session: Session) {
        for id in session.joined() {
            self.rooms.leave(id, session.subscriber.id());
        }
        tracing::debug!(connection = session.subscriber.id(), "Session closed");
    }
}
