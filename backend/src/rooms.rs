use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::models::{auction::AuctionId, event::ServerEvent};

pub type ConnectionId = u64;

/// Outbound half of one connection.
///
/// Sends never block. A full queue marks the subscriber as lagged; the
/// connection task is expected to close the socket once it sees the flag.
#[derive(Debug, Clone)]
pub struct Subscriber {
    id: ConnectionId,
    tx: mpsc::Sender<ServerEvent>,
    lagged: Arc<AtomicBool>,
}

impl Subscriber {
    pub fn new(id: ConnectionId, capacity: usize) -> (Self, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let subscriber = Self {
            id,
            tx,
            lagged: Arc::new(AtomicBool::new(false)),
        };
        (subscriber, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues `event`, returning whether it was accepted.
    pub fn send(&self, event: ServerEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    connection = self.id,
                    event = event.name(),
                    "Outbound queue full, dropping subscriber."
                );
                self.lagged.store(true, Ordering::Release);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    pub fn is_lagged(&self) -> bool {
        self.lagged.load(Ordering::Acquire)
    }
}

/// Room membership: which live connections follow which auction.
#[derive(Default)]
pub struct Rooms {
    rooms: DashMap<AuctionId, HashMap<ConnectionId, Subscriber>>,
}

impl Rooms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `subscriber` to the room. Returns `false` if it was already a member.
    pub fn join(&self, auction_id: AuctionId, subscriber: &Subscriber) -> bool {
        self.rooms
            .entry(auction_id)
            .or_default()
            .insert(subscriber.id(), subscriber.clone())
            .is_none()
    }

    /// Removes the connection from the room. Unknown rooms and non-members are ignored.
    pub fn leave(&self, auction_id: &AuctionId, connection_id: ConnectionId) -> bool {
        let removed = match self.rooms.get_mut(auction_id) {
            Some(mut members) => members.remove(&connection_id).is_some(),
            None => false,
        };
        self.rooms.remove_if(auction_id, |_, members| members.is_empty());
        removed
    }

    /// Delivers `event` to every member of the room and returns how many accepted it.
    ///
    /// Members whose connection is gone or whose queue is full are dropped from
    /// the room; the others still get the event.
    pub fn broadcast(&self, auction_id: &AuctionId, event: &ServerEvent) -> usize {
        let Some(mut members) = self.rooms.get_mut(auction_id) else {
            return 0;
        };
        let mut delivered = 0;
        members.retain(|_, subscriber| {
            let accepted = subscriber.send(event.clone());
            delivered += usize::from(accepted);
            accepted
        });
        let empty = members.is_empty();
        drop(members);
        if empty {
            self.rooms.remove_if(auction_id, |_, members| members.is_empty());
        }
        delivered
    }

    #[cfg(test)]
    pub fn is_member(&self, auction_id: &AuctionId, connection_id: ConnectionId) -> bool {
        self.rooms
            .get(auction_id)
            .is_some_and(|members| members.contains_key(&connection_id))
    }

    #[cfg(test)]
    pub fn member_count(&self, auction_id: &AuctionId) -> usize {
        self.rooms.get(auction_id).map_or(0, |members| members.len())
    }
}
