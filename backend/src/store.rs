use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use ulid::{Generator, Ulid};

use crate::{
    errors::AuctionError,
    models::auction::{Auction, AuctionId, CreateAuctionRequest},
};

/// Owner of every auction and the only path through which one may change.
///
/// Implementations must run each `mutate` closure with exclusive access to its
/// auction: two closures for the same id never overlap, closures for distinct
/// ids may run in parallel.
pub trait AuctionStore: Send + Sync + 'static {
    fn create(&self, req: CreateAuctionRequest) -> Auction;

    fn get(&self, id: &AuctionId) -> Result<Auction, AuctionError>;

    /// Snapshot of all auctions, oldest first.
    fn list(&self) -> Vec<Auction>;

    /// Ids of all auctions, oldest first.
    fn ids(&self) -> Vec<AuctionId>;

    fn mutate<R, F>(&self, id: &AuctionId, f: F) -> Result<R, AuctionError>
    where
        F: FnOnce(&mut Auction) -> R;
}

/// Process-lifetime store. Each auction sits behind its own mutex so writers
/// to one auction never wait on another.
pub struct MemoryStore {
    auctions: DashMap<AuctionId, Arc<Mutex<Auction>>>,
    ids: Mutex<Generator>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            auctions: DashMap::new(),
            ids: Mutex::new(Generator::new()),
        }
    }

    /// Monotonic ids keep `list` in creation order even within one millisecond.
    fn next_id(&self) -> AuctionId {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        ids.generate().unwrap_or_else(|_| Ulid::new())
    }

    fn slot(&self, id: &AuctionId) -> Result<Arc<Mutex<Auction>>, AuctionError> {
        // Clone the Arc so the shard lock is released before the auction lock is taken.
        self.auctions
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AuctionError::not_found(id))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuctionStore for MemoryStore {
    fn create(&self, req: CreateAuctionRequest) -> Auction {
        let auction = Auction::new(self.next_id(), req);
        self.auctions
            .insert(auction.id(), Arc::new(Mutex::new(auction.clone())));
        auction
    }

    fn get(&self, id: &AuctionId) -> Result<Auction, AuctionError> {
        let slot = self.slot(id)?;
        let auction = slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(auction.clone())
    }

    fn list(&self) -> Vec<Auction> {
        let slots: Vec<_> = self
            .auctions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        let mut auctions: Vec<Auction> = slots
            .iter()
            .map(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
            .collect();
        auctions.sort_by_key(|a| a.id());
        auctions
    }

    fn ids(&self) -> Vec<AuctionId> {
        let mut ids: Vec<_> = self.auctions.iter().map(|entry| *entry.key()).collect();
        ids.sort();
        ids
    }

    fn mutate<R, F>(&self, id: &AuctionId, f: F) -> Result<R, AuctionError>
    where
        F: FnOnce(&mut Auction) -> R,
    {
        let slot = self.slot(id)?;
        let mut auction = slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&mut auction))
    }
}
