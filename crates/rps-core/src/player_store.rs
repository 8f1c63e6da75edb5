//! Player store seam.
//!
//! The durable alias -> score mapping is an external collaborator; the
//! round logic only needs lookup, create, increment and an ordered
//! snapshot. [`InMemoryPlayerStore`] is the implementation the server
//! ships with and the one the tests use.

use std::net::IpAddr;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;

use crate::error::StoreError;

/// A persisted player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    /// Unique, immutable identity key.
    pub username: String,

    /// Cumulative score. Never decreases.
    pub score: u64,

    /// Address of the connection that created this record.
    pub origin_ip: Option<IpAddr>,
}

/// Lookup-or-create record store with an atomic score counter.
///
/// Implementations must tolerate concurrent reads and apply
/// `increment_score` atomically per alias (no lost updates).
pub trait PlayerStore: Send + Sync {
    fn find_by_alias(&self, alias: &str) -> Result<Option<PlayerRecord>, StoreError>;

    /// Fails with [`StoreError::DuplicateAlias`] if the alias exists.
    fn create(&self, alias: &str, origin_ip: Option<IpAddr>) -> Result<PlayerRecord, StoreError>;

    /// Add `delta` to the alias's score and return the new score.
    fn increment_score(&self, alias: &str, delta: u64) -> Result<u64, StoreError>;

    /// Snapshot of every record, in the store's iteration order.
    fn players(&self) -> Result<Vec<PlayerRecord>, StoreError>;
}

/// Process-lifetime store; iteration order is creation order.
#[derive(Debug, Default)]
pub struct InMemoryPlayerStore {
    records: RwLock<IndexMap<String, PlayerRecord>>,
}

impl InMemoryPlayerStore {
    pub fn new() -> Self {
        InMemoryPlayerStore::default()
    }

    pub fn len(&self) -> usize {
        self.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, IndexMap<String, PlayerRecord>>, StoreError> {
        self.records
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, IndexMap<String, PlayerRecord>>, StoreError> {
        self.records
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

impl PlayerStore for InMemoryPlayerStore {
    fn find_by_alias(&self, alias: &str) -> Result<Option<PlayerRecord>, StoreError> {
        Ok(self.read()?.get(alias).cloned())
    }

    fn create(&self, alias: &str, origin_ip: Option<IpAddr>) -> Result<PlayerRecord, StoreError> {
        let mut records = self.write()?;
        if records.contains_key(alias) {
            return Err(StoreError::DuplicateAlias(alias.to_string()));
        }

        let record = PlayerRecord {
            username: alias.to_string(),
            score: 0,
            origin_ip,
        };
        records.insert(alias.to_string(), record.clone());
        Ok(record)
    }

    fn increment_score(&self, alias: &str, delta: u64) -> Result<u64, StoreError> {
        let mut records = self.write()?;
        let record = records
            .get_mut(alias)
            .ok_or_else(|| StoreError::UnknownAlias(alias.to_string()))?;

        record.score = record.score.saturating_add(delta);
        Ok(record.score)
    }

    fn players(&self) -> Result<Vec<PlayerRecord>, StoreError> {
        Ok(self.read()?.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn create_then_find() {
        let store = InMemoryPlayerStore::new();
        assert!(store.is_empty());
        let ip: IpAddr = "10.0.0.7".parse().unwrap();

        let created = store.create("alice", Some(ip)).unwrap();
        assert_eq!(created.score, 0);
        assert_eq!(store.find_by_alias("alice").unwrap(), Some(created));
        assert_eq!(store.find_by_alias("bob").unwrap(), None);
        assert!(!store.is_empty());
    }

    #[test]
    fn duplicate_create_is_rejected_and_keeps_score() {
        let store = InMemoryPlayerStore::new();
        store.create("alice", None).unwrap();
        store.increment_score("alice", 4).unwrap();

        assert_eq!(
            store.create("alice", None),
            Err(StoreError::DuplicateAlias("alice".to_string()))
        );
        assert_eq!(store.find_by_alias("alice").unwrap().unwrap().score, 4);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn increment_unknown_alias_fails() {
        let store = InMemoryPlayerStore::new();
        assert_eq!(
            store.increment_score("ghost", 1),
            Err(StoreError::UnknownAlias("ghost".to_string()))
        );
    }

    #[test]
    fn players_in_creation_order() {
        let store = InMemoryPlayerStore::new();
        for alias in ["zed", "amy", "mo"] {
            store.create(alias, None).unwrap();
        }
        let names: Vec<_> = store
            .players()
            .unwrap()
            .into_iter()
            .map(|p| p.username)
            .collect();
        assert_eq!(names, ["zed", "amy", "mo"]);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let store = Arc::new(InMemoryPlayerStore::new());
        store.create("alice", None).unwrap();
        store.create("bob", None).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                let alias = if i % 2 == 0 { "alice" } else { "bob" };
                thread::spawn(move || {
                    for _ in 0..250 {
                        store.increment_score(alias, 1).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.find_by_alias("alice").unwrap().unwrap().score, 1000);
        assert_eq!(store.find_by_alias("bob").unwrap().unwrap().score, 1000);
    }

    #[test]
    fn concurrent_create_has_one_winner() {
        let store = Arc::new(InMemoryPlayerStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.create("racer", None).is_ok())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&ok| ok)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(store.len(), 1);
    }
}
