/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! In-memory message store implementation.
//!
//! Suitable for tests and sessions that reset sequence numbers on logon.
//! All data is lost when the process exits.

use crate::traits::MessageStore;
use async_trait::async_trait;
use bytes::Bytes;
use fixlink_core::error::StoreError;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory message store.
///
/// Frames are kept in a `BTreeMap` for efficient range queries.
#[derive(Debug)]
pub struct MemoryStore {
    frames: RwLock<BTreeMap<u64, Bytes>>,
    next_sender_seq: AtomicU64,
    next_target_seq: AtomicU64,
}

impl MemoryStore {
    /// Creates a new empty memory store with sequence numbers at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::with_initial_seqs(1, 1)
    }

    /// Creates a memory store with explicit initial sequence numbers.
    #[must_use]
    pub fn with_initial_seqs(sender_seq: u64, target_seq: u64) -> Self {
        Self {
            frames: RwLock::new(BTreeMap::new()),
            next_sender_seq: AtomicU64::new(sender_seq),
            next_target_seq: AtomicU64::new(target_seq),
        }
    }

    /// Returns the number of saved frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.read().len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    fn next_sender_seq_num(&self) -> u64 {
        self.next_sender_seq.load(Ordering::SeqCst)
    }

    fn next_target_seq_num(&self) -> u64 {
        self.next_target_seq.load(Ordering::SeqCst)
    }

    fn set_next_sender_seq_num(&self, seq: u64) {
        self.next_sender_seq.store(seq, Ordering::SeqCst);
    }

    fn set_next_target_seq_num(&self, seq: u64) {
        self.next_target_seq.store(seq, Ordering::SeqCst);
    }

    fn incr_next_sender_seq_num(&self) {
        self.next_sender_seq.fetch_add(1, Ordering::SeqCst);
    }

    fn incr_next_target_seq_num(&self) {
        self.next_target_seq.fetch_add(1, Ordering::SeqCst);
    }

    async fn save(&self, seq_num: u64, raw: &[u8]) -> Result<(), StoreError> {
        self.frames
            .write()
            .insert(seq_num, Bytes::copy_from_slice(raw));
        Ok(())
    }

    async fn get(&self, begin: u64, end: u64) -> Result<Vec<(u64, Bytes)>, StoreError> {
        let frames = self.frames.read();
        let end = if end == 0 { u64::MAX } else { end };

        Ok(frames
            .range(begin..=end)
            .map(|(seq, bytes)| (*seq, bytes.clone()))
            .collect())
    }

    async fn reset(&self) -> Result<(), StoreError> {
        self.frames.write().clear();
        self.next_sender_seq.store(1, Ordering::SeqCst);
        self.next_target_seq.store(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_new() {
        let store = MemoryStore::new();
        assert_eq!(store.next_sender_seq_num(), 1);
        assert_eq!(store.next_target_seq_num(), 1);
        assert_eq!(store.frame_count(), 0);
    }

    #[tokio::test]
    async fn test_memory_store_save_and_get() {
        let store = MemoryStore::new();

        store.save(1, b"frame1").await.unwrap();
        store.save(2, b"frame2").await.unwrap();
        store.save(5, b"frame5").await.unwrap();

        let range = store.get(1, 2).await.unwrap();
        assert_eq!(range.len(), 2);
        assert_eq!(&range[0].1[..], b"frame1");

        let open_ended = store.get(2, 0).await.unwrap();
        assert_eq!(open_ended.len(), 2);
        assert_eq!(open_ended[1].0, 5);
    }

    #[tokio::test]
    async fn test_memory_store_incr() {
        let store = MemoryStore::new();
        store.incr_next_sender_seq_num();
        store.incr_next_sender_seq_num();
        store.incr_next_target_seq_num();

        assert_eq!(store.next_sender_seq_num(), 3);
        assert_eq!(store.next_target_seq_num(), 2);
    }

    #[tokio::test]
    async fn test_memory_store_reset() {
        let store = MemoryStore::with_initial_seqs(10, 20);
        store.save(1, b"frame").await.unwrap();

        store.reset().await.unwrap();

        assert_eq!(store.frame_count(), 0);
        assert_eq!(store.next_sender_seq_num(), 1);
        assert_eq!(store.next_target_seq_num(), 1);
    }
}
