/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Message store trait definition.
//!
//! The store is a consumed interface: the CLI layer selects and initializes
//! a backend (memory, SQLite, Postgres) and hands it to the session. The
//! session persists sequence numbers through it and replays saved frames
//! when the counterparty requests a resend.

use async_trait::async_trait;
use bytes::Bytes;
use fixlink_core::error::StoreError;

/// Abstract interface for FIX message storage.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Returns the next sender (outbound) sequence number.
    fn next_sender_seq_num(&self) -> u64;

    /// Returns the next expected target (inbound) sequence number.
    fn next_target_seq_num(&self) -> u64;

    /// Sets the next sender sequence number.
    fn set_next_sender_seq_num(&self, seq: u64);

    /// Sets the next target sequence number.
    fn set_next_target_seq_num(&self, seq: u64);

    /// Increments the next sender sequence number.
    fn incr_next_sender_seq_num(&self) {
        self.set_next_sender_seq_num(self.next_sender_seq_num() + 1);
    }

    /// Increments the next target sequence number.
    fn incr_next_target_seq_num(&self) {
        self.set_next_target_seq_num(self.next_target_seq_num() + 1);
    }

    /// Saves an outbound frame for potential resend.
    ///
    /// # Errors
    /// Returns `StoreError` if the frame cannot be persisted.
    async fn save(&self, seq_num: u64, raw: &[u8]) -> Result<(), StoreError>;

    /// Retrieves saved frames for a resend request.
    ///
    /// # Arguments
    /// * `begin` - Begin sequence number (inclusive)
    /// * `end` - End sequence number (inclusive, or 0 for infinity)
    ///
    /// # Errors
    /// Returns `StoreError` if frames cannot be retrieved.
    async fn get(&self, begin: u64, end: u64) -> Result<Vec<(u64, Bytes)>, StoreError>;

    /// Resets the store, clearing saved frames and sequence numbers.
    ///
    /// # Errors
    /// Returns `StoreError` if the reset fails.
    async fn reset(&self) -> Result<(), StoreError>;

    /// Refreshes cached state from persistent storage.
    ///
    /// # Errors
    /// Returns `StoreError` if the refresh fails.
    async fn refresh(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullStore;

    #[async_trait]
    impl MessageStore for NullStore {
        fn next_sender_seq_num(&self) -> u64 {
            1
        }

        fn next_target_seq_num(&self) -> u64 {
            1
        }

        fn set_next_sender_seq_num(&self, _seq: u64) {}

        fn set_next_target_seq_num(&self, _seq: u64) {}

        async fn save(&self, _seq_num: u64, _raw: &[u8]) -> Result<(), StoreError> {
            Ok(())
        }

        async fn get(&self, _begin: u64, _end: u64) -> Result<Vec<(u64, Bytes)>, StoreError> {
            Ok(vec![])
        }

        async fn reset(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_default_incr_methods() {
        let store = NullStore;
        store.incr_next_sender_seq_num();
        store.incr_next_target_seq_num();
        assert!(store.save(1, b"frame").await.is_ok());
        assert!(store.refresh().await.is_ok());
    }
}
