/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Sequence number management.
//!
//! Outbound sequence numbers are allocated strictly monotonically in send
//! order; inbound numbers are validated against the expected value, with
//! gaps and possible duplicates surfaced for the session task to act on.

use fixlink_core::types::SeqNum;
use std::sync::atomic::{AtomicU64, Ordering};

/// Manages sequence numbers for a FIX session.
///
/// Uses atomics so the numbers can be observed from outside the session
/// task without locks; only the session task mutates them.
#[derive(Debug)]
pub struct SequenceManager {
    next_sender_seq: AtomicU64,
    next_target_seq: AtomicU64,
}

impl SequenceManager {
    /// Creates a new manager with both sequence numbers at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::with_initial(1, 1)
    }

    /// Creates a manager with persisted starting values.
    #[must_use]
    pub fn with_initial(sender_seq: u64, target_seq: u64) -> Self {
        Self {
            next_sender_seq: AtomicU64::new(sender_seq),
            next_target_seq: AtomicU64::new(target_seq),
        }
    }

    /// Returns the next sender sequence number without allocating it.
    #[inline]
    #[must_use]
    pub fn next_sender_seq(&self) -> SeqNum {
        SeqNum::new(self.next_sender_seq.load(Ordering::SeqCst))
    }

    /// Returns the next expected target sequence number.
    #[inline]
    #[must_use]
    pub fn next_target_seq(&self) -> SeqNum {
        SeqNum::new(self.next_target_seq.load(Ordering::SeqCst))
    }

    /// Allocates the next sender sequence number.
    #[inline]
    pub fn allocate_sender_seq(&self) -> SeqNum {
        SeqNum::new(self.next_sender_seq.fetch_add(1, Ordering::SeqCst))
    }

    /// Advances the expected target sequence number after processing an
    /// inbound message.
    #[inline]
    pub fn increment_target_seq(&self) {
        self.next_target_seq.fetch_add(1, Ordering::SeqCst);
    }

    /// Sets the next sender sequence number.
    #[inline]
    pub fn set_sender_seq(&self, seq: u64) {
        self.next_sender_seq.store(seq, Ordering::SeqCst);
    }

    /// Sets the next target sequence number.
    #[inline]
    pub fn set_target_seq(&self, seq: u64) {
        self.next_target_seq.store(seq, Ordering::SeqCst);
    }

    /// Resets both sequence numbers to 1.
    #[inline]
    pub fn reset(&self) {
        self.next_sender_seq.store(1, Ordering::SeqCst);
        self.next_target_seq.store(1, Ordering::SeqCst);
    }

    /// Validates an inbound sequence number against the expected value.
    #[must_use]
    pub fn check_incoming(&self, received: u64) -> SequenceCheck {
        let expected = self.next_target_seq.load(Ordering::SeqCst);

        if received == expected {
            SequenceCheck::Ok
        } else if received < expected {
            SequenceCheck::TooLow { expected, received }
        } else {
            SequenceCheck::Gap { expected, received }
        }
    }
}

impl Default for SequenceManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of inbound sequence number validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceCheck {
    /// Sequence number is as expected.
    Ok,
    /// Lower than expected: accept only with PossDupFlag=Y, logout otherwise.
    TooLow {
        /// Expected sequence number.
        expected: u64,
        /// Received sequence number.
        received: u64,
    },
    /// Higher than expected: request a resend for the gap.
    Gap {
        /// Expected sequence number.
        expected: u64,
        /// Received sequence number.
        received: u64,
    },
}

impl SequenceCheck {
    /// Returns true if the sequence number matched.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_is_monotonic() {
        let seq = SequenceManager::new();

        assert_eq!(seq.allocate_sender_seq().value(), 1);
        assert_eq!(seq.allocate_sender_seq().value(), 2);
        assert_eq!(seq.allocate_sender_seq().value(), 3);
        assert_eq!(seq.next_sender_seq().value(), 4);
    }

    #[test]
    fn test_check_incoming() {
        let seq = SequenceManager::new();
        assert!(seq.check_incoming(1).is_ok());

        seq.set_target_seq(5);
        assert_eq!(
            seq.check_incoming(3),
            SequenceCheck::TooLow {
                expected: 5,
                received: 3
            }
        );
        assert_eq!(
            seq.check_incoming(9),
            SequenceCheck::Gap {
                expected: 5,
                received: 9
            }
        );
        assert!(seq.check_incoming(5).is_ok());
    }

    #[test]
    fn test_increment_target() {
        let seq = SequenceManager::new();
        seq.increment_target_seq();
        seq.increment_target_seq();
        assert_eq!(seq.next_target_seq().value(), 3);
    }

    #[test]
    fn test_reset() {
        let seq = SequenceManager::with_initial(100, 200);
        assert_eq!(seq.next_sender_seq().value(), 100);
        assert_eq!(seq.next_target_seq().value(), 200);

        seq.reset();
        assert_eq!(seq.next_sender_seq().value(), 1);
        assert_eq!(seq.next_target_seq().value(), 1);
    }
}
