/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Heartbeat and TestRequest management.
//!
//! Timing rules:
//! - Emit a Heartbeat after `HeartBtInt` of outbound silence.
//! - Emit a TestRequest after `1.2 x HeartBtInt` of inbound silence.
//! - Declare the peer dead when a pending TestRequest gets no answer
//!   within another `HeartBtInt`.

use std::time::{Duration, Instant};

/// Manages heartbeat timing for a FIX session.
#[derive(Debug)]
pub struct HeartbeatManager {
    interval: Duration,
    last_sent: Instant,
    last_received: Instant,
    test_request_pending: Option<String>,
    test_request_sent_at: Option<Instant>,
}

impl HeartbeatManager {
    /// Creates a new heartbeat manager with the specified interval.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            interval,
            last_sent: now,
            last_received: now,
            test_request_pending: None,
            test_request_sent_at: None,
        }
    }

    /// Records that a message was sent.
    #[inline]
    pub fn on_message_sent(&mut self) {
        self.last_sent = Instant::now();
    }

    /// Records that a message was received.
    ///
    /// A Heartbeat answering the pending TestRequest clears it; any inbound
    /// traffic resets the silence clock.
    pub fn on_message_received(&mut self, is_heartbeat: bool, test_req_id: Option<&str>) {
        self.last_received = Instant::now();

        if is_heartbeat
            && let (Some(pending), Some(received)) = (&self.test_request_pending, test_req_id)
            && pending == received
        {
            self.test_request_pending = None;
            self.test_request_sent_at = None;
        }
    }

    /// Checks if a heartbeat should be sent (outbound idle >= interval).
    #[must_use]
    pub fn should_send_heartbeat(&self) -> bool {
        self.last_sent.elapsed() >= self.interval
    }

    /// Checks if a TestRequest should be sent (inbound silence >= 1.2 x
    /// interval, no TestRequest already pending).
    #[must_use]
    pub fn should_send_test_request(&self) -> bool {
        if self.test_request_pending.is_some() {
            return false;
        }
        self.last_received.elapsed() >= self.interval + self.interval / 5
    }

    /// Checks if the session has timed out: a TestRequest was sent and one
    /// more interval has passed without an answer.
    #[must_use]
    pub fn is_timed_out(&self) -> bool {
        self.test_request_sent_at
            .is_some_and(|sent_at| sent_at.elapsed() >= self.interval)
    }

    /// Records that a TestRequest was sent.
    pub fn on_test_request_sent(&mut self, test_req_id: String) {
        self.test_request_pending = Some(test_req_id);
        self.test_request_sent_at = Some(Instant::now());
        self.last_sent = Instant::now();
    }

    /// Returns the pending TestRequest ID, if any.
    #[must_use]
    pub fn pending_test_request(&self) -> Option<&str> {
        self.test_request_pending.as_deref()
    }

    /// Returns the heartbeat interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Resets the manager, e.g. after a reconnect.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.last_sent = now;
        self.last_received = now;
        self.test_request_pending = None;
        self.test_request_sent_at = None;
    }
}
