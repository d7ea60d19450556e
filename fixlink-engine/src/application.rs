/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Application callback interface.
//!
//! The session task drives these callbacks: session lifecycle events,
//! outbound message decoration, and inbound message delivery split into
//! admin and application planes. Inbound messages are delivered in
//! received order; callbacks must not block.

use async_trait::async_trait;
use fixlink_core::message::Message;
use fixlink_core::types::SessionId;

/// Business reject reason: other.
pub const REJECT_REASON_OTHER: u32 = 0;

/// Business reject reason: unsupported message type.
pub const REJECT_REASON_UNSUPPORTED_MSG_TYPE: u32 = 3;

/// Reason for rejecting a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectReason {
    /// Rejection reason code (BusinessRejectReason values).
    pub code: u32,
    /// Human-readable rejection text.
    pub text: String,
    /// Offending tag, when one can be named.
    pub ref_tag: Option<u32>,
}

impl RejectReason {
    /// Creates a new rejection reason.
    #[must_use]
    pub fn new(code: u32, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
            ref_tag: None,
        }
    }

    /// Sets the offending tag.
    #[must_use]
    pub const fn with_ref_tag(mut self, tag: u32) -> Self {
        self.ref_tag = Some(tag);
        self
    }

    /// Convenience constructor for a missing required field.
    #[must_use]
    pub fn missing_field(tag: u32, name: &str) -> Self {
        Self::new(REJECT_REASON_OTHER, format!("Missing {name}")).with_ref_tag(tag)
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (reason {})", self.text, self.code)
    }
}

/// Application callback interface for handling FIX messages.
///
/// Implementations own their routing (usually a
/// [`crate::router::MessageRouter`]) and any response channels callers
/// wait on.
#[async_trait]
pub trait Application: Send + Sync {
    /// Called when a session is created.
    async fn on_create(&self, session_id: &SessionId);

    /// Called on successful logon.
    async fn on_logon(&self, session_id: &SessionId);

    /// Called on logout or disconnect.
    async fn on_logout(&self, session_id: &SessionId);

    /// Called before sending an admin message; may mutate it.
    async fn to_admin(&self, message: &mut Message, session_id: &SessionId);

    /// Called when an admin message is received.
    ///
    /// # Returns
    /// `Ok(())` to accept, `Err(RejectReason)` to reject.
    #[allow(clippy::wrong_self_convention)]
    async fn from_admin(
        &self,
        message: &Message,
        session_id: &SessionId,
    ) -> Result<(), RejectReason>;

    /// Called before sending an application message; may mutate it.
    async fn to_app(&self, message: &mut Message, session_id: &SessionId);

    /// Called when an application message is received.
    ///
    /// # Returns
    /// `Ok(())` to accept, `Err(RejectReason)` to answer with a
    /// BusinessMessageReject.
    #[allow(clippy::wrong_self_convention)]
    async fn from_app(
        &self,
        message: &Message,
        session_id: &SessionId,
    ) -> Result<(), RejectReason>;
}

/// Default no-op application implementation.
#[derive(Debug, Default)]
pub struct NoOpApplication;

#[async_trait]
impl Application for NoOpApplication {
    async fn on_create(&self, _session_id: &SessionId) {}

    async fn on_logon(&self, _session_id: &SessionId) {}

    async fn on_logout(&self, _session_id: &SessionId) {}

    async fn to_admin(&self, _message: &mut Message, _session_id: &SessionId) {}

    async fn from_admin(
        &self,
        _message: &Message,
        _session_id: &SessionId,
    ) -> Result<(), RejectReason> {
        Ok(())
    }

    async fn to_app(&self, _message: &mut Message, _session_id: &SessionId) {}

    async fn from_app(
        &self,
        _message: &Message,
        _session_id: &SessionId,
    ) -> Result<(), RejectReason> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixlink_core::types::CompId;

    #[test]
    fn test_reject_reason() {
        let reason = RejectReason::new(3, "Unsupported").with_ref_tag(35);
        assert_eq!(reason.code, 3);
        assert_eq!(reason.ref_tag, Some(35));
        assert_eq!(reason.to_string(), "Unsupported (reason 3)");
    }

    #[test]
    fn test_missing_field_reason() {
        let reason = RejectReason::missing_field(11, "ClOrdID");
        assert_eq!(reason.code, REJECT_REASON_OTHER);
        assert_eq!(reason.ref_tag, Some(11));
        assert_eq!(reason.text, "Missing ClOrdID");
    }

    #[tokio::test]
    async fn test_noop_application() {
        let app = NoOpApplication;
        let session_id = SessionId::new(
            "FIX.4.4",
            CompId::new("SENDER").unwrap(),
            CompId::new("TARGET").unwrap(),
        );

        app.on_create(&session_id).await;
        app.on_logon(&session_id).await;
        let message = Message::new();
        assert!(app.from_app(&message, &session_id).await.is_ok());
        app.on_logout(&session_id).await;
    }
}
