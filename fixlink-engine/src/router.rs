/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Message router.
//!
//! A flat `(version key, message type) -> handler` table. The version key
//! is the ApplVerID for FIXT sessions and the BeginString otherwise, so one
//! router can serve FIX 4.x exchange sessions and FIXT client sessions side
//! by side. Registration happens once at application startup; dispatch is a
//! single map lookup.

use crate::application::RejectReason;
use fixlink_core::message::{Message, MsgType};
use fixlink_core::tags;
use fixlink_core::types::{SessionId, BEGIN_STRING_FIXT11};
use futures_util::future::BoxFuture;
use std::collections::HashMap;

/// Version component of a route key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionKey {
    /// On-wire BeginString for pre-5.0 sessions (e.g. "FIX.4.4").
    BeginString(String),
    /// ApplVerID for FIXT sessions (e.g. "9" for FIX 5.0 SP2).
    ApplVerId(String),
}

impl VersionKey {
    /// Derives the version key of an inbound message.
    ///
    /// FIXT messages route by ApplVerID (tag 1128), falling back to the
    /// session's DefaultApplVerID; everything else routes by BeginString.
    #[must_use]
    pub fn for_message(message: &Message, default_appl_ver_id: Option<&str>) -> Option<Self> {
        let begin_string = message.begin_string()?;
        if begin_string == BEGIN_STRING_FIXT11 {
            let appl_ver_id = message
                .header
                .get_str(tags::APPL_VER_ID)
                .or(default_appl_ver_id)?;
            Some(Self::ApplVerId(appl_ver_id.to_string()))
        } else {
            Some(Self::BeginString(begin_string.to_string()))
        }
    }
}

/// Result of a dispatch attempt.
#[derive(Debug)]
pub enum RouteOutcome {
    /// A handler ran; it accepted or rejected the message.
    Handled(Result<(), RejectReason>),
    /// No handler is registered for the message's route key.
    NotFound,
}

type Handler = Box<dyn Fn(Message, SessionId) -> BoxFuture<'static, Result<(), RejectReason>> + Send + Sync>;

/// Dispatch table keyed by `(VersionKey, MsgType)`.
#[derive(Default)]
pub struct MessageRouter {
    routes: HashMap<(VersionKey, MsgType), Handler>,
}

impl MessageRouter {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a `(version, message type)` pair.
    ///
    /// Handlers are plain async functions bound to application state;
    /// later registrations for the same key replace earlier ones.
    pub fn add_route<F, Fut>(&mut self, version: VersionKey, msg_type: MsgType, handler: F)
    where
        F: Fn(Message, SessionId) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), RejectReason>> + Send + 'static,
    {
        self.routes.insert(
            (version, msg_type),
            Box::new(move |message, session_id| Box::pin(handler(message, session_id))),
        );
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Dispatches a message to its handler.
    ///
    /// Unknown `(version, message type)` pairs yield
    /// [`RouteOutcome::NotFound`]; the caller answers those with a
    /// BusinessMessageReject reason UnsupportedMessageType.
    pub async fn route(
        &self,
        message: &Message,
        session_id: &SessionId,
        default_appl_ver_id: Option<&str>,
    ) -> RouteOutcome {
        let Some(version) = VersionKey::for_message(message, default_appl_ver_id) else {
            return RouteOutcome::NotFound;
        };
        let Some(msg_type) = message.msg_type() else {
            return RouteOutcome::NotFound;
        };

        match self.routes.get(&(version, msg_type)) {
            Some(handler) => {
                RouteOutcome::Handled(handler(message.clone(), session_id.clone()).await)
            }
            None => RouteOutcome::NotFound,
        }
    }
}

impl std::fmt::Debug for MessageRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageRouter")
            .field("routes", &self.routes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixlink_core::types::CompId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn session_id() -> SessionId {
        SessionId::new(
            "FIXT.1.1",
            CompId::new("CL").unwrap(),
            CompId::new("SRV").unwrap(),
        )
    }

    #[test]
    fn test_version_key_fixt_uses_appl_ver_id() {
        let message = Message::with_type(BEGIN_STRING_FIXT11, MsgType::NewOrderSingle);
        let key = VersionKey::for_message(&message, Some("9")).unwrap();
        assert_eq!(key, VersionKey::ApplVerId("9".to_string()));
    }

    #[test]
    fn test_version_key_fixt_prefers_message_appl_ver_id() {
        let mut message = Message::with_type(BEGIN_STRING_FIXT11, MsgType::NewOrderSingle);
        message.header.set(tags::APPL_VER_ID, "7");
        let key = VersionKey::for_message(&message, Some("9")).unwrap();
        assert_eq!(key, VersionKey::ApplVerId("7".to_string()));
    }

    #[test]
    fn test_version_key_pre_fix50_uses_begin_string() {
        let message = Message::with_type("FIX.4.4", MsgType::ExecutionReport);
        let key = VersionKey::for_message(&message, None).unwrap();
        assert_eq!(key, VersionKey::BeginString("FIX.4.4".to_string()));
    }

    #[tokio::test]
    async fn test_route_dispatches_to_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut router = MessageRouter::new();
        let counter = Arc::clone(&calls);
        router.add_route(
            VersionKey::ApplVerId("9".to_string()),
            MsgType::NewOrderSingle,
            move |_message, _session_id| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        );

        let message = Message::with_type(BEGIN_STRING_FIXT11, MsgType::NewOrderSingle);
        let outcome = router.route(&message, &session_id(), Some("9")).await;
        assert!(matches!(outcome, RouteOutcome::Handled(Ok(()))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_route_unknown_type_is_not_found() {
        let router = MessageRouter::new();
        let message = Message::with_type(BEGIN_STRING_FIXT11, MsgType::Quote);
        let outcome = router.route(&message, &session_id(), Some("9")).await;
        assert!(matches!(outcome, RouteOutcome::NotFound));
    }

    #[tokio::test]
    async fn test_route_handler_rejection_propagates() {
        let mut router = MessageRouter::new();
        router.add_route(
            VersionKey::BeginString("FIX.4.4".to_string()),
            MsgType::ExecutionReport,
            |_message, _session_id| async {
                Err(RejectReason::new(0, "Missing ClOrdID").with_ref_tag(11))
            },
        );

        let message = Message::with_type("FIX.4.4", MsgType::ExecutionReport);
        let outcome = router.route(&message, &session_id(), None).await;
        match outcome {
            RouteOutcome::Handled(Err(reason)) => assert_eq!(reason.ref_tag, Some(11)),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
