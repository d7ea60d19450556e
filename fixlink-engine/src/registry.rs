/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session registry and the outbound send interface.
//!
//! Applications never touch sockets; they push messages onto a session's
//! command queue through [`OutboundSender::send_to_target`]. The registry
//! maps live session ids to their command queues.

use async_trait::async_trait;
use fixlink_core::error::SessionError;
use fixlink_core::message::Message;
use fixlink_core::types::SessionId;
use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Commands accepted by a session task.
#[derive(Debug)]
pub enum SessionCommand {
    /// Stamp, sequence and send an application message.
    Send(Message),
    /// Initiate a logout.
    Logout,
}

/// Outbound send interface handed to applications.
#[async_trait]
pub trait OutboundSender: Send + Sync {
    /// Queues a message for sending on the identified session.
    ///
    /// # Errors
    /// Returns `SessionError::UnknownSession` when no live session matches,
    /// or `SessionError::Closed` when the session task has stopped.
    async fn send_to_target(
        &self,
        message: Message,
        session_id: &SessionId,
    ) -> Result<(), SessionError>;
}

/// Registry of live sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, mpsc::Sender<SessionCommand>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session's command queue.
    pub fn register(&self, session_id: SessionId, commands: mpsc::Sender<SessionCommand>) {
        self.sessions.write().insert(session_id, commands);
    }

    /// Removes a session.
    pub fn unregister(&self, session_id: &SessionId) {
        self.sessions.write().remove(session_id);
    }

    /// Returns the ids of all registered sessions.
    #[must_use]
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.read().keys().cloned().collect()
    }

    /// Number of registered sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Returns true if no sessions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    fn queue_for(&self, session_id: &SessionId) -> Option<mpsc::Sender<SessionCommand>> {
        self.sessions.read().get(session_id).cloned()
    }

    /// Requests a logout on every registered session (graceful shutdown).
    pub async fn logout_all(&self) {
        let queues: Vec<_> = self.sessions.read().values().cloned().collect();
        for queue in queues {
            let _ = queue.send(SessionCommand::Logout).await;
        }
    }
}

#[async_trait]
impl OutboundSender for SessionRegistry {
    async fn send_to_target(
        &self,
        message: Message,
        session_id: &SessionId,
    ) -> Result<(), SessionError> {
        let queue = self
            .queue_for(session_id)
            .ok_or_else(|| SessionError::UnknownSession(session_id.to_string()))?;
        queue
            .send(SessionCommand::Send(message))
            .await
            .map_err(|_| SessionError::Closed)
    }
}
