/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session state machine.
//!
//! A session moves through
//! `Disconnected -> Connecting -> LogonSent -> LoggedOn -> LogoutSent ->
//! Disconnected`, driven by transport events, received admin messages and
//! timers. The state lives in the single session task; transitions are
//! checked at runtime and invalid ones are rejected.

use fixlink_core::error::SessionError;
use std::fmt;

/// Runtime state of a FIX session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No connection established.
    #[default]
    Disconnected,
    /// TCP connection in progress (initiator) or awaiting Logon (acceptor).
    Connecting,
    /// Logon sent, awaiting the peer's Logon.
    LogonSent,
    /// Session fully established.
    LoggedOn,
    /// Logout sent, awaiting the peer's Logout or the timeout.
    LogoutSent,
}

impl SessionState {
    /// Returns true if application messages may be sent in this state.
    #[must_use]
    pub const fn is_logged_on(self) -> bool {
        matches!(self, Self::LoggedOn)
    }

    /// Returns true if the transport is up in this state.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        !matches!(self, Self::Disconnected)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::LogonSent => "LogonSent",
            Self::LoggedOn => "LoggedOn",
            Self::LogoutSent => "LogoutSent",
        };
        write!(f, "{name}")
    }
}

/// Checked transition driver over [`SessionState`].
#[derive(Debug, Default)]
pub struct StateMachine {
    state: SessionState,
}

impl StateMachine {
    /// Creates a machine in the Disconnected state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Transport established (initiator dialed, acceptor accepted).
    ///
    /// # Errors
    /// Returns `SessionError::InvalidState` unless currently Disconnected.
    pub fn on_connect(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::Disconnected, SessionState::Connecting)
    }

    /// Local Logon emitted.
    ///
    /// # Errors
    /// Returns `SessionError::InvalidState` unless currently Connecting.
    pub fn on_logon_sent(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::Connecting, SessionState::LogonSent)
    }

    /// Peer Logon received and sequence numbers reconciled.
    ///
    /// Acceptors answer from Connecting, initiators from LogonSent.
    ///
    /// # Errors
    /// Returns `SessionError::InvalidState` from any other state.
    pub fn on_logged_on(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::LogonSent | SessionState::Connecting => {
                self.state = SessionState::LoggedOn;
                Ok(())
            }
            current => Err(SessionError::InvalidState {
                expected: "LogonSent or Connecting".to_string(),
                current: current.to_string(),
            }),
        }
    }

    /// Local Logout emitted.
    ///
    /// # Errors
    /// Returns `SessionError::InvalidState` unless currently LoggedOn.
    pub fn on_logout_sent(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::LoggedOn, SessionState::LogoutSent)
    }

    /// Transport dropped or logout completed; valid from every state.
    pub fn on_disconnect(&mut self) {
        self.state = SessionState::Disconnected;
    }

    fn transition(
        &mut self,
        expected: SessionState,
        next: SessionState,
    ) -> Result<(), SessionError> {
        if self.state == expected {
            self.state = next;
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                expected: expected.to_string(),
                current: self.state.to_string(),
            })
        }
    }
}
