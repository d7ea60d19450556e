/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session settings.
//!
//! `SessionSettings` is injected, fully built, by the configuration layer;
//! the toolkit reads no files. One settings object describes one session:
//! either an initiator (connect host/port) or an acceptor (accept port).

use fixlink_core::error::SessionError;
use fixlink_core::types::{CompId, SessionId};
use std::time::Duration;

/// Network role of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRole {
    /// Dials the counterparty and sends the first Logon.
    Initiator,
    /// Accepts the connection and answers the Logon.
    Acceptor,
}

/// Configuration for a FIX session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// FIX version BeginString (e.g., "FIX.4.4" or "FIXT.1.1").
    pub begin_string: String,
    /// Sender CompID (tag 49).
    pub sender_comp_id: CompId,
    /// Target CompID (tag 56).
    pub target_comp_id: CompId,
    /// Optional sender sub ID (tag 50).
    pub sender_sub_id: Option<String>,
    /// Optional target sub ID (tag 57).
    pub target_sub_id: Option<String>,
    /// Optional session qualifier.
    pub qualifier: Option<String>,
    /// Heartbeat interval.
    pub heart_bt_int: Duration,
    /// Host to dial (initiator sessions).
    pub socket_connect_host: Option<String>,
    /// Port to dial (initiator sessions).
    pub socket_connect_port: Option<u16>,
    /// Port to listen on (acceptor sessions).
    pub socket_accept_port: Option<u16>,
    /// Socket operation timeout; used by single-shot flows when no explicit
    /// timeout is given.
    pub socket_timeout: Option<Duration>,
    /// Session window start, `HH:MM:SS` (validated, not scheduled).
    pub start_time: Option<String>,
    /// Session window end, `HH:MM:SS` (validated, not scheduled).
    pub end_time: Option<String>,
    /// Username injected into the Logon header (tag 553).
    pub username: Option<String>,
    /// Password injected into the Logon header (tag 554); always redacted
    /// in logs.
    pub password: Option<String>,
    /// DefaultApplVerID (tag 1137) for FIXT sessions.
    pub default_appl_ver_id: Option<String>,
    /// Whether to reset sequence numbers on logon.
    pub reset_on_logon: bool,
    /// Whether to reset sequence numbers on disconnect.
    pub reset_on_disconnect: bool,
    /// Maximum inbound message size in bytes.
    pub max_message_size: usize,
    /// Whether to validate inbound checksums.
    pub validate_checksum: bool,
}

impl SessionSettings {
    /// Creates settings with required fields and defaults.
    #[must_use]
    pub fn new(
        begin_string: impl Into<String>,
        sender_comp_id: CompId,
        target_comp_id: CompId,
    ) -> Self {
        Self {
            begin_string: begin_string.into(),
            sender_comp_id,
            target_comp_id,
            sender_sub_id: None,
            target_sub_id: None,
            qualifier: None,
            heart_bt_int: Duration::from_secs(30),
            socket_connect_host: None,
            socket_connect_port: None,
            socket_accept_port: None,
            socket_timeout: None,
            start_time: None,
            end_time: None,
            username: None,
            password: None,
            default_appl_ver_id: None,
            reset_on_logon: false,
            reset_on_disconnect: false,
            max_message_size: 1024 * 1024,
            validate_checksum: true,
        }
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub fn with_heart_bt_int(mut self, interval: Duration) -> Self {
        self.heart_bt_int = interval;
        self
    }

    /// Sets the connect endpoint, making this an initiator session.
    #[must_use]
    pub fn with_connect(mut self, host: impl Into<String>, port: u16) -> Self {
        self.socket_connect_host = Some(host.into());
        self.socket_connect_port = Some(port);
        self
    }

    /// Sets the accept port, making this an acceptor session.
    #[must_use]
    pub fn with_accept_port(mut self, port: u16) -> Self {
        self.socket_accept_port = Some(port);
        self
    }

    /// Sets the socket timeout.
    #[must_use]
    pub fn with_socket_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout = Some(timeout);
        self
    }

    /// Sets logon credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the DefaultApplVerID for FIXT sessions.
    #[must_use]
    pub fn with_default_appl_ver_id(mut self, appl_ver_id: impl Into<String>) -> Self {
        self.default_appl_ver_id = Some(appl_ver_id.into());
        self
    }

    /// Sets whether to reset sequence numbers on logon.
    #[must_use]
    pub const fn with_reset_on_logon(mut self, reset: bool) -> Self {
        self.reset_on_logon = reset;
        self
    }

    /// Sets the sender sub ID.
    #[must_use]
    pub fn with_sender_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.sender_sub_id = Some(sub_id.into());
        self
    }

    /// Sets the target sub ID.
    #[must_use]
    pub fn with_target_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.target_sub_id = Some(sub_id.into());
        self
    }

    /// Sets the session window.
    #[must_use]
    pub fn with_session_window(
        mut self,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        self.start_time = Some(start_time.into());
        self.end_time = Some(end_time.into());
        self
    }

    /// Returns the session identity described by these settings.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        let mut id = SessionId::new(
            self.begin_string.clone(),
            self.sender_comp_id.clone(),
            self.target_comp_id.clone(),
        );
        if let Some(sub) = &self.sender_sub_id {
            id = id.with_sender_sub_id(sub.clone());
        }
        if let Some(sub) = &self.target_sub_id {
            id = id.with_target_sub_id(sub.clone());
        }
        if let Some(q) = &self.qualifier {
            id = id.with_qualifier(q.clone());
        }
        id
    }

    /// Returns the network role, or an error when the settings name neither
    /// a connect endpoint nor an accept port (or both).
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` for contradictory settings.
    pub fn role(&self) -> Result<SessionRole, SessionError> {
        let connects = self.socket_connect_host.is_some() && self.socket_connect_port.is_some();
        let accepts = self.socket_accept_port.is_some();
        match (connects, accepts) {
            (true, false) => Ok(SessionRole::Initiator),
            (false, true) => Ok(SessionRole::Acceptor),
            (true, true) => Err(SessionError::Configuration(
                "session cannot both connect and accept".to_string(),
            )),
            (false, false) => Err(SessionError::Configuration(
                "session needs SocketConnectHost/Port or SocketAcceptPort".to_string(),
            )),
        }
    }

    /// Validates settings consistency at startup.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` describing the first problem.
    pub fn validate(&self) -> Result<(), SessionError> {
        self.role()?;
        if self.heart_bt_int.is_zero() {
            return Err(SessionError::Configuration(
                "HeartBtInt must be positive".to_string(),
            ));
        }
        if self.begin_string == fixlink_core::BEGIN_STRING_FIXT11
            && self.default_appl_ver_id.is_none()
        {
            return Err(SessionError::Configuration(
                "FIXT sessions require DefaultApplVerID".to_string(),
            ));
        }
        if self.start_time.is_some() != self.end_time.is_some() {
            return Err(SessionError::Configuration(
                "StartTime and EndTime must be set together".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SessionSettings {
        SessionSettings::new(
            "FIXT.1.1",
            CompId::new("CL").unwrap(),
            CompId::new("SRV").unwrap(),
        )
        .with_default_appl_ver_id("9")
    }

    #[test]
    fn test_role_initiator() {
        let s = settings().with_connect("localhost", 5001);
        assert_eq!(s.role().unwrap(), SessionRole::Initiator);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_role_acceptor() {
        let s = settings().with_accept_port(5001);
        assert_eq!(s.role().unwrap(), SessionRole::Acceptor);
    }

    #[test]
    fn test_role_unset_is_configuration_error() {
        assert!(matches!(
            settings().role(),
            Err(SessionError::Configuration(_))
        ));
    }

    #[test]
    fn test_role_both_is_configuration_error() {
        let s = settings().with_connect("localhost", 5001).with_accept_port(5002);
        assert!(matches!(s.role(), Err(SessionError::Configuration(_))));
    }

    #[test]
    fn test_fixt_requires_default_appl_ver_id() {
        let s = SessionSettings::new(
            "FIXT.1.1",
            CompId::new("CL").unwrap(),
            CompId::new("SRV").unwrap(),
        )
        .with_connect("localhost", 5001);
        assert!(matches!(s.validate(), Err(SessionError::Configuration(_))));
    }

    #[test]
    fn test_session_window_must_be_paired() {
        let mut s = settings().with_connect("localhost", 5001);
        s.start_time = Some("08:00:00".to_string());
        assert!(matches!(s.validate(), Err(SessionError::Configuration(_))));
    }

    #[test]
    fn test_session_id() {
        let s = settings().with_sender_sub_id("MD");
        let id = s.session_id();
        assert_eq!(id.to_string(), "FIXT.1.1:CL/MD->SRV");
        assert!(id.is_fixt());
    }
}
