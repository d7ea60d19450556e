/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Shared single-shot request skeleton.
//!
//! Every client flow is: wait for logon (bounded), send one typed request,
//! wait for the response (bounded), render. Timeouts resolve as explicit
//! option, then session socket timeout, then 5 seconds; an application
//! timeout never disconnects the session.

use crate::requests::ResponseApp;
use fixlink_core::error::AppError;
use fixlink_core::message::Message;
use fixlink_core::types::SessionId;
use fixlink_engine::OutboundSender;
use fixlink_session::SessionSettings;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Default timeout when neither an explicit option nor the session
/// settings provide one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves the effective timeout: explicit option, then session socket
/// timeout, then the 5 second default.
#[must_use]
pub fn resolve_timeout(explicit: Option<Duration>, settings: &SessionSettings) -> Duration {
    explicit
        .or(settings.socket_timeout)
        .unwrap_or(DEFAULT_TIMEOUT)
}

/// Waits for the logon notification.
///
/// # Errors
/// `AppError::ConnectionTimeout` when the deadline passes,
/// `AppError::FixLogout` when the channel closes (session gone).
pub async fn await_logon(
    connected: &mut mpsc::Receiver<SessionId>,
    timeout: Duration,
) -> Result<SessionId, AppError> {
    match tokio::time::timeout(timeout, connected.recv()).await {
        Err(_) => Err(AppError::ConnectionTimeout),
        Ok(None) => Err(AppError::FixLogout),
        Ok(Some(session_id)) => Ok(session_id),
    }
}

/// Waits for the next response message.
///
/// # Errors
/// `AppError::ResponseTimeout` when the deadline passes,
/// `AppError::FixLogout` when the channel closes (session gone).
pub async fn await_response(
    responses: &mut mpsc::Receiver<Message>,
    timeout: Duration,
) -> Result<Message, AppError> {
    match tokio::time::timeout(timeout, responses.recv()).await {
        Err(_) => Err(AppError::ResponseTimeout),
        Ok(None) => Err(AppError::FixLogout),
        Ok(Some(message)) => Ok(message),
    }
}

/// Runs one request/response exchange against a logged-on session.
///
/// # Errors
/// Propagates send failures as `AppError::FixLogout` and wait failures per
/// [`await_response`].
pub async fn request_response(
    sender: &Arc<dyn OutboundSender>,
    app: &ResponseApp,
    session_id: &SessionId,
    request: Message,
    timeout: Duration,
) -> Result<Message, AppError> {
    sender
        .send_to_target(request, session_id)
        .await
        .map_err(|_| AppError::FixLogout)?;

    let mut responses = app
        .take_responses()
        .ok_or(AppError::ResponseTimeout)?;
    let result = await_response(&mut responses, timeout).await;
    app.put_responses(responses);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixlink_core::types::CompId;

    fn settings() -> SessionSettings {
        SessionSettings::new(
            "FIXT.1.1",
            CompId::new("CL").unwrap(),
            CompId::new("SRV").unwrap(),
        )
    }

    #[test]
    fn test_timeout_resolution_order() {
        let bare = settings();
        assert_eq!(resolve_timeout(None, &bare), DEFAULT_TIMEOUT);

        let with_socket = settings().with_socket_timeout(Duration::from_secs(9));
        assert_eq!(resolve_timeout(None, &with_socket), Duration::from_secs(9));
        assert_eq!(
            resolve_timeout(Some(Duration::from_secs(2)), &with_socket),
            Duration::from_secs(2)
        );
    }

    #[tokio::test]
    async fn test_await_logon_timeout() {
        let (_tx, mut rx) = mpsc::channel::<SessionId>(1);
        let err = await_logon(&mut rx, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::ConnectionTimeout);
    }

    #[tokio::test]
    async fn test_await_logon_closed_channel_is_logout() {
        let (tx, mut rx) = mpsc::channel::<SessionId>(1);
        drop(tx);
        let err = await_logon(&mut rx, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::FixLogout);
    }

    #[tokio::test]
    async fn test_await_response_delivers() {
        let (tx, mut rx) = mpsc::channel::<Message>(1);
        tx.send(Message::new()).await.unwrap();
        let message = await_response(&mut rx, Duration::from_millis(50))
            .await
            .unwrap();
        assert!(message.header.is_empty());
    }
}
