/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Single-shot request flows.
//!
//! [`ResponseApp`] is the application side of every flow: it signals logon,
//! funnels the expected response types (and session-level Rejects) to the
//! waiting caller, and closes its channels on logout so waiting callers see
//! `FixLogout`. The builders produce the typed requests; the flow functions
//! tie both together.

use crate::flow::{request_response, resolve_timeout};
use async_trait::async_trait;
use fixlink_core::error::AppError;
use fixlink_core::field::FieldValue;
use fixlink_core::message::{Message, MsgType};
use fixlink_core::tags;
use fixlink_core::types::{OrdType, SessionId, Side, TimeInForce, Timestamp};
use fixlink_dictionary::Dictionary;
use fixlink_engine::{Application, OutboundSender, RejectReason};
use fixlink_session::SessionSettings;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};
use uuid::Uuid;

/// HandlInst: automated execution, no broker intervention.
const HANDL_INST_AUTOMATED: char = '1';

/// Application collecting logon events and expected responses.
pub struct ResponseApp {
    expected: Vec<MsgType>,
    dictionary: Option<Arc<Dictionary>>,
    connected_tx: Mutex<Option<mpsc::Sender<SessionId>>>,
    responses_tx: Mutex<Option<mpsc::Sender<Message>>>,
    responses_rx: Mutex<Option<mpsc::Receiver<Message>>>,
}

impl ResponseApp {
    /// Creates the application and the logon-notification channel.
    #[must_use]
    pub fn new(expected: Vec<MsgType>) -> (Arc<Self>, mpsc::Receiver<SessionId>) {
        Self::with_dictionary(expected, None)
    }

    /// Creates the application with a dictionary so log lines carry
    /// message-type names.
    #[must_use]
    pub fn with_dictionary(
        expected: Vec<MsgType>,
        dictionary: Option<Arc<Dictionary>>,
    ) -> (Arc<Self>, mpsc::Receiver<SessionId>) {
        let (connected_tx, connected_rx) = mpsc::channel(4);
        let (responses_tx, responses_rx) = mpsc::channel(8);
        (
            Arc::new(Self {
                expected,
                dictionary,
                connected_tx: Mutex::new(Some(connected_tx)),
                responses_tx: Mutex::new(Some(responses_tx)),
                responses_rx: Mutex::new(Some(responses_rx)),
            }),
            connected_rx,
        )
    }

    /// Borrows the response receiver for one wait.
    #[must_use]
    pub fn take_responses(&self) -> Option<mpsc::Receiver<Message>> {
        self.responses_rx.lock().take()
    }

    /// Returns the response receiver after a wait.
    pub fn put_responses(&self, receiver: mpsc::Receiver<Message>) {
        *self.responses_rx.lock() = Some(receiver);
    }

    fn forward_response(&self, message: &Message) {
        if let Some(tx) = self.responses_tx.lock().as_ref() {
            let _ = tx.try_send(message.clone());
        }
    }
}

#[async_trait]
impl Application for ResponseApp {
    async fn on_create(&self, session_id: &SessionId) {
        debug!(session = %session_id, "new session");
    }

    async fn on_logon(&self, session_id: &SessionId) {
        debug!(session = %session_id, "logon");
        if let Some(tx) = self.connected_tx.lock().as_ref() {
            let _ = tx.try_send(session_id.clone());
        }
    }

    async fn on_logout(&self, session_id: &SessionId) {
        debug!(session = %session_id, "logout");
        // Dropping the senders closes both channels; waiting callers
        // translate that into FixLogout.
        *self.connected_tx.lock() = None;
        *self.responses_tx.lock() = None;
    }

    async fn to_admin(&self, message: &mut Message, session_id: &SessionId) {
        trace!(session = %session_id, "-> {}", message.to_log_string());
    }

    async fn from_admin(
        &self,
        message: &Message,
        session_id: &SessionId,
    ) -> Result<(), RejectReason> {
        trace!(session = %session_id, "<- {}", message.to_log_string());
        if message.msg_type() == Some(MsgType::Reject) {
            self.forward_response(message);
        }
        Ok(())
    }

    async fn to_app(&self, message: &mut Message, session_id: &SessionId) {
        trace!(session = %session_id, "-> {}", message.to_log_string());
    }

    async fn from_app(
        &self,
        message: &Message,
        _session_id: &SessionId,
    ) -> Result<(), RejectReason> {
        match message.msg_type() {
            Some(msg_type) if self.expected.contains(&msg_type) => {
                self.forward_response(message);
            }
            Some(msg_type) => {
                let name = self
                    .dictionary
                    .as_ref()
                    .and_then(|d| d.message_name(msg_type.as_str()))
                    .unwrap_or("?");
                info!(msg_type = %msg_type, name, "received unexpected message type");
            }
            None => {
                info!("received message without MsgType");
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ResponseApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseApp")
            .field("expected", &self.expected)
            .finish_non_exhaustive()
    }
}

/// Parameters of a new single order.
#[derive(Debug, Clone)]
pub struct NewOrderRequest {
    /// Instrument symbol.
    pub symbol: String,
    /// Order side.
    pub side: Side,
    /// Order type.
    pub ord_type: OrdType,
    /// Quantity (emitted at scale 2).
    pub quantity: Decimal,
    /// Limit price (emitted at scale 2).
    pub price: Decimal,
    /// Expiry.
    pub time_in_force: TimeInForce,
    /// Client order id; a UUID is generated when absent.
    pub cl_ord_id: Option<String>,
}

/// Ensures the session speaks a supported application version.
///
/// # Errors
/// `AppError::FixVersionNotImplemented` for anything but FIXT/5.0SP2.
fn check_version(settings: &SessionSettings) -> Result<(), AppError> {
    if settings.begin_string == fixlink_core::BEGIN_STRING_FIXT11
        && settings.default_appl_ver_id.as_deref() == Some(fixlink_core::APPL_VER_ID_FIX50SP2)
    {
        Ok(())
    } else {
        Err(AppError::FixVersionNotImplemented)
    }
}

fn scaled(mut value: Decimal) -> Decimal {
    value.rescale(2);
    value
}

/// Builds a NewOrderSingle for a FIXT/5.0SP2 session.
///
/// # Errors
/// `AppError::FixVersionNotImplemented` for unsupported session versions.
pub fn build_new_order_single(
    settings: &SessionSettings,
    request: &NewOrderRequest,
) -> Result<Message, AppError> {
    check_version(settings)?;

    let cl_ord_id = request
        .cl_ord_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut message = Message::with_type(&settings.begin_string, MsgType::NewOrderSingle);
    message.body.set(tags::CL_ORD_ID, cl_ord_id.as_str());
    message.body.set(tags::ORD_TYPE, request.ord_type.as_char());
    message.body.set(
        tags::TRANSACT_TIME,
        FieldValue::UtcTimestamp(Timestamp::now()),
    );
    message.body.set(tags::SIDE, request.side.as_char());
    message.body.set(tags::HANDL_INST, HANDL_INST_AUTOMATED);
    message.body.set(tags::SYMBOL, request.symbol.as_str());
    message
        .body
        .set(tags::PRICE, FieldValue::Decimal(scaled(request.price)));
    message
        .body
        .set(tags::ORDER_QTY, FieldValue::Decimal(scaled(request.quantity)));
    message
        .body
        .set(tags::TIME_IN_FORCE, request.time_in_force.as_char());
    Ok(message)
}

/// Builds a SecurityListRequest for all symbols.
#[must_use]
pub fn build_security_list_request(begin_string: &str) -> Message {
    let mut message = Message::with_type(begin_string, MsgType::SecurityListRequest);
    message
        .body
        .set(tags::SECURITY_REQ_ID, Uuid::new_v4().to_string());
    message
        .body
        .set(tags::SECURITY_LIST_REQUEST_TYPE, FieldValue::UInt(0));
    message
}

/// Builds a TradingSessionStatusRequest.
#[must_use]
pub fn build_trading_session_status_request(begin_string: &str, subscription: char) -> Message {
    let mut message = Message::with_type(begin_string, MsgType::TradingSessionStatusRequest);
    message
        .body
        .set(tags::TRAD_SES_REQ_ID, Uuid::new_v4().to_string());
    message.body.set(tags::SUBSCRIPTION_REQUEST_TYPE, subscription);
    message
}

/// Builds an OrderStatusRequest.
#[must_use]
pub fn build_order_status_request(
    begin_string: &str,
    cl_ord_id: &str,
    symbol: &str,
    side: Side,
) -> Message {
    let mut message = Message::with_type(begin_string, MsgType::OrderStatusRequest);
    message.body.set(tags::CL_ORD_ID, cl_ord_id);
    message.body.set(tags::SYMBOL, symbol);
    message.body.set(tags::SIDE, side.as_char());
    message
}

/// Classifies an ExecutionReport answering a new order.
///
/// # Errors
/// `AppError::FixOrderRejected` for OrdStatus=8 (with Text when present),
/// `AppError::FixOrderStatusUnknown` for any status other than New.
pub fn classify_order_response(message: &Message) -> Result<(), AppError> {
    let text = message.body.get_str(tags::TEXT).map(str::to_string);
    match message.body.get_char(tags::ORD_STATUS) {
        Some('0') => Ok(()),
        Some('8') => Err(AppError::FixOrderRejected(text)),
        _ => Err(AppError::FixOrderStatusUnknown(text)),
    }
}

/// Sends a new order and classifies the answering ExecutionReport.
///
/// # Errors
/// Build, timeout and classification failures per the helpers above.
pub async fn place_order(
    sender: &Arc<dyn OutboundSender>,
    app: &ResponseApp,
    session_id: &SessionId,
    settings: &SessionSettings,
    request: &NewOrderRequest,
    timeout: Option<Duration>,
) -> Result<Message, AppError> {
    let order = build_new_order_single(settings, request)?;
    let timeout = resolve_timeout(timeout, settings);
    let response = request_response(sender, app, session_id, order, timeout).await?;
    classify_order_response(&response)?;
    Ok(response)
}

/// Requests the security list.
///
/// # Errors
/// Timeout and logout failures per the flow helpers.
pub async fn list_securities(
    sender: &Arc<dyn OutboundSender>,
    app: &ResponseApp,
    session_id: &SessionId,
    settings: &SessionSettings,
    timeout: Option<Duration>,
) -> Result<Message, AppError> {
    let request = build_security_list_request(&settings.begin_string);
    let timeout = resolve_timeout(timeout, settings);
    request_response(sender, app, session_id, request, timeout).await
}

/// Requests the trading-session status snapshot.
///
/// # Errors
/// Timeout and logout failures per the flow helpers.
pub async fn trading_session_status(
    sender: &Arc<dyn OutboundSender>,
    app: &ResponseApp,
    session_id: &SessionId,
    settings: &SessionSettings,
    timeout: Option<Duration>,
) -> Result<Message, AppError> {
    let request = build_trading_session_status_request(&settings.begin_string, '0');
    let timeout = resolve_timeout(timeout, settings);
    request_response(sender, app, session_id, request, timeout).await
}

/// Requests the status of a previously sent order.
///
/// # Errors
/// Timeout and logout failures per the flow helpers.
pub async fn order_status(
    sender: &Arc<dyn OutboundSender>,
    app: &ResponseApp,
    session_id: &SessionId,
    settings: &SessionSettings,
    cl_ord_id: &str,
    symbol: &str,
    side: Side,
    timeout: Option<Duration>,
) -> Result<Message, AppError> {
    let request =
        build_order_status_request(&settings.begin_string, cl_ord_id, symbol, side);
    let timeout = resolve_timeout(timeout, settings);
    request_response(sender, app, session_id, request, timeout).await
}
