/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! The FIX-to-FIX bridge application.
//!
//! Acts as an acceptor toward FIXT/5.0SP2 clients and an initiator toward
//! FIX 4.2/4.4 exchanges. Client order flow is translated to the exchange
//! version and forwarded; exchange responses come back to the originating
//! client through the ClOrdID correlation table. Correlation entries never
//! expire within a session lifetime; responses for unknown ids are logged
//! and dropped, never a disconnect.

use crate::translate::{copy_fields, copy_party_group, CopyKind, FieldCopy};
use async_trait::async_trait;
use fixlink_core::message::{Message, MsgType};
use fixlink_core::tags;
use fixlink_core::types::SessionId;
use fixlink_engine::{
    Application, MessageRouter, OutboundSender, RejectReason, RouteOutcome, VersionKey,
    REJECT_REASON_OTHER, REJECT_REASON_UNSUPPORTED_MSG_TYPE,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// ApplVerID of the client side.
const CLIENT_APPL_VER_ID: &str = "9";

/// BeginStrings accepted on the exchange side.
const EXCHANGE_BEGIN_STRINGS: [&str; 2] = ["FIX.4.2", "FIX.4.4"];

const NEW_ORDER_SINGLE_FIELDS: &[FieldCopy] = &[
    FieldCopy::required(tags::ORDER_QTY, CopyKind::Decimal),
    FieldCopy::required(tags::ORD_TYPE, CopyKind::Char),
    FieldCopy::optional(tags::PRICE, CopyKind::Decimal),
    FieldCopy::required(tags::SIDE, CopyKind::Char),
    FieldCopy::required(tags::SYMBOL, CopyKind::Str),
    FieldCopy::required(tags::TIME_IN_FORCE, CopyKind::Char),
    FieldCopy::required(tags::TRANSACT_TIME, CopyKind::Timestamp),
    FieldCopy::optional(tags::ORDER_ORIGINATION, CopyKind::Int),
];

const ORDER_CANCEL_REQUEST_FIELDS: &[FieldCopy] = &[
    FieldCopy::optional(tags::ORIG_CL_ORD_ID, CopyKind::Str),
    FieldCopy::optional(tags::ORDER_ID, CopyKind::Str),
    FieldCopy::required(tags::SIDE, CopyKind::Char),
    FieldCopy::optional(tags::SYMBOL, CopyKind::Str),
    FieldCopy::required(tags::TRANSACT_TIME, CopyKind::Timestamp),
];

const ORDER_CANCEL_REPLACE_FIELDS: &[FieldCopy] = &[
    FieldCopy::optional(tags::ORIG_CL_ORD_ID, CopyKind::Str),
    FieldCopy::optional(tags::ORDER_ID, CopyKind::Str),
    FieldCopy::required(tags::ORDER_QTY, CopyKind::Decimal),
    FieldCopy::required(tags::ORD_TYPE, CopyKind::Char),
    FieldCopy::optional(tags::PRICE, CopyKind::Decimal),
    FieldCopy::required(tags::SIDE, CopyKind::Char),
    FieldCopy::optional(tags::SYMBOL, CopyKind::Str),
    FieldCopy::required(tags::TIME_IN_FORCE, CopyKind::Char),
    FieldCopy::required(tags::TRANSACT_TIME, CopyKind::Timestamp),
    FieldCopy::optional(tags::ORDER_ORIGINATION, CopyKind::Int),
];

const MASS_CANCEL_REQUEST_FIELDS: &[FieldCopy] = &[
    FieldCopy::required(tags::SIDE, CopyKind::Char),
    FieldCopy::required(tags::SYMBOL, CopyKind::Str),
    FieldCopy::required(tags::TRANSACT_TIME, CopyKind::Timestamp),
    FieldCopy::required(tags::MASS_CANCEL_REQUEST_TYPE, CopyKind::Char),
];

const EXECUTION_REPORT_FIELDS: &[FieldCopy] = &[
    FieldCopy::optional(tags::ACCOUNT, CopyKind::Str),
    FieldCopy::required(tags::ORDER_ID, CopyKind::Str),
    FieldCopy::optional(tags::SECONDARY_ORDER_ID, CopyKind::Str),
    FieldCopy::optional(tags::ORIG_CL_ORD_ID, CopyKind::Str),
    FieldCopy::required(tags::EXEC_ID, CopyKind::Str),
    FieldCopy::optional(tags::TRD_MATCH_ID, CopyKind::Str),
    FieldCopy::required(tags::EXEC_TYPE, CopyKind::Char),
    FieldCopy::required(tags::ORD_STATUS, CopyKind::Char),
    FieldCopy::required(tags::SYMBOL, CopyKind::Str),
    FieldCopy::required(tags::ORD_TYPE, CopyKind::Char),
    FieldCopy::required(tags::TIME_IN_FORCE, CopyKind::Char),
    FieldCopy::required(tags::SIDE, CopyKind::Char),
    FieldCopy::optional(tags::PRICE, CopyKind::Decimal),
    FieldCopy::optional(tags::LAST_PX, CopyKind::Decimal),
    FieldCopy::required(tags::CUM_QTY, CopyKind::Decimal),
    FieldCopy::optional(tags::ORDER_QTY, CopyKind::Decimal),
    FieldCopy::required(tags::LEAVES_QTY, CopyKind::Decimal),
    FieldCopy::optional(tags::LAST_QTY, CopyKind::Decimal),
    FieldCopy::optional(tags::TEXT, CopyKind::Str),
    FieldCopy::required(tags::TRANSACT_TIME, CopyKind::Timestamp),
];

const ORDER_CANCEL_REJECT_FIELDS: &[FieldCopy] = &[
    FieldCopy::optional(tags::ACCOUNT, CopyKind::Str),
    FieldCopy::required(tags::ORDER_ID, CopyKind::Str),
    FieldCopy::optional(tags::SECONDARY_ORDER_ID, CopyKind::Str),
    FieldCopy::required(tags::ORD_STATUS, CopyKind::Char),
    FieldCopy::optional(tags::ORIG_CL_ORD_ID, CopyKind::Str),
    FieldCopy::optional(tags::TEXT, CopyKind::Str),
    FieldCopy::required(tags::TRANSACT_TIME, CopyKind::Timestamp),
    FieldCopy::optional(tags::CXL_REJ_REASON, CopyKind::Int),
    FieldCopy::required(tags::CXL_REJ_RESPONSE_TO, CopyKind::Char),
];

const MASS_CANCEL_REPORT_FIELDS: &[FieldCopy] = &[
    FieldCopy::optional(tags::MASS_ACTION_REPORT_ID, CopyKind::Str),
    FieldCopy::required(tags::MASS_CANCEL_REQUEST_TYPE, CopyKind::Char),
    FieldCopy::required(tags::MASS_CANCEL_RESPONSE, CopyKind::Char),
    FieldCopy::required(tags::MASS_CANCEL_REJECT_REASON, CopyKind::Int),
    FieldCopy::optional(tags::TEXT, CopyKind::Str),
    FieldCopy::optional(tags::TRANSACT_TIME, CopyKind::Timestamp),
];

/// Policy choosing which connected exchange receives client order flow.
pub trait ExchangeSelector: Send + Sync {
    /// Picks a target from the ordered list of logged-on exchanges.
    fn select(&self, connected: &[SessionId]) -> Option<SessionId>;
}

/// Routes everything to the first connected exchange.
#[derive(Debug, Default)]
pub struct FirstConnected;

impl ExchangeSelector for FirstConnected {
    fn select(&self, connected: &[SessionId]) -> Option<SessionId> {
        connected.first().cloned()
    }
}

/// `ClOrdID -> client session` mapping.
///
/// Touched only by bridge handlers; critical sections are a single map
/// operation. Entries are orphaned (not removed) when a client session
/// drops.
#[derive(Debug, Default)]
pub struct CorrelationTable {
    inner: RwLock<HashMap<String, SessionId>>,
}

impl CorrelationTable {
    /// Records the client session of an order id.
    pub fn insert(&self, cl_ord_id: &str, session_id: SessionId) {
        self.inner.write().insert(cl_ord_id.to_string(), session_id);
    }

    /// Looks up the client session of an order id.
    #[must_use]
    pub fn lookup(&self, cl_ord_id: &str) -> Option<SessionId> {
        self.inner.read().get(cl_ord_id).cloned()
    }

    /// Number of tracked order ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns true if no order ids are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

struct BridgeState {
    correlation: CorrelationTable,
    exchanges: RwLock<Vec<SessionId>>,
    selector: Box<dyn ExchangeSelector>,
    sender: Arc<dyn OutboundSender>,
}

impl BridgeState {
    fn select_exchange(&self) -> Option<SessionId> {
        self.selector.select(&self.exchanges.read())
    }

    /// Client -> exchange: correlate by ClOrdID and forward translated.
    async fn forward_client(
        &self,
        message: Message,
        client_session: SessionId,
        msg_type: MsgType,
        fields: &'static [FieldCopy],
    ) -> Result<(), RejectReason> {
        let Some(target) = self.select_exchange() else {
            return Err(RejectReason::new(REJECT_REASON_OTHER, "No connected exchanges"));
        };
        let Some(cl_ord_id) = message.body.get_str(tags::CL_ORD_ID).map(str::to_string) else {
            return Err(RejectReason::missing_field(tags::CL_ORD_ID, "ClOrdID"));
        };

        self.correlation.insert(&cl_ord_id, client_session);

        let mut outbound = Message::with_type(&target.begin_string, msg_type);
        outbound.body.set(tags::CL_ORD_ID, cl_ord_id.as_str());
        copy_fields(&mut outbound.body, &message.body, fields)?;
        copy_party_group(&mut outbound, &message);

        self.sender
            .send_to_target(outbound, &target)
            .await
            .map_err(|err| RejectReason::new(REJECT_REASON_OTHER, err.to_string()))
    }

    /// Exchange -> client: look up the originating client and forward.
    async fn forward_exchange(
        &self,
        message: Message,
        exchange_session: SessionId,
        msg_type: MsgType,
        fields: &'static [FieldCopy],
    ) -> Result<(), RejectReason> {
        let Some(cl_ord_id) = message.body.get_str(tags::CL_ORD_ID).map(str::to_string) else {
            return Err(RejectReason::missing_field(tags::CL_ORD_ID, "ClOrdID"));
        };

        let Some(client_session) = self.correlation.lookup(&cl_ord_id) else {
            warn!(
                cl_ord_id,
                session = %exchange_session,
                "no client session found for ClOrdID"
            );
            return Ok(());
        };

        let mut outbound = Message::with_type(&client_session.begin_string, msg_type);
        outbound.body.set(tags::CL_ORD_ID, cl_ord_id.as_str());
        copy_fields(&mut outbound.body, &message.body, fields)?;
        copy_party_group(&mut outbound, &message);

        self.sender
            .send_to_target(outbound, &client_session)
            .await
            .map_err(|err| RejectReason::new(REJECT_REASON_OTHER, err.to_string()))
    }

    fn unhandled(&self, message: &Message, session_id: &SessionId) {
        debug!(
            msg_type = message.msg_type().map(|t| t.to_string()).unwrap_or_default(),
            session = %session_id,
            "unhandled message"
        );
    }
}

/// The bidirectional bridge application.
pub struct Bridge {
    state: Arc<BridgeState>,
    router: MessageRouter,
}

impl Bridge {
    /// Creates a bridge routing to the first connected exchange.
    #[must_use]
    pub fn new(sender: Arc<dyn OutboundSender>) -> Arc<Self> {
        Self::with_selector(sender, Box::new(FirstConnected))
    }

    /// Creates a bridge with an explicit exchange selection policy.
    #[must_use]
    pub fn with_selector(
        sender: Arc<dyn OutboundSender>,
        selector: Box<dyn ExchangeSelector>,
    ) -> Arc<Self> {
        let state = Arc::new(BridgeState {
            correlation: CorrelationTable::default(),
            exchanges: RwLock::new(Vec::new()),
            selector,
            sender,
        });

        let mut router = MessageRouter::new();
        let client_key = VersionKey::ApplVerId(CLIENT_APPL_VER_ID.to_string());

        for (msg_type, fields) in [
            (MsgType::NewOrderSingle, NEW_ORDER_SINGLE_FIELDS),
            (MsgType::OrderCancelRequest, ORDER_CANCEL_REQUEST_FIELDS),
            (MsgType::OrderCancelReplaceRequest, ORDER_CANCEL_REPLACE_FIELDS),
            (MsgType::OrderMassCancelRequest, MASS_CANCEL_REQUEST_FIELDS),
        ] {
            let handler_state = Arc::clone(&state);
            let forwarded_type = msg_type.clone();
            router.add_route(client_key.clone(), msg_type, move |message, session_id| {
                let state = Arc::clone(&handler_state);
                let msg_type = forwarded_type.clone();
                async move { state.forward_client(message, session_id, msg_type, fields).await }
            });
        }

        for msg_type in [MsgType::Quote, MsgType::QuoteCancel, MsgType::BusinessMessageReject] {
            let handler_state = Arc::clone(&state);
            router.add_route(client_key.clone(), msg_type, move |message, session_id| {
                let state = Arc::clone(&handler_state);
                async move {
                    state.unhandled(&message, &session_id);
                    Ok(())
                }
            });
        }

        for begin_string in EXCHANGE_BEGIN_STRINGS {
            let exchange_key = VersionKey::BeginString(begin_string.to_string());

            for (msg_type, fields) in [
                (MsgType::ExecutionReport, EXECUTION_REPORT_FIELDS),
                (MsgType::OrderCancelReject, ORDER_CANCEL_REJECT_FIELDS),
                (MsgType::OrderMassCancelReport, MASS_CANCEL_REPORT_FIELDS),
            ] {
                let handler_state = Arc::clone(&state);
                let forwarded_type = msg_type.clone();
                router.add_route(exchange_key.clone(), msg_type, move |message, session_id| {
                    let state = Arc::clone(&handler_state);
                    let msg_type = forwarded_type.clone();
                    async move {
                        state
                            .forward_exchange(message, session_id, msg_type, fields)
                            .await
                    }
                });
            }

            let handler_state = Arc::clone(&state);
            router.add_route(
                exchange_key,
                MsgType::QuoteStatusReport,
                move |message, session_id| {
                    let state = Arc::clone(&handler_state);
                    async move {
                        state.unhandled(&message, &session_id);
                        Ok(())
                    }
                },
            );
        }

        Arc::new(Self { state, router })
    }

    /// Ordered list of currently logged-on exchange sessions.
    #[must_use]
    pub fn connected_exchanges(&self) -> Vec<SessionId> {
        self.state.exchanges.read().clone()
    }

    /// The ClOrdID correlation table.
    #[must_use]
    pub fn correlation(&self) -> &CorrelationTable {
        &self.state.correlation
    }
}

#[async_trait]
impl Application for Bridge {
    async fn on_create(&self, session_id: &SessionId) {
        debug!(session = %session_id, "new session");
    }

    async fn on_logon(&self, session_id: &SessionId) {
        debug!(session = %session_id, "logon");
        if !session_id.is_fixt() {
            let mut exchanges = self.state.exchanges.write();
            if !exchanges.contains(session_id) {
                exchanges.push(session_id.clone());
            }
        }
    }

    async fn on_logout(&self, session_id: &SessionId) {
        debug!(session = %session_id, "logout");
        if !session_id.is_fixt() {
            self.state.exchanges.write().retain(|s| s != session_id);
        }
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
        Ok(())
    }

    async fn to_app(&self, message: &mut Message, session_id: &SessionId) {
        trace!(session = %session_id, "-> {}", message.to_log_string());
    }

    async fn from_app(
        &self,
        message: &Message,
        session_id: &SessionId,
    ) -> Result<(), RejectReason> {
        trace!(session = %session_id, "<- {}", message.to_log_string());
        match self
            .router
            .route(message, session_id, Some(CLIENT_APPL_VER_ID))
            .await
        {
            RouteOutcome::Handled(result) => result,
            RouteOutcome::NotFound => Err(RejectReason::new(
                REJECT_REASON_UNSUPPORTED_MSG_TYPE,
                "Unsupported message type",
            )),
        }
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("exchanges", &self.state.exchanges.read().len())
            .field("correlated_orders", &self.state.correlation.len())
            .finish()
    }
}
