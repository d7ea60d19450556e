/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Market-data validator application.
//!
//! Subscribes to market data on logon, maintains one order book per
//! security from snapshot and incremental refreshes, detects duplicate
//! ids, unknown-id updates and crossed books, and reports everything
//! through the injected metrics registry. Validator findings never
//! disconnect the session.

use crate::book::{BookError, BookSide, Order, OrderBook};
use crate::metrics::ValidatorMetrics;
use async_trait::async_trait;
use fixlink_core::error::{AppError, FixError};
use fixlink_core::field::FieldValue;
use fixlink_core::message::{FieldMap, Message, MsgType, RepeatingGroup};
use fixlink_core::tags;
use fixlink_core::types::{OrdType, SessionId};
use fixlink_engine::{
    Application, MessageRouter, OutboundSender, RejectReason, RouteOutcome, VersionKey,
    REJECT_REASON_UNSUPPORTED_MSG_TYPE,
};
use parking_lot::Mutex;
use prometheus::Registry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

/// ApplVerID the validator subscribes under.
const APPL_VER_ID: &str = "9";

/// Private entry type some venues use for trade history.
const ENTRY_TYPE_TRADE_HISTORY: &str = "101";

/// Validator behavior options.
#[derive(Debug, Clone, Default)]
pub struct ValidatorOptions {
    /// Securities to subscribe to; empty means seed from a SecurityList
    /// round-trip.
    pub symbols: Vec<String>,
    /// Request the private "101" trade-history entry type.
    pub trade_history: bool,
    /// Emit an "Exit" info event on disconnect so the caller stops
    /// instead of waiting for a reconnect.
    pub exit_on_disconnect: bool,
}

struct ValidatorState {
    books: Mutex<HashMap<String, OrderBook>>,
    metrics: ValidatorMetrics,
    options: ValidatorOptions,
    sender: Arc<dyn OutboundSender>,
    timeout: Duration,
    info_tx: mpsc::Sender<String>,
    security_list_tx: mpsc::Sender<Message>,
    security_list_rx: Mutex<Option<mpsc::Receiver<Message>>>,
}

/// The market-data validator application.
pub struct MarketDataValidator {
    state: Arc<ValidatorState>,
    router: MessageRouter,
}

impl MarketDataValidator {
    /// Creates the validator and the info-event channel the caller reads
    /// ("Connected", "Disconnected", reject notices).
    ///
    /// # Errors
    /// Returns `prometheus::Error` when the metrics cannot be registered.
    pub fn new(
        sender: Arc<dyn OutboundSender>,
        registry: &Registry,
        options: ValidatorOptions,
        timeout: Duration,
    ) -> Result<(Arc<Self>, mpsc::Receiver<String>), prometheus::Error> {
        let metrics = ValidatorMetrics::new(registry)?;
        let (info_tx, info_rx) = mpsc::channel(16);
        let (security_list_tx, security_list_rx) = mpsc::channel(4);

        let state = Arc::new(ValidatorState {
            books: Mutex::new(HashMap::new()),
            metrics,
            options,
            sender,
            timeout,
            info_tx,
            security_list_tx,
            security_list_rx: Mutex::new(Some(security_list_rx)),
        });

        let mut router = MessageRouter::new();
        let snapshot_state = Arc::clone(&state);
        router.add_route(
            VersionKey::ApplVerId(APPL_VER_ID.to_string()),
            MsgType::MarketDataSnapshotFullRefresh,
            move |message, _session_id| {
                let state = Arc::clone(&snapshot_state);
                async move { state.on_snapshot(&message) }
            },
        );
        let incremental_state = Arc::clone(&state);
        router.add_route(
            VersionKey::ApplVerId(APPL_VER_ID.to_string()),
            MsgType::MarketDataIncrementalRefresh,
            move |message, _session_id| {
                let state = Arc::clone(&incremental_state);
                async move { state.on_incremental(&message) }
            },
        );

        Ok((Arc::new(Self { state, router }), info_rx))
    }

    /// Current number of orders for a security, for observability hooks.
    #[must_use]
    pub fn order_count(&self, security: &str) -> Option<usize> {
        self.state.books.lock().get(security).map(OrderBook::len)
    }
}

impl ValidatorState {
    fn notify(&self, event: &str) {
        let _ = self.info_tx.try_send(event.to_string());
    }

    /// Seeds books and metrics for a fresh security list.
    fn seed_books(&self, symbols: &[String]) {
        let mut books = self.books.lock();
        books.clear();
        for symbol in symbols {
            books.insert(symbol.clone(), OrderBook::new());
            self.metrics.seed_security(symbol);
        }
    }

    fn on_snapshot(&self, message: &Message) -> Result<(), RejectReason> {
        let Some(security) = message.body.get_str(tags::SYMBOL).map(str::to_string) else {
            error!("snapshot without Symbol");
            return Err(RejectReason::missing_field(tags::SYMBOL, "Symbol"));
        };
        let Some(entries) = message.group(tags::NO_MD_ENTRIES) else {
            error!(security, "snapshot without NoMDEntries");
            return Err(RejectReason::missing_field(tags::NO_MD_ENTRIES, "NoMDEntries"));
        };
        info!(security, entries = entries.len(), "received snapshot full refresh");

        let mut books = self.books.lock();
        let Some(book) = books.get_mut(&security) else {
            let reason = format!("symbol not found internally: {security}");
            error!(security, "{reason}");
            return Err(RejectReason::new(0, reason));
        };

        for entry in &entries.entries {
            let Some(entry_type) = entry.get_char(tags::MD_ENTRY_TYPE) else {
                error!(security, "entry without MDEntryType");
                continue;
            };
            match BookSide::from_char(entry_type) {
                Some(side) => {
                    let Some(order) = self.order_from_entry(entry, side, &security) else {
                        continue;
                    };
                    if let Err(err) = book.add_order(order) {
                        self.report_book_error(&security, err);
                    }
                }
                None if entry_type == '2' => {
                    self.metrics
                        .trade_updates
                        .with_label_values(&[&security, "new"])
                        .inc();
                }
                None => {
                    warn!(security, %entry_type, "entry type not implemented");
                }
            }
        }

        debug!(
            security,
            types = ?book.types_volume(),
            sides = ?book.sides_volume(),
            "order book after snapshot"
        );
        self.update_order_gauges(&security, book);
        self.apply_crossed(&security, book);
        Ok(())
    }

    fn on_incremental(&self, message: &Message) -> Result<(), RejectReason> {
        let Some(entries) = message.group(tags::NO_MD_ENTRIES) else {
            error!("incremental refresh without NoMDEntries");
            return Err(RejectReason::missing_field(tags::NO_MD_ENTRIES, "NoMDEntries"));
        };
        if entries.is_empty() {
            error!("MDEntries seems empty");
            return Err(RejectReason::new(0, "MDEntries seems empty"));
        }

        let Some(security) = entries.entries[0]
            .get_str(tags::SYMBOL)
            .map(str::to_string)
        else {
            error!("no security found in MDEntries");
            return Err(RejectReason::missing_field(tags::SYMBOL, "Symbol"));
        };

        let mut books = self.books.lock();
        let Some(book) = books.get_mut(&security) else {
            let reason = format!("security not found: {security}");
            error!(security, "{reason}");
            return Err(RejectReason::new(0, reason));
        };

        self.metrics
            .incremental_refreshes
            .with_label_values(&[&security])
            .inc();
        info!(security, entries = entries.len(), "received incremental refresh");

        for entry in &entries.entries {
            let Some(entry_type) = entry.get_char(tags::MD_ENTRY_TYPE) else {
                error!(security, "entry without MDEntryType");
                continue;
            };
            let Some(action) = entry.get_char(tags::MD_UPDATE_ACTION) else {
                error!(security, "entry without MDUpdateAction");
                continue;
            };

            match BookSide::from_char(entry_type) {
                Some(side) => {
                    let Some(order) = self.order_from_entry(entry, side, &security) else {
                        continue;
                    };
                    let type_label = order.ord_type.label();
                    let side_label = side.label();

                    let result = match action {
                        '0' => {
                            self.count_order_update(&security, "new", type_label, side_label);
                            book.add_order(order)
                        }
                        '1' => {
                            self.count_order_update(&security, "change", type_label, side_label);
                            book.update_order(order)
                        }
                        '2' => {
                            self.count_order_update(&security, "delete", type_label, side_label);
                            book.delete_order(&order.id)
                        }
                        other => {
                            warn!(security, %other, "update action not implemented");
                            Ok(())
                        }
                    };
                    if let Err(err) = result {
                        self.report_book_error(&security, err);
                    }
                }
                None if entry_type == '2' => {
                    if action == '0' {
                        self.metrics
                            .trade_updates
                            .with_label_values(&[&security, "new"])
                            .inc();
                    }
                }
                None => {
                    warn!(security, %entry_type, "entry type not implemented");
                }
            }
        }

        debug!(
            security,
            types = ?book.types_volume(),
            sides = ?book.sides_volume(),
            "order book after incremental refresh"
        );
        self.update_order_gauges(&security, book);
        self.apply_crossed(&security, book);
        Ok(())
    }

    /// Builds an order from an MDEntry; logs and skips malformed entries.
    fn order_from_entry(
        &self,
        entry: &FieldMap,
        side: BookSide,
        security: &str,
    ) -> Option<Order> {
        let Some(id) = entry.get_str(tags::ORDER_ID) else {
            error!(security, "no order ID found in entry");
            return None;
        };
        let Some(ord_type) = entry
            .get_char(tags::ORD_TYPE)
            .and_then(OrdType::from_char)
        else {
            error!(security, "no order type found in entry");
            return None;
        };
        let size = entry.get_decimal(tags::MD_ENTRY_SIZE).unwrap_or_default();
        let price = entry.get_decimal(tags::MD_ENTRY_PX).unwrap_or_default();

        Some(Order {
            id: id.to_string(),
            side,
            ord_type,
            price,
            size,
            remaining_size: size,
        })
    }

    fn count_order_update(&self, security: &str, update: &str, ord_type: &str, side: &str) {
        self.metrics
            .order_updates
            .with_label_values(&[security, update, ord_type, side])
            .inc();
    }

    fn report_book_error(&self, security: &str, err: BookError) {
        error!(security, %err, "book operation failed");
        self.metrics
            .errors
            .with_label_values(&[security, &err.to_string()])
            .inc();
    }

    fn update_order_gauges(&self, security: &str, book: &OrderBook) {
        for ((ord_type, side), count) in book.stats() {
            self.metrics
                .orders
                .with_label_values(&[security, ord_type.label(), side.label()])
                .set(count);
        }
    }

    fn apply_crossed(&self, security: &str, book: &mut OrderBook) {
        let state = book.check_crossed();
        if state.crossed {
            if state.changed {
                self.metrics
                    .crossed_updates
                    .with_label_values(&[security])
                    .inc();
                self.metrics
                    .book_crossed
                    .with_label_values(&[security])
                    .set(1);
            }
            error!(
                security,
                best_bid = ?book.best_bid(),
                best_offer = ?book.best_offer(),
                "order book is crossed"
            );
        } else if state.changed {
            self.metrics
                .book_crossed
                .with_label_values(&[security])
                .set(0);
        }
    }

    /// Sends the market-data subscription, seeding the security list from
    /// a SecurityList round-trip when no symbols were configured.
    async fn subscribe(&self, session_id: &SessionId) -> Result<(), FixError> {
        if self.options.symbols.is_empty() {
            self.load_symbols_from_fix(session_id).await?;
        } else {
            self.seed_books(&self.options.symbols);
        }

        let request = self.build_subscription_message(session_id);
        self.sender
            .send_to_target(request, session_id)
            .await
            .map_err(FixError::from)
    }

    fn build_subscription_message(&self, session_id: &SessionId) -> Message {
        let mut message =
            Message::with_type(&session_id.begin_string, MsgType::MarketDataRequest);
        message
            .body
            .set(tags::MD_REQ_ID, Uuid::new_v4().to_string());
        message.body.set(tags::SUBSCRIPTION_REQUEST_TYPE, '1');
        message.body.set(tags::MARKET_DEPTH, FieldValue::UInt(0));
        message.body.set(tags::MD_UPDATE_TYPE, FieldValue::UInt(1));

        let mut entry_types = RepeatingGroup::new(tags::NO_MD_ENTRY_TYPES, tags::MD_ENTRY_TYPE);
        for wire in ['0', '1', '2'] {
            entry_types.add_entry().set(tags::MD_ENTRY_TYPE, wire);
        }
        if self.options.trade_history {
            entry_types
                .add_entry()
                .set(tags::MD_ENTRY_TYPE, ENTRY_TYPE_TRADE_HISTORY);
        }
        message.set_group(entry_types);

        let mut related_sym = RepeatingGroup::new(tags::NO_RELATED_SYM, tags::SYMBOL);
        let mut symbols: Vec<String> = self.books.lock().keys().cloned().collect();
        symbols.sort();
        for symbol in symbols {
            related_sym.add_entry().set(tags::SYMBOL, symbol.as_str());
        }
        message.set_group(related_sym);
        message
    }

    /// Issues a SecurityListRequest and seeds the books from the response.
    async fn load_symbols_from_fix(&self, session_id: &SessionId) -> Result<(), FixError> {
        let mut request =
            Message::with_type(&session_id.begin_string, MsgType::SecurityListRequest);
        request
            .body
            .set(tags::SECURITY_REQ_ID, Uuid::new_v4().to_string());
        request
            .body
            .set(tags::SECURITY_LIST_REQUEST_TYPE, FieldValue::UInt(0));
        self.sender.send_to_target(request, session_id).await?;

        let Some(mut receiver) = self.security_list_rx.lock().take() else {
            return Err(AppError::ResponseTimeout.into());
        };
        let response = tokio::time::timeout(self.timeout, receiver.recv()).await;
        *self.security_list_rx.lock() = Some(receiver);

        let response = match response {
            Err(_) => return Err(AppError::ResponseTimeout.into()),
            Ok(None) => return Err(AppError::FixLogout.into()),
            Ok(Some(message)) => message,
        };

        let Some(group) = response.group(tags::NO_RELATED_SYM) else {
            return Err(AppError::ResponseTimeout.into());
        };
        let symbols: Vec<String> = group
            .entries
            .iter()
            .filter_map(|entry| entry.get_str(tags::SYMBOL).map(str::to_string))
            .collect();
        info!(count = symbols.len(), "seeded security list from FIX");
        self.seed_books(&symbols);
        Ok(())
    }
}

#[async_trait]
impl Application for MarketDataValidator {
    async fn on_create(&self, session_id: &SessionId) {
        debug!(session = %session_id, "new session");
        self.state
            .metrics
            .connection
            .with_label_values(&[&session_id.to_string()])
            .set(0);
    }

    async fn on_logon(&self, session_id: &SessionId) {
        debug!(session = %session_id, "logon");
        self.state
            .metrics
            .connection
            .with_label_values(&[&session_id.to_string()])
            .set(1);
        self.state.notify("Connected");

        let state = Arc::clone(&self.state);
        let session_id = session_id.clone();
        tokio::spawn(async move {
            if let Err(err) = state.subscribe(&session_id).await {
                error!(session = %session_id, %err, "error while subscribing");
            }
        });
    }

    async fn on_logout(&self, session_id: &SessionId) {
        debug!(session = %session_id, "logout");
        self.state
            .metrics
            .connection
            .with_label_values(&[&session_id.to_string()])
            .set(0);

        let securities: Vec<String> = {
            let mut books = self.state.books.lock();
            let keys: Vec<String> = books.keys().cloned().collect();
            books.clear();
            keys
        };
        for security in securities {
            self.state.metrics.seed_security(&security);
        }

        self.state.notify("Disconnected");
        if self.state.options.exit_on_disconnect {
            self.state.notify("Exit");
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

        match message.msg_type() {
            Some(MsgType::BusinessMessageReject) => {
                self.state.notify("Received BusinessMessageReject");
                Ok(())
            }
            Some(MsgType::SecurityList) => {
                let _ = self.state.security_list_tx.try_send(message.clone());
                Ok(())
            }
            Some(MsgType::News) => {
                let headline = message.body.get_str(tags::HEADLINE).unwrap_or("");
                let text = message
                    .group(tags::NO_LINES_OF_TEXT)
                    .and_then(|g| g.entries.first())
                    .and_then(|e| e.get_str(tags::TEXT))
                    .or_else(|| message.body.get_str(tags::TEXT))
                    .unwrap_or("");
                info!(headline, text, "receiving news");
                Ok(())
            }
            _ => match self
                .router
                .route(message, session_id, Some(APPL_VER_ID))
                .await
            {
                RouteOutcome::Handled(result) => result,
                RouteOutcome::NotFound => Err(RejectReason::new(
                    REJECT_REASON_UNSUPPORTED_MSG_TYPE,
                    "Unsupported message type",
                )),
            },
        }
    }
}

impl std::fmt::Debug for MarketDataValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDataValidator")
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixlink_core::error::SessionError;
    use fixlink_core::types::CompId;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<(Message, SessionId)>>,
    }

    #[async_trait]
    impl OutboundSender for RecordingSender {
        async fn send_to_target(
            &self,
            message: Message,
            session_id: &SessionId,
        ) -> Result<(), SessionError> {
            self.sent.lock().push((message, session_id.clone()));
            Ok(())
        }
    }

    fn session_id() -> SessionId {
        SessionId::new(
            "FIXT.1.1",
            CompId::new("CL").unwrap(),
            CompId::new("SRV").unwrap(),
        )
    }

    fn validator(
        options: ValidatorOptions,
    ) -> (Arc<MarketDataValidator>, Arc<RecordingSender>, Registry) {
        let registry = Registry::new();
        let sender = Arc::new(RecordingSender::default());
        let (validator, _info_rx) = MarketDataValidator::new(
            Arc::clone(&sender) as Arc<dyn OutboundSender>,
            &registry,
            options,
            Duration::from_secs(1),
        )
        .unwrap();
        (validator, sender, registry)
    }

    fn snapshot_entry(
        group: &mut RepeatingGroup,
        entry_type: char,
        order_id: &str,
        px: &str,
        size: &str,
    ) {
        let entry = group.add_entry();
        entry.set(tags::MD_ENTRY_TYPE, entry_type);
        entry.set(
            tags::MD_ENTRY_PX,
            FieldValue::Decimal(px.parse().unwrap()),
        );
        entry.set(
            tags::MD_ENTRY_SIZE,
            FieldValue::Decimal(size.parse().unwrap()),
        );
        entry.set(tags::ORDER_ID, order_id);
        entry.set(tags::ORD_TYPE, '2');
    }

    fn incremental_entry(
        group: &mut RepeatingGroup,
        action: char,
        entry_type: char,
        order_id: &str,
        px: &str,
        size: &str,
        symbol: &str,
    ) {
        let entry = group.add_entry();
        entry.set(tags::MD_UPDATE_ACTION, action);
        entry.set(tags::MD_ENTRY_TYPE, entry_type);
        entry.set(
            tags::MD_ENTRY_PX,
            FieldValue::Decimal(px.parse().unwrap()),
        );
        entry.set(
            tags::MD_ENTRY_SIZE,
            FieldValue::Decimal(size.parse().unwrap()),
        );
        entry.set(tags::ORDER_ID, order_id);
        entry.set(tags::ORD_TYPE, '2');
        entry.set(tags::SYMBOL, symbol);
    }

    fn snapshot_message(symbol: &str, build: impl FnOnce(&mut RepeatingGroup)) -> Message {
        let mut message =
            Message::with_type("FIXT.1.1", MsgType::MarketDataSnapshotFullRefresh);
        message.body.set(tags::SYMBOL, symbol);
        let mut group = RepeatingGroup::new(tags::NO_MD_ENTRIES, tags::MD_ENTRY_TYPE);
        build(&mut group);
        message.set_group(group);
        message
    }

    fn incremental_message(build: impl FnOnce(&mut RepeatingGroup)) -> Message {
        let mut message =
            Message::with_type("FIXT.1.1", MsgType::MarketDataIncrementalRefresh);
        let mut group = RepeatingGroup::new(tags::NO_MD_ENTRIES, tags::MD_UPDATE_ACTION);
        build(&mut group);
        message.set_group(group);
        message
    }

    // Scenario: a snapshot with one bid seeds the book; one order, best bid
    // set, no offer, not crossed.
    #[test]
    fn test_snapshot_adds_order() {
        let (validator, _sender, _registry) = validator(ValidatorOptions::default());
        validator.state.seed_books(&["ABC".to_string()]);

        let message = snapshot_message("ABC", |group| {
            snapshot_entry(group, '0', "o1", "100.00", "10");
        });
        validator.state.on_snapshot(&message).unwrap();

        let books = validator.state.books.lock();
        let book = books.get("ABC").unwrap();
        assert_eq!(book.len(), 1);
        assert_eq!(book.best_bid().unwrap().id, "o1");
        assert!(book.best_offer().is_none());
        assert!(!book.is_crossed());
    }

    #[test]
    fn test_snapshot_unknown_symbol_rejected() {
        let (validator, _sender, _registry) = validator(ValidatorOptions::default());
        let message = snapshot_message("GHOST", |group| {
            snapshot_entry(group, '0', "o1", "100.00", "10");
        });
        assert!(validator.state.on_snapshot(&message).is_err());
    }

    // Scenario: an incremental offer below the standing bid crosses the
    // book; gauge goes to 1 and the one-shot counter increments once.
    #[test]
    fn test_incremental_crossed_detection() {
        let (validator, _sender, _registry) = validator(ValidatorOptions::default());
        validator.state.seed_books(&["ABC".to_string()]);

        let snapshot = snapshot_message("ABC", |group| {
            snapshot_entry(group, '0', "o1", "100.00", "10");
        });
        validator.state.on_snapshot(&snapshot).unwrap();

        let incremental = incremental_message(|group| {
            incremental_entry(group, '0', '1', "o2", "99.00", "5", "ABC");
        });
        validator.state.on_incremental(&incremental).unwrap();

        let metrics = &validator.state.metrics;
        assert_eq!(metrics.book_crossed.with_label_values(&["ABC"]).get(), 1);
        assert_eq!(metrics.crossed_updates.with_label_values(&["ABC"]).get(), 1);
        {
            let books = validator.state.books.lock();
            assert!(books.get("ABC").unwrap().is_crossed());
        }

        // A second crossed update does not re-increment the one-shot counter.
        let more = incremental_message(|group| {
            incremental_entry(group, '0', '1', "o3", "98.00", "5", "ABC");
        });
        validator.state.on_incremental(&more).unwrap();
        assert_eq!(metrics.crossed_updates.with_label_values(&["ABC"]).get(), 1);
    }

    // Scenario: deleting the best bid uncrosses the book; deleting a
    // missing id counts an "order not found" error.
    #[test]
    fn test_incremental_delete_best_and_missing() {
        let (validator, _sender, _registry) = validator(ValidatorOptions::default());
        validator.state.seed_books(&["ABC".to_string()]);

        let snapshot = snapshot_message("ABC", |group| {
            snapshot_entry(group, '0', "o1", "100.00", "10");
        });
        validator.state.on_snapshot(&snapshot).unwrap();
        let crossing = incremental_message(|group| {
            incremental_entry(group, '0', '1', "o2", "99.00", "5", "ABC");
        });
        validator.state.on_incremental(&crossing).unwrap();

        let delete = incremental_message(|group| {
            incremental_entry(group, '2', '0', "o1", "100.00", "10", "ABC");
        });
        validator.state.on_incremental(&delete).unwrap();

        let metrics = &validator.state.metrics;
        assert_eq!(metrics.book_crossed.with_label_values(&["ABC"]).get(), 0);
        {
            let books = validator.state.books.lock();
            let book = books.get("ABC").unwrap();
            assert!(book.best_bid().is_none());
            assert!(!book.is_crossed());
        }

        let delete_again = incremental_message(|group| {
            incremental_entry(group, '2', '0', "o1", "100.00", "10", "ABC");
        });
        validator.state.on_incremental(&delete_again).unwrap();
        assert_eq!(
            metrics
                .errors
                .with_label_values(&["ABC", "order not found"])
                .get(),
            1
        );
    }

    #[test]
    fn test_duplicate_add_counts_error() {
        let (validator, _sender, _registry) = validator(ValidatorOptions::default());
        validator.state.seed_books(&["ABC".to_string()]);

        let snapshot = snapshot_message("ABC", |group| {
            snapshot_entry(group, '0', "o1", "100.00", "10");
            snapshot_entry(group, '0', "o1", "101.00", "10");
        });
        validator.state.on_snapshot(&snapshot).unwrap();

        assert_eq!(
            validator
                .state
                .metrics
                .errors
                .with_label_values(&["ABC", "order already exists"])
                .get(),
            1
        );
    }

    #[test]
    fn test_snapshot_trade_entry_counts() {
        let (validator, _sender, _registry) = validator(ValidatorOptions::default());
        validator.state.seed_books(&["ABC".to_string()]);

        let snapshot = snapshot_message("ABC", |group| {
            let entry = group.add_entry();
            entry.set(tags::MD_ENTRY_TYPE, '2');
            entry.set(
                tags::MD_ENTRY_PX,
                FieldValue::Decimal("100.00".parse().unwrap()),
            );
        });
        validator.state.on_snapshot(&snapshot).unwrap();

        assert_eq!(
            validator
                .state
                .metrics
                .trade_updates
                .with_label_values(&["ABC", "new"])
                .get(),
            1
        );
        assert_eq!(validator.order_count("ABC"), Some(0));
    }

    #[tokio::test]
    async fn test_subscribe_with_configured_symbols() {
        let options = ValidatorOptions {
            symbols: vec!["ABC".to_string(), "XYZ".to_string()],
            trade_history: true,
            exit_on_disconnect: false,
        };
        let (validator, sender, _registry) = validator(options);

        validator.state.subscribe(&session_id()).await.unwrap();

        let sent = sender.sent.lock();
        assert_eq!(sent.len(), 1);
        let (message, target) = &sent[0];
        assert_eq!(*target, session_id());
        assert_eq!(message.msg_type(), Some(MsgType::MarketDataRequest));
        assert_eq!(message.body.get_char(tags::SUBSCRIPTION_REQUEST_TYPE), Some('1'));
        assert_eq!(message.body.get_uint(tags::MARKET_DEPTH), Some(0));
        assert_eq!(message.body.get_uint(tags::MD_UPDATE_TYPE), Some(1));

        let entry_types = message.group(tags::NO_MD_ENTRY_TYPES).unwrap();
        // Bid, offer, trade plus the private trade-history marker.
        assert_eq!(entry_types.len(), 4);
        assert_eq!(
            entry_types.entries[3].get_str(tags::MD_ENTRY_TYPE),
            Some(ENTRY_TYPE_TRADE_HISTORY)
        );

        let related = message.group(tags::NO_RELATED_SYM).unwrap();
        assert_eq!(related.len(), 2);
        assert_eq!(related.entries[0].get_str(tags::SYMBOL), Some("ABC"));
    }

    #[tokio::test]
    async fn test_security_list_seeding() {
        let (validator, sender, _registry) = validator(ValidatorOptions::default());

        // Feed the SecurityList response through the application callback
        // before the round-trip waits on it.
        let mut response = Message::with_type("FIXT.1.1", MsgType::SecurityList);
        response.body.set(tags::SECURITY_REQ_ID, "req-1");
        let mut group = RepeatingGroup::new(tags::NO_RELATED_SYM, tags::SYMBOL);
        group.add_entry().set(tags::SYMBOL, "ABC");
        group.add_entry().set(tags::SYMBOL, "DEF");
        response.set_group(group);
        validator
            .from_app(&response, &session_id())
            .await
            .unwrap();

        validator.state.subscribe(&session_id()).await.unwrap();

        let sent = sender.sent.lock();
        // SecurityListRequest then MarketDataRequest.
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0.msg_type(), Some(MsgType::SecurityListRequest));
        let request = &sent[1].0;
        let related = request.group(tags::NO_RELATED_SYM).unwrap();
        assert_eq!(related.len(), 2);
        assert_eq!(validator.order_count("ABC"), Some(0));
        assert_eq!(validator.order_count("DEF"), Some(0));
    }

    #[tokio::test]
    async fn test_from_app_routes_unknown_type_to_reject() {
        let (validator, _sender, _registry) = validator(ValidatorOptions::default());
        let message = Message::with_type("FIXT.1.1", MsgType::Quote);
        let err = validator
            .from_app(&message, &session_id())
            .await
            .unwrap_err();
        assert_eq!(err.code, REJECT_REASON_UNSUPPORTED_MSG_TYPE);
    }
}
