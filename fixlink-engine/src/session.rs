/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! The session actor.
//!
//! One task owns all mutable session state (FSM, sequence numbers, timers);
//! a reader task drains the socket into a bounded inbound queue and a writer
//! task drains a bounded outbound queue into the socket. Applications reach
//! the session only through its command queue, so ordering is by
//! construction: inbound messages are delivered in arrival order and
//! outbound messages are sequence-numbered in send order.

use crate::application::Application;
use crate::registry::SessionCommand;
use bytes::BytesMut;
use fixlink_core::error::{DecodeError, FixError, SessionError};
use fixlink_core::field::FieldValue;
use fixlink_core::message::{Message, MsgType};
use fixlink_core::tags;
use fixlink_core::types::{SessionId, Timestamp};
use fixlink_dictionary::Dictionary;
use fixlink_session::{
    HeartbeatManager, SequenceCheck, SequenceManager, SessionRole, SessionSettings, SessionState,
    StateMachine,
};
use fixlink_store::MessageStore;
use fixlink_tagvalue::{MessageDecoder, MessageEncoder};
use fixlink_transport::FixCodec;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

/// Capacity of the per-session inbound and outbound queues.
const QUEUE_DEPTH: usize = 64;

/// Tick driving heartbeat and timeout checks.
const TIMER_TICK: Duration = Duration::from_millis(250);

/// Events the reader task delivers to the session task.
#[derive(Debug)]
enum InboundEvent {
    /// A complete, parsed message.
    Message(Box<Message>),
    /// Framing or parse failure; disconnect-worthy, no Logout.
    FrameError(String),
    /// The peer closed the connection.
    Closed,
}

/// Cloneable handle for pushing commands to a session task.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    commands: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Returns the session identity.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns the underlying command queue.
    #[must_use]
    pub fn commands(&self) -> mpsc::Sender<SessionCommand> {
        self.commands.clone()
    }

    /// Queues an application message for sending.
    ///
    /// # Errors
    /// Returns `SessionError::Closed` when the session task has stopped.
    pub async fn send(&self, message: Message) -> Result<(), SessionError> {
        self.commands
            .send(SessionCommand::Send(message))
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Requests a logout.
    ///
    /// # Errors
    /// Returns `SessionError::Closed` when the session task has stopped.
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.commands
            .send(SessionCommand::Logout)
            .await
            .map_err(|_| SessionError::Closed)
    }
}

/// The per-session state machine driver.
///
/// Created once per configured session and reused across reconnects so
/// sequence numbers survive transport drops.
pub struct SessionRuntime {
    settings: SessionSettings,
    session_id: SessionId,
    role: SessionRole,
    transport_dict: Arc<Dictionary>,
    app_dict: Arc<Dictionary>,
    decoder: MessageDecoder,
    encoder: MessageEncoder,
    app: Arc<dyn Application>,
    store: Arc<dyn MessageStore>,
    seq: SequenceManager,
    heartbeat: HeartbeatManager,
    fsm: StateMachine,
    commands: Option<mpsc::Receiver<SessionCommand>>,
    logon_sent_at: Option<Instant>,
    logout_sent_at: Option<Instant>,
}

impl SessionRuntime {
    /// Creates a session runtime and its command handle.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` for inconsistent settings.
    pub fn new(
        settings: SessionSettings,
        transport_dict: Arc<Dictionary>,
        app_dict: Arc<Dictionary>,
        app: Arc<dyn Application>,
        store: Arc<dyn MessageStore>,
    ) -> Result<(Self, SessionHandle), SessionError> {
        settings.validate()?;
        let role = settings.role()?;
        let session_id = settings.session_id();
        let seq = SequenceManager::with_initial(
            store.next_sender_seq_num(),
            store.next_target_seq_num(),
        );
        let heartbeat = HeartbeatManager::new(settings.heart_bt_int);
        let decoder = MessageDecoder::new(Arc::clone(&transport_dict), Arc::clone(&app_dict))
            .with_checksum_validation(settings.validate_checksum);

        let (commands_tx, commands_rx) = mpsc::channel(QUEUE_DEPTH);
        let handle = SessionHandle {
            session_id: session_id.clone(),
            commands: commands_tx,
        };

        Ok((
            Self {
                settings,
                session_id,
                role,
                transport_dict,
                app_dict,
                decoder,
                encoder: MessageEncoder::new(),
                app,
                store,
                seq,
                heartbeat,
                fsm: StateMachine::new(),
                commands: Some(commands_rx),
                logon_sent_at: None,
                logout_sent_at: None,
            },
            handle,
        ))
    }

    /// Returns the session identity.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns the current FSM state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.fsm.state()
    }

    /// Drives one connection lifecycle over an established transport.
    ///
    /// Returns when the connection ends, gracefully or not; the caller owns
    /// the reconnect policy.
    ///
    /// # Errors
    /// Returns `FixError` for unrecoverable local failures; remote failures
    /// end the connection and return `Ok`.
    pub async fn run<S>(&mut self, socket: S) -> Result<(), FixError>
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let Some(mut commands) = self.commands.take() else {
            return Err(SessionError::Closed.into());
        };

        self.fsm = StateMachine::new();
        self.fsm.on_connect()?;
        self.heartbeat.reset();
        self.logon_sent_at = None;
        self.logout_sent_at = None;

        let codec = FixCodec::new()
            .with_max_message_size(self.settings.max_message_size)
            .with_checksum_validation(self.settings.validate_checksum);

        let (read_half, write_half) = tokio::io::split(socket);
        let mut framed_read = FramedRead::new(read_half, codec.clone());
        let mut framed_write = FramedWrite::new(write_half, codec);

        let (inbound_tx, mut inbound_rx) = mpsc::channel::<InboundEvent>(QUEUE_DEPTH);
        let (write_tx, mut write_rx) = mpsc::channel::<BytesMut>(QUEUE_DEPTH);

        let decoder = self.decoder.clone();
        let reader = tokio::spawn(async move {
            while let Some(frame) = framed_read.next().await {
                let event = match frame {
                    Ok(bytes) => match decoder.decode(&bytes) {
                        Ok(message) => InboundEvent::Message(Box::new(message)),
                        Err(err) => InboundEvent::FrameError(err.to_string()),
                    },
                    Err(err) => InboundEvent::FrameError(err.to_string()),
                };
                let fatal = matches!(event, InboundEvent::FrameError(_));
                if inbound_tx.send(event).await.is_err() || fatal {
                    return;
                }
            }
            let _ = inbound_tx.send(InboundEvent::Closed).await;
        });

        let writer = tokio::spawn(async move {
            while let Some(bytes) = write_rx.recv().await {
                if framed_write.send(bytes).await.is_err() {
                    break;
                }
            }
            let _ = SinkExt::<BytesMut>::flush(&mut framed_write).await;
        });

        if self.role == SessionRole::Initiator {
            if self.settings.reset_on_logon {
                self.seq.reset();
                let _ = self.store.reset().await;
            }
            let logon = self.build_logon();
            self.send_message(logon, &write_tx).await;
            self.fsm.on_logon_sent()?;
            self.logon_sent_at = Some(Instant::now());
        }

        let mut ticker = tokio::time::interval(TIMER_TICK);
        let mut was_logged_on = false;
        let mut commands_closed = false;
        loop {
            let disconnect = tokio::select! {
                event = inbound_rx.recv() => match event {
                    None | Some(InboundEvent::Closed) => {
                        info!(session = %self.session_id, "connection closed by peer");
                        true
                    }
                    Some(InboundEvent::FrameError(err)) => {
                        error!(session = %self.session_id, %err, "frame error, disconnecting");
                        true
                    }
                    Some(InboundEvent::Message(message)) => {
                        self.handle_inbound(*message, &write_tx).await
                    }
                },
                command = commands.recv(), if !commands_closed => match command {
                    None => {
                        commands_closed = true;
                        self.initiate_logout("shutting down", &write_tx).await;
                        false
                    }
                    Some(SessionCommand::Send(message)) => {
                        self.handle_send_command(message, &write_tx).await;
                        false
                    }
                    Some(SessionCommand::Logout) => {
                        self.initiate_logout("logout requested", &write_tx).await;
                        false
                    }
                },
                _ = ticker.tick() => self.on_tick(&write_tx).await,
            };

            if self.fsm.state().is_logged_on() {
                was_logged_on = true;
            }
            if disconnect {
                break;
            }
        }

        reader.abort();
        drop(write_tx);
        let _ = writer.await;
        self.commands = Some(commands);

        if was_logged_on {
            self.app.on_logout(&self.session_id).await;
        }
        if self.settings.reset_on_disconnect {
            self.seq.reset();
            let _ = self.store.reset().await;
        }
        self.fsm.on_disconnect();
        Ok(())
    }

    /// Handles one inbound message; returns true to disconnect.
    async fn handle_inbound(
        &mut self,
        message: Message,
        write_tx: &mpsc::Sender<BytesMut>,
    ) -> bool {
        trace!(session = %self.session_id, "<- {}", message.to_log_string());

        let Some(msg_type) = message.msg_type() else {
            warn!(session = %self.session_id, "message without MsgType");
            return true;
        };

        self.heartbeat.on_message_received(
            msg_type == MsgType::Heartbeat,
            message.body.get_str(tags::TEST_REQ_ID),
        );

        if msg_type == MsgType::SequenceReset {
            self.on_sequence_reset(&message);
            return false;
        }

        let Some(seq_num) = message.seq_num() else {
            warn!(session = %self.session_id, "message without MsgSeqNum, disconnecting");
            return true;
        };

        // A Logon carrying ResetSeqNumFlag=Y restarts inbound numbering
        // before the sequence check.
        if msg_type == MsgType::Logon
            && message.body.get_bool(tags::RESET_SEQ_NUM_FLAG).unwrap_or(false)
        {
            info!(session = %self.session_id, "peer requested sequence reset");
            self.seq.set_target_seq(1);
        }

        match self.seq.check_incoming(seq_num.value()) {
            SequenceCheck::Gap { expected, received } => {
                warn!(
                    session = %self.session_id,
                    expected, received, "sequence gap, requesting resend"
                );
                // A Logon still completes the handshake so the resend can
                // flow on the established session.
                if msg_type == MsgType::Logon {
                    let _ = self.process_admin(msg_type.clone(), &message, write_tx).await;
                }
                let mut resend = Message::with_type(&self.settings.begin_string, MsgType::ResendRequest);
                resend.body.set(tags::BEGIN_SEQ_NO, FieldValue::UInt(expected));
                resend.body.set(tags::END_SEQ_NO, FieldValue::UInt(0));
                self.send_message(resend, write_tx).await;
                return false;
            }
            SequenceCheck::TooLow { expected, received } => {
                if message.is_poss_dup() {
                    debug!(
                        session = %self.session_id,
                        received, "possible duplicate accepted"
                    );
                    return false;
                }
                error!(
                    session = %self.session_id,
                    expected, received, "sequence too low, logging out"
                );
                self.initiate_logout(
                    &format!("MsgSeqNum too low, expecting {expected} but received {received}"),
                    write_tx,
                )
                .await;
                return false;
            }
            SequenceCheck::Ok => {
                self.seq.increment_target_seq();
                self.store
                    .set_next_target_seq_num(self.seq.next_target_seq().value());
            }
        }

        // Required-field validation per the session's dictionaries; a
        // violation answers with a session-level Reject, not a disconnect.
        let dict = if msg_type.is_admin() {
            &self.transport_dict
        } else {
            &self.app_dict
        };
        if let Err(DecodeError::MissingRequiredField { tag }) = dict.validate_required(&message) {
            warn!(
                session = %self.session_id,
                msg_type = %msg_type, tag, "required field missing, rejecting"
            );
            let mut reject = Message::with_type(&self.settings.begin_string, MsgType::Reject);
            reject
                .body
                .set(tags::REF_SEQ_NUM, FieldValue::UInt(seq_num.value()));
            reject.body.set(tags::REF_TAG_ID, FieldValue::UInt(u64::from(tag)));
            reject.body.set(tags::REF_MSG_TYPE, msg_type.as_str());
            reject.body.set(tags::TEXT, "Required tag missing");
            self.send_message(reject, write_tx).await;
            return false;
        }

        if msg_type.is_admin() {
            self.process_admin(msg_type, &message, write_tx).await
        } else {
            self.process_app(&message, write_tx).await
        }
    }

    /// Handles an admin message; returns true to disconnect.
    async fn process_admin(
        &mut self,
        msg_type: MsgType,
        message: &Message,
        write_tx: &mpsc::Sender<BytesMut>,
    ) -> bool {
        if let Err(reason) = self.app.from_admin(message, &self.session_id).await {
            warn!(session = %self.session_id, %reason, "admin message rejected by application");
            self.initiate_logout(&reason.text, write_tx).await;
            return false;
        }

        match msg_type {
            MsgType::Logon => {
                match (self.role, self.fsm.state()) {
                    (SessionRole::Acceptor, SessionState::Connecting) => {
                        let reply = self.build_logon();
                        self.send_message(reply, write_tx).await;
                        if self.fsm.on_logged_on().is_ok() {
                            info!(session = %self.session_id, "logged on");
                            self.app.on_logon(&self.session_id).await;
                        }
                    }
                    (SessionRole::Initiator, SessionState::LogonSent) => {
                        if self.fsm.on_logged_on().is_ok() {
                            info!(session = %self.session_id, "logged on");
                            self.app.on_logon(&self.session_id).await;
                        }
                    }
                    (_, state) => {
                        warn!(session = %self.session_id, %state, "unexpected Logon");
                    }
                }
                false
            }
            MsgType::Heartbeat => false,
            MsgType::TestRequest => {
                let mut heartbeat =
                    Message::with_type(&self.settings.begin_string, MsgType::Heartbeat);
                if let Some(id) = message.body.get_str(tags::TEST_REQ_ID) {
                    heartbeat.body.set(tags::TEST_REQ_ID, id);
                }
                self.send_message(heartbeat, write_tx).await;
                false
            }
            MsgType::ResendRequest => {
                let begin = message.body.get_uint(tags::BEGIN_SEQ_NO).unwrap_or(1);
                let end = message.body.get_uint(tags::END_SEQ_NO).unwrap_or(0);
                info!(session = %self.session_id, begin, end, "resend requested");
                self.resend_range(begin, end, write_tx).await;
                false
            }
            MsgType::Logout => {
                if self.fsm.state() == SessionState::LogoutSent {
                    info!(session = %self.session_id, "logout confirmed");
                } else {
                    info!(session = %self.session_id, "peer initiated logout");
                    let reply = Message::with_type(&self.settings.begin_string, MsgType::Logout);
                    self.send_message(reply, write_tx).await;
                }
                true
            }
            MsgType::Reject => {
                warn!(
                    session = %self.session_id,
                    text = message.body.get_str(tags::TEXT).unwrap_or(""),
                    "session-level reject received"
                );
                false
            }
            other => {
                warn!(session = %self.session_id, msg_type = %other, "unhandled admin message");
                false
            }
        }
    }

    /// Handles an application message; returns true to disconnect.
    async fn process_app(
        &mut self,
        message: &Message,
        write_tx: &mpsc::Sender<BytesMut>,
    ) -> bool {
        if !self.fsm.state().is_logged_on() {
            warn!(session = %self.session_id, "application message before logon, dropping");
            return false;
        }

        if let Err(reason) = self.app.from_app(message, &self.session_id).await {
            warn!(session = %self.session_id, %reason, "application rejected message");
            let mut reject =
                Message::with_type(&self.settings.begin_string, MsgType::BusinessMessageReject);
            if let Some(seq) = message.seq_num() {
                reject.body.set(tags::REF_SEQ_NUM, FieldValue::UInt(seq.value()));
            }
            if let Some(msg_type) = message.msg_type() {
                reject.body.set(tags::REF_MSG_TYPE, msg_type.as_str());
            }
            reject
                .body
                .set(tags::BUSINESS_REJECT_REASON, FieldValue::UInt(u64::from(reason.code)));
            reject.body.set(tags::TEXT, reason.text.as_str());
            self.send_message(reject, write_tx).await;
        }
        false
    }

    /// Periodic heartbeat and timeout checks; returns true to disconnect.
    async fn on_tick(&mut self, write_tx: &mpsc::Sender<BytesMut>) -> bool {
        let interval = self.heartbeat.interval();

        if self.fsm.state() == SessionState::LogonSent
            && let Some(sent_at) = self.logon_sent_at
            && sent_at.elapsed() > interval.saturating_mul(5)
        {
            error!(session = %self.session_id, "logon timed out");
            return true;
        }

        if self.fsm.state() == SessionState::LogoutSent
            && let Some(sent_at) = self.logout_sent_at
            && sent_at.elapsed() > interval.saturating_mul(2)
        {
            warn!(session = %self.session_id, "logout unanswered, disconnecting");
            return true;
        }

        if self.fsm.state().is_logged_on() {
            if self.heartbeat.is_timed_out() {
                error!(session = %self.session_id, "test request unanswered, disconnecting");
                return true;
            }
            if self.heartbeat.should_send_test_request() {
                let test_req_id = Uuid::new_v4().to_string();
                let mut request =
                    Message::with_type(&self.settings.begin_string, MsgType::TestRequest);
                request.body.set(tags::TEST_REQ_ID, test_req_id.as_str());
                self.send_message(request, write_tx).await;
                self.heartbeat.on_test_request_sent(test_req_id);
            } else if self.heartbeat.should_send_heartbeat() {
                let heartbeat =
                    Message::with_type(&self.settings.begin_string, MsgType::Heartbeat);
                self.send_message(heartbeat, write_tx).await;
            }
        }
        false
    }

    /// Applies a SequenceReset (plain or gap fill).
    fn on_sequence_reset(&mut self, message: &Message) {
        let Some(new_seq) = message.body.get_uint(tags::NEW_SEQ_NO) else {
            warn!(session = %self.session_id, "SequenceReset without NewSeqNo");
            return;
        };
        let expected = self.seq.next_target_seq().value();
        if new_seq >= expected {
            info!(session = %self.session_id, new_seq, "sequence reset applied");
            self.seq.set_target_seq(new_seq);
            self.store.set_next_target_seq_num(new_seq);
        } else {
            warn!(
                session = %self.session_id,
                new_seq, expected, "SequenceReset attempts to lower sequence, ignored"
            );
        }
    }

    /// Sends an application message pushed by an application task.
    async fn handle_send_command(
        &mut self,
        message: Message,
        write_tx: &mpsc::Sender<BytesMut>,
    ) {
        if !self.fsm.state().is_logged_on() {
            warn!(
                session = %self.session_id,
                state = %self.fsm.state(),
                "dropping outbound application message, session not logged on"
            );
            return;
        }
        self.send_message(message, write_tx).await;
    }

    /// Requests a logout from the peer.
    async fn initiate_logout(&mut self, text: &str, write_tx: &mpsc::Sender<BytesMut>) {
        if self.fsm.state() == SessionState::LogoutSent {
            return;
        }
        let mut logout = Message::with_type(&self.settings.begin_string, MsgType::Logout);
        if !text.is_empty() {
            logout.body.set(tags::TEXT, text);
        }
        self.send_message(logout, write_tx).await;
        if self.fsm.on_logout_sent().is_ok() {
            self.logout_sent_at = Some(Instant::now());
        }
    }

    /// Stamps the header, allocates the sequence number, persists and sends.
    async fn send_message(&mut self, mut message: Message, write_tx: &mpsc::Sender<BytesMut>) {
        let msg_type = message.msg_type().unwrap_or_default();
        let seq_num = self.seq.allocate_sender_seq();
        self.stamp_header(&mut message);
        message
            .header
            .set(tags::MSG_SEQ_NUM, FieldValue::UInt(seq_num.value()));

        if msg_type.is_admin() {
            if msg_type == MsgType::Logon {
                self.inject_credentials(&mut message);
            }
            self.app.to_admin(&mut message, &self.session_id).await;
        } else {
            self.app.to_app(&mut message, &self.session_id).await;
        }

        let bytes = match self.encoder.encode(&message) {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(session = %self.session_id, %err, "failed to encode outbound message");
                return;
            }
        };

        if let Err(err) = self.store.save(seq_num.value(), &bytes).await {
            warn!(session = %self.session_id, %err, "failed to persist outbound message");
        }
        self.store
            .set_next_sender_seq_num(self.seq.next_sender_seq().value());

        trace!(session = %self.session_id, "-> {}", message.to_log_string());
        if write_tx.send(bytes).await.is_err() {
            warn!(session = %self.session_id, "writer gone, message dropped");
            return;
        }
        self.heartbeat.on_message_sent();
    }

    /// Replays stored frames for a resend request.
    ///
    /// Application messages are re-sent with PossDupFlag=Y and their
    /// original sequence numbers; admin messages are replaced by a
    /// SequenceReset-GapFill.
    async fn resend_range(&mut self, begin: u64, end: u64, write_tx: &mpsc::Sender<BytesMut>) {
        let frames = match self.store.get(begin, end).await {
            Ok(frames) => frames,
            Err(err) => {
                warn!(session = %self.session_id, %err, "resend range unavailable");
                return;
            }
        };

        let mut gap_start: Option<u64> = None;
        let mut next_expected = begin;

        for (seq_num, raw) in frames {
            if seq_num > next_expected {
                gap_start.get_or_insert(next_expected);
            }
            next_expected = seq_num + 1;

            let replay = match self.decoder.decode(&raw) {
                Ok(message) if message.msg_type().is_some_and(|t| t.is_app()) => Some(message),
                _ => None,
            };

            match replay {
                Some(mut message) => {
                    if let Some(start) = gap_start.take() {
                        self.send_gap_fill(start, seq_num, write_tx).await;
                    }
                    if let Some(sending_time) = message.header.get(tags::SENDING_TIME).cloned() {
                        message.header.set(tags::ORIG_SENDING_TIME, sending_time);
                    }
                    message.header.set(tags::POSS_DUP_FLAG, true);
                    message
                        .header
                        .set(tags::SENDING_TIME, FieldValue::UtcTimestamp(Timestamp::now()));
                    match self.encoder.encode(&message) {
                        Ok(bytes) => {
                            let _ = write_tx.send(bytes).await;
                        }
                        Err(err) => {
                            warn!(session = %self.session_id, %err, seq_num, "failed to re-encode resend");
                        }
                    }
                }
                None => {
                    gap_start.get_or_insert(seq_num);
                }
            }
        }

        let fill_to = self.seq.next_sender_seq().value();
        if let Some(start) = gap_start.take() {
            self.send_gap_fill(start, fill_to, write_tx).await;
        } else if next_expected < fill_to && end == 0 {
            self.send_gap_fill(next_expected, fill_to, write_tx).await;
        }
    }

    /// Emits a SequenceReset-GapFill covering `[start, next)`.
    async fn send_gap_fill(&mut self, start: u64, next: u64, write_tx: &mpsc::Sender<BytesMut>) {
        let mut reset = Message::with_type(&self.settings.begin_string, MsgType::SequenceReset);
        self.stamp_header(&mut reset);
        reset.header.set(tags::MSG_SEQ_NUM, FieldValue::UInt(start));
        reset.header.set(tags::POSS_DUP_FLAG, true);
        reset.body.set(tags::GAP_FILL_FLAG, true);
        reset.body.set(tags::NEW_SEQ_NO, FieldValue::UInt(next));

        match self.encoder.encode(&reset) {
            Ok(bytes) => {
                let _ = write_tx.send(bytes).await;
            }
            Err(err) => {
                warn!(session = %self.session_id, %err, "failed to encode gap fill");
            }
        }
    }

    /// Stamps the routing header fields common to every outbound message.
    fn stamp_header(&self, message: &mut Message) {
        message
            .header
            .set(tags::BEGIN_STRING, self.settings.begin_string.as_str());
        message
            .header
            .set(tags::SENDER_COMP_ID, self.settings.sender_comp_id.as_str());
        message
            .header
            .set(tags::TARGET_COMP_ID, self.settings.target_comp_id.as_str());
        if let Some(sub) = &self.settings.sender_sub_id {
            message.header.set(tags::SENDER_SUB_ID, sub.as_str());
        }
        if let Some(sub) = &self.settings.target_sub_id {
            message.header.set(tags::TARGET_SUB_ID, sub.as_str());
        }
        message
            .header
            .set(tags::SENDING_TIME, FieldValue::UtcTimestamp(Timestamp::now()));
    }

    /// Injects configured credentials into an outbound Logon header.
    fn inject_credentials(&self, message: &mut Message) {
        if let Some(username) = &self.settings.username
            && !username.is_empty()
        {
            debug!(session = %self.session_id, "Username injected in logon message");
            message.header.set(tags::USERNAME, username.as_str());
        }
        if let Some(password) = &self.settings.password
            && !password.is_empty()
        {
            debug!(session = %self.session_id, "Password injected in logon message");
            message.header.set(tags::PASSWORD, password.as_str());
        }
    }

    /// Builds a Logon carrying the session's heartbeat interval and, for
    /// FIXT sessions, the DefaultApplVerID.
    fn build_logon(&self) -> Message {
        let mut logon = Message::with_type(&self.settings.begin_string, MsgType::Logon);
        logon.body.set(tags::ENCRYPT_METHOD, FieldValue::UInt(0));
        logon.body.set(
            tags::HEART_BT_INT,
            FieldValue::UInt(self.settings.heart_bt_int.as_secs()),
        );
        if let Some(appl_ver_id) = &self.settings.default_appl_ver_id {
            logon
                .body
                .set(tags::DEFAULT_APPL_VER_ID, appl_ver_id.as_str());
        }
        if self.settings.reset_on_logon {
            logon.body.set(tags::RESET_SEQ_NUM_FLAG, true);
        }
        logon
    }
}

impl std::fmt::Debug for SessionRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRuntime")
            .field("session_id", &self.session_id)
            .field("role", &self.role)
            .field("state", &self.fsm.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::NoOpApplication;
    use fixlink_core::types::CompId;
    use fixlink_dictionary::{application, fixt11_transport, Version};
    use fixlink_store::MemoryStore;

    fn runtime_pair() -> (SessionRuntime, SessionHandle, SessionRuntime, SessionHandle) {
        let transport = Arc::new(fixt11_transport());
        let app_dict = Arc::new(application(Version::Fix50Sp2));

        let initiator_settings = SessionSettings::new(
            "FIXT.1.1",
            CompId::new("CL").unwrap(),
            CompId::new("SRV").unwrap(),
        )
        .with_default_appl_ver_id("9")
        .with_heart_bt_int(Duration::from_secs(5))
        .with_connect("localhost", 0);

        let acceptor_settings = SessionSettings::new(
            "FIXT.1.1",
            CompId::new("SRV").unwrap(),
            CompId::new("CL").unwrap(),
        )
        .with_default_appl_ver_id("9")
        .with_heart_bt_int(Duration::from_secs(5))
        .with_accept_port(0);

        let (initiator, initiator_handle) = SessionRuntime::new(
            initiator_settings,
            Arc::clone(&transport),
            Arc::clone(&app_dict),
            Arc::new(NoOpApplication),
            Arc::new(MemoryStore::new()),
        )
        .unwrap();
        let (acceptor, acceptor_handle) = SessionRuntime::new(
            acceptor_settings,
            transport,
            app_dict,
            Arc::new(NoOpApplication),
            Arc::new(MemoryStore::new()),
        )
        .unwrap();

        (initiator, initiator_handle, acceptor, acceptor_handle)
    }

    // Scenario: client issues Logon, peer echoes Logon, both sessions reach
    // LoggedOn and the initiator's next outbound sequence number advances
    // from 1 to 2.
    #[tokio::test]
    async fn test_logon_handshake_over_duplex() {
        let (mut initiator, initiator_handle, mut acceptor, acceptor_handle) = runtime_pair();
        let (client_io, server_io) = tokio::io::duplex(16 * 1024);

        let server = tokio::spawn(async move { acceptor.run(server_io).await.map(|()| acceptor) });
        let client = tokio::spawn(async move { initiator.run(client_io).await.map(|()| initiator) });

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(initiator_handle.session_id().to_string(), "FIXT.1.1:CL->SRV");

        initiator_handle.logout().await.unwrap();
        let initiator = tokio::time::timeout(Duration::from_secs(5), client)
            .await
            .expect("initiator did not stop")
            .unwrap()
            .unwrap();
        let _ = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("acceptor did not stop");
        drop(acceptor_handle);

        // Logon was seq 1, Logout seq 2; the next allocation is 3.
        assert_eq!(initiator.seq.next_sender_seq().value(), 3);
        assert_eq!(initiator.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_app_send_before_logon_is_dropped() {
        let (mut initiator, handle, _acceptor, _acceptor_handle) = runtime_pair();
        let (client_io, _server_io) = tokio::io::duplex(16 * 1024);

        let task = tokio::spawn(async move {
            let _ = initiator.run(client_io).await;
        });

        // The peer never answers the Logon, so the session stays in
        // LogonSent and application sends are dropped rather than queued.
        handle
            .send(Message::with_type("FIXT.1.1", MsgType::NewOrderSingle))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        task.abort();
    }

    #[test]
    fn test_build_logon_carries_fixt_fields() {
        let (initiator, _h, _a, _ah) = runtime_pair();
        let logon = initiator.build_logon();
        assert_eq!(logon.msg_type(), Some(MsgType::Logon));
        assert_eq!(logon.body.get_uint(tags::HEART_BT_INT), Some(5));
        assert_eq!(logon.body.get_str(tags::DEFAULT_APPL_VER_ID), Some("9"));
    }

    #[test]
    fn test_credentials_injected_and_redacted() {
        let transport = Arc::new(fixt11_transport());
        let app_dict = Arc::new(application(Version::Fix50Sp2));
        let settings = SessionSettings::new(
            "FIXT.1.1",
            CompId::new("CL").unwrap(),
            CompId::new("SRV").unwrap(),
        )
        .with_default_appl_ver_id("9")
        .with_connect("localhost", 0)
        .with_credentials("user", "secret");

        let (runtime, _handle) = SessionRuntime::new(
            settings,
            transport,
            app_dict,
            Arc::new(NoOpApplication),
            Arc::new(MemoryStore::new()),
        )
        .unwrap();

        let mut logon = runtime.build_logon();
        runtime.inject_credentials(&mut logon);
        assert_eq!(logon.header.get_str(tags::USERNAME), Some("user"));
        assert_eq!(logon.header.get_str(tags::PASSWORD), Some("secret"));

        let log = logon.to_log_string();
        assert!(log.contains("<redacted>"));
        assert!(!log.contains("secret"));
    }
}
