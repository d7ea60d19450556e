/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # fixlink
//!
//! A FIX client-and-bridge toolkit for Rust.
//!
//! fixlink speaks FIX 4.2, 4.4 and 5.0 SP2 over FIXT.1.1 and provides the
//! three building blocks of the toolkit:
//!
//! - A **session engine and message router** driving a typed protocol
//!   state machine over TCP, with logon authentication, heartbeats,
//!   sequence management and `(version, message type)` dispatch
//! - A **market-data validator** maintaining live order books from
//!   snapshot and incremental refresh streams, with invariant detection
//!   and Prometheus metrics
//! - A **FIX-to-FIX bridge** translating order flow between FIXT clients
//!   and FIX 4.x exchanges, correlated by ClOrdID
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fixlink::prelude::*;
//! use std::sync::Arc;
//!
//! let settings = SessionSettings::new(
//!     "FIXT.1.1",
//!     CompId::new("CLIENT").unwrap(),
//!     CompId::new("SERVER").unwrap(),
//! )
//! .with_default_appl_ver_id("9")
//! .with_connect("fix.example.com", 9878);
//!
//! let (app, connected) = ResponseApp::new(vec![MsgType::ExecutionReport]);
//! let engine = EngineBuilder::new(app).add_session(settings).build();
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Message model, field types, errors
//! - [`dictionary`]: Data dictionary schema and lookup
//! - [`tagvalue`]: Tag-value decoding and encoding
//! - [`transport`]: TCP framing codec
//! - [`store`]: Message persistence interface
//! - [`session`]: Session settings, FSM, sequence and heartbeat logic
//! - [`engine`]: Session actor, router, registry, engine builder
//! - [`validator`]: Market-data validator application
//! - [`bridge`]: FIX-to-FIX bridge application
//! - [`client`]: Single-shot request/response flows

pub mod core {
    //! Message model, field types and errors.
    pub use fixlink_core::*;
}

pub mod dictionary {
    //! Data dictionary schema and lookup.
    pub use fixlink_dictionary::*;
}

pub mod tagvalue {
    //! Tag-value decoding and encoding.
    pub use fixlink_tagvalue::*;
}

pub mod transport {
    //! TCP framing codec.
    pub use fixlink_transport::*;
}

pub mod store {
    //! Message persistence interface.
    pub use fixlink_store::*;
}

pub mod session {
    //! Session settings, state machine, sequence and heartbeat logic.
    pub use fixlink_session::*;
}

pub mod engine {
    //! Session actor, router, registry and engine builder.
    pub use fixlink_engine::*;
}

pub mod validator {
    //! Market-data validator application.
    pub use fixlink_validator::*;
}

pub mod bridge {
    //! FIX-to-FIX bridge application.
    pub use fixlink_bridge::*;
}

pub mod client {
    //! Single-shot request/response flows.
    pub use fixlink_client::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use fixlink_core::{
        AppError, CompId, DecodeError, EncodeError, FieldMap, FieldTag, FieldValue, FixError,
        GroupTemplate, Message, MsgType, OrdType, RepeatingGroup, Result, SeqNum, SessionError,
        SessionId, Side, StoreError, TimeInForce, Timestamp,
    };

    pub use fixlink_dictionary::{Dictionary, FieldDef, FieldType, MessageDef, Version};

    pub use fixlink_tagvalue::{calculate_checksum, Encoder, MessageDecoder, MessageEncoder};

    pub use fixlink_transport::{CodecError, FixCodec};

    pub use fixlink_store::{MemoryStore, MessageStore};

    pub use fixlink_session::{
        HeartbeatManager, SequenceCheck, SequenceManager, SessionRole, SessionSettings,
        SessionState, StateMachine,
    };

    pub use fixlink_engine::{
        Application, Engine, EngineBuilder, EngineHandle, MessageRouter, NoOpApplication,
        OutboundSender, RejectReason, SessionHandle, SessionRegistry, SessionRuntime, VersionKey,
    };

    pub use fixlink_validator::{MarketDataValidator, OrderBook, ValidatorOptions};

    pub use fixlink_bridge::{Bridge, CorrelationTable, ExchangeSelector, FirstConnected};

    pub use fixlink_client::{MessageRenderer, NewOrderRequest, ResponseApp};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let _seq = SeqNum::new(1);
        let _ts = Timestamp::now();
        let _side = Side::Buy;
        let _version = Version::Fix50Sp2;
        assert_eq!(Version::Fix44.begin_string(), "FIX.4.4");
    }
}
