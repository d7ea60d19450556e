/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # fixlink Engine
//!
//! Session orchestration for the fixlink FIX toolkit.
//!
//! This crate provides:
//! - **Application callbacks**: The [`Application`] trait sessions drive
//! - **Session actor**: [`SessionRuntime`], one task owning all session
//!   state, fed by reader/writer tasks
//! - **Router**: [`MessageRouter`], a `(version, message type)` dispatch
//!   table
//! - **Registry**: [`SessionRegistry`] mapping live sessions to command
//!   queues; applications send through [`OutboundSender`]
//! - **Builder**: [`EngineBuilder`] / [`Engine`] wiring it all together

pub mod application;
pub mod builder;
pub mod registry;
pub mod router;
pub mod session;

pub use application::{
    Application, NoOpApplication, RejectReason, REJECT_REASON_OTHER,
    REJECT_REASON_UNSUPPORTED_MSG_TYPE,
};
pub use builder::{Engine, EngineBuilder, EngineHandle};
pub use registry::{OutboundSender, SessionCommand, SessionRegistry};
pub use router::{MessageRouter, RouteOutcome, VersionKey};
pub use session::{SessionHandle, SessionRuntime};
