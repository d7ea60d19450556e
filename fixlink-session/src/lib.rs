/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # fixlink Session
//!
//! FIX session layer state for the fixlink toolkit.
//!
//! This crate provides:
//! - **Settings**: Injected [`SessionSettings`] describing one session
//! - **State machine**: Runtime session FSM with checked transitions
//! - **Sequence management**: Monotonic outbound allocation and inbound
//!   validation
//! - **Heartbeat handling**: Heartbeat/TestRequest timing
//!
//! The session actor that drives these over a socket lives in
//! `fixlink-engine`; this crate holds the pure session logic.

pub mod heartbeat;
pub mod sequence;
pub mod settings;
pub mod state;

pub use heartbeat::HeartbeatManager;
pub use sequence::{SequenceCheck, SequenceManager};
pub use settings::{SessionRole, SessionSettings};
pub use state::{SessionState, StateMachine};
