/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # fixlink Core
//!
//! Core message model, field types and error hierarchy for the fixlink
//! FIX toolkit.
//!
//! This crate provides:
//! - **Message model**: Ordered header/body/trailer field maps with
//!   repeating groups
//! - **Field types**: Tag wrappers, zero-copy field references, typed values
//! - **Session identity**: `SessionId`, `CompId`, sequence numbers, timestamps
//! - **Errors**: Typed error hierarchy shared by every layer

pub mod error;
pub mod field;
pub mod message;
pub mod tags;
pub mod types;

pub use error::{AppError, DecodeError, EncodeError, FixError, Result, SessionError, StoreError};
pub use field::{FieldRef, FieldTag, FieldValue};
pub use message::{FieldMap, GroupTemplate, Message, MsgType, RepeatingGroup};
pub use types::{
    CompId, OrdType, SeqNum, SessionId, Side, TimeInForce, TimePrecision, Timestamp,
    APPL_VER_ID_FIX50SP2, BEGIN_STRING_FIX42, BEGIN_STRING_FIX44, BEGIN_STRING_FIXT11,
};
