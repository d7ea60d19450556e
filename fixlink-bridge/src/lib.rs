/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # fixlink Bridge
//!
//! FIX-to-FIX order-flow bridge for the fixlink toolkit.
//!
//! This crate provides:
//! - **Translation**: Declared field description lists and copy helpers
//! - **Correlation**: `ClOrdID -> client session` tracking
//! - **Application**: [`Bridge`], acceptor toward FIXT/5.0SP2 clients and
//!   initiator toward FIX 4.2/4.4 exchanges

pub mod bridge;
pub mod translate;

pub use bridge::{Bridge, CorrelationTable, ExchangeSelector, FirstConnected};
pub use translate::{copy_fields, copy_party_group, CopyKind, FieldCopy};
