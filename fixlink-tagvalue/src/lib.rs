/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # fixlink Tag-Value
//!
//! FIX tag-value wire codec for the fixlink toolkit.
//!
//! This crate provides:
//! - **Checksum**: mod-256 checksum calculation and formatting
//! - **Decoding**: zero-copy field scanning and dictionary-driven
//!   structuring into [`fixlink_core::Message`]
//! - **Encoding**: frame building with BodyLength and CheckSum recomputed
//!   from the concrete serialized bytes

pub mod checksum;
pub mod decoder;
pub mod encoder;

pub use checksum::{calculate_checksum, format_checksum, parse_checksum};
pub use decoder::{FieldScanner, MessageDecoder, SOH};
pub use encoder::{Encoder, MessageEncoder};
