/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # fixlink Transport
//!
//! TCP framing layer for the fixlink FIX toolkit.
//!
//! This crate provides:
//! - **Codec**: Tokio codec for FIX frame boundary discovery and checksum
//!   validation

pub mod codec;

pub use codec::{CodecError, FixCodec};
