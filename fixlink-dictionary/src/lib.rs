/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # fixlink Dictionary
//!
//! FIX data dictionary schema and lookup API for the fixlink toolkit.
//!
//! This crate provides:
//! - **Schema definitions**: Field, message and group definitions
//! - **Lookup API**: Field names/types, enum labels, header/trailer
//!   membership, required-field sets, group templates
//! - **Bootstrap dictionaries**: Programmatic transport and application
//!   dictionaries covering the toolkit's tag set
//!
//! Dictionaries are immutable after construction and shared behind `Arc`;
//! one transport and one application dictionary are loaded per session pair.

pub mod bootstrap;
pub mod schema;

pub use bootstrap::{application, fixt11_transport, transport};
pub use schema::{Dictionary, FieldDef, FieldType, GroupDef, MessageCategory, MessageDef, Version};
