/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FIX message encoding.
//!
//! Two layers:
//! - [`Encoder`]: appends `tag=value\x01` fields and finalizes a frame with
//!   BeginString, BodyLength and CheckSum computed from the concrete bytes
//! - [`MessageEncoder`]: walks a [`Message`] (header order, body with groups
//!   at their count-tag positions, trailer) through an [`Encoder`]
//!
//! BodyLength and CheckSum are always recomputed from the serialized bytes,
//! never taken from the parsed model.

use crate::checksum::{calculate_checksum, format_checksum};
use bytes::{BufMut, BytesMut};
use fixlink_core::error::EncodeError;
use fixlink_core::field::FieldValue;
use fixlink_core::message::Message;
use fixlink_core::tags;
use rust_decimal::Decimal;

/// SOH (Start of Header) delimiter used in FIX messages.
pub const SOH: u8 = 0x01;

/// Low-level FIX frame builder.
///
/// Fields are appended in call order. BeginString (8), BodyLength (9) and
/// CheckSum (10) are handled by [`Encoder::finish`].
#[derive(Debug)]
pub struct Encoder {
    body: BytesMut,
    begin_string: String,
}

impl Encoder {
    /// Creates a new encoder with the specified BeginString.
    #[must_use]
    pub fn new(begin_string: impl Into<String>) -> Self {
        Self {
            body: BytesMut::with_capacity(256),
            begin_string: begin_string.into(),
        }
    }

    /// Appends a field with a string value.
    #[inline]
    pub fn put_str(&mut self, tag: u32, value: &str) {
        self.put_raw(tag, value.as_bytes());
    }

    /// Appends a field with a signed integer value.
    #[inline]
    pub fn put_int(&mut self, tag: u32, value: i64) {
        let mut buf = itoa::Buffer::new();
        self.put_raw(tag, buf.format(value).as_bytes());
    }

    /// Appends a field with an unsigned integer value.
    #[inline]
    pub fn put_uint(&mut self, tag: u32, value: u64) {
        let mut buf = itoa::Buffer::new();
        self.put_raw(tag, buf.format(value).as_bytes());
    }

    /// Appends a field with a decimal value, preserving its scale.
    #[inline]
    pub fn put_decimal(&mut self, tag: u32, value: Decimal) {
        self.put_str(tag, &value.to_string());
    }

    /// Appends a field with a boolean value (Y/N).
    #[inline]
    pub fn put_bool(&mut self, tag: u32, value: bool) {
        self.put_raw(tag, if value { b"Y" } else { b"N" });
    }

    /// Appends a field with a single character value.
    #[inline]
    pub fn put_char(&mut self, tag: u32, value: char) {
        let mut buf = [0u8; 4];
        let s = value.encode_utf8(&mut buf);
        self.put_raw(tag, s.as_bytes());
    }

    /// Appends a field with raw bytes.
    #[inline]
    pub fn put_raw(&mut self, tag: u32, value: &[u8]) {
        let mut tag_buf = itoa::Buffer::new();
        self.body.put_slice(tag_buf.format(tag).as_bytes());
        self.body.put_u8(b'=');
        self.body.put_slice(value);
        self.body.put_u8(SOH);
    }

    /// Appends a typed field value in its wire representation.
    pub fn put_value(&mut self, tag: u32, value: &FieldValue) {
        match value {
            FieldValue::String(s) => self.put_str(tag, s),
            FieldValue::Int(v) => self.put_int(tag, *v),
            FieldValue::UInt(v) => self.put_uint(tag, *v),
            FieldValue::Decimal(v) => self.put_decimal(tag, *v),
            FieldValue::Bool(v) => self.put_bool(tag, *v),
            FieldValue::Char(c) => self.put_char(tag, *c),
            FieldValue::Data(d) => self.put_raw(tag, d),
            other => self.put_str(tag, &other.to_string()),
        }
    }

    /// Returns the current body length in bytes.
    #[inline]
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Clears the encoder for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.body.clear();
    }

    /// Finalizes the frame and returns the complete encoded bytes.
    ///
    /// Prepends BeginString (8) and BodyLength (9), then appends the
    /// CheckSum (10) computed over the serialized bytes.
    #[must_use]
    pub fn finish(self) -> BytesMut {
        let body_len = self.body.len();

        let mut message = BytesMut::with_capacity(body_len + 32);
        message.put_slice(b"8=");
        message.put_slice(self.begin_string.as_bytes());
        message.put_u8(SOH);
        message.put_slice(b"9=");

        let mut len_buf = itoa::Buffer::new();
        message.put_slice(len_buf.format(body_len).as_bytes());
        message.put_u8(SOH);
        message.put_slice(&self.body);

        let checksum = calculate_checksum(&message);
        message.put_slice(b"10=");
        message.put_slice(&format_checksum(checksum));
        message.put_u8(SOH);

        message
    }
}

/// Serializes [`Message`]s to wire frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageEncoder;

impl MessageEncoder {
    /// Creates a new message encoder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Encodes a message to a complete FIX frame.
    ///
    /// Header fields are emitted in map order with MsgType first; body
    /// fields in map order with each repeating group expanded at its count
    /// tag; trailer fields other than CheckSum pass through before the
    /// recomputed CheckSum.
    ///
    /// # Errors
    /// Returns `EncodeError` if BeginString or MsgType are absent.
    pub fn encode(&self, message: &Message) -> Result<BytesMut, EncodeError> {
        let begin_string = message
            .begin_string()
            .ok_or(EncodeError::MissingBeginString)?;
        let msg_type = message
            .header
            .get_str(tags::MSG_TYPE)
            .ok_or(EncodeError::MissingMsgType)?;

        let mut encoder = Encoder::new(begin_string);
        encoder.put_str(tags::MSG_TYPE, msg_type);

        for (tag, value) in message.header.iter() {
            if matches!(tag, tags::BEGIN_STRING | tags::BODY_LENGTH | tags::MSG_TYPE) {
                continue;
            }
            encoder.put_value(tag, value);
        }

        for (tag, value) in message.body.iter() {
            match message.group(tag) {
                Some(group) => {
                    encoder.put_uint(tag, group.entries.len() as u64);
                    for entry in &group.entries {
                        for (entry_tag, entry_value) in entry.iter() {
                            encoder.put_value(entry_tag, entry_value);
                        }
                    }
                }
                None => encoder.put_value(tag, value),
            }
        }

        for (tag, value) in message.trailer.iter() {
            if tag == tags::CHECK_SUM {
                continue;
            }
            encoder.put_value(tag, value);
        }

        Ok(encoder.finish())
    }
}
