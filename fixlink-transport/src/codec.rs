/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tokio codec for FIX message framing.
//!
//! Frames are discovered from the declared BodyLength, then checksum
//! validated. Framing errors are fatal for the connection; the session
//! layer disconnects without a Logout on any of them.

use bytes::{BufMut, BytesMut};
use fixlink_tagvalue::checksum::{calculate_checksum, parse_checksum};
use memchr::memchr;
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

/// SOH delimiter.
const SOH: u8 = 0x01;

/// Length of the trailer field `10=XXX\x01`.
const TRAILER_LEN: usize = 7;

/// Errors that can occur during framing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Frame does not start with `8=`.
    #[error("malformed frame: message must start with 8=")]
    MalformedFrame,

    /// Missing BodyLength field after BeginString.
    #[error("missing body length field (tag 9)")]
    MissingBodyLength,

    /// Invalid BodyLength value.
    #[error("invalid body length value")]
    InvalidBodyLength,

    /// Trailer is not a well-formed `10=XXX\x01` field.
    #[error("invalid checksum trailer")]
    InvalidTrailer,

    /// Checksum mismatch.
    #[error("checksum mismatch: calculated {calculated}, declared {declared}")]
    ChecksumMismatch {
        /// Calculated checksum.
        calculated: u8,
        /// Declared checksum in message.
        declared: u8,
    },

    /// Message exceeds maximum size.
    #[error("message too large: {size} bytes exceeds maximum {max_size}")]
    MessageTooLarge {
        /// Actual message size.
        size: usize,
        /// Maximum allowed size.
        max_size: usize,
    },

    /// I/O error.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Tokio codec for FIX message framing.
///
/// Emits complete raw frames; parsing into [`fixlink_core::Message`]
/// happens in the session reader with the session's dictionary pair.
#[derive(Debug, Clone)]
pub struct FixCodec {
    max_message_size: usize,
    validate_checksum: bool,
}

impl FixCodec {
    /// Creates a new codec with default settings (1 MiB frames, checksum on).
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_message_size: 1024 * 1024,
            validate_checksum: true,
        }
    }

    /// Sets the maximum message size.
    #[must_use]
    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Sets whether to validate checksums.
    #[must_use]
    pub const fn with_checksum_validation(mut self, validate: bool) -> Self {
        self.validate_checksum = validate;
        self
    }

    /// Computes the total frame length from the declared BodyLength.
    ///
    /// # Returns
    /// `Ok(None)` when more data is needed.
    fn frame_length(src: &[u8]) -> Result<Option<usize>, CodecError> {
        if src.len() < 2 {
            return Ok(None);
        }
        if &src[..2] != b"8=" {
            return Err(CodecError::MalformedFrame);
        }

        let Some(begin_soh) = memchr(SOH, src) else {
            return Ok(None);
        };

        let len_field = begin_soh + 1;
        if src.len() < len_field + 2 {
            return Ok(None);
        }
        if &src[len_field..len_field + 2] != b"9=" {
            return Err(CodecError::MissingBodyLength);
        }

        let Some(len_soh) = memchr(SOH, &src[len_field..]) else {
            return Ok(None);
        };
        let len_soh = len_field + len_soh;

        let body_length: usize = std::str::from_utf8(&src[len_field + 2..len_soh])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(CodecError::InvalidBodyLength)?;

        // BodyLength counts from after "9=...\x01" up to and including the
        // SOH before "10="; the trailer field follows.
        Ok(Some(len_soh + 1 + body_length + TRAILER_LEN))
    }
}

impl Default for FixCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FixCodec {
    type Item = BytesMut;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(total) = Self::frame_length(src)? else {
            return Ok(None);
        };

        if total > self.max_message_size {
            return Err(CodecError::MessageTooLarge {
                size: total,
                max_size: self.max_message_size,
            });
        }

        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        let trailer = &src[total - TRAILER_LEN..total];
        if &trailer[..3] != b"10=" || trailer[TRAILER_LEN - 1] != SOH {
            return Err(CodecError::InvalidTrailer);
        }

        if self.validate_checksum {
            let declared =
                parse_checksum(&trailer[3..6]).ok_or(CodecError::InvalidTrailer)?;
            let calculated = calculate_checksum(&src[..total - TRAILER_LEN]);
            if calculated != declared {
                return Err(CodecError::ChecksumMismatch {
                    calculated,
                    declared,
                });
            }
        }

        Ok(Some(src.split_to(total)))
    }
}

impl Encoder<&[u8]> for FixCodec {
    type Error = CodecError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len());
        dst.put_slice(item);
        Ok(())
    }
}

impl Encoder<BytesMut> for FixCodec {
    type Error = CodecError;

    fn encode(&mut self, item: BytesMut, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len());
        dst.put_slice(&item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_frame(body: &str) -> Vec<u8> {
        let without_checksum = format!("8=FIXT.1.1\x019={}\x01{}", body.len(), body);
        let checksum = calculate_checksum(without_checksum.as_bytes());
        format!("{without_checksum}10={checksum:03}\x01").into_bytes()
    }

    #[test]
    fn test_decode_complete_frame() {
        let mut codec = FixCodec::new();
        let frame = make_frame("35=0\x0134=1\x01");
        let mut buf = BytesMut::from(&frame[..]);

        let out = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&out[..], &frame[..]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_incomplete_returns_none() {
        let mut codec = FixCodec::new();
        let frame = make_frame("35=0\x0134=1\x01");
        let mut buf = BytesMut::from(&frame[..frame.len() - 5]);

        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_decode_two_pipelined_frames() {
        let mut codec = FixCodec::new();
        let first = make_frame("35=0\x0134=1\x01");
        let second = make_frame("35=1\x0134=2\x01112=T1\x01");

        let mut buf = BytesMut::new();
        buf.extend_from_slice(&first);
        buf.extend_from_slice(&second);

        let out1 = codec.decode(&mut buf).unwrap().unwrap();
        let out2 = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&out1[..], &first[..]);
        assert_eq!(&out2[..], &second[..]);
    }

    #[test]
    fn test_decode_malformed_frame() {
        let mut codec = FixCodec::new();
        let mut buf = BytesMut::from(&b"9=FIXT.1.1\x019=5\x0135=0\x0110=000\x01"[..]);

        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::MalformedFrame)
        ));
    }

    #[test]
    fn test_decode_checksum_mismatch() {
        let mut codec = FixCodec::new();
        let mut frame = make_frame("35=0\x0134=1\x01");
        let len = frame.len();
        frame[len - 2] = b'0';
        frame[len - 3] = b'0';
        frame[len - 4] = b'0';
        let mut buf = BytesMut::from(&frame[..]);

        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_skips_checksum_when_disabled() {
        let mut codec = FixCodec::new().with_checksum_validation(false);
        let mut frame = make_frame("35=0\x0134=1\x01");
        let len = frame.len();
        frame[len - 2] = b'0';
        frame[len - 3] = b'0';
        frame[len - 4] = b'0';
        let mut buf = BytesMut::from(&frame[..]);

        assert!(codec.decode(&mut buf).unwrap().is_some());
    }

    #[test]
    fn test_decode_too_large() {
        let mut codec = FixCodec::new().with_max_message_size(16);
        let frame = make_frame("35=0\x0134=1\x01");
        let mut buf = BytesMut::from(&frame[..]);

        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::MessageTooLarge { .. })
        ));
    }

    #[test]
    fn test_encode_passes_bytes_through() {
        let mut codec = FixCodec::new();
        let frame = make_frame("35=0\x0134=1\x01");
        let mut dst = BytesMut::new();

        codec.encode(&frame[..], &mut dst).unwrap();
        assert_eq!(&dst[..], &frame[..]);
    }
}
