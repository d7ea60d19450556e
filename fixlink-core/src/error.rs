/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Error types for the fixlink FIX toolkit.
//!
//! This module provides a unified error hierarchy using `thiserror` for typed,
//! domain-specific errors across all fixlink operations.

use thiserror::Error;

/// Result type alias using [`FixError`] as the error type.
pub type Result<T> = std::result::Result<T, FixError>;

/// Top-level error type for all fixlink operations.
#[derive(Debug, Error)]
pub enum FixError {
    /// Error during message decoding.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error during message encoding.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Error in session layer operations.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Error in message store operations.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Application-level error surfaced to a caller.
    #[error("application error: {0}")]
    App(#[from] AppError),

    /// I/O error from underlying transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that occur during FIX message decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Message buffer is incomplete, need more data.
    #[error("incomplete message, need more data")]
    Incomplete,

    /// Frame does not start with `8=BeginString`.
    #[error("malformed frame: expected 8=BeginString first")]
    MalformedFrame,

    /// Missing or misplaced BodyLength field (tag 9).
    #[error("missing body length field (tag 9)")]
    MissingBodyLength,

    /// Invalid BodyLength value.
    #[error("invalid body length value")]
    InvalidBodyLength,

    /// Missing or misplaced MsgType field (tag 35).
    #[error("missing msg type field (tag 35)")]
    MissingMsgType,

    /// Frame ended before the CheckSum field (tag 10).
    #[error("truncated frame: no checksum field")]
    TruncatedFrame,

    /// Checksum mismatch between calculated and declared values.
    #[error("checksum mismatch: calculated {calculated}, declared {declared}")]
    ChecksumMismatch {
        /// Calculated checksum value.
        calculated: u8,
        /// Declared checksum value in message.
        declared: u8,
    },

    /// CheckSum value is not exactly three ASCII digits.
    #[error("invalid checksum format")]
    InvalidChecksum,

    /// Invalid tag format (not a valid integer).
    #[error("invalid tag format: {0}")]
    InvalidTag(String),

    /// Missing required field.
    #[error("missing required field: tag {tag}")]
    MissingRequiredField {
        /// The tag number of the missing field.
        tag: u32,
    },

    /// Invalid field value for the expected type.
    #[error("invalid field value for tag {tag}: {reason}")]
    InvalidFieldValue {
        /// The tag number of the field.
        tag: u32,
        /// Description of why the value is invalid.
        reason: String,
    },

    /// No repeating group template known for a count tag.
    #[error("unknown group template for count tag {count_tag}")]
    UnknownTemplate {
        /// The count tag with no declared template.
        count_tag: u32,
    },

    /// Repeating group count mismatch.
    #[error("group count mismatch for tag {count_tag}: expected {expected}, found {actual}")]
    GroupCountMismatch {
        /// The tag containing the group count.
        count_tag: u32,
        /// Expected number of group entries.
        expected: u32,
        /// Actual number of group entries found.
        actual: u32,
    },

    /// Invalid UTF-8 in string field.
    #[error("invalid utf-8 in field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Message exceeds maximum allowed size.
    #[error("message too large: {size} bytes exceeds maximum {max_size}")]
    MessageTooLarge {
        /// Actual message size in bytes.
        size: usize,
        /// Maximum allowed size in bytes.
        max_size: usize,
    },
}

/// Errors that occur during FIX message encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Missing required field during encoding.
    #[error("missing required field: tag {tag}")]
    MissingRequiredField {
        /// The tag number of the missing field.
        tag: u32,
    },

    /// Invalid field value for encoding.
    #[error("invalid field value for tag {tag}: {reason}")]
    InvalidFieldValue {
        /// The tag number of the field.
        tag: u32,
        /// Description of why the value is invalid.
        reason: String,
    },

    /// Message carries no MsgType (tag 35).
    #[error("message has no msg type")]
    MissingMsgType,

    /// Message carries no BeginString (tag 8).
    #[error("message has no begin string")]
    MissingBeginString,
}

/// Errors in FIX session layer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Session is not in the correct state for the operation.
    #[error("invalid session state: expected {expected}, current {current}")]
    InvalidState {
        /// Expected state for the operation.
        expected: String,
        /// Current session state.
        current: String,
    },

    /// Logon was rejected by counterparty.
    #[error("logon rejected: {reason}")]
    LogonRejected {
        /// Reason for rejection.
        reason: String,
    },

    /// Heartbeat timeout, no response to TestRequest.
    #[error("heartbeat timeout after {elapsed_ms} milliseconds")]
    HeartbeatTimeout {
        /// Elapsed time in milliseconds since last message.
        elapsed_ms: u64,
    },

    /// Sequence number lower than expected and not a possible duplicate.
    #[error("sequence too low: expected {expected}, received {received}")]
    SequenceTooLow {
        /// Expected sequence number.
        expected: u64,
        /// Received sequence number.
        received: u64,
    },

    /// No session registered for the given session id.
    #[error("unknown session: {0}")]
    UnknownSession(String),

    /// Session configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Session task is shutting down.
    #[error("session closed")]
    Closed,
}

/// Errors in message store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Failed to persist a message.
    #[error("failed to store message seq={seq_num}: {reason}")]
    SaveFailed {
        /// Sequence number of the message.
        seq_num: u64,
        /// Reason for failure.
        reason: String,
    },

    /// Range of messages not available.
    #[error("messages not available for range {begin}..={end}")]
    RangeNotAvailable {
        /// Begin sequence number of the requested range.
        begin: u64,
        /// End sequence number of the requested range.
        end: u64,
    },

    /// I/O error in persistent store.
    #[error("store i/o error: {0}")]
    Io(String),
}

/// Application-level errors reported to callers of the single-shot flows.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Session did not reach logon within the allowed time.
    #[error("connection timeout")]
    ConnectionTimeout,

    /// No response arrived within the allowed time.
    #[error("timeout while waiting for response")]
    ResponseTimeout,

    /// The session logged out while a caller was waiting.
    #[error("FIX: logout received")]
    FixLogout,

    /// The counterparty rejected the order.
    #[error("FIX: rejected order{}", fmt_detail(.0))]
    FixOrderRejected(Option<String>),

    /// The response carried an order status the caller cannot classify.
    #[error("FIX: unknown order status{}", fmt_detail(.0))]
    FixOrderStatusUnknown(Option<String>),

    /// The requested FIX version is not supported by the toolkit.
    #[error("FIX: version not implemented")]
    FixVersionNotImplemented,
}

fn fmt_detail(detail: &Option<String>) -> String {
    match detail {
        Some(text) => format!(": {text}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::ChecksumMismatch {
            calculated: 100,
            declared: 200,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: calculated 100, declared 200"
        );
    }

    #[test]
    fn test_fix_error_from_decode() {
        let decode_err = DecodeError::Incomplete;
        let fix_err: FixError = decode_err.into();
        assert!(matches!(fix_err, FixError::Decode(DecodeError::Incomplete)));
    }

    #[test]
    fn test_unknown_template_display() {
        let err = DecodeError::UnknownTemplate { count_tag: 268 };
        assert_eq!(err.to_string(), "unknown group template for count tag 268");
    }

    #[test]
    fn test_app_error_display() {
        assert_eq!(AppError::FixLogout.to_string(), "FIX: logout received");
        assert_eq!(
            AppError::FixOrderRejected(Some("insufficient funds".to_string())).to_string(),
            "FIX: rejected order: insufficient funds"
        );
        assert_eq!(
            AppError::FixOrderRejected(None).to_string(),
            "FIX: rejected order"
        );
    }

    #[test]
    fn test_session_error_display() {
        let err = SessionError::SequenceTooLow {
            expected: 5,
            received: 3,
        };
        assert_eq!(err.to_string(), "sequence too low: expected 5, received 3");
    }
}
