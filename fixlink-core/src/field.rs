/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Field types for FIX protocol messages.
//!
//! This module provides:
//! - [`FieldTag`]: Type-safe wrapper for FIX field tag numbers
//! - [`FieldRef`]: Zero-copy reference to a field within a message buffer
//! - [`FieldValue`]: Tagged union of the value types a FIX field can carry

use crate::error::DecodeError;
use crate::types::Timestamp;
use bytes::Bytes;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// FIX field tag number.
///
/// Tags are positive integers no larger than 2^16 that identify fields
/// within a FIX message. Standard tags are defined in the FIX specification
/// (1-5000 range), while user-defined tags use the 5001+ range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct FieldTag(u32);

impl FieldTag {
    /// Largest tag number accepted on the wire.
    pub const MAX: u32 = u16::MAX as u32;

    /// Creates a new field tag.
    #[inline]
    #[must_use]
    pub const fn new(tag: u32) -> Self {
        Self(tag)
    }

    /// Returns the raw tag number.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns true if this is a standard FIX tag (1-5000).
    #[inline]
    #[must_use]
    pub const fn is_standard(self) -> bool {
        self.0 >= 1 && self.0 <= 5000
    }

    /// Returns true if this is a user-defined tag (5001+).
    #[inline]
    #[must_use]
    pub const fn is_user_defined(self) -> bool {
        self.0 > 5000
    }
}

impl From<u32> for FieldTag {
    fn from(tag: u32) -> Self {
        Self(tag)
    }
}

impl From<FieldTag> for u32 {
    fn from(tag: FieldTag) -> Self {
        tag.0
    }
}

impl fmt::Display for FieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Zero-copy reference to a field within a FIX message buffer.
///
/// Produced by the tag-value scanner; values reference the original
/// buffer without copying.
#[derive(Debug, Clone, Copy)]
pub struct FieldRef<'a> {
    /// The field tag number.
    pub tag: u32,
    /// Reference to the field value bytes (without delimiters).
    pub value: &'a [u8],
}

impl<'a> FieldRef<'a> {
    /// Creates a new field reference.
    #[inline]
    #[must_use]
    pub const fn new(tag: u32, value: &'a [u8]) -> Self {
        Self { tag, value }
    }

    /// Returns the value as a string slice.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidUtf8` if the value is not valid UTF-8.
    pub fn as_str(&self) -> std::result::Result<&'a str, DecodeError> {
        std::str::from_utf8(self.value).map_err(DecodeError::from)
    }

    /// Parses the value as the specified type.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidFieldValue` if parsing fails.
    pub fn parse<T: FromStr>(&self) -> std::result::Result<T, DecodeError> {
        let s = self.as_str()?;
        s.parse().map_err(|_| DecodeError::InvalidFieldValue {
            tag: self.tag,
            reason: format!("failed to parse '{}' as {}", s, std::any::type_name::<T>()),
        })
    }

    /// Returns the raw bytes of the value.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.value
    }

    /// Returns true if the value is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// Tagged union of the value types a FIX field can carry.
///
/// Decimal values keep the scale they were parsed or built with, so a price
/// of `100.00` re-emits as `100.00`. A decimal zero is a real value and never
/// compares equal to an absent field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// String value.
    String(String),
    /// Signed integer value.
    Int(i64),
    /// Unsigned integer value.
    UInt(u64),
    /// Decimal value with explicit scale.
    Decimal(Decimal),
    /// Boolean value (Y/N).
    Bool(bool),
    /// Single character value.
    Char(char),
    /// UTC timestamp (`YYYYMMDD-HH:MM:SS[.sss]`).
    UtcTimestamp(Timestamp),
    /// UTC date (`YYYYMMDD`).
    UtcDate(NaiveDate),
    /// Local time of day (`HH:MM:SS`).
    TimeOfDay(NaiveTime),
    /// Raw bytes (for data fields).
    Data(Bytes),
}

impl FieldValue {
    /// Returns the value as a string slice, if it is a String variant.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an i64 for Int and UInt variants.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the value as a u64 for UInt and non-negative Int variants.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt(v) => Some(*v),
            Self::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the value as a Decimal, if it is a Decimal variant.
    #[must_use]
    pub const fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a bool, if it is a Bool variant.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a char, if it is a Char variant.
    #[must_use]
    pub const fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a timestamp, if it is a UtcTimestamp variant.
    #[must_use]
    pub const fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::UtcTimestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// Renders the value in FIX wire format.
    ///
    /// This is the exact byte sequence the encoder emits for the value.
    #[must_use]
    pub fn to_wire(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{}", if *v { "Y" } else { "N" }),
            Self::Char(c) => write!(f, "{c}"),
            Self::UtcTimestamp(ts) => write!(f, "{ts}"),
            Self::UtcDate(d) => write!(f, "{}", d.format("%Y%m%d")),
            Self::TimeOfDay(t) => write!(f, "{}", t.format("%H:%M:%S%.3f")),
            Self::Data(d) => {
                for b in d.iter() {
                    write!(f, "{}", *b as char)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<Decimal> for FieldValue {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<char> for FieldValue {
    fn from(v: char) -> Self {
        Self::Char(v)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(v: Timestamp) -> Self {
        Self::UtcTimestamp(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_tag() {
        let tag = FieldTag::new(35);
        assert_eq!(tag.value(), 35);
        assert!(tag.is_standard());
        assert!(!tag.is_user_defined());

        let user_tag = FieldTag::new(5001);
        assert!(!user_tag.is_standard());
        assert!(user_tag.is_user_defined());
    }

    #[test]
    fn test_field_ref_as_str() {
        let field = FieldRef::new(11, b"ORDER123");
        assert_eq!(field.as_str().unwrap(), "ORDER123");
    }

    #[test]
    fn test_field_ref_parse() {
        let field = FieldRef::new(34, b"12345");
        assert_eq!(field.parse::<u64>().unwrap(), 12345);
        assert!(FieldRef::new(34, b"12x45").parse::<u64>().is_err());
    }

    #[test]
    fn test_field_ref_invalid_utf8() {
        let field = FieldRef::new(1, &[0xFF, 0xFE]);
        assert!(field.as_str().is_err());
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::String("test".to_string()).to_string(), "test");
        assert_eq!(FieldValue::Int(-42).to_string(), "-42");
        assert_eq!(FieldValue::Bool(true).to_string(), "Y");
        assert_eq!(FieldValue::Bool(false).to_string(), "N");
        assert_eq!(FieldValue::Char('1').to_string(), "1");
    }

    #[test]
    fn test_field_value_decimal_preserves_scale() {
        let px: Decimal = "100.00".parse().unwrap();
        assert_eq!(FieldValue::Decimal(px).to_string(), "100.00");
    }

    #[test]
    fn test_field_value_timestamp_display() {
        let ts = Timestamp::parse_fix("20230101-00:00:00").unwrap();
        assert_eq!(
            FieldValue::UtcTimestamp(ts).to_string(),
            "20230101-00:00:00"
        );
    }

    #[test]
    fn test_field_value_zero_is_a_value() {
        let zero: Decimal = "0.00".parse().unwrap();
        let value = FieldValue::Decimal(zero);
        assert_eq!(value.as_decimal(), Some(zero));
    }
}
