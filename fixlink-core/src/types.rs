/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Core types for FIX protocol operations.
//!
//! This module provides fundamental types used throughout the fixlink toolkit:
//! - [`SeqNum`]: Sequence number wrapper
//! - [`Timestamp`]: FIX-formatted UTC timestamp that remembers its precision
//! - [`CompId`]: Component identifier (SenderCompID, TargetCompID)
//! - [`SessionId`]: Full session identity tuple
//! - [`Side`], [`OrdType`], [`TimeInForce`]: Order field enumerations

use arrayvec::ArrayString;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length for CompID strings in bytes.
pub const COMP_ID_MAX_LEN: usize = 32;

/// BeginString of the FIXT.1.1 transport.
pub const BEGIN_STRING_FIXT11: &str = "FIXT.1.1";

/// BeginString of FIX 4.2.
pub const BEGIN_STRING_FIX42: &str = "FIX.4.2";

/// BeginString of FIX 4.4.
pub const BEGIN_STRING_FIX44: &str = "FIX.4.4";

/// ApplVerID value denoting FIX 5.0 SP2.
pub const APPL_VER_ID_FIX50SP2: &str = "9";

/// FIX message sequence number.
///
/// Sequence numbers are unsigned 64-bit integers that identify messages
/// within a FIX session. They start at 1 and increment for each message sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct SeqNum(u64);

impl SeqNum {
    /// Creates a new sequence number.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw sequence number value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the next sequence number.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Checks if this sequence number is valid (>= 1).
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 >= 1
    }
}

impl Default for SeqNum {
    fn default() -> Self {
        Self(1)
    }
}

impl From<u64> for SeqNum {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<SeqNum> for u64 {
    fn from(seq: SeqNum) -> Self {
        seq.0
    }
}

impl fmt::Display for SeqNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wire precision of a FIX timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimePrecision {
    /// `YYYYMMDD-HH:MM:SS`
    Seconds,
    /// `YYYYMMDD-HH:MM:SS.sss`
    #[default]
    Millis,
}

/// FIX protocol UTC timestamp.
///
/// The precision the value arrived with is preserved so that re-emission
/// reproduces the original wire text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Nanoseconds since Unix epoch (1970-01-01 00:00:00 UTC).
    nanos_since_epoch: i64,
    /// Wire precision.
    precision: TimePrecision,
}

impl Timestamp {
    /// Returns the current UTC timestamp with millisecond precision.
    #[must_use]
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// Creates a timestamp from nanoseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self {
            nanos_since_epoch: nanos,
            precision: TimePrecision::Millis,
        }
    }

    /// Returns nanoseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn as_nanos(self) -> i64 {
        self.nanos_since_epoch
    }

    /// Returns the wire precision.
    #[inline]
    #[must_use]
    pub const fn precision(self) -> TimePrecision {
        self.precision
    }

    /// Converts to a chrono `DateTime<Utc>`.
    #[must_use]
    pub fn to_datetime(self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.nanos_since_epoch)
    }

    /// Parses a FIX `UTCTimestamp` value (`YYYYMMDD-HH:MM:SS[.sss]`).
    #[must_use]
    pub fn parse_fix(s: &str) -> Option<Self> {
        let dt = NaiveDateTime::parse_from_str(s, "%Y%m%d-%H:%M:%S%.f").ok()?;
        let precision = if s.contains('.') {
            TimePrecision::Millis
        } else {
            TimePrecision::Seconds
        };
        Some(Self {
            nanos_since_epoch: dt.and_utc().timestamp_nanos_opt()?,
            precision,
        })
    }

    /// Formats the timestamp in FIX wire format at its own precision.
    #[must_use]
    pub fn format_fix(self) -> ArrayString<21> {
        let dt = self.to_datetime();
        let mut buf = ArrayString::new();
        let fmt = match self.precision {
            TimePrecision::Seconds => "%Y%m%d-%H:%M:%S",
            TimePrecision::Millis => "%Y%m%d-%H:%M:%S%.3f",
        };
        let _ = fmt::write(&mut buf, format_args!("{}", dt.format(fmt)));
        buf
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            nanos_since_epoch: dt.timestamp_nanos_opt().unwrap_or(0),
            precision: TimePrecision::Millis,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fix())
    }
}

/// Component identifier for FIX sessions.
///
/// Used for SenderCompID (tag 49), TargetCompID (tag 56), and related fields.
/// Maximum length is 32 characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct CompId(ArrayString<COMP_ID_MAX_LEN>);

impl CompId {
    /// Creates a new CompId from a string slice.
    ///
    /// # Returns
    /// `Some(CompId)` if the string fits within the maximum length, `None` otherwise.
    #[must_use]
    pub fn new(s: &str) -> Option<Self> {
        ArrayString::from(s).ok().map(Self)
    }

    /// Returns the CompId as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the length of the CompId in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the CompId is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for CompId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CompId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CompId {
    type Err = arrayvec::CapacityError<()>;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ArrayString::try_from(s)
            .map(Self)
            .map_err(|_| arrayvec::CapacityError::new(()))
    }
}

/// Full identity of a FIX session.
///
/// The tuple `(BeginString, SenderCompID, SenderSubID?, TargetCompID,
/// TargetSubID?, Qualifier?)` identifies exactly one session per process;
/// the session is the unit of message ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId {
    /// BeginString (on-wire FIX version).
    pub begin_string: String,
    /// Sender CompID (tag 49).
    pub sender_comp_id: CompId,
    /// Optional sender sub ID (tag 50).
    pub sender_sub_id: Option<String>,
    /// Target CompID (tag 56).
    pub target_comp_id: CompId,
    /// Optional target sub ID (tag 57).
    pub target_sub_id: Option<String>,
    /// Optional qualifier distinguishing otherwise identical sessions.
    pub qualifier: Option<String>,
}

impl SessionId {
    /// Creates a new session id from the required components.
    #[must_use]
    pub fn new(begin_string: impl Into<String>, sender: CompId, target: CompId) -> Self {
        Self {
            begin_string: begin_string.into(),
            sender_comp_id: sender,
            sender_sub_id: None,
            target_comp_id: target,
            target_sub_id: None,
            qualifier: None,
        }
    }

    /// Sets the sender sub ID.
    #[must_use]
    pub fn with_sender_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.sender_sub_id = Some(sub_id.into());
        self
    }

    /// Sets the target sub ID.
    #[must_use]
    pub fn with_target_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.target_sub_id = Some(sub_id.into());
        self
    }

    /// Sets the session qualifier.
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Returns true if this session runs over the FIXT.1.1 transport.
    ///
    /// FIXT sessions carry `DefaultApplVerID` (tag 1137) in their Logon.
    #[must_use]
    pub fn is_fixt(&self) -> bool {
        self.begin_string == BEGIN_STRING_FIXT11
    }

    /// Returns the session id of the opposite direction (sender and target
    /// swapped), as seen by the counterparty.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            begin_string: self.begin_string.clone(),
            sender_comp_id: self.target_comp_id.clone(),
            sender_sub_id: self.target_sub_id.clone(),
            target_comp_id: self.sender_comp_id.clone(),
            target_sub_id: self.sender_sub_id.clone(),
            qualifier: self.qualifier.clone(),
        }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.begin_string, self.sender_comp_id)?;
        if let Some(sub) = &self.sender_sub_id {
            write!(f, "/{sub}")?;
        }
        write!(f, "->{}", self.target_comp_id)?;
        if let Some(sub) = &self.target_sub_id {
            write!(f, "/{sub}")?;
        }
        if let Some(q) = &self.qualifier {
            write!(f, ":{q}")?;
        }
        Ok(())
    }
}

/// Order side (tag 54).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Buy order.
    Buy,
    /// Sell order.
    Sell,
}

impl Side {
    /// Creates a Side from its wire character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '1' => Some(Self::Buy),
            '2' => Some(Self::Sell),
            _ => None,
        }
    }

    /// Returns the wire character of this side.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Buy => '1',
            Self::Sell => '2',
        }
    }

    /// Parses a human-readable side name (`buy`, `sell`).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "buy" => Some(Self::Buy),
            "sell" => Some(Self::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Order type (tag 40).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrdType {
    /// Market order.
    Market,
    /// Limit order.
    Limit,
    /// Stop order.
    Stop,
    /// Stop limit order.
    StopLimit,
}

impl OrdType {
    /// Creates an OrdType from its wire character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '1' => Some(Self::Market),
            '2' => Some(Self::Limit),
            '3' => Some(Self::Stop),
            '4' => Some(Self::StopLimit),
            _ => None,
        }
    }

    /// Returns the wire character of this order type.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Market => '1',
            Self::Limit => '2',
            Self::Stop => '3',
            Self::StopLimit => '4',
        }
    }

    /// Parses a human-readable type name (`market`, `limit`, ...).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "market" => Some(Self::Market),
            "limit" => Some(Self::Limit),
            "stop" => Some(Self::Stop),
            "stop_limit" => Some(Self::StopLimit),
            _ => None,
        }
    }

    /// Returns the lowercase label used in logs and metric label values.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit => "limit",
            Self::Stop => "stop",
            Self::StopLimit => "stop_limit",
        }
    }
}

impl fmt::Display for OrdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Time in force (tag 59).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Valid for the trading day.
    Day,
    /// Good until cancelled.
    GoodTillCancel,
    /// Immediate or cancel.
    ImmediateOrCancel,
    /// Fill or kill.
    FillOrKill,
}

impl TimeInForce {
    /// Creates a TimeInForce from its wire character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Day),
            '1' => Some(Self::GoodTillCancel),
            '3' => Some(Self::ImmediateOrCancel),
            '4' => Some(Self::FillOrKill),
            _ => None,
        }
    }

    /// Returns the wire character of this time in force.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Day => '0',
            Self::GoodTillCancel => '1',
            Self::ImmediateOrCancel => '3',
            Self::FillOrKill => '4',
        }
    }

    /// Parses a human-readable expiry name (`day`, `good_till_cancel`, ...).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "day" => Some(Self::Day),
            "good_till_cancel" => Some(Self::GoodTillCancel),
            "immediate_or_cancel" => Some(Self::ImmediateOrCancel),
            "fill_or_kill" => Some(Self::FillOrKill),
            _ => None,
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_num_operations() {
        let seq = SeqNum::new(5);
        assert_eq!(seq.value(), 5);
        assert_eq!(seq.next().value(), 6);
        assert!(seq.is_valid());
        assert!(!SeqNum::new(0).is_valid());
    }

    #[test]
    fn test_timestamp_parse_and_format_seconds() {
        let ts = Timestamp::parse_fix("20230101-00:00:00").unwrap();
        assert_eq!(ts.precision(), TimePrecision::Seconds);
        assert_eq!(ts.format_fix().as_str(), "20230101-00:00:00");
    }

    #[test]
    fn test_timestamp_parse_and_format_millis() {
        let ts = Timestamp::parse_fix("20230101-12:30:45.123").unwrap();
        assert_eq!(ts.precision(), TimePrecision::Millis);
        assert_eq!(ts.format_fix().as_str(), "20230101-12:30:45.123");
    }

    #[test]
    fn test_timestamp_parse_invalid() {
        assert!(Timestamp::parse_fix("2023-01-01 00:00:00").is_none());
        assert!(Timestamp::parse_fix("garbage").is_none());
    }

    #[test]
    fn test_comp_id() {
        let id = CompId::new("SENDER").unwrap();
        assert_eq!(id.as_str(), "SENDER");
        assert!(!id.is_empty());

        let long_str = "A".repeat(COMP_ID_MAX_LEN + 1);
        assert!(CompId::new(&long_str).is_none());
    }

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new(
            BEGIN_STRING_FIXT11,
            CompId::new("CL").unwrap(),
            CompId::new("SRV").unwrap(),
        );
        assert_eq!(id.to_string(), "FIXT.1.1:CL->SRV");
        assert!(id.is_fixt());

        let id = id.with_sender_sub_id("A").with_qualifier("md");
        assert_eq!(id.to_string(), "FIXT.1.1:CL/A->SRV:md");
    }

    #[test]
    fn test_session_id_reversed() {
        let id = SessionId::new(
            BEGIN_STRING_FIX44,
            CompId::new("EXCH").unwrap(),
            CompId::new("BRIDGE").unwrap(),
        );
        let rev = id.reversed();
        assert_eq!(rev.sender_comp_id.as_str(), "BRIDGE");
        assert_eq!(rev.target_comp_id.as_str(), "EXCH");
        assert!(!rev.is_fixt());
    }

    #[test]
    fn test_side_round_trip() {
        assert_eq!(Side::from_char('1'), Some(Side::Buy));
        assert_eq!(Side::Buy.as_char(), '1');
        assert_eq!(Side::from_label("SELL"), Some(Side::Sell));
        assert_eq!(Side::from_label("short"), None);
    }

    #[test]
    fn test_ord_type_labels() {
        assert_eq!(OrdType::from_label("limit"), Some(OrdType::Limit));
        assert_eq!(OrdType::Limit.label(), "limit");
        assert_eq!(OrdType::Limit.as_char(), '2');
    }

    #[test]
    fn test_time_in_force_labels() {
        assert_eq!(
            TimeInForce::from_label("good_till_cancel"),
            Some(TimeInForce::GoodTillCancel)
        );
        assert_eq!(TimeInForce::Day.as_char(), '0');
    }
}
