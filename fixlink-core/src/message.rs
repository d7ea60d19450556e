/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Message model for FIX protocol.
//!
//! This module provides:
//! - [`MsgType`]: Enumeration of the message types the toolkit covers
//! - [`FieldMap`]: An ordered tag to value map
//! - [`RepeatingGroup`] / [`GroupTemplate`]: Repeating group model
//! - [`Message`]: Header, body and trailer field maps plus groups
//!
//! A FIX message is dynamic tag-value soup at the wire level; [`Message`]
//! keeps it that way (ordered maps, no per-message-type class hierarchy).
//! Typed accessors live with the applications that need them.

use crate::field::FieldValue;
use crate::tags;
use crate::types::SeqNum;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// FIX message types covered by the toolkit.
///
/// Session-level types plus the application types the router, validator,
/// bridge and clients handle. Anything else is `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MsgType {
    /// Heartbeat (0) - Session level.
    #[default]
    Heartbeat,
    /// Test Request (1) - Session level.
    TestRequest,
    /// Resend Request (2) - Session level.
    ResendRequest,
    /// Reject (3) - Session level.
    Reject,
    /// Sequence Reset (4) - Session level.
    SequenceReset,
    /// Logout (5) - Session level.
    Logout,
    /// Execution Report (8).
    ExecutionReport,
    /// Order Cancel Reject (9).
    OrderCancelReject,
    /// Logon (A) - Session level.
    Logon,
    /// News (B).
    News,
    /// New Order Single (D).
    NewOrderSingle,
    /// Order Cancel Request (F).
    OrderCancelRequest,
    /// Order Cancel/Replace Request (G).
    OrderCancelReplaceRequest,
    /// Order Status Request (H).
    OrderStatusRequest,
    /// Quote (S).
    Quote,
    /// Market Data Request (V).
    MarketDataRequest,
    /// Market Data Snapshot/Full Refresh (W).
    MarketDataSnapshotFullRefresh,
    /// Market Data Incremental Refresh (X).
    MarketDataIncrementalRefresh,
    /// Market Data Request Reject (Y).
    MarketDataRequestReject,
    /// Quote Cancel (Z).
    QuoteCancel,
    /// Security Status Request (e).
    SecurityStatusRequest,
    /// Security Status (f).
    SecurityStatus,
    /// Trading Session Status Request (g).
    TradingSessionStatusRequest,
    /// Trading Session Status (h).
    TradingSessionStatus,
    /// Business Message Reject (j).
    BusinessMessageReject,
    /// Order Mass Cancel Request (q).
    OrderMassCancelRequest,
    /// Order Mass Cancel Report (r).
    OrderMassCancelReport,
    /// Security List Request (x).
    SecurityListRequest,
    /// Security List (y).
    SecurityList,
    /// Quote Status Report (AI).
    QuoteStatusReport,
    /// Custom or unknown message type.
    Custom(String),
}

impl std::str::FromStr for MsgType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "0" => Self::Heartbeat,
            "1" => Self::TestRequest,
            "2" => Self::ResendRequest,
            "3" => Self::Reject,
            "4" => Self::SequenceReset,
            "5" => Self::Logout,
            "8" => Self::ExecutionReport,
            "9" => Self::OrderCancelReject,
            "A" => Self::Logon,
            "B" => Self::News,
            "D" => Self::NewOrderSingle,
            "F" => Self::OrderCancelRequest,
            "G" => Self::OrderCancelReplaceRequest,
            "H" => Self::OrderStatusRequest,
            "S" => Self::Quote,
            "V" => Self::MarketDataRequest,
            "W" => Self::MarketDataSnapshotFullRefresh,
            "X" => Self::MarketDataIncrementalRefresh,
            "Y" => Self::MarketDataRequestReject,
            "Z" => Self::QuoteCancel,
            "e" => Self::SecurityStatusRequest,
            "f" => Self::SecurityStatus,
            "g" => Self::TradingSessionStatusRequest,
            "h" => Self::TradingSessionStatus,
            "j" => Self::BusinessMessageReject,
            "q" => Self::OrderMassCancelRequest,
            "r" => Self::OrderMassCancelReport,
            "x" => Self::SecurityListRequest,
            "y" => Self::SecurityList,
            "AI" => Self::QuoteStatusReport,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl MsgType {
    /// Returns the wire representation of this message type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Heartbeat => "0",
            Self::TestRequest => "1",
            Self::ResendRequest => "2",
            Self::Reject => "3",
            Self::SequenceReset => "4",
            Self::Logout => "5",
            Self::ExecutionReport => "8",
            Self::OrderCancelReject => "9",
            Self::Logon => "A",
            Self::News => "B",
            Self::NewOrderSingle => "D",
            Self::OrderCancelRequest => "F",
            Self::OrderCancelReplaceRequest => "G",
            Self::OrderStatusRequest => "H",
            Self::Quote => "S",
            Self::MarketDataRequest => "V",
            Self::MarketDataSnapshotFullRefresh => "W",
            Self::MarketDataIncrementalRefresh => "X",
            Self::MarketDataRequestReject => "Y",
            Self::QuoteCancel => "Z",
            Self::SecurityStatusRequest => "e",
            Self::SecurityStatus => "f",
            Self::TradingSessionStatusRequest => "g",
            Self::TradingSessionStatus => "h",
            Self::BusinessMessageReject => "j",
            Self::OrderMassCancelRequest => "q",
            Self::OrderMassCancelReport => "r",
            Self::SecurityListRequest => "x",
            Self::SecurityList => "y",
            Self::QuoteStatusReport => "AI",
            Self::Custom(s) => s.as_str(),
        }
    }

    /// Returns true if this is an administrative (session-level) message.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::Heartbeat
                | Self::TestRequest
                | Self::ResendRequest
                | Self::Reject
                | Self::SequenceReset
                | Self::Logout
                | Self::Logon
        )
    }

    /// Returns true if this is an application message.
    #[must_use]
    pub fn is_app(&self) -> bool {
        !self.is_admin()
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An ordered tag to value map.
///
/// Insertion order is preserved and reproduced on emission. `set` replaces
/// an existing field in place; `push` always appends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMap {
    fields: SmallVec<[(u32, FieldValue); 16]>,
}

impl FieldMap {
    /// Creates an empty field map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of fields.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the map holds no fields.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true if a field with the given tag is present.
    #[must_use]
    pub fn contains(&self, tag: u32) -> bool {
        self.fields.iter().any(|(t, _)| *t == tag)
    }

    /// Returns the first value for the given tag.
    #[must_use]
    pub fn get(&self, tag: u32) -> Option<&FieldValue> {
        self.fields.iter().find(|(t, _)| *t == tag).map(|(_, v)| v)
    }

    /// Returns the value for the given tag as a string slice.
    #[must_use]
    pub fn get_str(&self, tag: u32) -> Option<&str> {
        self.get(tag).and_then(FieldValue::as_str)
    }

    /// Returns the value for the given tag as an i64.
    #[must_use]
    pub fn get_int(&self, tag: u32) -> Option<i64> {
        self.get(tag).and_then(FieldValue::as_i64)
    }

    /// Returns the value for the given tag as a u64.
    #[must_use]
    pub fn get_uint(&self, tag: u32) -> Option<u64> {
        self.get(tag).and_then(FieldValue::as_u64)
    }

    /// Returns the value for the given tag as a Decimal.
    #[must_use]
    pub fn get_decimal(&self, tag: u32) -> Option<rust_decimal::Decimal> {
        self.get(tag).and_then(FieldValue::as_decimal)
    }

    /// Returns the value for the given tag as a char.
    #[must_use]
    pub fn get_char(&self, tag: u32) -> Option<char> {
        self.get(tag).and_then(FieldValue::as_char)
    }

    /// Returns the value for the given tag as a bool.
    #[must_use]
    pub fn get_bool(&self, tag: u32) -> Option<bool> {
        self.get(tag).and_then(FieldValue::as_bool)
    }

    /// Sets a field, replacing an existing one in place or appending.
    pub fn set(&mut self, tag: u32, value: impl Into<FieldValue>) {
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(t, _)| *t == tag) {
            slot.1 = value;
        } else {
            self.fields.push((tag, value));
        }
    }

    /// Appends a field without looking for an existing one.
    pub fn push(&mut self, tag: u32, value: impl Into<FieldValue>) {
        self.fields.push((tag, value.into()));
    }

    /// Removes the first field with the given tag and returns its value.
    pub fn remove(&mut self, tag: u32) -> Option<FieldValue> {
        let idx = self.fields.iter().position(|(t, _)| *t == tag)?;
        Some(self.fields.remove(idx).1)
    }

    /// Iterates over `(tag, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &FieldValue)> {
        self.fields.iter().map(|(t, v)| (*t, v))
    }

    /// Returns the tags in insertion order.
    pub fn tags(&self) -> impl Iterator<Item = u32> + '_ {
        self.fields.iter().map(|(t, _)| *t)
    }
}

/// Declared shape of a repeating group: count tag, delimiter tag, and the
/// member field order.
///
/// The delimiter is the first tag of each sub-record; encountering it starts
/// a new entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTemplate {
    /// Tag carrying the entry count (NumInGroup).
    pub count_tag: u32,
    /// First tag of every entry.
    pub delimiter_tag: u32,
    /// Member tags, in declared order.
    pub fields: Vec<u32>,
}

impl GroupTemplate {
    /// Creates a new group template.
    ///
    /// The delimiter is the first member tag.
    #[must_use]
    pub fn new(count_tag: u32, fields: Vec<u32>) -> Self {
        let delimiter_tag = fields.first().copied().unwrap_or(0);
        Self {
            count_tag,
            delimiter_tag,
            fields,
        }
    }

    /// Returns true if the tag is a declared member of this template.
    #[must_use]
    pub fn contains(&self, tag: u32) -> bool {
        self.fields.contains(&tag)
    }
}

/// A parsed or built repeating group: N sub-records of a declared template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatingGroup {
    /// Tag carrying the entry count.
    pub count_tag: u32,
    /// First tag of every entry.
    pub delimiter_tag: u32,
    /// Group entries, each an ordered field map.
    pub entries: Vec<FieldMap>,
}

impl RepeatingGroup {
    /// Creates an empty group for the given template shape.
    #[must_use]
    pub fn new(count_tag: u32, delimiter_tag: u32) -> Self {
        Self {
            count_tag,
            delimiter_tag,
            entries: Vec::new(),
        }
    }

    /// Creates an empty group shaped by a template.
    #[must_use]
    pub fn from_template(template: &GroupTemplate) -> Self {
        Self::new(template.count_tag, template.delimiter_tag)
    }

    /// Appends an empty entry and returns a mutable reference to it.
    pub fn add_entry(&mut self) -> &mut FieldMap {
        self.entries.push(FieldMap::new());
        self.entries.last_mut().expect("entry just pushed")
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the group has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A FIX message: ordered header, body and trailer field maps plus a side
/// table of repeating groups anchored at their body count tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Standard header fields (BeginString, MsgType, MsgSeqNum, ...).
    pub header: FieldMap,
    /// Body fields; a group's count tag appears here at its wire position.
    pub body: FieldMap,
    /// Trailer fields (CheckSum).
    pub trailer: FieldMap,
    groups: Vec<RepeatingGroup>,
}

impl Message {
    /// Creates an empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a message with BeginString and MsgType already set.
    #[must_use]
    pub fn with_type(begin_string: &str, msg_type: MsgType) -> Self {
        let mut message = Self::new();
        message.header.set(tags::BEGIN_STRING, begin_string);
        message.header.set(tags::MSG_TYPE, msg_type.as_str());
        message
    }

    /// Returns the message type parsed from tag 35.
    #[must_use]
    pub fn msg_type(&self) -> Option<MsgType> {
        self.header
            .get_str(tags::MSG_TYPE)
            .and_then(|s| s.parse().ok())
    }

    /// Returns the BeginString (tag 8).
    #[must_use]
    pub fn begin_string(&self) -> Option<&str> {
        self.header.get_str(tags::BEGIN_STRING)
    }

    /// Returns the sequence number (tag 34).
    #[must_use]
    pub fn seq_num(&self) -> Option<SeqNum> {
        self.header.get_uint(tags::MSG_SEQ_NUM).map(SeqNum::new)
    }

    /// Returns true if PossDupFlag (tag 43) is set to Y.
    #[must_use]
    pub fn is_poss_dup(&self) -> bool {
        self.header.get_bool(tags::POSS_DUP_FLAG).unwrap_or(false)
    }

    /// Attaches a repeating group, stamping its count into the body.
    ///
    /// The count field keeps its position if the tag was already present,
    /// so groups survive a decode, mutate, re-encode cycle in place.
    pub fn set_group(&mut self, group: RepeatingGroup) {
        self.body
            .set(group.count_tag, FieldValue::UInt(group.entries.len() as u64));
        if let Some(existing) = self
            .groups
            .iter_mut()
            .find(|g| g.count_tag == group.count_tag)
        {
            *existing = group;
        } else {
            self.groups.push(group);
        }
    }

    /// Returns the group anchored at the given count tag.
    #[must_use]
    pub fn group(&self, count_tag: u32) -> Option<&RepeatingGroup> {
        self.groups.iter().find(|g| g.count_tag == count_tag)
    }

    /// Iterates over all attached groups.
    pub fn groups(&self) -> impl Iterator<Item = &RepeatingGroup> {
        self.groups.iter()
    }

    /// Renders the message for log lines with SOH replaced by `|`.
    ///
    /// Passwords (tag 554) are redacted.
    #[must_use]
    pub fn to_log_string(&self) -> String {
        let mut out = String::new();
        let mut write = |tag: u32, value: &FieldValue| {
            if tag == tags::PASSWORD {
                out.push_str("554=<redacted>|");
            } else {
                out.push_str(&format!("{tag}={value}|"));
            }
        };
        for (tag, value) in self.header.iter() {
            write(tag, value);
        }
        for (tag, value) in self.body.iter() {
            match self.group(tag) {
                Some(group) => {
                    write(tag, value);
                    for entry in &group.entries {
                        for (etag, evalue) in entry.iter() {
                            write(etag, evalue);
                        }
                    }
                }
                None => write(tag, value),
            }
        }
        for (tag, value) in self.trailer.iter() {
            write(tag, value);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msg_type_round_trip() {
        assert_eq!("0".parse::<MsgType>().unwrap(), MsgType::Heartbeat);
        assert_eq!("A".parse::<MsgType>().unwrap(), MsgType::Logon);
        assert_eq!("AI".parse::<MsgType>().unwrap(), MsgType::QuoteStatusReport);
        assert_eq!(MsgType::QuoteStatusReport.as_str(), "AI");
        assert_eq!(MsgType::BusinessMessageReject.as_str(), "j");
    }

    #[test]
    fn test_msg_type_is_admin() {
        assert!(MsgType::Heartbeat.is_admin());
        assert!(MsgType::Logon.is_admin());
        assert!(!MsgType::NewOrderSingle.is_admin());
        assert!(MsgType::NewOrderSingle.is_app());
    }

    #[test]
    fn test_msg_type_custom() {
        let custom: MsgType = "XX".parse().unwrap();
        assert!(matches!(custom, MsgType::Custom(_)));
        assert_eq!(custom.as_str(), "XX");
    }

    #[test]
    fn test_field_map_preserves_order() {
        let mut map = FieldMap::new();
        map.set(55, "ABC");
        map.set(54, '1');
        map.set(38, FieldValue::UInt(10));

        let tags: Vec<u32> = map.tags().collect();
        assert_eq!(tags, vec![55, 54, 38]);
    }

    #[test]
    fn test_field_map_set_replaces_in_place() {
        let mut map = FieldMap::new();
        map.set(55, "ABC");
        map.set(54, '1');
        map.set(55, "DEF");

        assert_eq!(map.get_str(55), Some("DEF"));
        let tags: Vec<u32> = map.tags().collect();
        assert_eq!(tags, vec![55, 54]);
    }

    #[test]
    fn test_field_map_remove() {
        let mut map = FieldMap::new();
        map.set(55, "ABC");
        assert!(map.remove(55).is_some());
        assert!(map.remove(55).is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn test_group_template_delimiter() {
        let template = GroupTemplate::new(268, vec![279, 269, 270, 271]);
        assert_eq!(template.delimiter_tag, 279);
        assert!(template.contains(270));
        assert!(!template.contains(55));
    }

    #[test]
    fn test_message_set_group_updates_count() {
        let mut message = Message::with_type("FIXT.1.1", MsgType::MarketDataRequest);
        let mut group = RepeatingGroup::new(267, 269);
        group.add_entry().set(269, '0');
        group.add_entry().set(269, '1');
        message.set_group(group);

        assert_eq!(message.body.get_uint(267), Some(2));
        assert_eq!(message.group(267).unwrap().len(), 2);
    }

    #[test]
    fn test_message_accessors() {
        let mut message = Message::with_type("FIX.4.4", MsgType::NewOrderSingle);
        message.header.set(tags::MSG_SEQ_NUM, FieldValue::UInt(7));
        message.header.set(tags::POSS_DUP_FLAG, true);

        assert_eq!(message.msg_type(), Some(MsgType::NewOrderSingle));
        assert_eq!(message.begin_string(), Some("FIX.4.4"));
        assert_eq!(message.seq_num(), Some(SeqNum::new(7)));
        assert!(message.is_poss_dup());
    }

    #[test]
    fn test_log_string_redacts_password() {
        let mut message = Message::with_type("FIXT.1.1", MsgType::Logon);
        message.header.set(tags::PASSWORD, "hunter2");
        let log = message.to_log_string();
        assert!(log.contains("554=<redacted>|"));
        assert!(!log.contains("hunter2"));
    }
}
