/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Schema definitions for FIX dictionaries.
//!
//! This module defines the structures that represent FIX protocol
//! specifications:
//! - [`FieldDef`]: Field definitions with tag, name, type and enum labels
//! - [`MessageDef`]: Message definitions with required fields and groups
//! - [`GroupDef`]: Repeating group definitions
//! - [`Dictionary`]: Complete dictionary with the lookup API the session,
//!   router and rendering layers consume
//!
//! A dictionary is loaded once per session pair (one for the transport, one
//! for the application layer) and is immutable afterwards, so it can be
//! shared freely behind an `Arc`.

use fixlink_core::error::DecodeError;
use fixlink_core::message::{GroupTemplate, Message};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// FIX protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Version {
    /// FIX 4.2
    Fix42,
    /// FIX 4.4
    Fix44,
    /// FIX 5.0 SP2
    Fix50Sp2,
    /// FIXT 1.1 (transport layer for FIX 5.0+)
    Fixt11,
}

impl Version {
    /// Returns the BeginString value for this version.
    #[must_use]
    pub const fn begin_string(&self) -> &'static str {
        match self {
            Self::Fix42 => "FIX.4.2",
            Self::Fix44 => "FIX.4.4",
            Self::Fix50Sp2 | Self::Fixt11 => "FIXT.1.1",
        }
    }

    /// Returns the ApplVerID for FIX 5.0+ versions.
    #[must_use]
    pub const fn appl_ver_id(&self) -> Option<&'static str> {
        match self {
            Self::Fix50Sp2 => Some("9"),
            _ => None,
        }
    }

    /// Returns true if this version uses the FIXT transport.
    #[must_use]
    pub const fn uses_fixt(&self) -> bool {
        matches!(self, Self::Fix50Sp2 | Self::Fixt11)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.begin_string())
    }
}

/// FIX field data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Integer value.
    Int,
    /// Length field (for data fields).
    Length,
    /// Sequence number.
    SeqNum,
    /// Number of entries in a repeating group.
    NumInGroup,
    /// Tag number reference.
    TagNum,
    /// Floating point number.
    Float,
    /// Quantity.
    Qty,
    /// Price.
    Price,
    /// Amount (price * quantity).
    Amt,
    /// Percentage.
    Percentage,
    /// Single character.
    Char,
    /// Boolean (Y/N).
    Boolean,
    /// String.
    String,
    /// Multiple string value (space-separated).
    MultipleStringValue,
    /// Currency code (ISO 4217).
    Currency,
    /// Exchange code (ISO 10383 MIC).
    Exchange,
    /// UTC timestamp.
    UtcTimestamp,
    /// UTC time only.
    UtcTimeOnly,
    /// UTC date only.
    UtcDateOnly,
    /// Local market date.
    LocalMktDate,
    /// Raw data (binary).
    Data,
}

impl FieldType {
    /// Returns true if this type represents a decimal-valued quantity.
    #[must_use]
    pub const fn is_decimal(&self) -> bool {
        matches!(
            self,
            Self::Float | Self::Qty | Self::Price | Self::Amt | Self::Percentage
        )
    }

    /// Returns true if this type represents an integer.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int | Self::Length | Self::SeqNum | Self::NumInGroup | Self::TagNum
        )
    }
}

/// Definition of a FIX field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field tag number.
    pub tag: u32,
    /// Field name.
    pub name: String,
    /// Field data type.
    pub field_type: FieldType,
    /// Enum labels keyed by raw wire value, for enumerated fields.
    pub enums: Option<HashMap<String, String>>,
}

impl FieldDef {
    /// Creates a new field definition.
    #[must_use]
    pub fn new(tag: u32, name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            tag,
            name: name.into(),
            field_type,
            enums: None,
        }
    }

    /// Adds enum labels for an enumerated field.
    #[must_use]
    pub fn with_enums(mut self, pairs: &[(&str, &str)]) -> Self {
        self.enums = Some(
            pairs
                .iter()
                .map(|(raw, label)| ((*raw).to_string(), (*label).to_string()))
                .collect(),
        );
        self
    }
}

/// Definition of a repeating group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDef {
    /// Tag of the count field (NumInGroup).
    pub count_tag: u32,
    /// Tag of the first field in each entry (delimiter).
    pub delimiter_tag: u32,
    /// Member tags, in declared order.
    pub fields: Vec<u32>,
}

impl GroupDef {
    /// Creates a group definition; the delimiter is the first member tag.
    #[must_use]
    pub fn new(count_tag: u32, fields: Vec<u32>) -> Self {
        let delimiter_tag = fields.first().copied().unwrap_or(0);
        Self {
            count_tag,
            delimiter_tag,
            fields,
        }
    }

    /// Builds the wire-level template for this group.
    #[must_use]
    pub fn template(&self) -> GroupTemplate {
        GroupTemplate {
            count_tag: self.count_tag,
            delimiter_tag: self.delimiter_tag,
            fields: self.fields.clone(),
        }
    }
}

/// Message category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageCategory {
    /// Administrative message (session level).
    Admin,
    /// Application message.
    App,
}

/// Definition of a FIX message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDef {
    /// Message type value (tag 35).
    pub msg_type: String,
    /// Message name.
    pub name: String,
    /// Message category (admin or app).
    pub category: MessageCategory,
    /// Tags that must be present in a well-formed instance.
    pub required: HashSet<u32>,
    /// Groups declared for this message, keyed by count tag.
    pub groups: HashMap<u32, GroupDef>,
}

impl MessageDef {
    /// Creates a new message definition.
    #[must_use]
    pub fn new(msg_type: impl Into<String>, name: impl Into<String>, category: MessageCategory) -> Self {
        Self {
            msg_type: msg_type.into(),
            name: name.into(),
            category,
            required: HashSet::new(),
            groups: HashMap::new(),
        }
    }

    /// Marks tags as required.
    #[must_use]
    pub fn with_required(mut self, tags: &[u32]) -> Self {
        self.required.extend(tags.iter().copied());
        self
    }

    /// Declares a repeating group for this message.
    #[must_use]
    pub fn with_group(mut self, group: GroupDef) -> Self {
        self.groups.insert(group.count_tag, group);
        self
    }
}

/// Complete FIX dictionary for a specific version.
///
/// Immutable after construction. Tags absent from the dictionary are still
/// accepted at parse time but render as `<unknown>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dictionary {
    /// FIX version.
    pub version: Version,
    fields: HashMap<u32, FieldDef>,
    fields_by_name: HashMap<String, u32>,
    messages: HashMap<String, MessageDef>,
    header_fields: HashSet<u32>,
    trailer_fields: HashSet<u32>,
    /// Groups shared by several messages, keyed by count tag.
    common_groups: HashMap<u32, GroupDef>,
}

impl Dictionary {
    /// Creates a new empty dictionary for the specified version.
    #[must_use]
    pub fn new(version: Version) -> Self {
        Self {
            version,
            fields: HashMap::new(),
            fields_by_name: HashMap::new(),
            messages: HashMap::new(),
            header_fields: HashSet::new(),
            trailer_fields: HashSet::new(),
            common_groups: HashMap::new(),
        }
    }

    /// Adds a field definition.
    pub fn add_field(&mut self, field: FieldDef) {
        self.fields_by_name.insert(field.name.clone(), field.tag);
        self.fields.insert(field.tag, field);
    }

    /// Adds a message definition.
    pub fn add_message(&mut self, message: MessageDef) {
        self.messages.insert(message.msg_type.clone(), message);
    }

    /// Declares a header field.
    pub fn add_header_field(&mut self, tag: u32) {
        self.header_fields.insert(tag);
    }

    /// Declares a trailer field.
    pub fn add_trailer_field(&mut self, tag: u32) {
        self.trailer_fields.insert(tag);
    }

    /// Declares a group shared by several messages.
    pub fn add_common_group(&mut self, group: GroupDef) {
        self.common_groups.insert(group.count_tag, group);
    }

    /// Returns the field name for a tag, if the tag is known.
    #[must_use]
    pub fn field_name(&self, tag: u32) -> Option<&str> {
        self.fields.get(&tag).map(|f| f.name.as_str())
    }

    /// Returns the field type for a tag, if the tag is known.
    #[must_use]
    pub fn field_type(&self, tag: u32) -> Option<FieldType> {
        self.fields.get(&tag).map(|f| f.field_type)
    }

    /// Returns the label of an enumerated raw value, if declared.
    #[must_use]
    pub fn enum_label(&self, tag: u32, raw: &str) -> Option<&str> {
        self.fields
            .get(&tag)?
            .enums
            .as_ref()?
            .get(raw)
            .map(String::as_str)
    }

    /// Returns true if the tag belongs to the standard header.
    #[must_use]
    pub fn is_header_field(&self, tag: u32) -> bool {
        self.header_fields.contains(&tag)
    }

    /// Returns true if the tag belongs to the standard trailer.
    #[must_use]
    pub fn is_trailer_field(&self, tag: u32) -> bool {
        self.trailer_fields.contains(&tag)
    }

    /// Returns the required tags for a message type.
    ///
    /// Unknown message types have no requirements.
    #[must_use]
    pub fn required_fields_for(&self, msg_type: &str) -> HashSet<u32> {
        self.messages
            .get(msg_type)
            .map(|m| m.required.clone())
            .unwrap_or_default()
    }

    /// Returns the group template for a count tag within a message type.
    ///
    /// Message-scoped declarations take precedence over common groups, so
    /// the same count tag (e.g. NoMDEntries) can carry different templates
    /// in snapshot and incremental messages.
    #[must_use]
    pub fn group_template(&self, msg_type: &str, count_tag: u32) -> Option<GroupTemplate> {
        if let Some(message) = self.messages.get(msg_type) {
            if let Some(group) = message.groups.get(&count_tag) {
                return Some(group.template());
            }
        }
        self.common_groups.get(&count_tag).map(GroupDef::template)
    }

    /// Returns the message definition for a type.
    #[must_use]
    pub fn message(&self, msg_type: &str) -> Option<&MessageDef> {
        self.messages.get(msg_type)
    }

    /// Returns the human-readable name of a message type.
    #[must_use]
    pub fn message_name(&self, msg_type: &str) -> Option<&str> {
        self.messages.get(msg_type).map(|m| m.name.as_str())
    }

    /// Returns a field definition by name.
    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDef> {
        self.fields_by_name
            .get(name)
            .and_then(|tag| self.fields.get(tag))
    }

    /// Validates that a message carries every field its type requires.
    ///
    /// # Errors
    /// Returns `DecodeError::MissingRequiredField` naming the first missing tag.
    pub fn validate_required(&self, message: &Message) -> std::result::Result<(), DecodeError> {
        let Some(msg_type) = message.header.get_str(35) else {
            return Err(DecodeError::MissingMsgType);
        };
        let Some(def) = self.messages.get(msg_type) else {
            return Ok(());
        };
        let mut required: Vec<u32> = def.required.iter().copied().collect();
        required.sort_unstable();
        for tag in required {
            if !message.header.contains(tag) && !message.body.contains(tag) {
                return Err(DecodeError::MissingRequiredField { tag });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixlink_core::message::MsgType;

    fn dict_with_field() -> Dictionary {
        let mut dict = Dictionary::new(Version::Fix50Sp2);
        dict.add_field(
            FieldDef::new(54, "Side", FieldType::Char).with_enums(&[("1", "Buy"), ("2", "Sell")]),
        );
        dict.add_header_field(49);
        dict.add_trailer_field(10);
        dict.add_message(
            MessageDef::new("D", "NewOrderSingle", MessageCategory::App).with_required(&[11, 54]),
        );
        dict
    }

    #[test]
    fn test_version_begin_string() {
        assert_eq!(Version::Fix42.begin_string(), "FIX.4.2");
        assert_eq!(Version::Fix44.begin_string(), "FIX.4.4");
        assert_eq!(Version::Fix50Sp2.begin_string(), "FIXT.1.1");
    }

    #[test]
    fn test_version_appl_ver_id() {
        assert_eq!(Version::Fix44.appl_ver_id(), None);
        assert_eq!(Version::Fix50Sp2.appl_ver_id(), Some("9"));
        assert!(Version::Fix50Sp2.uses_fixt());
        assert!(!Version::Fix42.uses_fixt());
    }

    #[test]
    fn test_field_lookups() {
        let dict = dict_with_field();
        assert_eq!(dict.field_name(54), Some("Side"));
        assert_eq!(dict.field_type(54), Some(FieldType::Char));
        assert_eq!(dict.enum_label(54, "1"), Some("Buy"));
        assert_eq!(dict.enum_label(54, "9"), None);
        assert_eq!(dict.field_name(9999), None);
    }

    #[test]
    fn test_header_trailer_membership() {
        let dict = dict_with_field();
        assert!(dict.is_header_field(49));
        assert!(dict.is_trailer_field(10));
        assert!(!dict.is_header_field(54));
    }

    #[test]
    fn test_required_fields() {
        let dict = dict_with_field();
        let required = dict.required_fields_for("D");
        assert!(required.contains(&11));
        assert!(required.contains(&54));
        assert!(dict.required_fields_for("ZZ").is_empty());
    }

    #[test]
    fn test_group_template_message_scope_wins() {
        let mut dict = dict_with_field();
        dict.add_common_group(GroupDef::new(268, vec![269, 270]));
        dict.add_message(
            MessageDef::new("X", "MarketDataIncrementalRefresh", MessageCategory::App)
                .with_group(GroupDef::new(268, vec![279, 269, 270])),
        );

        let common = dict.group_template("W", 268).unwrap();
        assert_eq!(common.delimiter_tag, 269);

        let scoped = dict.group_template("X", 268).unwrap();
        assert_eq!(scoped.delimiter_tag, 279);
    }

    #[test]
    fn test_validate_required() {
        let dict = dict_with_field();
        let mut message = Message::with_type("FIXT.1.1", MsgType::NewOrderSingle);
        message.body.set(11, "order-1");

        let err = dict.validate_required(&message).unwrap_err();
        assert_eq!(err, DecodeError::MissingRequiredField { tag: 54 });

        message.body.set(54, '1');
        assert!(dict.validate_required(&message).is_ok());
    }
}
