/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FIX message decoding.
//!
//! Two layers:
//! - [`FieldScanner`]: zero-copy sequential `tag=value\x01` scanner
//! - [`MessageDecoder`]: structures scanned fields into a [`Message`] with
//!   header/body/trailer split and dictionary-driven repeating groups
//!
//! Parsing is strictly sequential: the first three fields must be
//! BeginString (8), BodyLength (9) and MsgType (35); the frame ends after
//! CheckSum (10), which must be exactly three ASCII digits.

use crate::checksum::{calculate_checksum, parse_checksum};
use bytes::Bytes;
use chrono::{NaiveDate, NaiveTime};
use fixlink_core::error::DecodeError;
use fixlink_core::field::{FieldRef, FieldTag, FieldValue};
use fixlink_core::message::{Message, MsgType, RepeatingGroup};
use fixlink_core::types::Timestamp;
use fixlink_dictionary::{Dictionary, FieldType};
use memchr::memchr;
use smallvec::SmallVec;
use std::sync::Arc;

/// SOH (Start of Header) delimiter used in FIX messages.
pub const SOH: u8 = 0x01;

/// Equals sign delimiter between tag and value.
pub const EQUALS: u8 = b'=';

/// Zero-copy sequential field scanner.
#[derive(Debug)]
pub struct FieldScanner<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> FieldScanner<'a> {
    /// Creates a new scanner for the given input buffer.
    #[inline]
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }

    /// Parses the next field from the buffer.
    ///
    /// # Returns
    /// The next field, or `None` if the buffer is exhausted or no complete
    /// `tag=value\x01` triplet remains.
    #[inline]
    pub fn next_field(&mut self) -> Option<FieldRef<'a>> {
        if self.offset >= self.input.len() {
            return None;
        }

        let remaining = &self.input[self.offset..];
        let eq_pos = memchr(EQUALS, remaining)?;
        let tag = parse_tag(&remaining[..eq_pos])?;

        let value_start = eq_pos + 1;
        let soh_pos = memchr(SOH, &remaining[value_start..])?;
        let value = &remaining[value_start..value_start + soh_pos];

        self.offset += value_start + soh_pos + 1;

        Some(FieldRef::new(tag, value))
    }

    /// Returns the current offset in the buffer.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns true if the buffer has been fully consumed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offset >= self.input.len()
    }
}

/// Parses a tag number from ASCII bytes.
///
/// Tags are positive integers no larger than `FieldTag::MAX`.
#[inline]
fn parse_tag(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 5 {
        return None;
    }

    let mut result: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        result = result * 10 + u32::from(b - b'0');
    }

    if result == 0 || result > FieldTag::MAX {
        return None;
    }

    Some(result)
}

/// Decodes complete FIX frames into owned [`Message`]s.
///
/// Holds the transport and application dictionaries of the session pair;
/// the transport dictionary classifies header/trailer fields and types
/// admin messages, the application dictionary types everything else and
/// declares the repeating-group templates.
#[derive(Debug, Clone)]
pub struct MessageDecoder {
    transport: Arc<Dictionary>,
    application: Arc<Dictionary>,
    validate_checksum: bool,
}

impl MessageDecoder {
    /// Creates a new decoder for a session's dictionary pair.
    #[must_use]
    pub fn new(transport: Arc<Dictionary>, application: Arc<Dictionary>) -> Self {
        Self {
            transport,
            application,
            validate_checksum: true,
        }
    }

    /// Sets whether to validate checksums during decoding.
    #[must_use]
    pub const fn with_checksum_validation(mut self, validate: bool) -> Self {
        self.validate_checksum = validate;
        self
    }

    /// Decodes one complete FIX frame.
    ///
    /// # Errors
    /// Returns `DecodeError` if the frame is malformed, truncated, fails
    /// checksum or body-length validation, or carries an inconsistent
    /// repeating group.
    pub fn decode(&self, input: &[u8]) -> Result<Message, DecodeError> {
        let mut scanner = FieldScanner::new(input);
        let mut fields: SmallVec<[FieldRef<'_>; 32]> = SmallVec::new();
        let mut offsets: SmallVec<[usize; 32]> = SmallVec::new();

        loop {
            let before = scanner.offset();
            match scanner.next_field() {
                Some(field) => {
                    offsets.push(before);
                    let done = field.tag == 10;
                    fields.push(field);
                    if done {
                        break;
                    }
                }
                None => break,
            }
        }

        if fields.is_empty() {
            return Err(DecodeError::Incomplete);
        }
        if fields[0].tag != 8 {
            return Err(DecodeError::MalformedFrame);
        }
        if fields.len() < 2 || fields[1].tag != 9 {
            return Err(DecodeError::MissingBodyLength);
        }
        if fields.len() < 3 || fields[2].tag != 35 {
            return Err(DecodeError::MissingMsgType);
        }

        let checksum_field = *fields.last().expect("fields not empty");
        if checksum_field.tag != 10 {
            return Err(DecodeError::TruncatedFrame);
        }
        let checksum_offset = offsets[fields.len() - 1];

        let declared =
            parse_checksum(checksum_field.value).ok_or(DecodeError::InvalidChecksum)?;
        if self.validate_checksum {
            let calculated = calculate_checksum(&input[..checksum_offset]);
            if calculated != declared {
                return Err(DecodeError::ChecksumMismatch {
                    calculated,
                    declared,
                });
            }
        }

        // BodyLength counts from the byte after "9=...\x01" up to and
        // including the SOH preceding "10=".
        let declared_len: usize = fields[1]
            .as_str()?
            .parse()
            .map_err(|_| DecodeError::InvalidBodyLength)?;
        let body_start = offsets[2];
        if checksum_offset - body_start != declared_len {
            return Err(DecodeError::InvalidBodyLength);
        }

        let msg_type_str = fields[2].as_str()?.to_string();
        let msg_type: MsgType = msg_type_str.parse().expect("msg type parse is infallible");
        let dict = if msg_type.is_admin() {
            &self.transport
        } else {
            &self.application
        };

        let mut message = Message::new();

        // Header: the leading run of header fields per the transport
        // dictionary (8, 9 and 35 always included).
        let mut cursor = 0;
        while cursor < fields.len() - 1 {
            let field = fields[cursor];
            if cursor >= 3 && !self.transport.is_header_field(field.tag) {
                break;
            }
            message
                .header
                .push(field.tag, self.typed_value(dict, field)?);
            cursor += 1;
        }

        // Body, expanding repeating groups at their count tags.
        while cursor < fields.len() - 1 {
            let field = fields[cursor];
            if self.transport.is_trailer_field(field.tag) {
                message
                    .trailer
                    .push(field.tag, self.typed_value(dict, field)?);
                cursor += 1;
                continue;
            }

            if let Some(template) = dict.group_template(&msg_type_str, field.tag) {
                let count: u32 = field
                    .parse()
                    .map_err(|_| DecodeError::InvalidFieldValue {
                        tag: field.tag,
                        reason: "invalid group count".to_string(),
                    })?;
                cursor += 1;

                let mut group = RepeatingGroup::new(template.count_tag, template.delimiter_tag);
                while group.entries.len() < count as usize
                    && cursor < fields.len() - 1
                    && fields[cursor].tag == template.delimiter_tag
                {
                    let entry = group.add_entry();
                    entry.push(
                        fields[cursor].tag,
                        self.typed_value(dict, fields[cursor])?,
                    );
                    cursor += 1;

                    while cursor < fields.len() - 1 {
                        let tag = fields[cursor].tag;
                        if tag == template.delimiter_tag {
                            break;
                        }
                        // Unknown tags inside a group are preserved in the
                        // entry for byte-identical re-emission.
                        let in_scope =
                            template.contains(tag) || dict.field_name(tag).is_none();
                        if !in_scope || self.transport.is_trailer_field(tag) {
                            break;
                        }
                        entry.push(tag, self.typed_value(dict, fields[cursor])?);
                        cursor += 1;
                    }
                }

                if group.entries.len() != count as usize {
                    return Err(DecodeError::GroupCountMismatch {
                        count_tag: template.count_tag,
                        expected: count,
                        actual: group.entries.len() as u32,
                    });
                }
                message.set_group(group);
                continue;
            }

            if dict.field_type(field.tag) == Some(FieldType::NumInGroup) {
                return Err(DecodeError::UnknownTemplate {
                    count_tag: field.tag,
                });
            }

            message.body.push(field.tag, self.typed_value(dict, field)?);
            cursor += 1;
        }

        message
            .trailer
            .push(10, FieldValue::String(checksum_field.as_str()?.to_string()));

        Ok(message)
    }

    /// Converts a raw field into a typed value using the dictionary.
    ///
    /// Unknown tags and values that do not parse as their declared type are
    /// kept as strings so that forwarding re-emits them unchanged.
    fn typed_value(
        &self,
        dict: &Dictionary,
        field: FieldRef<'_>,
    ) -> Result<FieldValue, DecodeError> {
        let Ok(text) = field.as_str() else {
            return Ok(FieldValue::Data(Bytes::copy_from_slice(field.value)));
        };

        let value = match dict.field_type(field.tag) {
            Some(t) if t.is_integer() => text
                .parse::<u64>()
                .map(FieldValue::UInt)
                .or_else(|_| text.parse::<i64>().map(FieldValue::Int))
                .unwrap_or_else(|_| FieldValue::String(text.to_string())),
            Some(t) if t.is_decimal() => text
                .parse()
                .map(FieldValue::Decimal)
                .unwrap_or_else(|_| FieldValue::String(text.to_string())),
            Some(FieldType::Boolean) => match text {
                "Y" => FieldValue::Bool(true),
                "N" => FieldValue::Bool(false),
                _ => FieldValue::String(text.to_string()),
            },
            Some(FieldType::Char) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => FieldValue::Char(c),
                    _ => FieldValue::String(text.to_string()),
                }
            }
            Some(FieldType::UtcTimestamp) => Timestamp::parse_fix(text)
                .map(FieldValue::UtcTimestamp)
                .unwrap_or_else(|| FieldValue::String(text.to_string())),
            Some(FieldType::UtcDateOnly | FieldType::LocalMktDate) => {
                NaiveDate::parse_from_str(text, "%Y%m%d")
                    .map(FieldValue::UtcDate)
                    .unwrap_or_else(|_| FieldValue::String(text.to_string()))
            }
            Some(FieldType::UtcTimeOnly) => {
                // Kept as text: time-of-day precision varies by venue and
                // re-emission must be byte-identical.
                let _ = NaiveTime::parse_from_str(text, "%H:%M:%S%.f");
                FieldValue::String(text.to_string())
            }
            Some(FieldType::Data) => FieldValue::Data(Bytes::copy_from_slice(field.value)),
            _ => FieldValue::String(text.to_string()),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;
    use fixlink_dictionary::{application, fixt11_transport, Version};

    fn decoder() -> MessageDecoder {
        MessageDecoder::new(
            Arc::new(fixt11_transport()),
            Arc::new(application(Version::Fix50Sp2)),
        )
    }

    fn frame(begin_string: &str, fields: &[(u32, &str)]) -> Vec<u8> {
        let mut enc = Encoder::new(begin_string);
        for (tag, value) in fields {
            enc.put_str(*tag, value);
        }
        enc.finish().to_vec()
    }

    #[test]
    fn test_parse_tag() {
        assert_eq!(parse_tag(b"8"), Some(8));
        assert_eq!(parse_tag(b"35"), Some(35));
        assert_eq!(parse_tag(b"65535"), Some(65535));
        assert_eq!(parse_tag(b"65536"), None);
        assert_eq!(parse_tag(b"0"), None);
        assert_eq!(parse_tag(b""), None);
        assert_eq!(parse_tag(b"abc"), None);
        assert_eq!(parse_tag(b"12a"), None);
    }

    #[test]
    fn test_scanner_next_field() {
        let input = b"8=FIX.4.4\x019=5\x0135=0\x01";
        let mut scanner = FieldScanner::new(input);

        let field1 = scanner.next_field().unwrap();
        assert_eq!(field1.tag, 8);
        assert_eq!(field1.as_str().unwrap(), "FIX.4.4");

        let field2 = scanner.next_field().unwrap();
        assert_eq!(field2.tag, 9);

        let field3 = scanner.next_field().unwrap();
        assert_eq!(field3.tag, 35);
        assert_eq!(field3.as_str().unwrap(), "0");

        assert!(scanner.next_field().is_none());
        assert!(scanner.is_empty());
    }

    #[test]
    fn test_scanner_incomplete_field() {
        let mut scanner = FieldScanner::new(b"8=FIX.4.4");
        assert!(scanner.next_field().is_none());
    }

    // Scenario: logon frame parses with typed HeartBtInt and DefaultApplVerID,
    // and the declared checksum is the mod-256 sum of the preceding bytes.
    #[test]
    fn test_decode_logon() {
        let bytes = frame(
            "FIXT.1.1",
            &[
                (35, "A"),
                (34, "1"),
                (49, "CL"),
                (56, "SRV"),
                (52, "20230101-00:00:00"),
                (98, "0"),
                (108, "30"),
                (1137, "9"),
            ],
        );

        let message = decoder().decode(&bytes).unwrap();
        assert_eq!(message.msg_type(), Some(MsgType::Logon));
        assert_eq!(message.begin_string(), Some("FIXT.1.1"));
        assert_eq!(message.body.get_uint(108), Some(30));
        assert_eq!(message.body.get_str(1137), Some("9"));

        let declared: u8 = message.trailer.get_str(10).unwrap().parse().unwrap();
        let checksum_start = bytes.len() - 7;
        assert_eq!(declared, calculate_checksum(&bytes[..checksum_start]));
    }

    #[test]
    fn test_decode_rejects_bad_checksum() {
        let mut bytes = frame("FIXT.1.1", &[(35, "0"), (34, "2"), (49, "CL"), (56, "SRV")]);
        let len = bytes.len();
        bytes[len - 2] = b'9';
        bytes[len - 3] = b'9';
        bytes[len - 4] = b'9';

        let err = decoder().decode(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_decode_rejects_bad_body_length() {
        let bytes = b"8=FIXT.1.1\x019=4\x0135=0\x0134=2\x0110=000\x01";
        let err = decoder()
            .with_checksum_validation(false)
            .decode(bytes)
            .unwrap_err();
        assert_eq!(err, DecodeError::InvalidBodyLength);
    }

    #[test]
    fn test_decode_rejects_wrong_field_order() {
        let bytes = b"9=5\x018=FIXT.1.1\x0135=0\x0110=000\x01";
        let err = decoder().decode(bytes).unwrap_err();
        assert_eq!(err, DecodeError::MalformedFrame);
    }

    #[test]
    fn test_decode_truncated_frame() {
        let bytes = b"8=FIXT.1.1\x019=5\x0135=0\x01";
        let err = decoder().decode(bytes).unwrap_err();
        assert_eq!(err, DecodeError::TruncatedFrame);
    }

    #[test]
    fn test_decode_snapshot_groups() {
        let bytes = frame(
            "FIXT.1.1",
            &[
                (35, "W"),
                (34, "3"),
                (49, "SRV"),
                (56, "CL"),
                (52, "20230101-00:00:00"),
                (55, "ABC"),
                (268, "2"),
                (269, "0"),
                (270, "100.00"),
                (271, "10"),
                (37, "o1"),
                (40, "2"),
                (269, "1"),
                (270, "101.00"),
                (271, "5"),
                (37, "o2"),
                (40, "2"),
            ],
        );

        let message = decoder().decode(&bytes).unwrap();
        assert_eq!(message.body.get_str(55), Some("ABC"));

        let group = message.group(268).unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(group.entries[0].get_str(37), Some("o1"));
        assert_eq!(
            group.entries[0].get_decimal(270),
            Some("100.00".parse().unwrap())
        );
        assert_eq!(group.entries[1].get_char(269), Some('1'));
    }

    #[test]
    fn test_decode_group_count_mismatch() {
        let bytes = frame(
            "FIXT.1.1",
            &[
                (35, "W"),
                (34, "3"),
                (49, "SRV"),
                (56, "CL"),
                (55, "ABC"),
                (268, "3"),
                (269, "0"),
                (270, "100.00"),
            ],
        );

        let err = decoder().decode(&bytes).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::GroupCountMismatch {
                count_tag: 268,
                expected: 3,
                actual: 1,
            }
        ));
    }

    #[test]
    fn test_decode_preserves_unknown_tags_in_group() {
        let bytes = frame(
            "FIXT.1.1",
            &[
                (35, "W"),
                (34, "3"),
                (49, "SRV"),
                (56, "CL"),
                (55, "ABC"),
                (268, "1"),
                (269, "0"),
                (270, "100.00"),
                (9001, "custom"),
                (271, "10"),
            ],
        );

        let message = decoder().decode(&bytes).unwrap();
        let entry = &message.group(268).unwrap().entries[0];
        assert_eq!(entry.get_str(9001), Some("custom"));
        assert_eq!(entry.get_decimal(271), Some("10".parse().unwrap()));
    }

    #[test]
    fn test_decode_header_body_split() {
        let bytes = frame(
            "FIXT.1.1",
            &[
                (35, "D"),
                (34, "4"),
                (49, "CL"),
                (56, "SRV"),
                (52, "20230101-00:00:00"),
                (11, "c-1"),
                (55, "ABC"),
                (54, "1"),
            ],
        );

        let message = decoder().decode(&bytes).unwrap();
        assert!(message.header.contains(49));
        assert!(message.header.contains(52));
        assert!(!message.header.contains(11));
        assert_eq!(message.body.get_str(11), Some("c-1"));
        assert_eq!(message.body.get_char(54), Some('1'));
    }
}
