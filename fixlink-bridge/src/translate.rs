/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Field-level message translation.
//!
//! Each bridged message type carries a declared field description list:
//! tag, expected value kind, required flag. Translation builds a fresh
//! message for the target version and copies exactly the described fields;
//! a required field absent from the source rejects the message, optional
//! fields are copied when present.

use fixlink_core::field::FieldValue;
use fixlink_core::message::{FieldMap, Message, RepeatingGroup};
use fixlink_core::tags;
use fixlink_engine::{RejectReason, REJECT_REASON_OTHER};

/// Expected value kind of a copied field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyKind {
    /// Free-form string.
    Str,
    /// Integer.
    Int,
    /// Decimal price or quantity.
    Decimal,
    /// Single character code.
    Char,
    /// UTC timestamp.
    Timestamp,
}

/// One entry of a field description list.
#[derive(Debug, Clone, Copy)]
pub struct FieldCopy {
    /// Tag to copy.
    pub tag: u32,
    /// Expected value kind.
    pub kind: CopyKind,
    /// Whether absence in the source rejects the message.
    pub required: bool,
}

impl FieldCopy {
    /// A field that must be present in the source.
    #[must_use]
    pub const fn required(tag: u32, kind: CopyKind) -> Self {
        Self {
            tag,
            kind,
            required: true,
        }
    }

    /// A field copied only when present.
    #[must_use]
    pub const fn optional(tag: u32, kind: CopyKind) -> Self {
        Self {
            tag,
            kind,
            required: false,
        }
    }
}

/// Coerces a value to the declared kind where the source arrived as text.
///
/// Typed values pass through unchanged; the coercion only firms up fields
/// the source dictionary did not type.
fn coerce(value: &FieldValue, kind: CopyKind) -> FieldValue {
    if let FieldValue::String(text) = value {
        match kind {
            CopyKind::Int => {
                if let Ok(v) = text.parse::<i64>() {
                    return FieldValue::Int(v);
                }
            }
            CopyKind::Decimal => {
                if let Ok(v) = text.parse() {
                    return FieldValue::Decimal(v);
                }
            }
            CopyKind::Char => {
                let mut chars = text.chars();
                if let (Some(c), None) = (chars.next(), chars.next()) {
                    return FieldValue::Char(c);
                }
            }
            CopyKind::Str | CopyKind::Timestamp => {}
        }
    }
    value.clone()
}

/// Copies a described field list from a source body into a destination.
///
/// # Errors
/// Returns a `RejectReason` naming the first required tag absent from the
/// source.
pub fn copy_fields(
    dest: &mut FieldMap,
    src: &FieldMap,
    descriptions: &[FieldCopy],
) -> Result<(), RejectReason> {
    for description in descriptions {
        match src.get(description.tag) {
            Some(value) => dest.set(description.tag, coerce(value, description.kind)),
            None if description.required => {
                return Err(RejectReason::new(
                    REJECT_REASON_OTHER,
                    format!("Missing required tag {}", description.tag),
                )
                .with_ref_tag(description.tag));
            }
            None => {}
        }
    }
    Ok(())
}

/// Copies the NoPartyIDs group field by field, when the source carries one.
pub fn copy_party_group(dest: &mut Message, src: &Message) {
    let Some(source_group) = src.group(tags::NO_PARTY_IDS) else {
        return;
    };

    let mut group = RepeatingGroup::new(tags::NO_PARTY_IDS, tags::PARTY_ID);
    for source_entry in &source_group.entries {
        let entry = group.add_entry();
        for tag in [
            tags::PARTY_ID,
            tags::PARTY_ID_SOURCE,
            tags::PARTY_ROLE,
            tags::PARTY_ROLE_QUALIFIER,
        ] {
            if let Some(value) = source_entry.get(tag) {
                entry.set(tag, value.clone());
            }
        }
    }
    dest.set_group(group);
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixlink_core::message::MsgType;

    #[test]
    fn test_copy_required_and_optional() {
        let mut src = FieldMap::new();
        src.set(55, "ABC");
        src.set(38, FieldValue::Decimal("10".parse().unwrap()));

        let mut dest = FieldMap::new();
        copy_fields(
            &mut dest,
            &src,
            &[
                FieldCopy::required(55, CopyKind::Str),
                FieldCopy::required(38, CopyKind::Decimal),
                FieldCopy::optional(44, CopyKind::Decimal),
            ],
        )
        .unwrap();

        assert_eq!(dest.get_str(55), Some("ABC"));
        assert!(dest.get_decimal(38).is_some());
        assert!(!dest.contains(44));
    }

    #[test]
    fn test_copy_missing_required_rejects() {
        let src = FieldMap::new();
        let mut dest = FieldMap::new();

        let err = copy_fields(&mut dest, &src, &[FieldCopy::required(60, CopyKind::Timestamp)])
            .unwrap_err();
        assert_eq!(err.ref_tag, Some(60));
        assert!(err.text.contains("60"));
    }

    #[test]
    fn test_copy_coerces_text_values() {
        let mut src = FieldMap::new();
        src.set(54, "1");
        src.set(44, "100.00");
        src.set(1724, "5");

        let mut dest = FieldMap::new();
        copy_fields(
            &mut dest,
            &src,
            &[
                FieldCopy::required(54, CopyKind::Char),
                FieldCopy::optional(44, CopyKind::Decimal),
                FieldCopy::optional(1724, CopyKind::Int),
            ],
        )
        .unwrap();

        assert_eq!(dest.get_char(54), Some('1'));
        assert_eq!(dest.get_decimal(44), Some("100.00".parse().unwrap()));
        assert_eq!(dest.get_int(1724), Some(5));
    }

    #[test]
    fn test_copy_party_group() {
        let mut src = Message::with_type("FIXT.1.1", MsgType::NewOrderSingle);
        let mut group = RepeatingGroup::new(tags::NO_PARTY_IDS, tags::PARTY_ID);
        let entry = group.add_entry();
        entry.set(tags::PARTY_ID, "TRADER-1");
        entry.set(tags::PARTY_ID_SOURCE, 'D');
        entry.set(tags::PARTY_ROLE, FieldValue::UInt(3));
        entry.set(9999, "ignored");
        src.set_group(group);

        let mut dest = Message::with_type("FIX.4.4", MsgType::NewOrderSingle);
        copy_party_group(&mut dest, &src);

        let copied = dest.group(tags::NO_PARTY_IDS).unwrap();
        assert_eq!(copied.len(), 1);
        assert_eq!(copied.entries[0].get_str(tags::PARTY_ID), Some("TRADER-1"));
        assert_eq!(copied.entries[0].get_uint(tags::PARTY_ROLE), Some(3));
        assert!(!copied.entries[0].contains(9999));
    }

    #[test]
    fn test_copy_party_group_absent_is_noop() {
        let src = Message::with_type("FIXT.1.1", MsgType::NewOrderSingle);
        let mut dest = Message::with_type("FIX.4.4", MsgType::NewOrderSingle);
        copy_party_group(&mut dest, &src);
        assert!(dest.group(tags::NO_PARTY_IDS).is_none());
    }
}
