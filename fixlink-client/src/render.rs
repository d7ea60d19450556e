/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Dictionary-driven message rendering.
//!
//! Response bodies print as a three-column `TAG | DESCRIPTION | VALUE`
//! table. Enum values render as `raw (Label)`, unknown tags as
//! `<unknown>`, passwords redacted. Administrative party/origination tags
//! and header/trailer fields are filtered out of the body view.

use fixlink_core::field::FieldValue;
use fixlink_core::message::Message;
use fixlink_core::tags;
use fixlink_dictionary::Dictionary;
use std::fmt::Write as _;
use std::sync::Arc;

/// Tags filtered from rendered bodies.
pub const FILTERED_TAGS: [u32; 6] = [447, 448, 452, 453, 1724, 2376];

/// Renders message bodies against a session's dictionary pair.
#[derive(Debug, Clone)]
pub struct MessageRenderer {
    transport: Arc<Dictionary>,
    application: Arc<Dictionary>,
}

impl MessageRenderer {
    /// Creates a renderer over the transport and application dictionaries.
    #[must_use]
    pub fn new(transport: Arc<Dictionary>, application: Arc<Dictionary>) -> Self {
        Self {
            transport,
            application,
        }
    }

    /// Renders one field value, appending the enum label when declared.
    fn render_value(&self, tag: u32, value: &FieldValue) -> String {
        if tag == tags::PASSWORD {
            return "<redacted>".to_string();
        }
        let raw = value.to_string();
        match self.application.enum_label(tag, &raw) {
            Some(label) => format!("{raw} ({label})"),
            None => raw,
        }
    }

    /// Renders the message body as a `TAG | DESCRIPTION | VALUE` table.
    #[must_use]
    pub fn body_as_table(&self, message: &Message) -> String {
        let mut rows: Vec<(String, String, String)> = Vec::new();

        let mut push_row = |tag: u32, value: &FieldValue| {
            if FILTERED_TAGS.contains(&tag)
                || self.transport.is_header_field(tag)
                || self.transport.is_trailer_field(tag)
            {
                return;
            }
            let description = self
                .application
                .field_name(tag)
                .unwrap_or("<unknown>")
                .to_string();
            rows.push((tag.to_string(), description, self.render_value(tag, value)));
        };

        for (tag, value) in message.body.iter() {
            match message.group(tag) {
                Some(group) => {
                    push_row(tag, value);
                    for entry in &group.entries {
                        for (entry_tag, entry_value) in entry.iter() {
                            push_row(entry_tag, entry_value);
                        }
                    }
                }
                None => push_row(tag, value),
            }
        }

        let mut tag_width = "TAG".len();
        let mut description_width = "DESCRIPTION".len();
        for (tag, description, _) in &rows {
            tag_width = tag_width.max(tag.len());
            description_width = description_width.max(description.len());
        }

        let mut out = String::new();
        let _ = writeln!(out, "{:>tag_width$}   {:<description_width$}   VALUE", "TAG", "DESCRIPTION");
        let _ = writeln!(
            out,
            "{}---{}---{}",
            "-".repeat(tag_width),
            "-".repeat(description_width),
            "-".repeat("VALUE".len())
        );
        for (tag, description, value) in &rows {
            let _ = writeln!(out, "{tag:>tag_width$}   {description:<description_width$}   {value}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixlink_core::field::FieldValue;
    use fixlink_core::message::{MsgType, RepeatingGroup};
    use fixlink_dictionary::{application, fixt11_transport, Version};

    fn renderer() -> MessageRenderer {
        MessageRenderer::new(
            Arc::new(fixt11_transport()),
            Arc::new(application(Version::Fix50Sp2)),
        )
    }

    fn execution_report() -> Message {
        let mut message = Message::with_type("FIXT.1.1", MsgType::ExecutionReport);
        message.header.set(tags::SENDER_COMP_ID, "SRV");
        message.body.set(tags::CL_ORD_ID, "c-1");
        message.body.set(tags::ORD_STATUS, '0');
        message.body.set(tags::SIDE, '1');
        message
            .body
            .set(tags::LEAVES_QTY, FieldValue::Decimal("10".parse().unwrap()));
        message
    }

    #[test]
    fn test_table_has_descriptions_and_enum_labels() {
        let table = renderer().body_as_table(&execution_report());

        assert!(table.contains("TAG"));
        assert!(table.contains("DESCRIPTION"));
        assert!(table.contains("ClOrdID"));
        assert!(table.contains("c-1"));
        assert!(table.contains("0 (New)"));
        assert!(table.contains("1 (Buy)"));
    }

    #[test]
    fn test_table_filters_admin_tags() {
        let mut message = execution_report();
        message.body.set(tags::ORDER_ORIGINATION, FieldValue::UInt(5));
        let mut party = RepeatingGroup::new(tags::NO_PARTY_IDS, tags::PARTY_ID);
        party.add_entry().set(tags::PARTY_ID, "TRADER-1");
        message.set_group(party);

        let table = renderer().body_as_table(&message);
        assert!(!table.contains("TRADER-1"));
        assert!(!table.contains("1724"));
        assert!(!table.contains("453"));
    }

    #[test]
    fn test_table_skips_header_fields() {
        let table = renderer().body_as_table(&execution_report());
        assert!(!table.contains("SRV"));
    }

    #[test]
    fn test_unknown_tag_renders_unknown() {
        let mut message = execution_report();
        message.body.set(9123, "custom");
        let table = renderer().body_as_table(&message);
        assert!(table.contains("<unknown>"));
        assert!(table.contains("custom"));
    }

    #[test]
    fn test_password_redacted() {
        let mut message = execution_report();
        message.body.set(tags::PASSWORD, "hunter2");
        let table = renderer().body_as_table(&message);
        // Password is a header field, so it is filtered from the body view
        // entirely; make sure the raw value never leaks.
        assert!(!table.contains("hunter2"));
    }
}
