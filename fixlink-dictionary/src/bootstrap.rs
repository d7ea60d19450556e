/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Programmatic dictionary construction.
//!
//! The toolkit does not read the bundled FIX XML specifications; the CLI
//! layer owns those. These builders cover the tag set the toolkit itself
//! parses, validates and renders, in the shape the XML dictionaries would
//! produce for the same fields.

use crate::schema::{Dictionary, FieldDef, FieldType, GroupDef, MessageCategory, MessageDef, Version};

use FieldType::*;

/// Standard header tags shared by every covered version.
const HEADER_TAGS: &[u32] = &[8, 9, 35, 34, 43, 49, 50, 52, 56, 57, 115, 122, 128, 129, 553, 554, 1128];

/// Standard trailer tags.
const TRAILER_TAGS: &[u32] = &[10, 89, 93];

fn base_fields(dict: &mut Dictionary) {
    let fields: &[(u32, &str, FieldType)] = &[
        (1, "Account", String),
        (6, "AvgPx", Price),
        (7, "BeginSeqNo", SeqNum),
        (8, "BeginString", String),
        (9, "BodyLength", Length),
        (10, "CheckSum", String),
        (11, "ClOrdID", String),
        (14, "CumQty", Qty),
        (16, "EndSeqNo", SeqNum),
        (17, "ExecID", String),
        (21, "HandlInst", Char),
        (22, "SecurityIDSource", String),
        (31, "LastPx", Price),
        (32, "LastQty", Qty),
        (33, "NoLinesOfText", NumInGroup),
        (34, "MsgSeqNum", SeqNum),
        (35, "MsgType", String),
        (36, "NewSeqNo", SeqNum),
        (37, "OrderID", String),
        (38, "OrderQty", Qty),
        (41, "OrigClOrdID", String),
        (42, "OrigTime", UtcTimestamp),
        (44, "Price", Price),
        (45, "RefSeqNum", SeqNum),
        (48, "SecurityID", String),
        (49, "SenderCompID", String),
        (50, "SenderSubID", String),
        (52, "SendingTime", UtcTimestamp),
        (55, "Symbol", String),
        (56, "TargetCompID", String),
        (57, "TargetSubID", String),
        (58, "Text", String),
        (60, "TransactTime", UtcTimestamp),
        (89, "Signature", Data),
        (93, "SignatureLength", Length),
        (98, "EncryptMethod", Int),
        (102, "CxlRejReason", Int),
        (103, "OrdRejReason", Int),
        (108, "HeartBtInt", Int),
        (112, "TestReqID", String),
        (115, "OnBehalfOfCompID", String),
        (117, "QuoteID", String),
        (122, "OrigSendingTime", UtcTimestamp),
        (128, "DeliverToCompID", String),
        (129, "DeliverToSubID", String),
        (146, "NoRelatedSym", NumInGroup),
        (148, "Headline", String),
        (151, "LeavesQty", Qty),
        (198, "SecondaryOrderID", String),
        (262, "MDReqID", String),
        (264, "MarketDepth", Int),
        (267, "NoMDEntryTypes", NumInGroup),
        (268, "NoMDEntries", NumInGroup),
        (270, "MDEntryPx", Price),
        (271, "MDEntrySize", Qty),
        (272, "MDEntryDate", UtcDateOnly),
        (273, "MDEntryTime", UtcTimeOnly),
        (277, "TradeCondition", MultipleStringValue),
        (286, "OpenCloseSettlFlag", MultipleStringValue),
        (298, "QuoteCancelType", Int),
        (320, "SecurityReqID", String),
        (335, "TradSesReqID", String),
        (336, "TradingSessionID", String),
        (324, "SecurityStatusReqID", String),
        (371, "RefTagID", TagNum),
        (372, "RefMsgType", String),
        (373, "SessionRejectReason", Int),
        (379, "BusinessRejectRefID", String),
        (434, "CxlRejResponseTo", Char),
        (447, "PartyIDSource", Char),
        (448, "PartyID", String),
        (452, "PartyRole", Int),
        (453, "NoPartyIDs", NumInGroup),
        (530, "MassCancelRequestType", Char),
        (531, "MassCancelResponse", Char),
        (532, "MassCancelRejectReason", Int),
        (553, "Username", String),
        (554, "Password", String),
        (560, "SecurityRequestResult", Int),
        (779, "LastUpdateTime", UtcTimestamp),
        (880, "TrdMatchID", String),
        (1003, "TradeID", String),
        (1128, "ApplVerID", String),
        (1137, "DefaultApplVerID", String),
        (1369, "MassActionReportID", String),
        (1724, "OrderOrigination", Int),
        (2376, "PartyRoleQualifier", Int),
    ];

    for (tag, name, field_type) in fields {
        dict.add_field(FieldDef::new(*tag, *name, *field_type));
    }

    // Enumerated fields rendered as "raw (Label)" by the table renderer.
    dict.add_field(FieldDef::new(39, "OrdStatus", Char).with_enums(&[
        ("0", "New"),
        ("1", "Partially Filled"),
        ("2", "Filled"),
        ("4", "Canceled"),
        ("6", "Pending Cancel"),
        ("8", "Rejected"),
    ]));
    dict.add_field(FieldDef::new(40, "OrdType", Char).with_enums(&[
        ("1", "Market"),
        ("2", "Limit"),
        ("3", "Stop"),
        ("4", "Stop Limit"),
    ]));
    dict.add_field(FieldDef::new(43, "PossDupFlag", Boolean));
    dict.add_field(
        FieldDef::new(54, "Side", Char).with_enums(&[("1", "Buy"), ("2", "Sell")]),
    );
    dict.add_field(FieldDef::new(59, "TimeInForce", Char).with_enums(&[
        ("0", "Day"),
        ("1", "Good Till Cancel"),
        ("3", "Immediate Or Cancel"),
        ("4", "Fill Or Kill"),
    ]));
    dict.add_field(FieldDef::new(61, "Urgency", Char).with_enums(&[
        ("0", "Normal"),
        ("1", "Flash"),
        ("2", "Background"),
    ]));
    dict.add_field(FieldDef::new(123, "GapFillFlag", Boolean));
    dict.add_field(FieldDef::new(141, "ResetSeqNumFlag", Boolean));
    dict.add_field(FieldDef::new(150, "ExecType", Char).with_enums(&[
        ("0", "New"),
        ("4", "Canceled"),
        ("5", "Replaced"),
        ("8", "Rejected"),
        ("F", "Trade"),
    ]));
    dict.add_field(FieldDef::new(263, "SubscriptionRequestType", Char).with_enums(&[
        ("0", "Snapshot"),
        ("1", "Snapshot Plus Updates"),
        ("2", "Disable Previous Snapshot"),
    ]));
    dict.add_field(
        FieldDef::new(265, "MDUpdateType", Int)
            .with_enums(&[("0", "Full Refresh"), ("1", "Incremental Refresh")]),
    );
    dict.add_field(FieldDef::new(269, "MDEntryType", Char).with_enums(&[
        ("0", "Bid"),
        ("1", "Offer"),
        ("2", "Trade"),
    ]));
    dict.add_field(FieldDef::new(279, "MDUpdateAction", Char).with_enums(&[
        ("0", "New"),
        ("1", "Change"),
        ("2", "Delete"),
    ]));
    dict.add_field(FieldDef::new(340, "TradSesStatus", Int).with_enums(&[
        ("1", "Halted"),
        ("2", "Open"),
        ("3", "Closed"),
        ("4", "Pre Open"),
        ("5", "Pre Close"),
    ]));
    dict.add_field(FieldDef::new(380, "BusinessRejectReason", Int).with_enums(&[
        ("0", "Other"),
        ("1", "Unknown ID"),
        ("2", "Unknown Security"),
        ("3", "Unsupported Message Type"),
        ("4", "Application Not Available"),
    ]));
    dict.add_field(FieldDef::new(559, "SecurityListRequestType", Int).with_enums(&[
        ("0", "Symbol"),
        ("4", "All Securities"),
    ]));

    for tag in HEADER_TAGS {
        dict.add_header_field(*tag);
    }
    for tag in TRAILER_TAGS {
        dict.add_trailer_field(*tag);
    }
}

fn party_ids_group() -> GroupDef {
    GroupDef::new(453, vec![448, 447, 452, 2376])
}

fn related_sym_group() -> GroupDef {
    GroupDef::new(146, vec![55, 48, 22])
}

/// Builds the FIXT.1.1 transport dictionary (session-level messages).
#[must_use]
pub fn fixt11_transport() -> Dictionary {
    transport(Version::Fixt11)
}

/// Builds the transport dictionary (session-level messages) for a version.
///
/// Pre-5.0 sessions carry their session layer in the same version as the
/// application layer; FIXT sessions use [`fixt11_transport`].
#[must_use]
pub fn transport(version: Version) -> Dictionary {
    let mut dict = Dictionary::new(version);
    base_fields(&mut dict);

    dict.add_message(
        MessageDef::new("A", "Logon", MessageCategory::Admin).with_required(&[98, 108]),
    );
    dict.add_message(MessageDef::new("0", "Heartbeat", MessageCategory::Admin));
    dict.add_message(
        MessageDef::new("1", "TestRequest", MessageCategory::Admin).with_required(&[112]),
    );
    dict.add_message(
        MessageDef::new("2", "ResendRequest", MessageCategory::Admin).with_required(&[7, 16]),
    );
    dict.add_message(
        MessageDef::new("3", "Reject", MessageCategory::Admin).with_required(&[45]),
    );
    dict.add_message(
        MessageDef::new("4", "SequenceReset", MessageCategory::Admin).with_required(&[36]),
    );
    dict.add_message(MessageDef::new("5", "Logout", MessageCategory::Admin));

    dict
}

/// Builds the application dictionary for the given version.
///
/// The covered tag set is identical across FIX 4.2, 4.4 and 5.0 SP2; only
/// the version identity differs.
#[must_use]
pub fn application(version: Version) -> Dictionary {
    let mut dict = Dictionary::new(version);
    base_fields(&mut dict);

    dict.add_common_group(party_ids_group());
    dict.add_common_group(related_sym_group());
    dict.add_common_group(GroupDef::new(267, vec![269]));
    dict.add_common_group(GroupDef::new(33, vec![58]));

    dict.add_message(
        MessageDef::new("D", "NewOrderSingle", MessageCategory::App)
            .with_required(&[11, 54, 60, 40])
            .with_group(party_ids_group()),
    );
    dict.add_message(
        MessageDef::new("F", "OrderCancelRequest", MessageCategory::App)
            .with_required(&[11, 54, 60])
            .with_group(party_ids_group()),
    );
    dict.add_message(
        MessageDef::new("G", "OrderCancelReplaceRequest", MessageCategory::App)
            .with_required(&[11, 38, 40, 54, 60])
            .with_group(party_ids_group()),
    );
    dict.add_message(
        MessageDef::new("H", "OrderStatusRequest", MessageCategory::App).with_required(&[11, 54]),
    );
    dict.add_message(
        MessageDef::new("q", "OrderMassCancelRequest", MessageCategory::App)
            .with_required(&[11, 530, 60])
            .with_group(party_ids_group()),
    );
    dict.add_message(
        MessageDef::new("S", "Quote", MessageCategory::App).with_required(&[117]),
    );
    dict.add_message(
        MessageDef::new("Z", "QuoteCancel", MessageCategory::App).with_required(&[298]),
    );
    dict.add_message(
        MessageDef::new("8", "ExecutionReport", MessageCategory::App)
            .with_required(&[37, 17, 150, 39])
            .with_group(party_ids_group()),
    );
    dict.add_message(
        MessageDef::new("9", "OrderCancelReject", MessageCategory::App)
            .with_required(&[37, 39, 434]),
    );
    dict.add_message(
        MessageDef::new("r", "OrderMassCancelReport", MessageCategory::App)
            .with_required(&[530, 531]),
    );
    dict.add_message(MessageDef::new("AI", "QuoteStatusReport", MessageCategory::App));
    dict.add_message(
        MessageDef::new("j", "BusinessMessageReject", MessageCategory::App)
            .with_required(&[380]),
    );
    dict.add_message(
        MessageDef::new("V", "MarketDataRequest", MessageCategory::App)
            .with_required(&[262, 263, 264])
            .with_group(GroupDef::new(267, vec![269]))
            .with_group(related_sym_group()),
    );
    dict.add_message(
        MessageDef::new("W", "MarketDataSnapshotFullRefresh", MessageCategory::App)
            .with_required(&[55])
            .with_group(GroupDef::new(
                268,
                vec![269, 270, 271, 37, 40, 1003, 272, 273, 58],
            )),
    );
    dict.add_message(
        MessageDef::new("X", "MarketDataIncrementalRefresh", MessageCategory::App)
            .with_required(&[268])
            .with_group(GroupDef::new(
                268,
                vec![279, 269, 270, 271, 37, 40, 58, 1003, 272, 273, 277, 286, 55],
            )),
    );
    dict.add_message(
        MessageDef::new("Y", "MarketDataRequestReject", MessageCategory::App)
            .with_required(&[262]),
    );
    dict.add_message(
        MessageDef::new("x", "SecurityListRequest", MessageCategory::App)
            .with_required(&[320, 559]),
    );
    dict.add_message(
        MessageDef::new("y", "SecurityList", MessageCategory::App)
            .with_required(&[320])
            .with_group(related_sym_group()),
    );
    dict.add_message(
        MessageDef::new("e", "SecurityStatusRequest", MessageCategory::App)
            .with_required(&[324, 55]),
    );
    dict.add_message(MessageDef::new("f", "SecurityStatus", MessageCategory::App));
    dict.add_message(
        MessageDef::new("g", "TradingSessionStatusRequest", MessageCategory::App)
            .with_required(&[335, 263]),
    );
    dict.add_message(
        MessageDef::new("h", "TradingSessionStatus", MessageCategory::App).with_required(&[340]),
    );
    dict.add_message(
        MessageDef::new("B", "News", MessageCategory::App)
            .with_required(&[148])
            .with_group(GroupDef::new(33, vec![58]))
            .with_group(related_sym_group()),
    );

    dict
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_dictionary_admin_messages() {
        let dict = fixt11_transport();
        assert_eq!(dict.message_name("A"), Some("Logon"));
        assert!(dict.required_fields_for("A").contains(&108));
        assert!(dict.required_fields_for("2").contains(&7));
        assert!(dict.is_header_field(49));
        assert!(dict.is_trailer_field(10));
    }

    #[test]
    fn test_application_dictionary_lookup() {
        let dict = application(Version::Fix50Sp2);
        assert_eq!(dict.field_name(11), Some("ClOrdID"));
        assert_eq!(dict.field_name(270), Some("MDEntryPx"));
        assert_eq!(dict.enum_label(269, "0"), Some("Bid"));
        assert_eq!(dict.enum_label(279, "2"), Some("Delete"));
        assert_eq!(dict.enum_label(39, "8"), Some("Rejected"));
    }

    #[test]
    fn test_md_entries_template_differs_per_message() {
        let dict = application(Version::Fix50Sp2);
        let snapshot = dict.group_template("W", 268).unwrap();
        let incremental = dict.group_template("X", 268).unwrap();
        assert_eq!(snapshot.delimiter_tag, 269);
        assert_eq!(incremental.delimiter_tag, 279);
        assert!(incremental.contains(55));
    }

    #[test]
    fn test_party_group_shared() {
        let dict = application(Version::Fix44);
        let group = dict.group_template("D", 453).unwrap();
        assert_eq!(group.delimiter_tag, 448);
        assert_eq!(group.fields, vec![448, 447, 452, 2376]);
        // Falls back to the common group for message types without a
        // dedicated declaration.
        assert!(dict.group_template("ZZ", 453).is_some());
    }

    #[test]
    fn test_new_order_required_fields() {
        let dict = application(Version::Fix50Sp2);
        let required = dict.required_fields_for("D");
        for tag in [11, 54, 60, 40] {
            assert!(required.contains(&tag), "missing required tag {tag}");
        }
    }
}
