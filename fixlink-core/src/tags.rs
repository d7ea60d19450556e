/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Well-known FIX tag numbers used across the toolkit.
//!
//! Only the tags the toolkit reads or writes are listed; the data dictionary
//! covers the rest.

/// Account (1).
pub const ACCOUNT: u32 = 1;
/// AvgPx (6).
pub const AVG_PX: u32 = 6;
/// BeginSeqNo (7).
pub const BEGIN_SEQ_NO: u32 = 7;
/// BeginString (8).
pub const BEGIN_STRING: u32 = 8;
/// BodyLength (9).
pub const BODY_LENGTH: u32 = 9;
/// CheckSum (10).
pub const CHECK_SUM: u32 = 10;
/// ClOrdID (11).
pub const CL_ORD_ID: u32 = 11;
/// CumQty (14).
pub const CUM_QTY: u32 = 14;
/// EndSeqNo (16).
pub const END_SEQ_NO: u32 = 16;
/// ExecID (17).
pub const EXEC_ID: u32 = 17;
/// HandlInst (21).
pub const HANDL_INST: u32 = 21;
/// SecurityIDSource (22).
pub const SECURITY_ID_SOURCE: u32 = 22;
/// MsgSeqNum (34).
pub const MSG_SEQ_NUM: u32 = 34;
/// MsgType (35).
pub const MSG_TYPE: u32 = 35;
/// NewSeqNo (36).
pub const NEW_SEQ_NO: u32 = 36;
/// OrderID (37).
pub const ORDER_ID: u32 = 37;
/// OrderQty (38).
pub const ORDER_QTY: u32 = 38;
/// OrdStatus (39).
pub const ORD_STATUS: u32 = 39;
/// OrdType (40).
pub const ORD_TYPE: u32 = 40;
/// OrigClOrdID (41).
pub const ORIG_CL_ORD_ID: u32 = 41;
/// PossDupFlag (43).
pub const POSS_DUP_FLAG: u32 = 43;
/// Price (44).
pub const PRICE: u32 = 44;
/// RefSeqNum (45).
pub const REF_SEQ_NUM: u32 = 45;
/// SecurityID (48).
pub const SECURITY_ID: u32 = 48;
/// SenderCompID (49).
pub const SENDER_COMP_ID: u32 = 49;
/// SenderSubID (50).
pub const SENDER_SUB_ID: u32 = 50;
/// SendingTime (52).
pub const SENDING_TIME: u32 = 52;
/// Side (54).
pub const SIDE: u32 = 54;
/// Symbol (55).
pub const SYMBOL: u32 = 55;
/// TargetCompID (56).
pub const TARGET_COMP_ID: u32 = 56;
/// TargetSubID (57).
pub const TARGET_SUB_ID: u32 = 57;
/// Text (58).
pub const TEXT: u32 = 58;
/// TimeInForce (59).
pub const TIME_IN_FORCE: u32 = 59;
/// TransactTime (60).
pub const TRANSACT_TIME: u32 = 60;
/// NoLinesOfText (33).
pub const NO_LINES_OF_TEXT: u32 = 33;
/// RawDataLength (95).
pub const RAW_DATA_LENGTH: u32 = 95;
/// RawData (96).
pub const RAW_DATA: u32 = 96;
/// EncryptMethod (98).
pub const ENCRYPT_METHOD: u32 = 98;
/// CxlRejReason (102).
pub const CXL_REJ_REASON: u32 = 102;
/// OrdRejReason (103).
pub const ORD_REJ_REASON: u32 = 103;
/// HeartBtInt (108).
pub const HEART_BT_INT: u32 = 108;
/// TestReqID (112).
pub const TEST_REQ_ID: u32 = 112;
/// OrigTime (42).
pub const ORIG_TIME: u32 = 42;
/// OrigSendingTime (122).
pub const ORIG_SENDING_TIME: u32 = 122;
/// GapFillFlag (123).
pub const GAP_FILL_FLAG: u32 = 123;
/// ResetSeqNumFlag (141).
pub const RESET_SEQ_NUM_FLAG: u32 = 141;
/// NoRelatedSym (146).
pub const NO_RELATED_SYM: u32 = 146;
/// Headline (148).
pub const HEADLINE: u32 = 148;
/// ExecType (150).
pub const EXEC_TYPE: u32 = 150;
/// LeavesQty (151).
pub const LEAVES_QTY: u32 = 151;
/// SecondaryOrderID (198).
pub const SECONDARY_ORDER_ID: u32 = 198;
/// MDReqID (262).
pub const MD_REQ_ID: u32 = 262;
/// SubscriptionRequestType (263).
pub const SUBSCRIPTION_REQUEST_TYPE: u32 = 263;
/// MarketDepth (264).
pub const MARKET_DEPTH: u32 = 264;
/// MDUpdateType (265).
pub const MD_UPDATE_TYPE: u32 = 265;
/// NoMDEntryTypes (267).
pub const NO_MD_ENTRY_TYPES: u32 = 267;
/// NoMDEntries (268).
pub const NO_MD_ENTRIES: u32 = 268;
/// MDEntryType (269).
pub const MD_ENTRY_TYPE: u32 = 269;
/// MDEntryPx (270).
pub const MD_ENTRY_PX: u32 = 270;
/// MDEntrySize (271).
pub const MD_ENTRY_SIZE: u32 = 271;
/// MDEntryDate (272).
pub const MD_ENTRY_DATE: u32 = 272;
/// MDEntryTime (273).
pub const MD_ENTRY_TIME: u32 = 273;
/// MDUpdateAction (279).
pub const MD_UPDATE_ACTION: u32 = 279;
/// LastPx (31).
pub const LAST_PX: u32 = 31;
/// LastQty (32).
pub const LAST_QTY: u32 = 32;
/// SecurityReqID (320).
pub const SECURITY_REQ_ID: u32 = 320;
/// SecurityRequestResult (560).
pub const SECURITY_REQUEST_RESULT: u32 = 560;
/// TradSesReqID (335).
pub const TRAD_SES_REQ_ID: u32 = 335;
/// TradingSessionID (336).
pub const TRADING_SESSION_ID: u32 = 336;
/// TradSesStatus (340).
pub const TRAD_SES_STATUS: u32 = 340;
/// RefTagID (371).
pub const REF_TAG_ID: u32 = 371;
/// RefMsgType (372).
pub const REF_MSG_TYPE: u32 = 372;
/// SessionRejectReason (373).
pub const SESSION_REJECT_REASON: u32 = 373;
/// BusinessRejectRefID (379).
pub const BUSINESS_REJECT_REF_ID: u32 = 379;
/// BusinessRejectReason (380).
pub const BUSINESS_REJECT_REASON: u32 = 380;
/// Urgency (61).
pub const URGENCY: u32 = 61;
/// NoPartyIDs (453).
pub const NO_PARTY_IDS: u32 = 453;
/// PartyID (448).
pub const PARTY_ID: u32 = 448;
/// PartyIDSource (447).
pub const PARTY_ID_SOURCE: u32 = 447;
/// PartyRole (452).
pub const PARTY_ROLE: u32 = 452;
/// PartyRoleQualifier (2376).
pub const PARTY_ROLE_QUALIFIER: u32 = 2376;
/// MassCancelRequestType (530).
pub const MASS_CANCEL_REQUEST_TYPE: u32 = 530;
/// MassCancelResponse (531).
pub const MASS_CANCEL_RESPONSE: u32 = 531;
/// MassCancelRejectReason (532).
pub const MASS_CANCEL_REJECT_REASON: u32 = 532;
/// MassActionReportID (1369).
pub const MASS_ACTION_REPORT_ID: u32 = 1369;
/// Username (553).
pub const USERNAME: u32 = 553;
/// Password (554).
pub const PASSWORD: u32 = 554;
/// SecurityListRequestType (559).
pub const SECURITY_LIST_REQUEST_TYPE: u32 = 559;
/// CxlRejResponseTo (434).
pub const CXL_REJ_RESPONSE_TO: u32 = 434;
/// TrdMatchID (880).
pub const TRD_MATCH_ID: u32 = 880;
/// TradeID (1003).
pub const TRADE_ID: u32 = 1003;
/// ApplVerID (1128).
pub const APPL_VER_ID: u32 = 1128;
/// DefaultApplVerID (1137).
pub const DEFAULT_APPL_VER_ID: u32 = 1137;
/// OrderOrigination (1724).
pub const ORDER_ORIGINATION: u32 = 1724;
/// LastUpdateTime (779).
pub const LAST_UPDATE_TIME: u32 = 779;
