//! Order details payloads.
//!
//! The order-details endpoint answers with an envelope whose `order`
//! field is an *escaped JSON string*, decoded here in a second pass.
//! Fields marked undocumented are absent from the API specification
//! but observed in live responses; everything decodes tolerantly.

use crate::datetime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// Raw order-details response envelope.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfoResponse {
    /// Order state code.
    #[serde(default)]
    pub code: String,
    /// Message describing the current state of the creation request.
    #[serde(default)]
    pub message: Option<String>,
    /// Undocumented; a GUID.
    #[serde(default)]
    pub message_id: Option<String>,
    /// Escaped JSON object with the order details, present once the
    /// order has been created on the portal.
    #[serde(default)]
    pub order: Option<String>,
}

impl OrderInfoResponse {
    /// Decode the embedded `order` string into a typed [`OrderInfo`].
    pub fn parse(self) -> serde_json::Result<OrderInfo> {
        let order = match self.order.as_deref() {
            Some(raw) => Some(serde_json::from_str(raw)?),
            None => None,
        };
        Ok(OrderInfo {
            code: self.code,
            message: self.message,
            message_id: self.message_id,
            order,
        })
    }
}

/// Detailed information about a submitted application.
#[derive(Clone, Debug, Serialize)]
pub struct OrderInfo {
    /// Order state code.
    pub code: String,
    /// Message describing the current state of the creation request.
    pub message: Option<String>,
    /// Undocumented; a GUID.
    pub message_id: Option<String>,
    /// Order details, once the order exists on the portal.
    pub order: Option<Order>,
}

/// Order details.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    // Main attributes

    /// Order number.
    pub id: u64,
    /// Current status code.
    pub order_status_id: u64,
    /// Status history entries.
    pub statuses: Vec<OrderStatus>,
    /// The current status entry.
    pub current_status_history: Option<OrderStatus>,
    /// When the status last changed.
    #[serde(with = "datetime::option")]
    pub updated: Option<OffsetDateTime>,
    /// Whether a final status has been reached.
    pub closed: bool,
    /// Whether a result file was returned for the order.
    pub has_result: bool,
    /// Files submitted by the user.
    pub order_attachment_files: Vec<OrderAttachmentFile>,
    /// Files returned in response to the order.
    pub order_response_files: Vec<OrderResponseFile>,

    // Additional attributes

    pub has_new_status: bool,
    pub current_status_history_id: u64,
    /// Current status title.
    pub order_status_name: String,
    pub state_org_status_code: String,
    pub state_org_status_name: String,

    /// Agency code.
    pub state_org_id: u64,
    /// Agency name.
    pub state_structure_name: String,
    /// Agency short name.
    pub state_org_code: String,
    pub state_structure_id: String,
    pub gisdo: bool,

    /// Mnemonic of the consuming system the order was created from.
    pub source_system: String,
    pub creation_mode: String,
    pub ext_system: bool,
    pub owner_id: u64,
    pub user_id: u64,
    pub person_type: String,
    pub user_selected_region: String,
    pub test_user: bool,
    pub location: String,

    pub order_type: String,
    /// Form identifier.
    pub eservice_id: String,
    pub service_target_id: String,
    pub service_passport_id: String,
    /// Target service name.
    pub service_name: String,
    pub deprecated_service: bool,
    pub hub_form: bool,
    pub adm_level_code: String,
    pub mult_region: bool,
    pub service_epgu_id: String,
    pub form_version: String,
    /// Undocumented.
    pub possible_services: Value,

    /// When the order was created.
    #[serde(with = "datetime::option")]
    pub order_date: Option<OffsetDateTime>,
    /// Request timestamp.
    #[serde(with = "datetime::option")]
    pub request_date: Option<OffsetDateTime>,
    pub order_attribute_events: Vec<OrderAttributeEvent>,
    pub online: bool,
    pub has_timestamp: bool,
    pub has_active_invite_to_equeue: bool,
    pub has_children: bool,
    pub has_preview_pdf: bool,
    pub has_empowerment2021: bool,
    pub allow_to_edit: bool,
    pub allow_to_delete: bool,
    pub draft_hidden: bool,
    pub check_queue: bool,
    #[serde(rename = "eQueueEvents")]
    pub e_queue_events: Vec<Value>,
    pub use_as_template: bool,
    pub with_delivery: bool,
    pub with_custom_result: bool,
    pub ready_to_push: bool,
    /// Undocumented.
    pub elk: bool,

    /// SMEV3 transaction code.
    pub smev_tx: String,
    /// Identifier of the SMEV message that changed the status.
    pub smev_message_id: String,

    pub payment_required: bool,
    pub no_paid_payment_count: i64,
    pub payment_count: i64,
    pub has_no_paid_payment: bool,
    pub payment_status_events: Vec<Value>,
    pub order_payments: Vec<Value>,
    pub payback: bool,

    pub ready_to_sign: bool,
    /// Signature count, for orders from several applicants.
    pub sign_cnt: i64,
    pub all_file_sign: bool,
    pub children_signed: bool,
    pub eds_status: String,

    pub info_messages: Vec<Value>,
    pub text_messages: Vec<Value>,
    pub unread_message_cnt: i64,

    /// Undocumented.
    pub qrlink: Option<OrderQrLink>,
    /// Undocumented.
    pub steps: Vec<Value>,
}

/// One status entry of an [`Order`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderStatus {
    /// Status entry identifier.
    pub id: u64,
    /// Status code.
    pub status_id: u64,
    /// Status title.
    pub title: String,
    /// When the status changed.
    #[serde(with = "datetime::option")]
    pub date: Option<OffsetDateTime>,
    /// Order number.
    pub order_id: u64,
    pub final_status: bool,
    /// `"Y"`/`"N"` flag of a result file for the order.
    pub has_result: String,
    pub cancel_allowed: bool,
    /// Sender of the SMEV message that changed the status.
    pub sender: String,
    pub comment: String,
    pub state_org_status_code: String,
    pub state_org_status_descr: String,

    pub unread_event: bool,
    pub delivery_cancel_allowed: bool,
    pub send_message_allowed: bool,
    pub edit_allowed: bool,
    /// Mnemonic of the sending system.
    pub mnemonic: String,
    /// Undocumented.
    pub status_color_code: String,
}

/// A file submitted by the user, from an [`Order`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderAttachmentFile {
    pub id: String,
    pub file_name: String,
    pub mime_type: String,
    /// Storage link, parseable with [`crate::FileLink`].
    pub link: String,
    pub has_digital_signature: bool,
    pub file_size: u64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A file returned in response to the order, from an [`Order`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderResponseFile {
    pub id: String,
    pub file_name: String,
    pub mime_type: String,
    /// Storage link, parseable with [`crate::FileLink`].
    pub link: String,
    pub has_digital_signature: bool,
    pub has_alt_mime_type: bool,
    pub eds_status: String,
    pub file_size: u64,
}

/// Event attribute of an [`Order`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderAttributeEvent {
    pub name: String,
    pub new_value: String,
    pub old_value: String,
}

/// Undocumented `qrlink` object of an [`Order`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderQrLink {
    pub has_alt_mime_type: bool,
    pub file_size: u64,
    pub has_digital_signature: bool,
    #[serde(rename = "canSentToMFC")]
    pub can_sent_to_mfc: bool,
    #[serde(rename = "canPrintMFC")]
    pub can_print_mfc: bool,
}
