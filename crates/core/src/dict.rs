//! Dictionary (reference data) payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shape of the requested dictionary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeFiltering {
    /// Flat dictionary.
    #[default]
    #[serde(rename = "ONELEVEL")]
    OneLevel,
    /// Hierarchical dictionary.
    #[serde(rename = "SUBTREE")]
    SubTree,
}

/// Request body for a dictionary lookup. One page per call; pagination
/// is the caller's loop.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DictRequest {
    /// Flat or hierarchical lookup.
    pub tree_filtering: TreeFiltering,
    /// Code of the parent element for hierarchical lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_ref_item_value: Option<String>,
    /// Page number to fetch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_num: Option<u32>,
    /// Number of items per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Dictionary lookup response.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dict {
    /// Operation outcome reported inside the payload.
    #[serde(default)]
    pub error: DictError,
    /// Per-field request errors.
    #[serde(default)]
    pub field_errors: Vec<Value>,
    /// Total number of matching elements, across all pages.
    #[serde(default)]
    pub total: u64,
    /// Elements of the requested page.
    #[serde(default)]
    pub items: Vec<DictItem>,
}

/// Operation outcome of a dictionary lookup, e.g. `{0, "operation
/// completed"}` on success or `{7, "Entity not found"}`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DictError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// One dictionary element.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictItem {
    /// Element code.
    #[serde(default)]
    pub value: String,
    /// Code of the parent element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_value: Option<String>,
    /// Element title.
    #[serde(default)]
    pub title: String,
    /// Whether the element has no children.
    #[serde(default)]
    pub is_leaf: bool,
    /// Child elements.
    #[serde(default)]
    pub children: Vec<Value>,
    /// Additional attributes, detailed form.
    #[serde(default)]
    pub attributes: Vec<DictAttribute>,
    /// Additional attributes, short `name -> value` form.
    #[serde(default)]
    pub attribute_values: Value,
}

/// Detailed additional attribute of a dictionary element.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictAttribute {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: DictAttributeValue,
    #[serde(default)]
    pub value_as_of_type: Value,
}

/// Value of a [`DictAttribute`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictAttributeValue {
    #[serde(default)]
    pub as_string: String,
    #[serde(default)]
    pub type_of_value: String,
    #[serde(default)]
    pub value: Value,
}
