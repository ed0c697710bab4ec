//! Order metadata.

use serde::{Deserialize, Serialize};

/// Metadata of an application being created.
///
/// Sent as the JSON body of order creation and as the `meta` part of
/// multipart uploads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMeta {
    /// Interactive form code on the portal.
    pub region: String,
    /// Target service code in the FRGU catalogue.
    pub service_code: String,
    /// OKATO code of the user's location. The regional OKATO code is
    /// acceptable when a more precise one cannot be determined.
    pub target_code: String,
}

impl OrderMeta {
    /// Create order metadata.
    pub fn new(
        region: impl Into<String>,
        service_code: impl Into<String>,
        target_code: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            service_code: service_code.into(),
            target_code: target_code.into(),
        }
    }
}
