//! Requested access permissions for the consent page.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

/// A mnemonic reference used for actions, purposes and scopes of a
/// [`Permission`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sysname {
    pub sysname: String,
}

impl Sysname {
    pub fn new(sysname: impl Into<String>) -> Self {
        Self {
            sysname: sysname.into(),
        }
    }
}

/// One requested permission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    /// Responsible object (organization name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_object: Option<String>,
    /// Consent type mnemonic.
    pub sysname: String,
    /// Consent lifetime after approval, in minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire: Option<u32>,
    /// Action mnemonics.
    pub actions: Vec<Sysname>,
    /// Consent purpose mnemonics.
    pub purposes: Vec<Sysname>,
    /// Access scope mnemonics.
    pub scopes: Vec<Sysname>,
}

/// The list of permissions requested from the user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(pub Vec<Permission>);

impl Permissions {
    /// Encode the list for the `permissions` query parameter:
    /// unpadded URL-safe base64 over the JSON form.
    pub fn to_base64(&self) -> String {
        let json = serde_json::to_vec(&self.0).expect("permissions serialize infallibly");
        URL_SAFE_NO_PAD.encode(json)
    }
}

impl From<Vec<Permission>> for Permissions {
    fn from(permissions: Vec<Permission>) -> Self {
        Self(permissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn sample() -> Permissions {
        Permissions(vec![Permission {
            responsible_object: None,
            sysname: "fl_pension_delivery".to_string(),
            expire: Some(525_600),
            actions: vec![Sysname::new("ALL_ACTIONS_TO_DATA")],
            purposes: vec![Sysname::new("DELIVERY")],
            scopes: vec![Sysname::new("usr_dlv")],
        }])
    }

    #[test]
    fn test_base64_round_trip() {
        let encoded = sample().to_base64();
        assert!(!encoded.contains('='));

        let decoded = URL_SAFE_NO_PAD.decode(&encoded).unwrap();
        let parsed: Vec<Permission> = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(Permissions(parsed), sample());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(&sample().0).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "sysname": "fl_pension_delivery",
                "expire": 525600,
                "actions": [{"sysname": "ALL_ACTIONS_TO_DATA"}],
                "purposes": [{"sysname": "DELIVERY"}],
                "scopes": [{"sysname": "usr_dlv"}],
            }])
        );
    }
}
