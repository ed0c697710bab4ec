//! Storage file links.

use crate::error::{Error, Result};

/// Parsed storage link of an order attachment or response file.
///
/// Links come as `terrabyte://00/{objectId}/{fileName}/{objectType}`
/// and resolve to a storage download URI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileLink {
    /// Identifier of the owning object (the order number).
    pub object_id: u64,
    /// File mnemonic within the object.
    pub mnemonic: String,
    /// Storage object type.
    pub object_type: u32,
}

impl FileLink {
    /// Parse an opaque `link` field value.
    pub fn parse(link: &str) -> Result<Self> {
        let invalid = || Error::InvalidFileLink(link.to_string());

        let rest = link.strip_prefix("terrabyte://").ok_or_else(invalid)?;
        let mut segments = rest.splitn(3, '/');
        let _node = segments.next().ok_or_else(invalid)?;
        let object_id = segments
            .next()
            .and_then(|id| id.parse::<u64>().ok())
            .ok_or_else(invalid)?;
        let tail = segments.next().ok_or_else(invalid)?;
        let (mnemonic, object_type) = tail.rsplit_once('/').ok_or_else(invalid)?;
        if mnemonic.is_empty() {
            return Err(invalid());
        }
        let object_type = object_type.parse::<u32>().map_err(|_| invalid())?;

        Ok(Self {
            object_id,
            mnemonic: mnemonic.to_string(),
            object_type,
        })
    }

    /// Path of the storage download endpoint for this link.
    pub fn download_path(&self) -> String {
        format!(
            "/api/storage/v2/files/{}/{}/download?mnemonic={}",
            self.object_id, self.object_type, self.mnemonic
        )
    }
}
