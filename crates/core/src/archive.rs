//! Attachment archives for order submission.

use crate::error::{Error, Result};
use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// One attachment file to include in an [`Archive`].
#[derive(Clone, Debug)]
pub struct ArchiveFile {
    /// File name with extension, e.g. `req_346ee59c.xml`.
    pub filename: String,
    /// File contents.
    pub data: Vec<u8>,
}

impl ArchiveFile {
    /// Create an attachment file.
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }
}

/// A named in-memory zip archive of order attachments.
///
/// Built once, consumed by a single push or chunked-push call. The data
/// must be non-empty before any upload; the client rejects an empty
/// archive before touching the network.
#[derive(Clone, Debug)]
pub struct Archive {
    /// Archive name without extension, e.g. `35002123456-archive`.
    pub name: String,
    /// Archive contents in zip format.
    pub data: Vec<u8>,
}

impl Archive {
    /// Build an archive by zipping the given attachment files in order.
    pub fn new(name: impl Into<String>, files: &[ArchiveFile]) -> Result<Self> {
        if files.is_empty() {
            return Err(Error::NoFiles);
        }

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for file in files {
            writer.start_file(file.filename.as_str(), SimpleFileOptions::default())?;
            writer.write_all(&file.data)?;
        }
        let cursor = writer.finish()?;

        Ok(Self {
            name: name.into(),
            data: cursor.into_inner(),
        })
    }

    /// Wrap pre-built zip bytes without re-compressing.
    pub fn from_zip(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Base name used to derive the wire filename of each chunk.
    ///
    /// Falls back to `archive` when the name is empty so the filename
    /// is never a bare extension.
    pub fn file_stem(&self) -> &str {
        if self.name.is_empty() { "archive" } else { &self.name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_archive_zips_files_in_order() {
        let archive = Archive::new(
            "test-archive",
            &[
                ArchiveFile::new("req.xml", b"<request/>".to_vec()),
                ArchiveFile::new("trans.xml", b"<trans/>".to_vec()),
            ],
        )
        .unwrap();

        assert_eq!(archive.name, "test-archive");
        assert!(!archive.data.is_empty());

        let mut zip = zip::ZipArchive::new(Cursor::new(archive.data)).unwrap();
        assert_eq!(zip.len(), 2);
        assert_eq!(zip.by_index(0).unwrap().name(), "req.xml");
        assert_eq!(zip.by_index(1).unwrap().name(), "trans.xml");

        let mut contents = String::new();
        zip.by_name("req.xml").unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "<request/>");
    }

    #[test]
    fn test_archive_without_files_is_rejected() {
        let err = Archive::new("empty", &[]).unwrap_err();
        assert!(matches!(err, Error::NoFiles));
    }

    #[test]
    fn test_file_stem_falls_back_for_empty_name() {
        let archive = Archive::from_zip("", vec![1, 2, 3]);
        assert_eq!(archive.file_stem(), "archive");

        let archive = Archive::from_zip("named", vec![1, 2, 3]);
        assert_eq!(archive.file_stem(), "named");
    }
}
