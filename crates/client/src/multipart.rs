//! Multipart/form-data body assembly.
//!
//! The API validates upload fields positionally, so the body is built
//! from an explicit ordered list of part descriptors rather than a
//! name-keyed map.

use std::io::Write;
use uuid::Uuid;

/// One part of a multipart request body, written in insertion order.
#[derive(Debug)]
pub(crate) enum Part<'a> {
    /// Plain form field.
    Field { name: &'static str, value: String },
    /// JSON payload part (`Content-Type: application/json`).
    Json { name: &'static str, data: Vec<u8> },
    /// Binary file part (`Content-Type: application/octet-stream`).
    File { filename: String, data: &'a [u8] },
}

/// A fully assembled multipart body and its boundary.
pub(crate) struct MultipartBody {
    boundary: String,
    data: Vec<u8>,
}

impl MultipartBody {
    /// Assemble a body from parts under a fresh random boundary.
    pub fn build(parts: &[Part<'_>]) -> std::io::Result<Self> {
        Self::build_with_boundary(Uuid::new_v4().simple().to_string(), parts)
    }

    /// Assemble a body under a caller-supplied boundary.
    pub fn build_with_boundary(boundary: String, parts: &[Part<'_>]) -> std::io::Result<Self> {
        let mut buf = Vec::new();
        for part in parts {
            write!(buf, "--{boundary}\r\n")?;
            match part {
                Part::Field { name, value } => {
                    write!(
                        buf,
                        "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                    )?;
                }
                Part::Json { name, data } => {
                    write!(
                        buf,
                        "Content-Disposition: form-data; name=\"{name}\"\r\n\
                         Content-Type: application/json\r\n\r\n"
                    )?;
                    buf.write_all(data)?;
                    buf.write_all(b"\r\n")?;
                }
                Part::File { filename, data } => {
                    write!(
                        buf,
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )?;
                    buf.write_all(data)?;
                    buf.write_all(b"\r\n")?;
                }
            }
        }
        write!(buf, "--{boundary}--\r\n")?;

        Ok(Self {
            boundary,
            data: buf,
        })
    }

    /// `Content-Type` header value for this body.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Consume the body, yielding its serialized bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    #[cfg(test)]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}
