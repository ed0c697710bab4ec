//! Request/response dumps for debug logging.
//!
//! Dumps go through `tracing` at debug level and are enabled by the
//! embedding application's subscriber filter. Binary file parts are
//! replaced with a placeholder so archives do not flood the log.

use crate::multipart::Part;
use std::fmt::Write;

/// Render a multipart part list for logging.
pub(crate) fn multipart_preview(parts: &[Part<'_>]) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        match part {
            Part::Field { name, value } => {
                let _ = write!(out, "{name}='{value}'");
            }
            Part::Json { name, data } => {
                let _ = write!(out, "{name}={}", String::from_utf8_lossy(data));
            }
            Part::File { filename, data } => {
                let _ = write!(out, "file='{filename}' [{} bytes of binary data...]", data.len());
            }
        }
    }
    out
}

/// Render a response body for logging, keeping it on one line.
pub(crate) fn body_preview(body: &[u8]) -> String {
    String::from_utf8_lossy(body).replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipart_preview_hides_binary_payload() {
        let payload = vec![0u8; 1024];
        let preview = multipart_preview(&[
            Part::Field {
                name: "orderId",
                value: "123456".to_string(),
            },
            Part::File {
                filename: "a.z001".to_string(),
                data: &payload,
            },
        ]);
        assert_eq!(
            preview,
            "orderId='123456'; file='a.z001' [1024 bytes of binary data...]"
        );
    }

    #[test]
    fn test_body_preview_escapes_newlines() {
        assert_eq!(body_preview(b"a\nb"), "a\\nb");
    }
}
