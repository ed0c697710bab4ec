//! REST client for the EPGU e-services API.
//!
//! Wraps application submission (single-shot and chunked multipart
//! upload), status polling, cancellation, attachment download and
//! dictionary lookup behind one [`Client`].
//!
//! Every failure is a layered [`Error`]: the operation that was
//! invoked, the transport/decode/protocol cause, and (for classified
//! API responses) the HTTP status category plus the business error
//! code from the JSON error body. Each layer is testable by equality,
//! without string matching.

mod client;
mod debug;
mod error;
mod multipart;

pub use client::Client;
pub use error::{
    ApiError, BodyError, Error, ErrorCode, ErrorKind, Operation, Result, StatusCategory,
};
