//! Core domain types and pure logic for the EPGU e-services API.
//!
//! This crate defines the data model shared by the client crates:
//! - Attachment archives and their zip assembly
//! - Chunk splitting for the chunked upload protocol
//! - Order metadata and order detail payloads
//! - Dictionary (reference data) payloads
//! - The API timestamp format
//! - Storage file links

pub mod archive;
pub mod chunk;
pub mod datetime;
pub mod dict;
pub mod error;
pub mod link;
pub mod meta;
pub mod order;

pub use archive::{Archive, ArchiveFile};
pub use chunk::{Chunk, DEFAULT_CHUNK_SIZE, chunk_count, split};
pub use dict::{Dict, DictItem, DictRequest, TreeFiltering};
pub use error::{Error, Result};
pub use link::FileLink;
pub use meta::OrderMeta;
pub use order::{Order, OrderInfo, OrderInfoResponse};
