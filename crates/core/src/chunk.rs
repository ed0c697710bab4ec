//! Chunk splitting for the chunked upload protocol.

/// Default maximum chunk size in bytes for chunked uploads.
///
/// Archives larger than this are sent as several requests of at most
/// this many bytes each.
pub const DEFAULT_CHUNK_SIZE: usize = 5_000_000;

/// One bounded slice of an archive, sent as a single upload request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Position in the upload sequence (0-based).
    pub index: usize,
    /// Total number of chunks for this upload.
    pub total: usize,
    /// The chunk payload, borrowed from the archive data.
    pub data: &'a [u8],
}

impl Chunk<'_> {
    /// Derive the wire filename for this chunk.
    ///
    /// A single-chunk upload is named `{stem}.zip`; a multi-chunk upload
    /// names its parts `{stem}.z001`, `{stem}.z002`, and so on.
    pub fn filename(&self, stem: &str) -> String {
        if self.total == 1 {
            format!("{stem}.zip")
        } else {
            format!("{stem}.z{:03}", self.index + 1)
        }
    }
}

/// Number of chunks needed to cover `data_len` bytes.
///
/// Ceiling division; `data_len` and `chunk_size` must be greater than
/// zero. An input of exactly `chunk_size` bytes yields one chunk, not
/// two.
pub fn chunk_count(data_len: usize, chunk_size: usize) -> usize {
    debug_assert!(data_len > 0 && chunk_size > 0);
    1 + (data_len - 1) / chunk_size
}

/// Split data into chunks of at most `chunk_size` bytes.
///
/// All chunks are exactly `chunk_size` long except the last, which
/// holds the remainder. Chunks borrow the input; nothing is copied.
pub fn split<'a>(data: &'a [u8], chunk_size: usize) -> impl Iterator<Item = Chunk<'a>> + 'a {
    let total = if data.is_empty() {
        0
    } else {
        chunk_count(data.len(), chunk_size)
    };
    data.chunks(chunk_size)
        .enumerate()
        .map(move |(index, data)| Chunk { index, total, data })
}
