//! Binary dependency cache.
//!
//! The cache is a derived snapshot of a [`GraphIndex`]: the record array and
//! the path table, behind a small fixed header. It is never authoritative;
//! a build from the asset source can always regenerate it.
//!
//! # Module layout
//!
//! - [`codec`]: little-endian integers, LEB128 varints, strings.
//! - [`table`]: the body layout ([`encode_graph_body`] / [`decode_graph_body`]).
//! - [`reader`] / [`writer`]: file I/O.
//! - [`CacheHeader`] and [`CacheError`]: this module.
//!
//! # File layout
//!
//! ```text
//! magic     4 bytes  "ADEP"
//! version   u8
//! reserved  3 bytes  zero
//! body_len  u64 LE
//! checksum  u64 LE   first 8 bytes of BLAKE3(body)
//! body      body_len bytes
//! ```

pub mod codec;
pub mod reader;
pub mod table;
pub mod writer;

pub use reader::{CacheReader, CacheReaderError};
pub use table::{decode_graph_body, encode_graph_body};
pub use writer::{CacheStats, CacheWriter};

use crate::error::ErrorCode;
use crate::graph::{GraphIndex, InvariantError};

// ---------------------------------------------------------------------------
// Format constants
// ---------------------------------------------------------------------------

/// The four magic bytes at the start of every cache file.
pub const CACHE_MAGIC: [u8; 4] = *b"ADEP";

/// The current format version written to new cache files.
pub const CACHE_VERSION: u8 = 1;

/// Fixed header size in bytes.
pub const HEADER_SIZE: usize = 24;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors returned by cache encoding and decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// The file does not start with `ADEP`.
    #[error("invalid magic bytes: expected ADEP, got {0:?}")]
    InvalidMagic([u8; 4]),

    /// The format version is not one this library reads.
    #[error("unsupported cache format version {0}: maximum supported is {CACHE_VERSION}")]
    UnsupportedVersion(u8),

    /// Checksum mismatch, bad counts, invalid UTF-8, or trailing bytes.
    #[error("cache data is corrupted: {0}")]
    DataCorrupted(String),

    /// Unexpected end of data while reading the header or body.
    #[error("unexpected end of cache data")]
    UnexpectedEof,

    /// The body is well-formed but does not describe a valid index.
    #[error("cache describes an invalid graph: {0}")]
    InvariantViolation(#[from] InvariantError),

    /// A count or identifier does not fit the format's `int32` fields.
    #[error("value {0} does not fit in a 32-bit cache field")]
    TooLarge(usize),
}

impl CacheError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvariantViolation(_) => ErrorCode::InvariantViolation,
            Self::TooLarge(_) => ErrorCode::CacheWriteFailed,
            Self::InvalidMagic(_)
            | Self::UnsupportedVersion(_)
            | Self::DataCorrupted(_)
            | Self::UnexpectedEof => ErrorCode::CacheCorrupt,
        }
    }
}

/// First 8 bytes of the BLAKE3 hash of `data`, as a little-endian `u64`.
#[must_use]
pub fn checksum(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(head)
}

// ---------------------------------------------------------------------------
// CacheHeader
// ---------------------------------------------------------------------------

/// File header for the binary dependency cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheHeader {
    /// Format version.
    pub version: u8,
    /// Length of the body in bytes.
    pub body_len: u64,
    /// [`checksum`] of the body.
    pub checksum: u64,
}

impl CacheHeader {
    /// Header describing `body`.
    #[must_use]
    pub fn for_body(body: &[u8]) -> Self {
        Self {
            version: CACHE_VERSION,
            body_len: body.len() as u64,
            checksum: checksum(body),
        }
    }

    /// Append the encoded header to `buf`.
    pub fn write(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&CACHE_MAGIC);
        buf.push(self.version);
        buf.extend_from_slice(&[0; 3]);
        buf.extend_from_slice(&self.body_len.to_le_bytes());
        buf.extend_from_slice(&self.checksum.to_le_bytes());
    }

    /// Parse and validate a header, returning it with its checked body.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] on bad magic, an unsupported version, nonzero
    /// reserved bytes, a body length mismatch, or a checksum mismatch.
    pub fn read(data: &[u8]) -> Result<(Self, &[u8]), CacheError> {
        if data.len() < 4 {
            return Err(CacheError::UnexpectedEof);
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&data[..4]);
        if magic != CACHE_MAGIC {
            return Err(CacheError::InvalidMagic(magic));
        }
        if data.len() < HEADER_SIZE {
            return Err(CacheError::UnexpectedEof);
        }

        let version = data[4];
        if version == 0 || version > CACHE_VERSION {
            return Err(CacheError::UnsupportedVersion(version));
        }
        if data[5..8] != [0, 0, 0] {
            return Err(CacheError::DataCorrupted("reserved header bytes are not zero".into()));
        }

        let body_len = read_u64(&data[8..16]);
        let stored = read_u64(&data[16..24]);
        let body = &data[HEADER_SIZE..];
        let actual = body.len() as u64;
        if actual < body_len {
            return Err(CacheError::UnexpectedEof);
        }
        if actual > body_len {
            return Err(CacheError::DataCorrupted(format!(
                "{} trailing bytes after body",
                actual - body_len
            )));
        }

        let computed = checksum(body);
        if computed != stored {
            return Err(CacheError::DataCorrupted(format!(
                "checksum mismatch: header {stored:#018x}, body {computed:#018x}"
            )));
        }

        Ok((
            Self {
                version,
                body_len,
                checksum: stored,
            },
            body,
        ))
    }
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    u64::from_le_bytes(raw)
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Encode `graph` as a complete cache file image.
///
/// # Errors
///
/// Returns [`CacheError::TooLarge`] if the graph exceeds the format's limits.
pub fn encode_graph(graph: &GraphIndex) -> Result<Vec<u8>, CacheError> {
    let body = encode_graph_body(graph)?;
    let mut out = Vec::with_capacity(HEADER_SIZE + body.len());
    CacheHeader::for_body(&body).write(&mut out);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Decode a complete cache file image.
///
/// # Errors
///
/// Returns [`CacheError`] if the header, checksum, or body is invalid.
pub fn decode_graph(data: &[u8]) -> Result<GraphIndex, CacheError> {
    let (_header, body) = CacheHeader::read(data)?;
    decode_graph_body(body)
}
