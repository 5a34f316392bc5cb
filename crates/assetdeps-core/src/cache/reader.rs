//! Cache file reader.
//!
//! [`CacheReader`] reads a cache file into memory and validates the header
//! and checksum up front; decoding the body into a [`GraphIndex`] is a
//! separate step.

use std::fs;
use std::io;
use std::path::Path;

use tracing::instrument;

use crate::cache::{CacheError, CacheHeader, HEADER_SIZE, decode_graph_body};
use crate::error::ErrorCode;
use crate::graph::GraphIndex;

/// A validated cache file image.
///
/// # Example
///
/// ```rust,no_run
/// use assetdeps_core::cache::CacheReader;
///
/// let reader = CacheReader::open(".assetdeps/cache/dep.dat")?;
/// println!("cache body is {} bytes", reader.header().body_len);
/// let graph = reader.read_graph()?;
/// # Ok::<(), assetdeps_core::cache::CacheReaderError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CacheReader {
    header: CacheHeader,
    data: Vec<u8>,
}

impl CacheReader {
    /// Open and validate a cache file.
    ///
    /// # Errors
    ///
    /// Returns [`CacheReaderError::Io`] if the file cannot be read, or
    /// [`CacheReaderError::Cache`] if the header or checksum is invalid.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheReaderError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| CacheReaderError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_bytes(data)
    }

    /// Validate an in-memory cache image.
    ///
    /// # Errors
    ///
    /// Returns [`CacheReaderError::Cache`] if validation fails.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, CacheReaderError> {
        let (header, _body) = CacheHeader::read(&data)?;
        Ok(Self { header, data })
    }

    /// The validated header.
    #[must_use]
    pub const fn header(&self) -> &CacheHeader {
        &self.header
    }

    /// Total size of the file image in bytes.
    #[must_use]
    pub fn file_size(&self) -> usize {
        self.data.len()
    }

    /// Decode the body into a finalized graph.
    ///
    /// # Errors
    ///
    /// Returns [`CacheReaderError::Cache`] if the body is malformed or
    /// describes an invalid index.
    pub fn read_graph(&self) -> Result<GraphIndex, CacheReaderError> {
        Ok(decode_graph_body(&self.data[HEADER_SIZE..])?)
    }
}

/// Errors returned by [`CacheReader`].
#[derive(Debug, thiserror::Error)]
pub enum CacheReaderError {
    /// File I/O error.
    #[error("failed to read cache file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Cache format/validation error.
    #[error("cache validation error: {0}")]
    Cache(#[from] CacheError),
}

impl CacheReaderError {
    /// Returns true when the cache file simply does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }

    /// Machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } if self.is_not_found() => ErrorCode::CacheMissing,
            Self::Io { .. } => ErrorCode::InternalUnexpected,
            Self::Cache(inner) => inner.code(),
        }
    }
}
