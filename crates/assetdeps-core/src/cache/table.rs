//! Body layout: the record array followed by the path table.
//!
//! ```text
//! AssetCount: int32
//! AssetCount × { id: int32, usesCount: int32, uses: int32[],
//!                usedByCount: int32, usedBy: int32[] }
//! PathCount: int32
//! PathCount × string
//! ```

use tracing::debug;

use super::CacheError;
use super::codec::{ByteReader, write_len, write_string};
use crate::graph::{AssetId, AssetRecord, GraphIndex, InvariantError};
use crate::intern::PathInterner;

/// Smallest possible encoded record: id plus two empty counts.
const MIN_RECORD_SIZE: usize = 12;
const ID_SIZE: usize = 4;
/// Smallest possible encoded string: a one-byte zero length.
const MIN_STRING_SIZE: usize = 1;

/// Encode `graph` as a bare body, without the file header.
///
/// # Errors
///
/// Returns [`CacheError::TooLarge`] if a count or id does not fit in the
/// format's `int32` fields.
pub fn encode_graph_body(graph: &GraphIndex) -> Result<Vec<u8>, CacheError> {
    let path_bytes: usize = graph.paths().iter().map(|p| p.len() + 2).sum();
    let mut buf = Vec::with_capacity(
        8 + graph.len() * MIN_RECORD_SIZE + graph.edge_count() * 2 * ID_SIZE + path_bytes,
    );

    write_len(graph.len(), &mut buf)?;
    for record in graph.records() {
        write_len(record.id().index(), &mut buf)?;
        write_ids(record.uses(), &mut buf)?;
        write_ids(record.used_by(), &mut buf)?;
    }

    write_len(graph.paths().len(), &mut buf)?;
    for path in graph.paths() {
        write_string(path, &mut buf);
    }
    Ok(buf)
}

fn write_ids(ids: &[AssetId], buf: &mut Vec<u8>) -> Result<(), CacheError> {
    write_len(ids.len(), buf)?;
    for id in ids {
        write_len(id.index(), buf)?;
    }
    Ok(())
}

/// Decode a bare body into a finalized graph.
///
/// Records are placed by their stored id, not by file position. The inverse
/// relation is not checked; call [`GraphIndex::verify`] for that.
///
/// # Errors
///
/// Returns [`CacheError`] on malformed input, and
/// [`CacheError::InvariantViolation`] when the body is well-formed but
/// describes an impossible index.
pub fn decode_graph_body(body: &[u8]) -> Result<GraphIndex, CacheError> {
    let mut reader = ByteReader::new(body);

    let asset_count = reader.read_count("asset", MIN_RECORD_SIZE)?;
    let mut slots: Vec<Option<AssetRecord>> = vec![None; asset_count];
    for _ in 0..asset_count {
        let id = read_id(&mut reader, asset_count)?;
        let uses = read_ids(&mut reader, "uses", asset_count)?;
        let used_by = read_ids(&mut reader, "used-by", asset_count)?;
        let slot = &mut slots[id.index()];
        if slot.is_some() {
            return Err(InvariantError::DuplicateRecord(id).into());
        }
        *slot = Some(AssetRecord::new(id, uses, used_by));
    }

    let path_count = reader.read_count("path", MIN_STRING_SIZE)?;
    if path_count != asset_count {
        return Err(InvariantError::CountMismatch {
            records: asset_count,
            paths: path_count,
        }
        .into());
    }
    let mut paths = Vec::with_capacity(path_count);
    for _ in 0..path_count {
        paths.push(reader.read_string()?);
    }

    if reader.remaining() != 0 {
        return Err(CacheError::DataCorrupted(format!(
            "{} trailing bytes after path table",
            reader.remaining()
        )));
    }

    // asset_count distinct in-range ids fill every slot.
    let records: Vec<AssetRecord> = slots.into_iter().flatten().collect();
    let interner = PathInterner::from_paths(paths).map_err(InvariantError::from)?;
    let graph = GraphIndex::from_parts(interner, records)?;

    debug!(assets = graph.len(), edges = graph.edge_count(), "decoded graph body");
    Ok(graph)
}

fn read_id(reader: &mut ByteReader<'_>, len: usize) -> Result<AssetId, CacheError> {
    let raw = reader.read_i32()?;
    usize::try_from(raw)
        .ok()
        .filter(|&index| index < len)
        .map(AssetId::from_index)
        .ok_or_else(|| {
            InvariantError::IdOutOfRange {
                id: i64::from(raw),
                len,
            }
            .into()
        })
}

fn read_ids(
    reader: &mut ByteReader<'_>,
    what: &str,
    len: usize,
) -> Result<Vec<AssetId>, CacheError> {
    let count = reader.read_count(what, ID_SIZE)?;
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        ids.push(read_id(reader, len)?);
    }
    Ok(ids)
}
