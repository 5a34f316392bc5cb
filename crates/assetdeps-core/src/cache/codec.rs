//! Primitive encoders and a bounds-checked byte cursor.
//!
//! Integers are fixed-width little-endian. Strings are a LEB128 varint byte
//! length followed by UTF-8 bytes.

use super::CacheError;

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Encode a `u64` as an unsigned LEB128 varint.
pub(crate) fn encode_varint(value: u64, buf: &mut Vec<u8>) {
    let mut v = value;
    loop {
        let byte = (v & 0x7F) as u8;
        v >>= 7;
        if v == 0 {
            buf.push(byte);
            break;
        }
        buf.push(byte | 0x80);
    }
}

/// Decode a LEB128 varint from `data`, returning the value and bytes consumed.
///
/// # Errors
///
/// Returns [`CacheError::UnexpectedEof`] if the data ends mid-varint and
/// [`CacheError::DataCorrupted`] if the value does not fit in 64 bits.
pub(crate) fn decode_varint(data: &[u8]) -> Result<(u64, usize), CacheError> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    for (i, &byte) in data.iter().enumerate() {
        let low = u64::from(byte & 0x7F);
        if shift == 63 && low > 1 {
            return Err(CacheError::DataCorrupted("varint overflows 64 bits".into()));
        }
        value |= low << shift;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        shift += 7;
        if shift > 63 {
            return Err(CacheError::DataCorrupted(
                "varint overflow: more than 10 bytes".into(),
            ));
        }
    }
    Err(CacheError::UnexpectedEof)
}

pub(crate) fn write_i32(value: i32, buf: &mut Vec<u8>) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Write a count or identifier that the format stores as `int32`.
///
/// # Errors
///
/// Returns [`CacheError::TooLarge`] if `value` exceeds `i32::MAX`.
pub(crate) fn write_len(value: usize, buf: &mut Vec<u8>) -> Result<(), CacheError> {
    let value = i32::try_from(value).map_err(|_| CacheError::TooLarge(value))?;
    write_i32(value, buf);
    Ok(())
}

pub(crate) fn write_string(value: &str, buf: &mut Vec<u8>) {
    encode_varint(value.len() as u64, buf);
    buf.extend_from_slice(value.as_bytes());
}

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// Forward-only cursor over an encoded body.
#[derive(Debug, Clone)]
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], CacheError> {
        if n > self.remaining() {
            return Err(CacheError::UnexpectedEof);
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32, CacheError> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.read_bytes(4)?);
        Ok(i32::from_le_bytes(raw))
    }

    pub(crate) fn read_varint(&mut self) -> Result<u64, CacheError> {
        let (value, used) = decode_varint(&self.data[self.pos..])?;
        self.pos += used;
        Ok(value)
    }

    /// Read an `int32` element count.
    ///
    /// Every element occupies at least `min_item_size` bytes, so a count the
    /// remaining input cannot possibly hold is rejected before the caller
    /// allocates for it.
    pub(crate) fn read_count(&mut self, what: &str, min_item_size: usize) -> Result<usize, CacheError> {
        let at = self.pos;
        let raw = self.read_i32()?;
        let count = usize::try_from(raw).map_err(|_| {
            CacheError::DataCorrupted(format!("negative {what} count {raw} at byte {at}"))
        })?;
        let needed = count.saturating_mul(min_item_size);
        if needed > self.remaining() {
            return Err(CacheError::DataCorrupted(format!(
                "{what} count {count} at byte {at} needs at least {needed} bytes, {} remain",
                self.remaining()
            )));
        }
        Ok(count)
    }

    pub(crate) fn read_string(&mut self) -> Result<String, CacheError> {
        let at = self.pos;
        let len = self.read_varint()?;
        let len = usize::try_from(len)
            .ok()
            .filter(|&len| len <= self.remaining())
            .ok_or(CacheError::UnexpectedEof)?;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| CacheError::DataCorrupted(format!("invalid UTF-8 in string at byte {at}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_single_and_multi_byte() {
        for (value, expected) in [
            (0u64, vec![0x00]),
            (127, vec![0x7F]),
            (128, vec![0x80, 0x01]),
            (300, vec![0xAC, 0x02]),
        ] {
            let mut buf = Vec::new();
            encode_varint(value, &mut buf);
            assert_eq!(buf, expected, "encoding {value}");
            assert_eq!(decode_varint(&buf).expect("decode"), (value, expected.len()));
        }
    }

    #[test]
    fn varint_max_value() {
        let mut buf = Vec::new();
        encode_varint(u64::MAX, &mut buf);
        assert_eq!(buf.len(), 10);
        assert_eq!(decode_varint(&buf).expect("decode").0, u64::MAX);
    }

    #[test]
    fn varint_decode_truncated() {
        assert_eq!(decode_varint(&[0x80, 0x80]), Err(CacheError::UnexpectedEof));
        assert_eq!(decode_varint(&[]), Err(CacheError::UnexpectedEof));
    }

    #[test]
    fn varint_decode_overflow() {
        let bytes = [0xFF; 11];
        assert!(matches!(decode_varint(&bytes), Err(CacheError::DataCorrupted(_))));
    }

    #[test]
    fn string_is_varint_prefixed() {
        let mut buf = Vec::new();
        write_string("Assets/Ä.png", &mut buf);
        assert_eq!(buf[0] as usize, "Assets/Ä.png".len());

        let mut reader = ByteReader::new(&buf);
        assert_eq!(reader.read_string().expect("decode"), "Assets/Ä.png");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn string_rejects_invalid_utf8() {
        let buf = [2u8, 0xC3, 0x28];
        let err = ByteReader::new(&buf).read_string().expect_err("bad utf-8");
        assert!(matches!(err, CacheError::DataCorrupted(msg) if msg.contains("UTF-8")));
    }

    #[test]
    fn string_length_past_end_is_eof() {
        let buf = [10u8, b'a', b'b'];
        assert_eq!(ByteReader::new(&buf).read_string(), Err(CacheError::UnexpectedEof));
    }

    #[test]
    fn read_count_rejects_negative_and_oversized() {
        let mut buf = Vec::new();
        write_i32(-1, &mut buf);
        let err = ByteReader::new(&buf).read_count("asset", 4).expect_err("negative");
        assert!(matches!(err, CacheError::DataCorrupted(msg) if msg.contains("negative")));

        let mut buf = Vec::new();
        write_i32(i32::MAX, &mut buf);
        buf.extend_from_slice(&[0; 16]);
        let err = ByteReader::new(&buf).read_count("asset", 12).expect_err("oversized");
        assert!(matches!(err, CacheError::DataCorrupted(_)));
    }

    #[test]
    fn read_count_accepts_what_fits() {
        let mut buf = Vec::new();
        write_i32(2, &mut buf);
        buf.extend_from_slice(&[0; 8]);
        let mut reader = ByteReader::new(&buf);
        assert_eq!(reader.read_count("edge", 4).expect("fits"), 2);
        assert_eq!(reader.remaining(), 8);
    }

    #[test]
    fn write_len_rejects_huge_values() {
        let mut buf = Vec::new();
        assert_eq!(
            write_len(usize::MAX, &mut buf),
            Err(CacheError::TooLarge(usize::MAX))
        );
        assert!(buf.is_empty());
    }
}
