//! Sequential access to the hashable regions of the backing store.

use crate::error::SignatureResult;
use std::io::{self, Read, Seek, SeekFrom};
use super::traits::MessageDigest;

/// Reads the concatenation of byte ranges as one forward-only stream.
///
/// This is what digest providers and signature containers consume: the
/// whole file minus the reserved gaps, in file order, readable exactly
/// once.
pub struct RangeReader<'a, S: Read + Seek> {
    source: &'a mut S,
    ranges: Vec<(u64, u64)>,
    index: usize,
    remaining: u64,
    positioned: bool,
}

impl<'a, S: Read + Seek> RangeReader<'a, S> {
    /// Creates a reader over the flattened `[a0, l0, a1, l1, ...]`
    /// range sequence.
    pub fn new(source: &'a mut S, range: &[i64]) -> Self {
        let ranges: Vec<(u64, u64)> = range
            .chunks(2)
            .map(|pair| (pair[0] as u64, pair[1] as u64))
            .collect();
        let remaining = ranges.first().map(|(_, len)| *len).unwrap_or(0);
        Self {
            source,
            ranges,
            index: 0,
            remaining,
            positioned: false,
        }
    }

    /// Returns the total number of bytes the stream yields.
    pub fn total_len(&self) -> u64 {
        self.ranges.iter().map(|(_, len)| *len).sum()
    }
}

impl<S: Read + Seek> Read for RangeReader<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.index >= self.ranges.len() {
                return Ok(0);
            }
            if self.remaining == 0 {
                self.index += 1;
                self.positioned = false;
                if let Some((_, len)) = self.ranges.get(self.index) {
                    self.remaining = *len;
                }
                continue;
            }
            if !self.positioned {
                let (offset, len) = self.ranges[self.index];
                let consumed = len - self.remaining;
                self.source.seek(SeekFrom::Start(offset + consumed))?;
                self.positioned = true;
            }

            let want = buf.len().min(self.remaining as usize);
            let n = self.source.read(&mut buf[..want])?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "range extends past end of source",
                ));
            }
            self.remaining -= n as u64;
            return Ok(n);
        }
    }
}

/// Streams a reader through a message digest in 4 KiB chunks.
pub fn digest_stream(
    reader: &mut impl Read,
    mut digest: Box<dyn MessageDigest>,
) -> SignatureResult<Vec<u8>> {
    let mut buf = [0u8; 4096];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        digest.update(&buf[..n]);
    }
    Ok(digest.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::ranges::total_range_length;
    use crate::signing::traits::{ExternalDigest, StandardDigest};
    use sha2::{Digest, Sha256};
    use std::io::Cursor;

    #[test]
    fn test_reads_concatenated_ranges() {
        let mut source = Cursor::new(b"0123456789".to_vec());
        let mut reader = RangeReader::new(&mut source, &[0, 3, 7, 3]);
        assert_eq!(reader.total_len(), 6);

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"012789");
    }

    #[test]
    fn test_small_buffer_reads() {
        let mut source = Cursor::new(b"abcdefghij".to_vec());
        let mut reader = RangeReader::new(&mut source, &[2, 4, 8, 2]);

        let mut out = Vec::new();
        let mut buf = [0u8; 3];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(out, b"cdefij");
    }

    #[test]
    fn test_empty_leading_range() {
        let mut source = Cursor::new(b"abcdef".to_vec());
        let mut reader = RangeReader::new(&mut source, &[0, 0, 2, 4]);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"cdef");
    }

    #[test]
    fn test_digest_stream_matches_direct_hash() {
        let data = vec![7u8; 10000];
        let mut source = Cursor::new(data.clone());
        let mut reader = RangeReader::new(&mut source, &[0, 4000, 5000, 5000]);

        let md = StandardDigest.message_digest("SHA-256").unwrap();
        let digest = digest_stream(&mut reader, md).unwrap();

        let mut expected = Sha256::new();
        expected.update(&data[..4000]);
        expected.update(&data[5000..]);
        assert_eq!(digest, expected.finalize().to_vec());
    }

    #[test]
    fn test_total_len_matches_ranges() {
        let mut source = Cursor::new(vec![0u8; 500]);
        let reader = RangeReader::new(&mut source, &[0, 100, 120, 380]);
        assert_eq!(reader.total_len(), total_range_length(&[0, 100, 120, 380]));
    }
}
