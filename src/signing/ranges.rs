//! Byte-range arithmetic for signature exclusion windows.

use crate::error::{SignatureError, SignatureResult};
use super::placeholder::{BYTE_RANGE_KEY, BYTE_RANGE_RESERVED_LEN};

/// Computes the hashable ranges of a file of `file_len` bytes, skipping
/// the given exclusion windows.
///
/// `exclusions` are `(offset, length)` pairs covering the value bytes
/// that must stay outside the digest (for `/Contents` this includes the
/// `<` and `>` delimiters). The result is the flattened
/// `[a0, l0, a1, l1, ...]` sequence: it always starts at offset 0,
/// jumps over every window in file order, and ends at EOF.
///
/// Positions are 64-bit. Windows must not overlap.
pub fn compute_ranges(exclusions: &[(u64, usize)], file_len: u64) -> SignatureResult<Vec<i64>> {
    let mut windows = exclusions.to_vec();
    windows.sort_by_key(|(offset, _)| *offset);

    let mut range = Vec::with_capacity((windows.len() + 1) * 2);
    let mut position = 0u64;

    for (offset, len) in windows {
        let end = offset + len as u64;
        if offset < position {
            return Err(SignatureError::OverlappingExclusions);
        }
        if end > file_len {
            return Err(SignatureError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "exclusion window past end of file",
            )));
        }
        range.push(position as i64);
        range.push((offset - position) as i64);
        position = end;
    }

    range.push(position as i64);
    range.push((file_len - position) as i64);

    Ok(range)
}

/// Returns the total number of hashable bytes described by a range.
pub fn total_range_length(range: &[i64]) -> u64 {
    range.chunks(2).map(|pair| pair[1] as u64).sum()
}

/// Renders a byte range as the fixed-width `/ByteRange` literal:
/// `[` then space-separated decimals then `]`, right-padded with
/// spaces to exactly [`BYTE_RANGE_RESERVED_LEN`] bytes.
pub fn format_byte_range(range: &[i64]) -> SignatureResult<Vec<u8>> {
    let mut literal = String::with_capacity(BYTE_RANGE_RESERVED_LEN);
    literal.push('[');
    for (i, value) in range.iter().enumerate() {
        if i > 0 {
            literal.push(' ');
        }
        literal.push_str(&value.to_string());
    }
    literal.push(']');

    if literal.len() > BYTE_RANGE_RESERVED_LEN {
        return Err(SignatureError::ValueTooLarge {
            key: BYTE_RANGE_KEY.to_string(),
        });
    }

    let mut bytes = literal.into_bytes();
    bytes.resize(BYTE_RANGE_RESERVED_LEN, b' ');
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_window() {
        // One /Contents gap at offset 100, 20 bytes wide, file of 500
        let range = compute_ranges(&[(100, 20)], 500).unwrap();
        assert_eq!(range, vec![0, 100, 120, 380]);
    }

    #[test]
    fn test_range_complements_window() {
        let range = compute_ranges(&[(845, 16386)], 50000).unwrap();
        assert_eq!(range[0], 0);
        assert_eq!(range[0] + range[1], 845);
        assert_eq!(range[2], 845 + 16386);
        assert_eq!(range[2] + range[3], 50000);
    }

    #[test]
    fn test_two_windows_sorted() {
        let range = compute_ranges(&[(300, 10), (100, 20)], 500).unwrap();
        assert_eq!(range, vec![0, 100, 120, 180, 310, 190]);
        assert_eq!(total_range_length(&range), 500 - 30);
    }

    #[test]
    fn test_overlapping_windows_rejected() {
        let err = compute_ranges(&[(100, 50), (120, 10)], 500).unwrap_err();
        assert!(matches!(err, SignatureError::OverlappingExclusions));
    }

    #[test]
    fn test_window_at_start() {
        let range = compute_ranges(&[(0, 10)], 100).unwrap();
        assert_eq!(range, vec![0, 0, 10, 90]);
    }

    #[test]
    fn test_literal_is_eighty_bytes() {
        let bytes = format_byte_range(&[0, 840, 17226, 1234]).unwrap();
        assert_eq!(bytes.len(), BYTE_RANGE_RESERVED_LEN);
        assert!(bytes.starts_with(b"[0 840 17226 1234]"));
        assert!(bytes[18..].iter().all(|&b| b == b' '));
    }

    #[test]
    fn test_total_length() {
        assert_eq!(total_range_length(&[0, 100, 120, 380]), 480);
    }
}
