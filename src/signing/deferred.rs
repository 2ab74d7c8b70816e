//! Deferred signature injection into a pre-reserved gap.
//!
//! The two-phase workflow: a first pass reserves the `/Contents` gap
//! (typically with an all-zero container) and finalizes the file; this
//! pass hashes the surrounding bytes, obtains the real container, and
//! splices it into the gap without moving a single other byte.

use crate::error::{SignatureError, SignatureResult};
use log::debug;
use std::io::{Cursor, Write};
use super::hashable::RangeReader;
use super::traits::ExternalSignatureContainer;

/// Scans a serialized PDF for its last `/ByteRange` array.
///
/// Returns the flattened `[a0, l0, a1, l1, ...]` values, or `None` when
/// no parseable array is present.
pub fn read_last_byte_range(pdf: &[u8]) -> Option<Vec<i64>> {
    let needle = b"/ByteRange";
    if pdf.len() < needle.len() {
        return None;
    }

    // Backwards scan: the last signature's array wins
    for start in (0..=pdf.len() - needle.len()).rev() {
        if &pdf[start..start + needle.len()] == needle {
            if let Some(range) = parse_range_array(&pdf[start + needle.len()..]) {
                return Some(range);
            }
        }
    }
    None
}

/// Parses `[ n n n n ]` after optional whitespace.
fn parse_range_array(bytes: &[u8]) -> Option<Vec<i64>> {
    let mut pos = 0;
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    if pos >= bytes.len() || bytes[pos] != b'[' {
        return None;
    }
    let end = bytes[pos..].iter().position(|&b| b == b']')? + pos;

    let body = std::str::from_utf8(&bytes[pos + 1..end]).ok()?;
    let mut values = Vec::new();
    for token in body.split_whitespace() {
        values.push(token.parse().ok()?);
    }

    if values.is_empty() || values.len() % 2 != 0 {
        return None;
    }
    Some(values)
}

/// Injects a signature into the reserved gap of an existing PDF.
///
/// The last signature must cover the whole document, start at offset 0,
/// and leave exactly one exclusion window. The container receives the
/// hashable stream over the final bytes; its output is hex-encoded into
/// the gap, zero-padded on the right. Identical inputs produce
/// byte-identical output.
pub fn sign_deferred<W: Write>(
    pdf: &[u8],
    container: &dyn ExternalSignatureContainer,
    output: &mut W,
) -> SignatureResult<()> {
    let range = read_last_byte_range(pdf).ok_or(SignatureError::NotLastSignature)?;

    // The signature must cover the document up to EOF
    let last_offset = range[range.len() - 2];
    let last_len = range[range.len() - 1];
    if (last_offset + last_len) as usize != pdf.len() {
        return Err(SignatureError::NotLastSignature);
    }
    if range.len() != 4 || range[0] != 0 {
        return Err(SignatureError::SingleExclusionOnly);
    }

    let gap_start = (range[0] + range[1]) as usize;
    let gap_end = range[2] as usize;
    if gap_end <= gap_start || gap_end > pdf.len() {
        return Err(SignatureError::NotLastSignature);
    }

    let gap_len = gap_end - gap_start;
    if gap_len % 2 != 0 {
        return Err(SignatureError::GapNotEven);
    }

    let mut source = Cursor::new(pdf);
    let mut reader = RangeReader::new(&mut source, &range);
    let signed = container.sign(&mut reader)?;

    // Two bytes of the gap are the delimiters
    let capacity = (gap_len - 2) / 2;
    if signed.len() > capacity {
        return Err(SignatureError::InsufficientSpace);
    }

    debug!(
        "injecting {} bytes into a {}-byte gap at {}..{}",
        signed.len(),
        gap_len,
        gap_start,
        gap_end
    );

    output.write_all(&pdf[..gap_start])?;
    output.write_all(b"<")?;
    let mut hex = String::with_capacity(gap_len - 2);
    for byte in &signed {
        hex.push_str(&format!("{:02X}", byte));
    }
    while hex.len() < gap_len - 2 {
        hex.push('0');
    }
    output.write_all(hex.as_bytes())?;
    output.write_all(b">")?;
    output.write_all(&pdf[gap_end..])?;
    output.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    struct FixedContainer {
        bytes: Vec<u8>,
    }

    impl ExternalSignatureContainer for FixedContainer {
        fn modify_signing_dictionary(&self, _dict: &mut crate::signing::SignatureDictionary) {}

        fn sign(&self, content: &mut dyn Read) -> SignatureResult<Vec<u8>> {
            let mut sink = Vec::new();
            content.read_to_end(&mut sink)?;
            Ok(self.bytes.clone())
        }
    }

    /// Builds a synthetic file whose last signature has the given gap.
    fn synthetic_pdf(gap_len: usize, tail_len: usize) -> Vec<u8> {
        // The offsets appear inside the prefix, so iterate to the fixed
        // point where the prefix length equals the gap start it quotes
        let mut gap_start = 0;
        let prefix = loop {
            let candidate = format!(
                "%synthetic /ByteRange [0 {} {} {}] /Contents ",
                gap_start,
                gap_start + gap_len,
                tail_len
            );
            if candidate.len() == gap_start {
                break candidate.into_bytes();
            }
            gap_start = candidate.len();
        };

        let mut pdf = prefix;
        pdf.push(b'<');
        pdf.extend(std::iter::repeat(b'0').take(gap_len - 2));
        pdf.push(b'>');
        pdf.extend(std::iter::repeat(b'x').take(tail_len));
        pdf
    }

    #[test]
    fn test_read_last_byte_range() {
        let pdf = b"junk /ByteRange [0 10 20 5] more junk";
        assert_eq!(read_last_byte_range(pdf), Some(vec![0, 10, 20, 5]));

        let two = b"/ByteRange [0 1 2 3] ... /ByteRange [0 7 9 11]";
        assert_eq!(read_last_byte_range(two), Some(vec![0, 7, 9, 11]));

        assert_eq!(read_last_byte_range(b"no signature here"), None);
    }

    #[test]
    fn test_deferred_injects_hex_and_padding() {
        let pdf = synthetic_pdf(22, 7);
        let container = FixedContainer {
            bytes: vec![0xDE, 0xAD, 0xBE, 0xEF],
        };

        let mut out = Vec::new();
        sign_deferred(&pdf, &container, &mut out).unwrap();

        assert_eq!(out.len(), pdf.len());
        let range = read_last_byte_range(&pdf).unwrap();
        let gap_start = (range[0] + range[1]) as usize;
        let gap_end = range[2] as usize;

        // Bytes outside the gap are unchanged
        assert_eq!(&out[..gap_start], &pdf[..gap_start]);
        assert_eq!(&out[gap_end..], &pdf[gap_end..]);

        // Gap holds the hex signature, zero-padded
        assert_eq!(&out[gap_start..gap_end], b"<DEADBEEF000000000000>");
    }

    #[test]
    fn test_deferred_is_idempotent() {
        let pdf = synthetic_pdf(34, 11);
        let container = FixedContainer {
            bytes: vec![0x01, 0x02, 0x03],
        };

        let mut first = Vec::new();
        sign_deferred(&pdf, &container, &mut first).unwrap();
        let mut second = Vec::new();
        sign_deferred(&pdf, &container, &mut second).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_non_last_signature_rejected() {
        let mut pdf = synthetic_pdf(22, 7);
        // An incremental update after the signature breaks coverage
        pdf.extend_from_slice(b"\nappended update\n");

        let container = FixedContainer { bytes: vec![0x01] };
        let mut out = Vec::new();
        let err = sign_deferred(&pdf, &container, &mut out).unwrap_err();
        assert!(matches!(err, SignatureError::NotLastSignature));
    }

    #[test]
    fn test_odd_gap_rejected() {
        let pdf = synthetic_pdf(21, 7);
        let container = FixedContainer { bytes: vec![0x01] };
        let mut out = Vec::new();
        let err = sign_deferred(&pdf, &container, &mut out).unwrap_err();
        assert!(matches!(err, SignatureError::GapNotEven));
    }

    #[test]
    fn test_oversized_signature_rejected() {
        let pdf = synthetic_pdf(10, 7);
        let container = FixedContainer {
            bytes: vec![0xFF; 5],
        };
        let mut out = Vec::new();
        let err = sign_deferred(&pdf, &container, &mut out).unwrap_err();
        assert!(matches!(err, SignatureError::InsufficientSpace));
    }

    #[test]
    fn test_missing_signature_rejected() {
        let container = FixedContainer { bytes: vec![0x01] };
        let mut out = Vec::new();
        let err = sign_deferred(b"%PDF-1.7 plain", &container, &mut out).unwrap_err();
        assert!(matches!(err, SignatureError::NotLastSignature));
    }
}
