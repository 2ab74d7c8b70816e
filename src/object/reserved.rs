//! Reserved literals of exact byte width.

use super::PdfName;

/// How a reserved literal is rendered before it is overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedKind {
    /// A hexadecimal string: `<` followed by ASCII zeros and `>`.
    /// The recorded window covers the delimiters.
    HexString,
    /// A run of spaces, later replaced by a token of the same width.
    Whitespace,
}

/// A placeholder value in a dictionary whose final bytes are deferred.
///
/// The serializer emits exactly `width` bytes for it and reports the
/// file offset of the first byte, so the signer can seek back and
/// overwrite the span without changing the file length.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservedLiteral {
    /// The dictionary key this literal stands in for.
    pub key: PdfName,
    /// Total width in bytes, delimiters included.
    pub width: usize,
    /// Rendering of the unfilled span.
    pub kind: ReservedKind,
}

impl ReservedLiteral {
    /// Creates a reserved hexadecimal string of `width` total bytes.
    ///
    /// The payload capacity is `(width - 2) / 2` octets; the two extra
    /// bytes are the `<` and `>` delimiters.
    pub fn hex_string(key: impl Into<String>, width: usize) -> Self {
        debug_assert!(width >= 2);
        Self {
            key: PdfName::new_unchecked(key),
            width,
            kind: ReservedKind::HexString,
        }
    }

    /// Creates a reserved whitespace run of `width` bytes.
    pub fn whitespace(key: impl Into<String>, width: usize) -> Self {
        Self {
            key: PdfName::new_unchecked(key),
            width,
            kind: ReservedKind::Whitespace,
        }
    }

    /// Returns the unfilled rendering, exactly `width` bytes long.
    pub fn fill_string(&self) -> String {
        match self.kind {
            ReservedKind::HexString => {
                let mut s = String::with_capacity(self.width);
                s.push('<');
                for _ in 0..self.width - 2 {
                    s.push('0');
                }
                s.push('>');
                s
            }
            ReservedKind::Whitespace => " ".repeat(self.width),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_fill() {
        let r = ReservedLiteral::hex_string("Contents", 10);
        assert_eq!(r.fill_string(), "<00000000>");
    }

    #[test]
    fn test_whitespace_fill() {
        let r = ReservedLiteral::whitespace("ByteRange", 4);
        assert_eq!(r.fill_string(), "    ");
        assert_eq!(r.fill_string().len(), r.width);
    }
}
