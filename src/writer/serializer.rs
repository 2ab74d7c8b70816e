//! PDF object serialization.

use crate::object::{Object, PdfDictionary};
use crate::types::ObjectId;
use std::io::{self, Write};

/// A placeholder literal recorded during serialization: key, absolute
/// file offset of its first byte, and its width in bytes.
pub type RecordedPlaceholder = (String, u64, usize);

/// Serializes PDF objects to bytes.
///
/// Objects are written by walking the object tree so that the byte
/// position of every reserved literal is known at the moment it is
/// emitted. The reported offsets are final: nothing downstream
/// rearranges emitted bytes. The start offset of every indirect object
/// is recorded the same way and rendered into the cross-reference
/// section at the end.
pub struct Serializer<W: Write> {
    writer: W,
    position: u64,
    placeholders: Vec<RecordedPlaceholder>,
    object_offsets: Vec<(ObjectId, u64)>,
}

impl<W: Write> Serializer<W> {
    /// Creates a new serializer wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            position: 0,
            placeholders: Vec::new(),
            object_offsets: Vec::new(),
        }
    }

    /// Returns the current byte position.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Takes the placeholder records accumulated so far.
    pub fn take_placeholders(&mut self) -> Vec<RecordedPlaceholder> {
        std::mem::take(&mut self.placeholders)
    }

    /// Returns the cross-reference size: highest object number plus one.
    pub fn object_count(&self) -> u32 {
        self.object_offsets
            .iter()
            .map(|(id, _)| id.number + 1)
            .max()
            .unwrap_or(1)
    }

    /// Writes bytes and updates the position.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    /// Writes a string and updates the position.
    pub fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.write_bytes(s.as_bytes())
    }

    /// Writes a newline.
    pub fn write_newline(&mut self) -> io::Result<()> {
        self.write_bytes(b"\n")
    }

    /// Writes the PDF header.
    pub fn write_header(&mut self, version: &str) -> io::Result<()> {
        self.write_str(&format!("%PDF-{}\n", version))?;
        // Binary marker (high-bit bytes) so transports treat the file as binary
        self.write_bytes(b"%\xE2\xE3\xCF\xD3\n")?;
        Ok(())
    }

    /// Writes an indirect object definition.
    ///
    /// Returns the byte offset where the object starts.
    pub fn write_object(&mut self, id: ObjectId, object: &Object) -> io::Result<u64> {
        let offset = self.position;
        self.object_offsets.push((id, offset));

        self.write_str(&format!("{} {} obj\n", id.number, id.generation))?;
        self.write_value(object)?;
        self.write_newline()?;
        self.write_str("endobj\n")?;

        Ok(offset)
    }

    /// Writes an object value, recursing into containers.
    ///
    /// Reserved literals are recorded with the offset they land at.
    fn write_value(&mut self, object: &Object) -> io::Result<()> {
        match object {
            Object::Dictionary(dict) => self.write_dictionary(dict),
            Object::Array(array) => {
                self.write_str("[")?;
                for (i, element) in array.iter().enumerate() {
                    if i > 0 {
                        self.write_str(" ")?;
                    }
                    self.write_value(element)?;
                }
                self.write_str("]")
            }
            Object::Reserved(reserved) => {
                self.placeholders.push((
                    reserved.key.as_str().to_string(),
                    self.position,
                    reserved.width,
                ));
                self.write_str(&reserved.fill_string())
            }
            other => self.write_str(&other.to_pdf_string()),
        }
    }

    fn write_dictionary(&mut self, dict: &PdfDictionary) -> io::Result<()> {
        self.write_str("<<")?;
        for (key, value) in dict.iter() {
            self.write_str(" ")?;
            self.write_str(&PdfDictionary::escaped_key(key))?;
            self.write_str(" ")?;
            self.write_value(value)?;
        }
        self.write_str(" >>")
    }

    /// Writes the cross-reference section over every object emitted so
    /// far and returns its start offset.
    ///
    /// Each entry is exactly 20 bytes: ten-digit offset, five-digit
    /// generation, entry kind, space, newline. Object 0 heads the free
    /// list; numbers with no recorded offset are emitted as free so the
    /// section stays contiguous.
    pub fn write_cross_reference(&mut self) -> io::Result<u64> {
        let start = self.position;
        let size = self.object_count();

        let mut entries: Vec<Option<(u64, u16)>> = vec![None; size as usize];
        for &(id, offset) in &self.object_offsets {
            entries[id.number as usize] = Some((offset, id.generation));
        }

        let mut section = format!("xref\n0 {}\n", size);
        section.push_str("0000000000 65535 f \n");
        for entry in entries.iter().skip(1) {
            match entry {
                Some((offset, generation)) => {
                    section.push_str(&format!("{:010} {:05} n \n", offset, generation));
                }
                None => section.push_str("0000000000 65535 f \n"),
            }
        }

        self.write_str(&section)?;
        Ok(start)
    }

    /// Writes the trailer dictionary.
    pub fn write_trailer(
        &mut self,
        size: u32,
        root_id: ObjectId,
        info_id: Option<ObjectId>,
    ) -> io::Result<()> {
        self.write_str("trailer\n")?;
        self.write_str("<< ")?;
        self.write_str(&format!("/Size {} ", size))?;
        self.write_str(&format!("/Root {} ", root_id))?;

        if let Some(info) = info_id {
            self.write_str(&format!("/Info {} ", info))?;
        }

        self.write_str(">>\n")?;

        Ok(())
    }

    /// Writes the startxref pointer and the EOF marker.
    pub fn write_startxref(&mut self, xref_offset: u64) -> io::Result<()> {
        self.write_str(&format!("startxref\n{}\n%%EOF\n", xref_offset))
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Unwraps the serializer, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{PdfDictionary, PdfName, ReservedLiteral};
    use crate::types::ObjectId;

    /// Serializes one object and returns the emitted bytes.
    fn emit(object: &Object) -> Vec<u8> {
        let mut buffer = Vec::new();
        let mut serializer = Serializer::new(&mut buffer);
        serializer.write_object(ObjectId::new(1), object).unwrap();
        buffer
    }

    #[test]
    fn test_header_carries_binary_marker() {
        let mut buffer = Vec::new();
        Serializer::new(&mut buffer).write_header("1.7").unwrap();

        assert!(buffer.starts_with(b"%PDF-1.7\n%"));
        // Four high-bit bytes follow the second percent sign
        assert!(buffer[10..14].iter().all(|&b| b > 0x7F));
    }

    #[test]
    fn test_object_wrapped_in_obj_endobj() {
        let output = emit(&Object::Integer(42));
        assert_eq!(output, b"1 0 obj\n42\nendobj\n");
    }

    #[test]
    fn test_dictionary_streams_keys_and_values() {
        let mut dict = PdfDictionary::new();
        dict.set("Type", Object::Name(PdfName::catalog()));

        let output = emit(&Object::Dictionary(dict));
        assert!(String::from_utf8_lossy(&output).contains("/Type /Catalog"));
    }

    #[test]
    fn test_position_tracking() {
        let mut buffer = Vec::new();
        let mut serializer = Serializer::new(&mut buffer);

        assert_eq!(serializer.position(), 0);
        serializer.write_str("Hello").unwrap();
        assert_eq!(serializer.position(), 5);
    }

    #[test]
    fn test_reserved_offsets_recorded() {
        let mut buffer = Vec::new();
        let mut serializer = Serializer::new(&mut buffer);

        let mut dict = PdfDictionary::new();
        dict.set("ByteRange", Object::Reserved(ReservedLiteral::whitespace("ByteRange", 80)));
        dict.set("Contents", Object::Reserved(ReservedLiteral::hex_string("Contents", 18)));

        serializer
            .write_object(ObjectId::new(3), &Object::Dictionary(dict))
            .unwrap();

        let placeholders = serializer.take_placeholders();
        assert_eq!(placeholders.len(), 2);

        let (name, offset, len) = &placeholders[0];
        assert_eq!(name, "ByteRange");
        assert_eq!(*len, 80);
        assert_eq!(&buffer[*offset as usize..*offset as usize + *len], " ".repeat(80).as_bytes());

        let (name, offset, len) = &placeholders[1];
        assert_eq!(name, "Contents");
        assert_eq!(*len, 18);
        assert_eq!(buffer[*offset as usize], b'<');
        assert_eq!(buffer[*offset as usize + *len - 1], b'>');
    }

    #[test]
    fn test_streamed_dictionary_matches_to_pdf_string() {
        let mut dict = PdfDictionary::new();
        dict.set("Type", Object::Name(PdfName::new_unchecked("Sig")));
        dict.set("Count", Object::Integer(3));
        let object = Object::Dictionary(dict);

        let mut buffer = Vec::new();
        let mut serializer = Serializer::new(&mut buffer);
        serializer.write_object(ObjectId::new(1), &object).unwrap();

        let output = String::from_utf8_lossy(&buffer);
        assert!(output.contains(&object.to_pdf_string()));
    }

    #[test]
    fn test_cross_reference_entries_are_twenty_bytes() {
        let mut buffer = Vec::new();
        let mut serializer = Serializer::new(&mut buffer);

        let first = serializer.write_object(ObjectId::new(1), &Object::Integer(1)).unwrap();
        let second = serializer.write_object(ObjectId::new(2), &Object::Integer(2)).unwrap();
        let start = serializer.write_cross_reference().unwrap();

        assert_eq!(serializer.object_count(), 3);

        let section = String::from_utf8_lossy(&buffer[start as usize..]);
        let mut lines = section.lines();
        assert_eq!(lines.next(), Some("xref"));
        assert_eq!(lines.next(), Some("0 3"));
        assert_eq!(lines.next(), Some("0000000000 65535 f "));
        assert_eq!(lines.next(), Some(format!("{:010} 00000 n ", first).as_str()));
        assert_eq!(lines.next(), Some(format!("{:010} 00000 n ", second).as_str()));
    }

    #[test]
    fn test_cross_reference_fills_gaps_as_free() {
        let mut buffer = Vec::new();
        let mut serializer = Serializer::new(&mut buffer);

        serializer.write_object(ObjectId::new(2), &Object::Null).unwrap();
        let start = serializer.write_cross_reference().unwrap();

        let section = String::from_utf8_lossy(&buffer[start as usize..]);
        // Object 1 was never written, so its slot stays free
        assert_eq!(section.lines().nth(2), Some("0000000000 65535 f "));
        assert_eq!(section.lines().nth(3), Some("0000000000 65535 f "));
    }
}
