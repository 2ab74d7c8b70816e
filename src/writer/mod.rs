//! PDF file writing functionality.

mod serializer;

pub use serializer::{RecordedPlaceholder, Serializer};

use crate::error::{PdfResult, WriterError};
use crate::object::Object;
use crate::types::ObjectId;
use std::io::Write;

/// A PDF writer that manages object allocation and file output.
pub struct PdfWriter<W: Write> {
    serializer: Serializer<W>,
    next_object_number: u32,
    version: String,
}

impl<W: Write> PdfWriter<W> {
    /// Creates a new PDF writer with the given output.
    pub fn new(writer: W, version: &str) -> Self {
        Self {
            serializer: Serializer::new(writer),
            next_object_number: 1,
            version: version.to_string(),
        }
    }

    /// Allocates the next object ID.
    pub fn allocate_id(&mut self) -> ObjectId {
        let id = ObjectId::new(self.next_object_number);
        self.next_object_number += 1;
        id
    }

    /// Returns the next object number that will be allocated.
    pub fn peek_next_id(&self) -> u32 {
        self.next_object_number
    }

    /// Returns the current output position.
    pub fn position(&self) -> u64 {
        self.serializer.position()
    }

    /// Takes the placeholder literal records emitted so far.
    ///
    /// Offsets are final file offsets; the writer never rearranges
    /// bytes after emitting them.
    pub fn take_placeholders(&mut self) -> Vec<RecordedPlaceholder> {
        self.serializer.take_placeholders()
    }

    /// Writes the PDF header.
    pub fn write_header(&mut self) -> PdfResult<()> {
        self.serializer
            .write_header(&self.version)
            .map_err(|e| WriterError::Structure(e.to_string()))?;
        Ok(())
    }

    /// Writes an object, recording its offset for the cross-reference
    /// section.
    ///
    /// Returns the object ID.
    pub fn write_object(&mut self, object: &Object) -> PdfResult<ObjectId> {
        let id = self.allocate_id();
        self.write_object_with_id(id, object)?;
        Ok(id)
    }

    /// Writes an object with a specific ID.
    pub fn write_object_with_id(&mut self, id: ObjectId, object: &Object) -> PdfResult<()> {
        self.serializer
            .write_object(id, object)
            .map_err(|e| WriterError::Structure(e.to_string()))?;
        Ok(())
    }

    /// Writes the cross-reference section, trailer, and EOF.
    pub fn write_trailer(&mut self, root_id: ObjectId, info_id: Option<ObjectId>) -> PdfResult<()> {
        let size = self.serializer.object_count();

        let xref_offset = self
            .serializer
            .write_cross_reference()
            .map_err(|e| WriterError::Structure(e.to_string()))?;

        self.serializer
            .write_trailer(size, root_id, info_id)
            .map_err(|e| WriterError::Structure(e.to_string()))?;

        self.serializer
            .write_startxref(xref_offset)
            .map_err(|e| WriterError::Structure(e.to_string()))?;

        self.serializer
            .flush()
            .map_err(|e| WriterError::Structure(e.to_string()))?;

        Ok(())
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.serializer.into_inner()
    }
}

impl PdfWriter<Vec<u8>> {
    /// Creates a writer backed by an in-memory buffer.
    pub fn create_memory(version: &str) -> Self {
        Self::new(Vec::new(), version)
    }

    /// Consumes the writer and returns the emitted bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{PdfDictionary, PdfName};

    #[test]
    fn test_ids_allocated_sequentially() {
        let mut writer = PdfWriter::create_memory("1.7");
        assert_eq!(writer.allocate_id().number, 1);
        assert_eq!(writer.allocate_id().number, 2);
        assert_eq!(writer.peek_next_id(), 3);
    }

    #[test]
    fn test_write_minimal_pdf() {
        let mut writer = PdfWriter::create_memory("1.7");
        writer.write_header().unwrap();

        let mut catalog = PdfDictionary::new();
        catalog.set("Type", Object::Name(PdfName::catalog()));
        let catalog_id = writer.write_object(&Object::Dictionary(catalog)).unwrap();

        writer.write_trailer(catalog_id, None).unwrap();

        let content = String::from_utf8_lossy(&writer.into_bytes()).into_owned();
        for expected in [
            "%PDF-1.7",
            "/Type /Catalog",
            "xref\n0 2\n",
            "trailer",
            "/Size 2",
            "%%EOF",
        ] {
            assert!(content.contains(expected), "missing {:?}", expected);
        }
    }

    #[test]
    fn test_startxref_points_at_cross_reference() {
        let mut writer = PdfWriter::create_memory("1.7");
        writer.write_header().unwrap();
        let catalog_id = writer.write_object(&Object::Dictionary(PdfDictionary::new())).unwrap();
        writer.write_trailer(catalog_id, None).unwrap();

        let bytes = writer.into_bytes();
        let content = String::from_utf8_lossy(&bytes);

        let start = content
            .lines()
            .skip_while(|line| *line != "startxref")
            .nth(1)
            .and_then(|line| line.parse::<usize>().ok())
            .unwrap();
        assert!(bytes[start..].starts_with(b"xref\n"));
    }
}
