//! PDF Document structure and building.

mod info;
mod version;

pub use info::DocumentInfo;
pub use version::PdfVersion;

use crate::error::{DocumentError, FormError, PdfResult};
use crate::forms::{AnnotationFlags, FieldFlags, FieldKind, FormField};
use crate::object::{Object, PdfArray, PdfDictionary, PdfName, PdfString};
use crate::page::Page;
use crate::types::{ObjectId, Rectangle};
use crate::writer::PdfWriter;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A PDF document awaiting signing (or plain serialization).
#[derive(Debug)]
pub struct Document {
    /// PDF version.
    pub version: PdfVersion,
    /// Document metadata.
    pub info: DocumentInfo,
    /// Pages in the document.
    pub pages: Vec<Page>,
    /// Interactive form fields.
    pub fields: Vec<FormField>,
}

impl Document {
    /// Creates a new document with default settings.
    pub fn new() -> Self {
        Self {
            version: PdfVersion::default(),
            info: DocumentInfo::new(),
            pages: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Adds a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Returns the number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Adds an empty signature field at the given page and rectangle.
    pub fn add_signature_field(
        &mut self,
        name: impl Into<String>,
        page_index: usize,
        rect: Rectangle,
    ) -> PdfResult<()> {
        let name = name.into();
        if page_index >= self.pages.len() {
            return Err(DocumentError::PageOutOfRange(page_index).into());
        }
        if self.fields.iter().any(|f| f.name == name) {
            return Err(FormError::DuplicateFieldName(name).into());
        }
        self.fields.push(FormField::signature(name, page_index, rect));
        Ok(())
    }

    /// Looks up a form field by name.
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the first field name of the form `Signature<k>` not yet
    /// taken, for the smallest positive k.
    pub fn next_signature_name(&self) -> String {
        let mut k = 1usize;
        loop {
            let candidate = format!("Signature{}", k);
            if self.field(&candidate).is_none() {
                return candidate;
            }
            k += 1;
        }
    }

    /// Saves the document to a file, unsigned.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> PdfResult<()> {
        if self.pages.is_empty() {
            return Err(DocumentError::NoPages.into());
        }

        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        self.write_to(writer)
    }

    /// Saves the document to a byte vector, unsigned.
    pub fn save_to_bytes(&self) -> PdfResult<Vec<u8>> {
        if self.pages.is_empty() {
            return Err(DocumentError::NoPages.into());
        }

        let buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(buffer);
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Writes the document to any writer, without a signature.
    pub fn write_to<W: Write>(&self, writer: W) -> PdfResult<()> {
        let mut pdf_writer = PdfWriter::new(writer, self.version.as_str());

        pdf_writer.write_header()?;

        // Allocate object IDs for structure
        let catalog_id = pdf_writer.allocate_id();
        let pages_id = pdf_writer.allocate_id();
        let page_ids: Vec<ObjectId> = self.pages.iter().map(|_| pdf_writer.allocate_id()).collect();
        let field_ids: Vec<ObjectId> = self.fields.iter().map(|_| pdf_writer.allocate_id()).collect();

        let acroform_id = if self.fields.is_empty() {
            None
        } else {
            Some(pdf_writer.allocate_id())
        };

        let info_id = if self.info.is_empty() {
            None
        } else {
            Some(pdf_writer.allocate_id())
        };

        // Write catalog
        let mut catalog = PdfDictionary::new();
        catalog.set("Type", Object::Name(PdfName::catalog()));
        catalog.set("Pages", Object::Reference(pages_id));
        if let Some(acroform_id) = acroform_id {
            catalog.set("AcroForm", Object::Reference(acroform_id));
        }
        pdf_writer.write_object_with_id(catalog_id, &Object::Dictionary(catalog))?;

        // Write pages tree
        let mut pages_dict = PdfDictionary::new();
        pages_dict.set("Type", Object::Name(PdfName::pages()));
        pages_dict.set(
            "Kids",
            Object::Array(PdfArray::references(page_ids.iter().copied())),
        );
        pages_dict.set("Count", Object::Integer(self.pages.len() as i64));
        pdf_writer.write_object_with_id(pages_id, &Object::Dictionary(pages_dict))?;

        // Write each page
        for (i, page) in self.pages.iter().enumerate() {
            let mut page_dict = PdfDictionary::new();
            page_dict.set("Type", Object::Name(PdfName::page()));
            page_dict.set("Parent", Object::Reference(pages_id));

            page_dict.set(
                "MediaBox",
                Object::Array(PdfArray::reals(page.media_box.to_array())),
            );

            let annots = PdfArray::references(
                self.fields
                    .iter()
                    .zip(&field_ids)
                    .filter(|(f, _)| f.page_index == i)
                    .map(|(_, id)| *id),
            );
            if !annots.is_empty() {
                page_dict.set("Annots", Object::Array(annots));
            }

            pdf_writer.write_object_with_id(page_ids[i], &Object::Dictionary(page_dict))?;
        }

        // Write field widgets
        for (field, &field_id) in self.fields.iter().zip(&field_ids) {
            let dict = field_widget_dictionary(field, page_ids[field.page_index], None);
            pdf_writer.write_object_with_id(field_id, &Object::Dictionary(dict))?;
        }

        // Write AcroForm dictionary if fields exist
        if let Some(acroform_id) = acroform_id {
            let mut acroform = PdfDictionary::new();
            acroform.set(
                "Fields",
                Object::Array(PdfArray::references(field_ids.iter().copied())),
            );
            pdf_writer.write_object_with_id(acroform_id, &Object::Dictionary(acroform))?;
        }

        // Write info dictionary if present
        if let Some(info_id) = info_id {
            let info_dict = self.info.to_dictionary();
            pdf_writer.write_object_with_id(info_id, &Object::Dictionary(info_dict))?;
        }

        pdf_writer.write_trailer(catalog_id, info_id)?;

        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the widget annotation dictionary for a form field.
///
/// `value` is the indirect reference bound as `/V` (the signature
/// dictionary, once signing attaches one).
pub(crate) fn field_widget_dictionary(
    field: &FormField,
    page_id: ObjectId,
    value: Option<ObjectId>,
) -> PdfDictionary {
    let mut dict = PdfDictionary::new();
    dict.set("Type", Object::Name(PdfName::new_unchecked("Annot")));
    dict.set("Subtype", Object::Name(PdfName::new_unchecked("Widget")));
    dict.set("FT", Object::Name(PdfName::new_unchecked(field.kind.pdf_type())));
    dict.set("T", Object::String(PdfString::literal(&field.name)));
    dict.set("P", Object::Reference(page_id));

    dict.set("Rect", Object::Array(PdfArray::reals(field.rect.to_array())));

    let flags = if value.is_some() {
        AnnotationFlags::PRINT | AnnotationFlags::LOCKED
    } else {
        AnnotationFlags::PRINT
    };
    dict.set("F", Object::Integer(flags.bits() as i64));

    if let Some(value_id) = value {
        dict.set("V", Object::Reference(value_id));
    }
    if let Some(lock) = &field.lock {
        dict.set("Lock", Object::Dictionary(lock.to_dictionary()));
    }
    if field.kind == FieldKind::Signature {
        let ff = if value.is_some() {
            FieldFlags::READ_ONLY
        } else {
            FieldFlags::empty()
        };
        dict.set("Ff", Object::Integer(ff.bits() as i64));
    }

    dict
}

/// Builder for creating PDF documents.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    version: PdfVersion,
    info: DocumentInfo,
    pages: Vec<Page>,
    fields: Vec<FormField>,
}

impl DocumentBuilder {
    /// Creates a new document builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the PDF version.
    pub fn version(mut self, version: PdfVersion) -> Self {
        self.version = version;
        self
    }

    /// Sets the document title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.info.title = Some(title.into());
        self
    }

    /// Sets the document author.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.info.author = Some(author.into());
        self
    }

    /// Sets the producer application.
    pub fn producer(mut self, producer: impl Into<String>) -> Self {
        self.info.producer = Some(producer.into());
        self
    }

    /// Sets the document info.
    pub fn info(mut self, info: DocumentInfo) -> Self {
        self.info = info;
        self
    }

    /// Adds a page to the document.
    pub fn page(mut self, page: Page) -> Self {
        self.pages.push(page);
        self
    }

    /// Adds multiple pages to the document.
    pub fn pages(mut self, pages: impl IntoIterator<Item = Page>) -> Self {
        self.pages.extend(pages);
        self
    }

    /// Adds an empty signature field on the given page.
    pub fn signature_field(
        mut self,
        name: impl Into<String>,
        page_index: usize,
        rect: Rectangle,
    ) -> Self {
        self.fields.push(FormField::signature(name, page_index, rect));
        self
    }

    /// Builds the document.
    ///
    /// Returns an error if no pages have been added.
    pub fn build(self) -> PdfResult<Document> {
        if self.pages.is_empty() {
            return Err(DocumentError::NoPages.into());
        }
        for field in &self.fields {
            if field.page_index >= self.pages.len() {
                return Err(DocumentError::PageOutOfRange(field.page_index).into());
            }
        }

        Ok(Document {
            version: self.version,
            info: self.info,
            pages: self.pages,
            fields: self.fields,
        })
    }
}
