//! Form field types.

use crate::types::Rectangle;
use super::FieldLock;
use bitflags::bitflags;

/// Form field kind enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Digital signature field.
    Signature,
    /// Text input field.
    Text,
}

impl FieldKind {
    /// Returns the PDF field type name (`/FT` value).
    pub fn pdf_type(&self) -> &'static str {
        match self {
            FieldKind::Signature => "Sig",
            FieldKind::Text => "Tx",
        }
    }
}

bitflags! {
    /// Field flags as defined in the PDF specification (`/Ff`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldFlags: u32 {
        /// Field is read-only.
        const READ_ONLY = 1 << 0;
        /// Field is required.
        const REQUIRED = 1 << 1;
        /// Field should not be exported.
        const NO_EXPORT = 1 << 2;
    }
}

bitflags! {
    /// Annotation flags (`/F`) on the field's widget.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AnnotationFlags: u32 {
        /// Annotation is invisible if its handler is unknown.
        const INVISIBLE = 1 << 0;
        /// Annotation is hidden.
        const HIDDEN = 1 << 1;
        /// Annotation is printed with the page.
        const PRINT = 1 << 2;
        /// Annotation may not be deleted or repositioned.
        const LOCKED = 1 << 7;
    }
}

impl Default for FieldFlags {
    fn default() -> Self {
        FieldFlags::empty()
    }
}

impl Default for AnnotationFlags {
    fn default() -> Self {
        AnnotationFlags::PRINT
    }
}

/// A form field held by a document.
///
/// The signing layer binds a signature dictionary to one of these, or
/// creates one on the fly when the configured name does not exist yet.
#[derive(Debug, Clone)]
pub struct FormField {
    /// Field name (unique identifier, no `.`).
    pub name: String,
    /// Field kind.
    pub kind: FieldKind,
    /// Index of the page carrying the field's widget.
    pub page_index: usize,
    /// Widget position and size.
    pub rect: Rectangle,
    /// Whether a `/V` entry is already present.
    pub signed: bool,
    /// Lock dictionary attached to the field, if any.
    pub lock: Option<FieldLock>,
}

impl FormField {
    /// Creates an unsigned signature field.
    pub fn signature(name: impl Into<String>, page_index: usize, rect: Rectangle) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Signature,
            page_index,
            rect,
            signed: false,
            lock: None,
        }
    }

    /// Attaches a lock dictionary to the field.
    pub fn with_lock(mut self, lock: FieldLock) -> Self {
        self.lock = Some(lock);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_kind_pdf_type() {
        assert_eq!(FieldKind::Signature.pdf_type(), "Sig");
        assert_eq!(FieldKind::Text.pdf_type(), "Tx");
    }

    #[test]
    fn test_annotation_flags_print_locked() {
        let flags = AnnotationFlags::PRINT | AnnotationFlags::LOCKED;
        assert_eq!(flags.bits(), 4 | 128);
    }

    #[test]
    fn test_signature_field_unsigned() {
        let field = FormField::signature("Signature1", 0, Rectangle::new(0.0, 0.0, 100.0, 40.0));
        assert_eq!(field.kind, FieldKind::Signature);
        assert!(!field.signed);
        assert!(field.lock.is_none());
    }
}
