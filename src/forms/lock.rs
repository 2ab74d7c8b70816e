//! Signature field lock dictionaries.

use crate::object::{Object, PdfArray, PdfDictionary, PdfName, PdfString};

/// Which fields a signature freezes once it is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockAction {
    /// All fields in the document.
    All,
    /// Only the named fields.
    Include,
    /// All fields except the named ones.
    Exclude,
}

impl LockAction {
    /// Returns the PDF name for the action.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            LockAction::All => "All",
            LockAction::Include => "Include",
            LockAction::Exclude => "Exclude",
        }
    }
}

/// A signature field lock (`/SigFieldLock`).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLock {
    /// Which fields the lock applies to.
    pub action: LockAction,
    /// Field names, ignored when `action` is `All`.
    pub fields: Vec<String>,
}

impl FieldLock {
    /// Locks every field in the document.
    pub fn all() -> Self {
        Self {
            action: LockAction::All,
            fields: Vec::new(),
        }
    }

    /// Locks only the given fields.
    pub fn include(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            action: LockAction::Include,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Locks everything except the given fields.
    pub fn exclude(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            action: LockAction::Exclude,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds the `/Lock` dictionary attached to the signature field.
    pub fn to_dictionary(&self) -> PdfDictionary {
        let mut dict = PdfDictionary::new();
        dict.set("Type", Object::Name(PdfName::new_unchecked("SigFieldLock")));
        dict.set(
            "Action",
            Object::Name(PdfName::new_unchecked(self.action.pdf_name())),
        );
        if self.action != LockAction::All {
            let mut fields = PdfArray::new();
            for name in &self.fields {
                fields.push(Object::String(PdfString::literal(name)));
            }
            dict.set("Fields", Object::Array(fields));
        }
        dict
    }

    /// Merges the lock into FieldMDP `/TransformParams` entries.
    pub fn transform_params(&self) -> PdfDictionary {
        let mut params = PdfDictionary::new();
        params.set("Type", Object::Name(PdfName::new_unchecked("TransformParams")));
        params.set(
            "Action",
            Object::Name(PdfName::new_unchecked(self.action.pdf_name())),
        );
        if self.action != LockAction::All {
            let mut fields = PdfArray::new();
            for name in &self.fields {
                fields.push(Object::String(PdfString::literal(name)));
            }
            params.set("Fields", Object::Array(fields));
        }
        params.set("V", Object::Name(PdfName::new_unchecked("1.2")));
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_all_has_no_fields_entry() {
        let dict = FieldLock::all().to_dictionary();
        assert!(dict.get("Fields").is_none());
        assert!(dict.to_pdf_string().contains("/Action /All"));
    }

    #[test]
    fn test_lock_include_lists_fields() {
        let dict = FieldLock::include(["Total", "Date"]).to_dictionary();
        let out = dict.to_pdf_string();
        assert!(out.contains("/Action /Include"));
        assert!(out.contains("(Total)"));
        assert!(out.contains("(Date)"));
    }

    #[test]
    fn test_transform_params_carry_version() {
        let params = FieldLock::exclude(["Comments"]).transform_params();
        let out = params.to_pdf_string();
        assert!(out.contains("/Type /TransformParams"));
        assert!(out.contains("/V /1.2"));
        assert!(out.contains("/Action /Exclude"));
    }
}
