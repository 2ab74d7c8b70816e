//! PDF Document Information Dictionary.

use crate::object::{Object, PdfDictionary, PdfString};

/// Document metadata (Info dictionary).
///
/// Only the entries a signing workflow actually sets are modeled;
/// metadata management beyond that is out of scope for this crate.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    /// `/Title` entry.
    pub title: Option<String>,
    /// `/Author` entry.
    pub author: Option<String>,
    /// `/Producer` entry, typically the signing application.
    pub producer: Option<String>,
}

impl DocumentInfo {
    /// Creates an empty info dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `/Title` entry.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the `/Author` entry.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Sets the `/Producer` entry.
    pub fn producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = Some(producer.into());
        self
    }

    /// Returns true if all fields are empty.
    pub fn is_empty(&self) -> bool {
        self.entries().all(|(_, value)| value.is_none())
    }

    /// Converts the document info to a PDF dictionary.
    pub fn to_dictionary(&self) -> PdfDictionary {
        let mut dict = PdfDictionary::new();
        for (key, value) in self.entries() {
            if let Some(value) = value {
                dict.set(key, Object::String(PdfString::literal(value)));
            }
        }
        dict
    }

    fn entries(&self) -> impl Iterator<Item = (&'static str, &Option<String>)> {
        [
            ("Title", &self.title),
            ("Author", &self.author),
            ("Producer", &self.producer),
        ]
        .into_iter()
    }
}
