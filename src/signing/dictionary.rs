//! The signature dictionary and its cross-references.

use crate::document::PdfVersion;
use crate::forms::FieldLock;
use crate::object::{Object, PdfArray, PdfDictionary, PdfName, PdfString, ReservedLiteral};
use crate::types::ObjectId;
use chrono::{DateTime, Utc};
use super::filters;
use super::placeholder::{BYTE_RANGE_KEY, BYTE_RANGE_RESERVED_LEN};
use super::CertificationLevel;

/// The in-progress `/Sig` (or `/DocTimeStamp`) dictionary.
///
/// Typed setters cover the standard entries; arbitrary entries can be
/// added through [`SignatureDictionary::set`] by signature events and
/// external containers.
#[derive(Debug, Clone)]
pub struct SignatureDictionary {
    dict: PdfDictionary,
}

impl SignatureDictionary {
    /// Creates an approval/certification signature dictionary.
    pub fn signature(sub_filter: &str) -> Self {
        let mut dict = PdfDictionary::new();
        dict.set("Type", Object::Name(PdfName::new_unchecked("Sig")));
        dict.set("Filter", Object::Name(PdfName::new_unchecked(filters::ADOBE_PPKLITE)));
        dict.set("SubFilter", Object::Name(PdfName::new_unchecked(sub_filter)));
        Self { dict }
    }

    /// Creates a document timestamp dictionary.
    ///
    /// Timestamps carry no reason, location, or signing date; the time
    /// assertion lives inside the RFC 3161 token.
    pub fn timestamp() -> Self {
        let mut dict = PdfDictionary::new();
        dict.set("Type", Object::Name(PdfName::new_unchecked("DocTimeStamp")));
        dict.set("Filter", Object::Name(PdfName::new_unchecked(filters::ADOBE_PPKLITE)));
        dict.set(
            "SubFilter",
            Object::Name(PdfName::new_unchecked(filters::SUB_FILTER_RFC3161)),
        );
        Self { dict }
    }

    /// Sets an arbitrary entry.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Object>) {
        self.dict.set(key, value);
    }

    /// Returns an entry.
    pub fn get(&self, key: &str) -> Option<&Object> {
        self.dict.get(key)
    }

    /// Sets the `/SubFilter` name.
    pub fn set_sub_filter(&mut self, sub_filter: &str) {
        self.dict
            .set("SubFilter", Object::Name(PdfName::new_unchecked(sub_filter)));
    }

    /// Returns the `/SubFilter` name, if present.
    pub fn sub_filter(&self) -> Option<&str> {
        match self.dict.get("SubFilter") {
            Some(Object::Name(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Returns true for `/DocTimeStamp` dictionaries.
    pub fn is_timestamp(&self) -> bool {
        matches!(self.dict.get("Type"), Some(Object::Name(n)) if n.as_str() == "DocTimeStamp")
    }

    /// Sets the signer's name.
    pub fn set_name(&mut self, name: &str) {
        self.dict.set("Name", Object::String(PdfString::literal(name)));
    }

    /// Sets the reason for signing.
    pub fn set_reason(&mut self, reason: &str) {
        self.dict.set("Reason", Object::String(PdfString::literal(reason)));
    }

    /// Sets the location of signing.
    pub fn set_location(&mut self, location: &str) {
        self.dict
            .set("Location", Object::String(PdfString::literal(location)));
    }

    /// Sets the contact information.
    pub fn set_contact_info(&mut self, info: &str) {
        self.dict
            .set("ContactInfo", Object::String(PdfString::literal(info)));
    }

    /// Sets the `/M` signing date.
    pub fn set_signing_date(&mut self, date: DateTime<Utc>) {
        self.dict
            .set("M", Object::String(PdfString::literal(format_pdf_date(date))));
    }

    /// Adds a DocMDP `/Reference` entry pointing at the catalog.
    ///
    /// Must be added before any FieldMDP reference.
    pub fn add_doc_mdp_reference(
        &mut self,
        catalog_id: ObjectId,
        level: CertificationLevel,
        version: PdfVersion,
    ) {
        let mut params = PdfDictionary::new();
        params.set("Type", Object::Name(PdfName::new_unchecked("TransformParams")));
        params.set("V", Object::Name(PdfName::new_unchecked("1.2")));
        params.set("P", Object::Integer(level.permissions()));

        let mut reference = PdfDictionary::new();
        reference.set("Type", Object::Name(PdfName::new_unchecked("SigRef")));
        reference.set("TransformMethod", Object::Name(PdfName::new_unchecked("DocMDP")));
        reference.set("TransformParams", Object::Dictionary(params));
        reference.set("Data", Object::Reference(catalog_id));
        add_legacy_digest_entries(&mut reference, version);

        self.push_reference(reference);
    }

    /// Adds a FieldMDP `/Reference` entry derived from a field lock.
    pub fn add_field_mdp_reference(
        &mut self,
        lock: &FieldLock,
        catalog_id: ObjectId,
        version: PdfVersion,
    ) {
        let mut reference = PdfDictionary::new();
        reference.set("Type", Object::Name(PdfName::new_unchecked("SigRef")));
        reference.set("TransformMethod", Object::Name(PdfName::new_unchecked("FieldMDP")));
        reference.set("TransformParams", Object::Dictionary(lock.transform_params()));
        reference.set("Data", Object::Reference(catalog_id));
        add_legacy_digest_entries(&mut reference, version);

        self.push_reference(reference);
    }

    fn push_reference(&mut self, reference: PdfDictionary) {
        let mut array = match self.dict.remove("Reference") {
            Some(Object::Array(array)) => array,
            _ => PdfArray::new(),
        };
        array.push(Object::Dictionary(reference));
        self.dict.set("Reference", Object::Array(array));
    }

    /// Renders the dictionary for serialization, inserting the reserved
    /// `/ByteRange` literal and one reserved hex string per exclusion.
    ///
    /// `exclusions` are `(key, reserved byte count)` pairs; at minimum
    /// `Contents`.
    pub fn to_object(&self, exclusions: &[(String, usize)]) -> PdfDictionary {
        let mut dict = self.dict.clone();
        dict.set(
            BYTE_RANGE_KEY,
            Object::Reserved(ReservedLiteral::whitespace(
                BYTE_RANGE_KEY,
                BYTE_RANGE_RESERVED_LEN,
            )),
        );
        for (key, len) in exclusions {
            dict.set(
                key.clone(),
                Object::Reserved(ReservedLiteral::hex_string(key.clone(), *len)),
            );
        }
        dict
    }

    /// Returns the underlying dictionary.
    pub fn as_dictionary(&self) -> &PdfDictionary {
        &self.dict
    }
}

/// Legacy digest entries required by viewers predating PDF 1.6.
fn add_legacy_digest_entries(reference: &mut PdfDictionary, version: PdfVersion) {
    if !version.supports(PdfVersion::V1_6) {
        reference.set("DigestValue", Object::String(PdfString::literal("aa")));
        reference.set("DigestLocation", Object::Array(PdfArray::integers([0, 0])));
        reference.set("DigestMethod", Object::Name(PdfName::new_unchecked("MD5")));
    }
}

/// Formats a date as `D:YYYYMMDDHHmmSS+00'00'`.
pub fn format_pdf_date(date: DateTime<Utc>) -> String {
    date.format("D:%Y%m%d%H%M%S+00'00'").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::placeholder::CONTENTS_KEY;
    use chrono::TimeZone;

    #[test]
    fn test_signature_dictionary_basics() {
        let mut dict = SignatureDictionary::signature(filters::SUB_FILTER_CMS);
        dict.set_reason("Approval");
        dict.set_location("Jakarta");

        let out = dict.as_dictionary().to_pdf_string();
        assert!(out.contains("/Type /Sig"));
        assert!(out.contains("/Filter /Adobe.PPKLite"));
        assert!(out.contains("/SubFilter /adbe.pkcs7.detached"));
        assert!(out.contains("/Reason (Approval)"));
        assert!(out.contains("/Location (Jakarta)"));
    }

    #[test]
    fn test_timestamp_dictionary_has_no_reason() {
        let dict = SignatureDictionary::timestamp();
        let out = dict.as_dictionary().to_pdf_string();
        assert!(out.contains("/Type /DocTimeStamp"));
        assert!(out.contains("/SubFilter /ETSI.RFC3161"));
        assert!(!out.contains("/Reason"));
        assert!(dict.is_timestamp());
    }

    #[test]
    fn test_doc_mdp_precedes_field_mdp() {
        let mut dict = SignatureDictionary::signature(filters::SUB_FILTER_CMS);
        let catalog = ObjectId::new(1);
        dict.add_doc_mdp_reference(catalog, CertificationLevel::NoChanges, PdfVersion::V1_7);
        dict.add_field_mdp_reference(&FieldLock::all(), catalog, PdfVersion::V1_7);

        let out = dict.as_dictionary().to_pdf_string();
        let doc_mdp = out.find("/TransformMethod /DocMDP").unwrap();
        let field_mdp = out.find("/TransformMethod /FieldMDP").unwrap();
        assert!(doc_mdp < field_mdp);
        assert!(out.contains("/P 1"));
    }

    #[test]
    fn test_legacy_digest_entries_gated_on_version() {
        let mut modern = SignatureDictionary::signature(filters::SUB_FILTER_CMS);
        modern.add_doc_mdp_reference(ObjectId::new(1), CertificationLevel::NoChanges, PdfVersion::V1_7);
        assert!(!modern.as_dictionary().to_pdf_string().contains("/DigestMethod /MD5"));

        let mut legacy = SignatureDictionary::signature(filters::SUB_FILTER_CMS);
        legacy.add_doc_mdp_reference(ObjectId::new(1), CertificationLevel::NoChanges, PdfVersion::V1_4);
        assert!(legacy.as_dictionary().to_pdf_string().contains("/DigestMethod /MD5"));

        // FieldMDP follows the same version gate
        let mut field = SignatureDictionary::signature(filters::SUB_FILTER_CMS);
        field.add_field_mdp_reference(&FieldLock::all(), ObjectId::new(1), PdfVersion::V1_7);
        assert!(!field.as_dictionary().to_pdf_string().contains("/DigestMethod /MD5"));
    }

    #[test]
    fn test_to_object_inserts_reservations() {
        let dict = SignatureDictionary::signature(filters::SUB_FILTER_CMS);
        let rendered = dict.to_object(&[(CONTENTS_KEY.to_string(), 18)]);
        let out = rendered.to_pdf_string();
        assert!(out.contains(&" ".repeat(BYTE_RANGE_RESERVED_LEN)));
        assert!(out.contains("<0000000000000000>"));
    }

    #[test]
    fn test_pdf_date_format() {
        let date = Utc.with_ymd_and_hms(2025, 1, 20, 12, 0, 0).unwrap();
        assert_eq!(format_pdf_date(date), "D:20250120120000+00'00'");
    }
}
