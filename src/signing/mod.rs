//! PDF digital signature injection.
//!
//! The signing pipeline reserves space for the signature inside the
//! serialized document, hashes everything outside the reserved gap,
//! asks a pluggable back-end for the signature container, and
//! overwrites the gap in place. The file length never changes after
//! serialization, so the digest stays valid.
//!
//! # Example
//!
//! ```ignore
//! use pdf_signer::prelude::*;
//! use pdf_signer::signing::{CryptoStandard, PdfSigner, StandardDigest};
//!
//! let cert = Certificate::from_pem_file("cert.pem")?;
//! let key = PrivateKey::from_pem_file("key.pem")?;
//!
//! let doc = DocumentBuilder::new().page(Page::a4()).build()?;
//!
//! let mut output = Vec::new();
//! let mut signer = PdfSigner::new(doc, &mut output);
//! signer.set_reason("Document approval");
//! signer.sign_detached(
//!     &StandardDigest,
//!     &key,
//!     &[cert],
//!     &[],
//!     None,
//!     None,
//!     0,
//!     CryptoStandard::Cms,
//! )?;
//! ```

mod backing;
mod certificate;
mod config;
mod deferred;
mod dictionary;
mod hashable;
mod pkcs7;
mod placeholder;
mod ranges;
mod signer;
mod traits;

pub use backing::BackingStore;
pub use certificate::{Certificate, KeyType, PrivateKey};
pub use config::SigningConfig;
pub use deferred::{read_last_byte_range, sign_deferred};
pub use dictionary::SignatureDictionary;
pub use hashable::{digest_stream, RangeReader};
pub use pkcs7::SignedDataBuilder;
pub use placeholder::{PlaceholderSlot, PlaceholderTable, BYTE_RANGE_KEY, BYTE_RANGE_RESERVED_LEN, CONTENTS_KEY};
pub use ranges::{compute_ranges, format_byte_range, total_range_length};
pub use signer::PdfSigner;
pub use traits::{
    CrlClient, ExternalDigest, ExternalSignature, ExternalSignatureContainer, MessageDigest,
    OcspClient, SignatureEvent, StandardDigest, TsaClient,
};

pub use crate::error::SignatureResult;

/// The signature container profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoStandard {
    /// Plain CMS (`adbe.pkcs7.detached`).
    Cms,
    /// CAdES per ETSI EN 319 142 (`ETSI.CAdES.detached`).
    Cades,
}

impl CryptoStandard {
    /// Returns the `/SubFilter` name for this profile.
    pub fn sub_filter(&self) -> &'static str {
        match self {
            CryptoStandard::Cms => filters::SUB_FILTER_CMS,
            CryptoStandard::Cades => filters::SUB_FILTER_CADES,
        }
    }
}

/// The DocMDP certification level of a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CertificationLevel {
    /// An ordinary approval signature.
    #[default]
    NotCertified,
    /// Certifying signature; no changes allowed.
    NoChanges,
    /// Certifying signature; form filling allowed.
    FormFilling,
    /// Certifying signature; form filling and annotations allowed.
    FormFillingAndAnnotations,
}

impl CertificationLevel {
    /// Returns the `/P` access-permissions value.
    pub fn permissions(&self) -> i64 {
        match self {
            CertificationLevel::NotCertified => 0,
            CertificationLevel::NoChanges => 1,
            CertificationLevel::FormFilling => 2,
            CertificationLevel::FormFillingAndAnnotations => 3,
        }
    }

    /// Returns true when the signature certifies the document.
    pub fn is_certified(&self) -> bool {
        *self != CertificationLevel::NotCertified
    }
}

/// PDF signature dictionary names.
pub mod filters {
    /// Standard signature handler.
    pub const ADOBE_PPKLITE: &str = "Adobe.PPKLite";
    /// Sub-filter for PKCS#7 detached (CMS).
    pub const SUB_FILTER_CMS: &str = "adbe.pkcs7.detached";
    /// Sub-filter for ETSI CAdES detached.
    pub const SUB_FILTER_CADES: &str = "ETSI.CAdES.detached";
    /// Sub-filter for RFC 3161 document timestamps.
    pub const SUB_FILTER_RFC3161: &str = "ETSI.RFC3161";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_filter_names() {
        assert_eq!(CryptoStandard::Cms.sub_filter(), "adbe.pkcs7.detached");
        assert_eq!(CryptoStandard::Cades.sub_filter(), "ETSI.CAdES.detached");
    }

    #[test]
    fn test_certification_permissions() {
        assert_eq!(CertificationLevel::NotCertified.permissions(), 0);
        assert_eq!(CertificationLevel::NoChanges.permissions(), 1);
        assert_eq!(CertificationLevel::FormFilling.permissions(), 2);
        assert_eq!(CertificationLevel::FormFillingAndAnnotations.permissions(), 3);
        assert!(!CertificationLevel::NotCertified.is_certified());
        assert!(CertificationLevel::NoChanges.is_certified());
    }
}
