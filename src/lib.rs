//! # pdf-signer
//!
//! A library for injecting digital signatures into PDF documents.
//!
//! ## Features
//!
//! - **Detached CMS/CAdES signatures**: PKCS#7 containers conformant
//!   with ISO 32000 and the PAdES baseline profiles
//! - **Document timestamps**: standalone `/DocTimeStamp` signatures
//!   from an RFC 3161 authority
//! - **Deferred signing**: reserve the gap now, inject the signature
//!   later without touching any other byte
//! - **Pluggable back-ends**: bring your own digest, signer, CRL, OCSP,
//!   and TSA implementations through narrow traits
//!
//! ## Quick Start
//!
//! ```rust
//! use pdf_signer::prelude::*;
//! use std::io::Read;
//!
//! // A container producer; a real one would build a PKCS#7 blob
//! struct Stub;
//!
//! impl ExternalSignatureContainer for Stub {
//!     fn modify_signing_dictionary(&self, _dict: &mut SignatureDictionary) {}
//!
//!     fn sign(&self, content: &mut dyn Read) -> SignatureResult<Vec<u8>> {
//!         let mut bytes = Vec::new();
//!         content.read_to_end(&mut bytes)?;
//!         Ok(vec![0u8; 64])
//!     }
//! }
//!
//! let doc = DocumentBuilder::new()
//!     .title("Contract")
//!     .page(Page::a4())
//!     .build()
//!     .unwrap();
//!
//! let mut signed = Vec::new();
//! let mut signer = PdfSigner::new(doc, &mut signed);
//! signer.set_reason("Approval");
//! signer.sign_external_container(&Stub, 1024).unwrap();
//! drop(signer);
//!
//! assert!(signed.starts_with(b"%PDF-1.7"));
//! ```

// Module declarations
pub mod document;
pub mod error;
pub mod forms;
pub mod object;
pub mod page;
pub mod signing;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use document::{Document, DocumentBuilder, DocumentInfo, PdfVersion};
pub use error::{
    DocumentError, FormError, ObjectError, PdfError, PdfResult, SignatureError, SignatureResult,
    WriterError,
};
pub use forms::{AnnotationFlags, FieldFlags, FieldKind, FieldLock, FormField, LockAction};
pub use object::{
    DictionaryBuilder, Object, PdfArray, PdfDictionary, PdfName, PdfString, ReservedLiteral,
};
pub use page::Page;
pub use signing::{
    read_last_byte_range, sign_deferred, Certificate, CertificationLevel, CrlClient,
    CryptoStandard, ExternalDigest, ExternalSignature, ExternalSignatureContainer, MessageDigest,
    OcspClient, PdfSigner, PrivateKey, SignatureDictionary, SignatureEvent, SigningConfig,
    StandardDigest, TsaClient,
};
pub use types::{ObjectId, Rectangle};
pub use writer::PdfWriter;

/// Prelude module for convenient imports.
///
/// Use `use pdf_signer::prelude::*;` to import all commonly used types.
pub mod prelude {
    pub use crate::document::{Document, DocumentBuilder, DocumentInfo, PdfVersion};
    pub use crate::error::{PdfError, PdfResult, SignatureError, SignatureResult};
    pub use crate::forms::{FieldLock, LockAction};
    pub use crate::object::{Object, PdfArray, PdfDictionary, PdfName, PdfString};
    pub use crate::page::Page;
    pub use crate::signing::{
        sign_deferred, Certificate, CertificationLevel, CryptoStandard, ExternalDigest,
        ExternalSignature, ExternalSignatureContainer, PdfSigner, PrivateKey,
        SignatureDictionary, StandardDigest,
    };
    pub use crate::types::{ObjectId, Rectangle};
}
