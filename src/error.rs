//! Error types for the pdf-signer library.

use thiserror::Error;

/// The main error type for PDF operations.
#[derive(Debug, Error)]
pub enum PdfError {
    /// Error during object serialization.
    #[error("Object error: {0}")]
    Object(#[from] ObjectError),

    /// Error during document building.
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error during PDF writing.
    #[error("Writer error: {0}")]
    Writer(#[from] WriterError),

    /// Error during form field operations.
    #[error("Form error: {0}")]
    Form(#[from] FormError),

    /// Error during digital signature operations.
    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to PDF object handling.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// Invalid PDF name (contains invalid characters).
    #[error("Invalid PDF name: {0}")]
    InvalidName(String),

    /// Invalid PDF string encoding.
    #[error("Invalid PDF string: {0}")]
    InvalidString(String),

    /// Invalid object reference.
    #[error("Invalid object reference: ({0}, {1})")]
    InvalidReference(u32, u16),
}

/// Errors related to document building.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Document has no pages.
    #[error("Document must have at least one page")]
    NoPages,

    /// Page index outside the document.
    #[error("Page index out of range: {0}")]
    PageOutOfRange(usize),

    /// Invalid PDF version.
    #[error("Invalid PDF version: {0}")]
    InvalidVersion(String),
}

/// Errors related to PDF writing.
#[derive(Debug, Error)]
pub enum WriterError {
    /// Failed to write PDF structure.
    #[error("Failed to write PDF structure: {0}")]
    Structure(String),

    /// Invalid byte offset.
    #[error("Invalid byte offset: {0}")]
    InvalidOffset(u64),
}

/// Errors related to form fields.
#[derive(Debug, Error)]
pub enum FormError {
    /// Invalid field name.
    #[error("Invalid field name: {0}")]
    InvalidFieldName(String),

    /// Duplicate field name.
    #[error("Duplicate field name: {0}")]
    DuplicateFieldName(String),
}

/// Errors related to digital signature operations.
///
/// Signing code matches on these variants, so each failure mode keeps a
/// stable identity instead of a message payload.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// The signer has already produced a signature.
    #[error("Signer is already closed")]
    AlreadyClosed,

    /// `pre_close` was invoked twice.
    #[error("Document is already pre-closed")]
    AlreadyPreClosed,

    /// `close` was invoked before `pre_close`.
    #[error("Document must be pre-closed first")]
    MustBePreClosed,

    /// `pre_close` was invoked without a signature dictionary.
    #[error("No signature dictionary was prepared")]
    NoCryptoDictionary,

    /// Signature field names must not contain a period.
    #[error("Field name contains a '.'")]
    FieldNameContainsDot,

    /// The named field exists but is not a signature field.
    #[error("Field type is not /Sig")]
    FieldTypeNotSignature,

    /// The named field already carries a signature value.
    #[error("Field is already signed")]
    FieldAlreadySigned,

    /// The assembled container exceeds the reserved space.
    #[error("Signature container does not fit the reserved space")]
    NotEnoughSpace,

    /// Deferred signing: the signed bytes exceed the reserved gap.
    #[error("Signed bytes exceed the reserved gap")]
    InsufficientSpace,

    /// Deferred signing: the reserved gap has an odd length.
    #[error("Reserved gap length is odd")]
    GapNotEven,

    /// Deferred signing supports exactly one exclusion window.
    #[error("Signature has more than one exclusion window")]
    SingleExclusionOnly,

    /// Deferred signing over a signature that does not cover the file.
    #[error("Signature is not the last one in the document")]
    NotLastSignature,

    /// `close` received a key that was never reserved.
    #[error("No placeholder was reserved for key /{key}")]
    KeyNotReserved { key: String },

    /// A value serialized larger than its reserved placeholder.
    #[error("Value for key /{key} exceeds its reserved length")]
    ValueTooLarge { key: String },

    /// `close` did not receive a value for a reserved key.
    #[error("No update value supplied for reserved key /{key}")]
    UpdateKeysMissing { key: String },

    /// Two exclusion windows overlap.
    #[error("Exclusion windows overlap")]
    OverlappingExclusions,

    /// Wrapped I/O failure.
    #[error("I/O error during signing: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped failure from a cryptographic primitive or collaborator.
    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),

    /// Wrapped failure from PDF construction during signing.
    #[error("PDF error during signing: {0}")]
    Pdf(Box<PdfError>),
}

impl From<PdfError> for SignatureError {
    fn from(err: PdfError) -> Self {
        SignatureError::Pdf(Box::new(err))
    }
}

/// A specialized Result type for PDF operations.
pub type PdfResult<T> = Result<T, PdfError>;

/// Result type for signature operations.
pub type SignatureResult<T> = Result<T, SignatureError>;
