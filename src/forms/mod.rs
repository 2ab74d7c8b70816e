//! Interactive form support for signature fields.
//!
//! Only the parts of the AcroForm model that signing touches live here:
//! the field records a document carries, the flag sets written into
//! field and widget dictionaries, and the signature field lock.

mod field;
mod lock;

pub use field::{AnnotationFlags, FieldFlags, FieldKind, FormField};
pub use lock::{FieldLock, LockAction};

/// AcroForm `/SigFlags`: signatures exist in the document.
pub const SIG_FLAG_SIGNATURES_EXIST: i64 = 1;

/// AcroForm `/SigFlags`: the document may only be saved append-only.
pub const SIG_FLAG_APPEND_ONLY: i64 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sig_flags_combined() {
        assert_eq!(SIG_FLAG_SIGNATURES_EXIST | SIG_FLAG_APPEND_ONLY, 3);
    }
}
