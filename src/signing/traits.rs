//! Collaborator interfaces for pluggable signing back-ends.
//!
//! The signer core depends only on these behavioral contracts, so
//! hardware tokens, HSMs, remote services, and test doubles all plug in
//! the same way.

use crate::error::{SignatureError, SignatureResult};
use super::certificate::Certificate;
use super::dictionary::SignatureDictionary;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::io::Read;

/// An incremental message digest.
pub trait MessageDigest {
    /// Feeds data into the digest.
    fn update(&mut self, data: &[u8]);

    /// Finalizes and returns the digest value.
    fn finish(self: Box<Self>) -> Vec<u8>;
}

/// Provides message digests by hash algorithm name.
pub trait ExternalDigest {
    /// Returns a digest for a hash name such as `SHA-256`.
    fn message_digest(&self, hash_algorithm: &str) -> SignatureResult<Box<dyn MessageDigest>>;
}

/// A raw signing primitive: private key, HSM slot, or remote service.
pub trait ExternalSignature {
    /// Returns the hash algorithm name, e.g. `SHA-256`.
    fn hash_algorithm(&self) -> &str;

    /// Returns the encryption algorithm name, e.g. `RSA` or `ECDSA`.
    fn encryption_algorithm(&self) -> &str;

    /// Signs the given message and returns the raw signature bytes.
    fn sign(&self, message: &[u8]) -> SignatureResult<Vec<u8>>;
}

/// Produces a complete, opaque signature container.
///
/// The container consumes the hashable byte stream of the document and
/// returns the final octet string embedded into `/Contents`.
pub trait ExternalSignatureContainer {
    /// Lets the container adjust the signature dictionary before the
    /// document is pre-closed (e.g. set `/Filter` and `/SubFilter`).
    fn modify_signing_dictionary(&self, dict: &mut SignatureDictionary);

    /// Consumes the hashable stream and returns the container bytes.
    fn sign(&self, content: &mut dyn Read) -> SignatureResult<Vec<u8>>;
}

/// Fetches certificate revocation lists.
pub trait CrlClient {
    /// Returns the DER-encoded CRLs for the given certificate.
    fn get_encoded(&self, cert: &Certificate, url: Option<&str>) -> SignatureResult<Vec<Vec<u8>>>;
}

/// Fetches OCSP responses.
pub trait OcspClient {
    /// Returns a DER-encoded basic OCSP response for `cert`, checked
    /// against its `issuer`.
    fn get_encoded(
        &self,
        cert: &Certificate,
        issuer: &Certificate,
        url: Option<&str>,
    ) -> SignatureResult<Vec<u8>>;
}

/// An RFC 3161 time-stamping authority client.
pub trait TsaClient {
    /// Estimated token size in bytes, used to reserve space.
    fn token_size_estimate(&self) -> usize;

    /// Returns the digest the imprint is computed with.
    fn message_digest(&self) -> Box<dyn MessageDigest>;

    /// Requests a time-stamp token over the given message imprint.
    fn get_time_stamp_token(&self, imprint: &[u8]) -> SignatureResult<Vec<u8>>;
}

/// Callback invoked with the signature dictionary before pre-close.
pub trait SignatureEvent {
    /// Mutates the dictionary that is about to be serialized.
    fn on_signature_dictionary(&self, dict: &mut SignatureDictionary);
}

/// Digest provider backed by the `sha2` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDigest;

impl ExternalDigest for StandardDigest {
    fn message_digest(&self, hash_algorithm: &str) -> SignatureResult<Box<dyn MessageDigest>> {
        match hash_algorithm {
            "SHA-256" | "SHA256" => Ok(Box::new(Sha2Digest(Sha256::new()))),
            "SHA-384" | "SHA384" => Ok(Box::new(Sha2Digest(Sha384::new()))),
            "SHA-512" | "SHA512" => Ok(Box::new(Sha2Digest(Sha512::new()))),
            other => Err(SignatureError::Crypto(format!(
                "Unsupported hash algorithm: {}",
                other
            ))),
        }
    }
}

struct Sha2Digest<D: Digest>(D);

impl<D: Digest> MessageDigest for Sha2Digest<D> {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finish(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().to_vec()
    }
}
