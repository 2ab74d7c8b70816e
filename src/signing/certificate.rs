//! X.509 certificate and private key handling.

use crate::error::{SignatureError, SignatureResult};
use std::fs;
use std::path::Path;
use super::traits::ExternalSignature;

/// An X.509 certificate in a signing chain.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// The raw DER-encoded certificate bytes.
    der_bytes: Vec<u8>,
    /// The certificate subject name (common name).
    subject_name: String,
    /// The certificate issuer name.
    issuer_name: String,
    /// Serial number as hex string.
    serial_number: String,
}

impl Certificate {
    /// Loads a certificate from a PEM file.
    pub fn from_pem_file(path: impl AsRef<Path>) -> SignatureResult<Self> {
        let pem_data = fs::read_to_string(path.as_ref())
            .map_err(|e| SignatureError::Crypto(format!("Failed to read certificate: {}", e)))?;

        Self::from_pem(&pem_data)
    }

    /// Loads a certificate from PEM data.
    pub fn from_pem(pem_data: &str) -> SignatureResult<Self> {
        use der::{DecodePem, Encode};

        let cert = x509_cert::Certificate::from_pem(pem_data).map_err(|e| {
            SignatureError::Crypto(format!("Failed to parse certificate PEM: {}", e))
        })?;
        let der_bytes = cert.to_der().map_err(|e| {
            SignatureError::Crypto(format!("Failed to encode certificate: {}", e))
        })?;

        Ok(Self::from_parsed(&cert, der_bytes))
    }

    /// Loads a certificate from DER bytes.
    pub fn from_der(der_bytes: &[u8]) -> SignatureResult<Self> {
        use der::Decode;

        let cert = x509_cert::Certificate::from_der(der_bytes).map_err(|e| {
            SignatureError::Crypto(format!("Failed to parse certificate: {}", e))
        })?;

        Ok(Self::from_parsed(&cert, der_bytes.to_vec()))
    }

    fn from_parsed(cert: &x509_cert::Certificate, der_bytes: Vec<u8>) -> Self {
        let tbs = &cert.tbs_certificate;
        Self {
            der_bytes,
            subject_name: common_name(&tbs.subject).unwrap_or_else(|| "Unknown".to_string()),
            issuer_name: common_name(&tbs.issuer).unwrap_or_else(|| "Unknown".to_string()),
            serial_number: hex_upper(tbs.serial_number.as_bytes()),
        }
    }

    /// Subject common name, or `Unknown`.
    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    /// Issuer common name, or `Unknown`.
    pub fn issuer_name(&self) -> &str {
        &self.issuer_name
    }

    /// Serial number as uppercase hex.
    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    /// The DER encoding embedded into SignedData.
    pub fn der_bytes(&self) -> &[u8] {
        &self.der_bytes
    }
}

/// A private key usable as the raw signing primitive.
#[derive(Clone)]
pub struct PrivateKey {
    key_type: KeyType,
    /// DER key material, PKCS#8 or legacy PKCS#1.
    der_bytes: Vec<u8>,
}

/// Supported signing key algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// RSA, signed PKCS#1 v1.5 over SHA-256.
    Rsa,
    /// ECDSA on P-256 over SHA-256.
    EcdsaP256,
}

impl PrivateKey {
    /// Loads a private key from a PEM file.
    pub fn from_pem_file(path: impl AsRef<Path>) -> SignatureResult<Self> {
        let pem_data = fs::read_to_string(path.as_ref())
            .map_err(|e| SignatureError::Crypto(format!("Failed to read private key: {}", e)))?;

        Self::from_pem(&pem_data)
    }

    /// Loads a private key from PEM data.
    ///
    /// Accepts PKCS#8 (`PRIVATE KEY`) and legacy PKCS#1
    /// (`RSA PRIVATE KEY`) encodings. SEC1 EC keys must be converted to
    /// PKCS#8 first.
    pub fn from_pem(pem_data: &str) -> SignatureResult<Self> {
        use pkcs8::SecretDocument;

        let (label, document) = SecretDocument::from_pem(pem_data).map_err(|e| {
            SignatureError::Crypto(format!("Failed to parse private key PEM: {}", e))
        })?;

        match label {
            "PRIVATE KEY" => Self::from_pkcs8_der(document.as_bytes()),
            "RSA PRIVATE KEY" => Ok(Self {
                key_type: KeyType::Rsa,
                der_bytes: document.as_bytes().to_vec(),
            }),
            other => Err(SignatureError::Crypto(format!(
                "Unsupported private key label: {}",
                other
            ))),
        }
    }

    /// Loads a private key from PKCS#8 DER bytes.
    fn from_pkcs8_der(der_bytes: &[u8]) -> SignatureResult<Self> {
        use der::Decode;
        use pkcs8::PrivateKeyInfo;

        let key_info = PrivateKeyInfo::from_der(der_bytes).map_err(|e| {
            SignatureError::Crypto(format!("Failed to parse PKCS#8 key: {}", e))
        })?;

        let oid = key_info.algorithm.oid;

        // RSA OID: 1.2.840.113549.1.1.1
        let rsa_oid = const_oid::ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
        // EC OID: 1.2.840.10045.2.1
        let ec_oid = const_oid::ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

        let key_type = if oid == rsa_oid {
            KeyType::Rsa
        } else if oid == ec_oid {
            KeyType::EcdsaP256
        } else {
            return Err(SignatureError::Crypto(format!(
                "Unsupported key algorithm OID: {}",
                oid
            )));
        };

        Ok(Self {
            key_type,
            der_bytes: der_bytes.to_vec(),
        })
    }

    /// The key's algorithm.
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// The raw DER key material.
    pub fn der_bytes(&self) -> &[u8] {
        &self.der_bytes
    }

    /// Signs data with RSA PKCS#1 v1.5 over SHA-256.
    fn sign_rsa(&self, data: &[u8]) -> SignatureResult<Vec<u8>> {
        use pkcs8::DecodePrivateKey;
        use rsa::pkcs1::DecodeRsaPrivateKey;
        use rsa::{pkcs1v15::SigningKey, RsaPrivateKey};
        use sha2::Sha256;
        use signature::{SignatureEncoding, Signer};

        let private_key = RsaPrivateKey::from_pkcs8_der(&self.der_bytes)
            .or_else(|_| RsaPrivateKey::from_pkcs1_der(&self.der_bytes))
            .map_err(|e| SignatureError::Crypto(format!("Failed to parse RSA key: {}", e)))?;

        let signing_key = SigningKey::<Sha256>::new(private_key);
        let signature = signing_key.sign(data);

        Ok(signature.to_bytes().to_vec())
    }

    /// Signs data with ECDSA P-256 over SHA-256.
    fn sign_ecdsa(&self, data: &[u8]) -> SignatureResult<Vec<u8>> {
        use p256::ecdsa::{Signature, SigningKey};
        use pkcs8::DecodePrivateKey;
        use signature::Signer;

        let signing_key = SigningKey::from_pkcs8_der(&self.der_bytes)
            .map_err(|e| SignatureError::Crypto(format!("Failed to parse ECDSA key: {}", e)))?;

        let signature: Signature = signing_key.sign(data);

        Ok(signature.to_der().as_bytes().to_vec())
    }
}

impl ExternalSignature for PrivateKey {
    fn hash_algorithm(&self) -> &str {
        "SHA-256"
    }

    fn encryption_algorithm(&self) -> &str {
        match self.key_type {
            KeyType::Rsa => "RSA",
            KeyType::EcdsaP256 => "ECDSA",
        }
    }

    fn sign(&self, message: &[u8]) -> SignatureResult<Vec<u8>> {
        match self.key_type {
            KeyType::Rsa => self.sign_rsa(message),
            KeyType::EcdsaP256 => self.sign_ecdsa(message),
        }
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("key_type", &self.key_type)
            .field("der_bytes_len", &self.der_bytes.len())
            .finish()
    }
}

/// Finds the first common-name attribute of an X.509 name.
fn common_name(name: &x509_cert::name::Name) -> Option<String> {
    use const_oid::db::rfc4519::CN;

    name.0
        .iter()
        .flat_map(|rdn| rdn.0.iter())
        .find(|attr| attr.oid == CN)
        .and_then(|attr| std::str::from_utf8(attr.value.value()).ok())
        .map(str::to_owned)
}

/// Renders bytes as uppercase hex.
fn hex_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}
