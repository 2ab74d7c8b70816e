//! PKCS#7 (CMS) signature container building.

use crate::error::{SignatureError, SignatureResult};
use sha2::{Digest, Sha256};
use super::certificate::Certificate;
use super::traits::{ExternalSignature, TsaClient};
use super::CryptoStandard;

// OID byte bodies (content octets, without tag and length)

/// data: 1.2.840.113549.1.7.1
const OID_DATA: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x01];
/// signedData: 1.2.840.113549.1.7.2
const OID_SIGNED_DATA: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x02];
/// contentType attribute: 1.2.840.113549.1.9.3
const OID_CONTENT_TYPE: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x03];
/// messageDigest attribute: 1.2.840.113549.1.9.4
const OID_MESSAGE_DIGEST: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x04];
/// signingCertificateV2 attribute: 1.2.840.113549.1.9.16.2.47
const OID_SIGNING_CERTIFICATE_V2: &[u8] = &[
    0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x10, 0x02, 0x2F,
];
/// timeStampToken attribute: 1.2.840.113549.1.9.16.2.14
const OID_TIMESTAMP_TOKEN: &[u8] = &[
    0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x10, 0x02, 0x0E,
];
/// id-pkix-ocsp-basic: 1.3.6.1.5.5.7.48.1.1
const OID_OCSP_BASIC: &[u8] = &[0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x30, 0x01, 0x01];

/// SHA-256: 2.16.840.1.101.3.4.2.1
const OID_SHA256: &[u8] = &[0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01];
/// SHA-384: 2.16.840.1.101.3.4.2.2
const OID_SHA384: &[u8] = &[0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x02];
/// SHA-512: 2.16.840.1.101.3.4.2.3
const OID_SHA512: &[u8] = &[0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x03];

/// sha256WithRSAEncryption: 1.2.840.113549.1.1.11
const OID_SHA256_RSA: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x0B];
/// sha384WithRSAEncryption: 1.2.840.113549.1.1.12
const OID_SHA384_RSA: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x0C];
/// sha512WithRSAEncryption: 1.2.840.113549.1.1.13
const OID_SHA512_RSA: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x0D];
/// ecdsa-with-SHA256: 1.2.840.10045.4.3.2
const OID_SHA256_ECDSA: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x04, 0x03, 0x02];
/// ecdsa-with-SHA384: 1.2.840.10045.4.3.3
const OID_SHA384_ECDSA: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x04, 0x03, 0x03];
/// ecdsa-with-SHA512: 1.2.840.10045.4.3.4
const OID_SHA512_ECDSA: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x04, 0x03, 0x04];

/// Assembles a detached CMS/CAdES `SignedData` container.
///
/// The message digest is computed by the caller over the hashable byte
/// ranges; this builder produces the authenticated attributes for the
/// chosen profile, obtains the raw signature from the external signer,
/// and wraps everything with certificates, CRLs, an optional OCSP
/// response, and an optional RFC 3161 token.
pub struct SignedDataBuilder<'a> {
    chain: &'a [Certificate],
    signer: &'a dyn ExternalSignature,
    standard: CryptoStandard,
    crls: Vec<Vec<u8>>,
    ocsp: Option<Vec<u8>>,
}

impl<'a> SignedDataBuilder<'a> {
    /// Creates a builder over a certificate chain and raw signer.
    pub fn new(
        chain: &'a [Certificate],
        signer: &'a dyn ExternalSignature,
        standard: CryptoStandard,
    ) -> Self {
        Self {
            chain,
            signer,
            standard,
            crls: Vec::new(),
            ocsp: None,
        }
    }

    /// Embeds DER-encoded CRLs.
    pub fn crls(mut self, crls: Vec<Vec<u8>>) -> Self {
        self.crls = crls;
        self
    }

    /// Embeds a DER-encoded basic OCSP response.
    pub fn ocsp(mut self, ocsp: Option<Vec<u8>>) -> Self {
        self.ocsp = ocsp;
        self
    }

    /// Builds the encoded container over the given message digest.
    pub fn build(
        &self,
        message_digest: &[u8],
        tsa: Option<&dyn TsaClient>,
    ) -> SignatureResult<Vec<u8>> {
        let cert = self
            .chain
            .first()
            .ok_or_else(|| SignatureError::Crypto("Empty certificate chain".to_string()))?;

        let signed_attrs = self.build_signed_attributes(message_digest, cert);
        let signature = self.signer.sign(&signed_attrs)?;

        let timestamp_token = match tsa {
            Some(tsa) => {
                let mut md = tsa.message_digest();
                md.update(&signature);
                let imprint = md.finish();
                Some(tsa.get_time_stamp_token(&imprint)?)
            }
            None => None,
        };

        let mut signed_data = Vec::new();

        // Version (1 for issuerAndSerialNumber identifiers)
        signed_data.extend_from_slice(&der_integer(1));

        // DigestAlgorithms SET
        let digest_alg = digest_algorithm_identifier(self.signer.hash_algorithm())?;
        signed_data.extend_from_slice(&tlv(Tag::Set, &digest_alg));

        // EncapContentInfo (detached, so no content)
        signed_data.extend_from_slice(&tlv(Tag::Sequence, &tlv(Tag::Oid, OID_DATA)));

        // Certificates [0] IMPLICIT
        let mut certs = Vec::new();
        for cert in self.chain {
            certs.extend_from_slice(cert.der_bytes());
        }
        signed_data.extend_from_slice(&tlv(Tag::Context(0), &certs));

        // Crls [1] IMPLICIT, carrying CRLs and the OCSP response
        if !self.crls.is_empty() || self.ocsp.is_some() {
            let mut revocation = Vec::new();
            for crl in &self.crls {
                revocation.extend_from_slice(crl);
            }
            if let Some(ocsp) = &self.ocsp {
                let mut other = tlv(Tag::Oid, OID_OCSP_BASIC);
                other.extend_from_slice(ocsp);
                revocation.extend_from_slice(&tlv(Tag::Context(1), &other));
            }
            signed_data.extend_from_slice(&tlv(Tag::Context(1), &revocation));
        }

        // SignerInfos SET
        let signer_info =
            self.build_signer_info(cert, &signed_attrs, &signature, timestamp_token.as_deref())?;
        signed_data.extend_from_slice(&tlv(Tag::Set, &signer_info));

        // ContentInfo wrapper: the SignedData SEQUENCE under [0] EXPLICIT
        let mut content_info = tlv(Tag::Oid, OID_SIGNED_DATA);
        content_info.extend_from_slice(&tlv(Tag::Context(0), &tlv(Tag::Sequence, &signed_data)));

        Ok(tlv(Tag::Sequence, &content_info))
    }

    /// Builds the authenticated attributes as a DER SET.
    ///
    /// These exact bytes are what the external signer signs; the
    /// embedded copy is re-tagged `[0] IMPLICIT`.
    fn build_signed_attributes(&self, message_digest: &[u8], cert: &Certificate) -> Vec<u8> {
        let mut attrs = Vec::new();

        attrs.extend_from_slice(&attribute(OID_CONTENT_TYPE, &tlv(Tag::Oid, OID_DATA)));
        attrs.extend_from_slice(&attribute(
            OID_MESSAGE_DIGEST,
            &tlv(Tag::OctetString, message_digest),
        ));

        if self.standard == CryptoStandard::Cades {
            // SigningCertificateV2 with the default SHA-256 hash algorithm:
            // SEQ { SEQ OF ESSCertIDv2 { SEQ { certHash } } }
            let cert_hash = Sha256::digest(cert.der_bytes());
            let ess_cert_id = tlv(Tag::Sequence, &tlv(Tag::OctetString, &cert_hash));
            let value = tlv(Tag::Sequence, &tlv(Tag::Sequence, &ess_cert_id));
            attrs.extend_from_slice(&attribute(OID_SIGNING_CERTIFICATE_V2, &value));
        }

        tlv(Tag::Set, &attrs)
    }

    /// Builds the signer info structure.
    fn build_signer_info(
        &self,
        cert: &Certificate,
        signed_attrs: &[u8],
        signature: &[u8],
        timestamp_token: Option<&[u8]>,
    ) -> SignatureResult<Vec<u8>> {
        let mut signer_info = Vec::new();

        // Version (1)
        signer_info.extend_from_slice(&der_integer(1));

        // IssuerAndSerialNumber
        signer_info.extend_from_slice(&build_issuer_and_serial(cert)?);

        // DigestAlgorithm
        signer_info.extend_from_slice(&digest_algorithm_identifier(self.signer.hash_algorithm())?);

        // SignedAttrs [0] IMPLICIT: same bytes as signed, re-tagged
        signer_info.extend_from_slice(&retag(signed_attrs, Tag::Context(0)));

        // SignatureAlgorithm
        signer_info.extend_from_slice(&signature_algorithm_identifier(
            self.signer.encryption_algorithm(),
            self.signer.hash_algorithm(),
        )?);

        // Signature value
        signer_info.extend_from_slice(&tlv(Tag::OctetString, signature));

        // UnsignedAttrs [1] IMPLICIT with the time-stamp token
        if let Some(token) = timestamp_token {
            let attr = attribute(OID_TIMESTAMP_TOKEN, token);
            signer_info.extend_from_slice(&tlv(Tag::Context(1), &attr));
        }

        Ok(tlv(Tag::Sequence, &signer_info))
    }
}

/// Builds the digest AlgorithmIdentifier for a hash name.
fn digest_algorithm_identifier(hash: &str) -> SignatureResult<Vec<u8>> {
    let oid = match hash {
        "SHA-256" | "SHA256" => OID_SHA256,
        "SHA-384" | "SHA384" => OID_SHA384,
        "SHA-512" | "SHA512" => OID_SHA512,
        other => {
            return Err(SignatureError::Crypto(format!(
                "Unsupported hash algorithm: {}",
                other
            )))
        }
    };

    Ok(algorithm_identifier(oid, true))
}

/// Builds the signature AlgorithmIdentifier for an encryption/hash pair.
///
/// RSA identifiers carry NULL parameters; ECDSA ones carry none.
fn signature_algorithm_identifier(encryption: &str, hash: &str) -> SignatureResult<Vec<u8>> {
    let (oid, null_params) = match (encryption, hash) {
        ("RSA", "SHA-256") | ("RSA", "SHA256") => (OID_SHA256_RSA, true),
        ("RSA", "SHA-384") | ("RSA", "SHA384") => (OID_SHA384_RSA, true),
        ("RSA", "SHA-512") | ("RSA", "SHA512") => (OID_SHA512_RSA, true),
        ("ECDSA", "SHA-256") | ("ECDSA", "SHA256") => (OID_SHA256_ECDSA, false),
        ("ECDSA", "SHA-384") | ("ECDSA", "SHA384") => (OID_SHA384_ECDSA, false),
        ("ECDSA", "SHA-512") | ("ECDSA", "SHA512") => (OID_SHA512_ECDSA, false),
        (enc, h) => {
            return Err(SignatureError::Crypto(format!(
                "Unsupported signature algorithm: {} with {}",
                enc, h
            )))
        }
    };

    Ok(algorithm_identifier(oid, null_params))
}

/// `AlgorithmIdentifier ::= SEQUENCE { algorithm OID, parameters ANY }`.
fn algorithm_identifier(oid_body: &[u8], null_params: bool) -> Vec<u8> {
    let mut content = tlv(Tag::Oid, oid_body);
    if null_params {
        content.extend_from_slice(&[0x05, 0x00]);
    }
    tlv(Tag::Sequence, &content)
}

/// Builds the issuer and serial number from the certificate.
fn build_issuer_and_serial(cert: &Certificate) -> SignatureResult<Vec<u8>> {
    use der::{Decode, Encode};
    use x509_cert::Certificate as X509Cert;

    let x509 = X509Cert::from_der(cert.der_bytes())
        .map_err(|e| SignatureError::Crypto(format!("Failed to parse certificate: {}", e)))?;

    let issuer_der = x509
        .tbs_certificate
        .issuer
        .to_der()
        .map_err(|e| SignatureError::Crypto(format!("Failed to encode issuer: {}", e)))?;

    let serial_der = x509
        .tbs_certificate
        .serial_number
        .to_der()
        .map_err(|e| SignatureError::Crypto(format!("Failed to encode serial: {}", e)))?;

    let mut issuer_serial = issuer_der;
    issuer_serial.extend_from_slice(&serial_der);

    Ok(tlv(Tag::Sequence, &issuer_serial))
}

// DER encoding layer. SignedData only ever emits a handful of shapes,
// so one tag-length-value builder covers them all.

/// The DER tags SignedData assembly uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Integer,
    OctetString,
    Oid,
    Sequence,
    Set,
    /// Constructed context-specific tag `[n]`.
    Context(u8),
}

impl Tag {
    fn octet(self) -> u8 {
        match self {
            Tag::Integer => 0x02,
            Tag::OctetString => 0x04,
            Tag::Oid => 0x06,
            Tag::Sequence => 0x30,
            Tag::Set => 0x31,
            Tag::Context(number) => 0xA0 | number,
        }
    }
}

/// Encodes one tag-length-value triple.
fn tlv(tag: Tag, content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 6);
    out.push(tag.octet());
    push_length(&mut out, content.len());
    out.extend_from_slice(content);
    out
}

/// Appends a DER length: short form under 128, long form above.
fn push_length(out: &mut Vec<u8>, len: usize) {
    if len < 128 {
        out.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

/// Encodes a non-negative INTEGER (SignedData versions are tiny).
fn der_integer(value: u64) -> Vec<u8> {
    let mut body = value.to_be_bytes().to_vec();
    while body.len() > 1 && body[0] == 0 && body[1] & 0x80 == 0 {
        body.remove(0);
    }
    tlv(Tag::Integer, &body)
}

/// Re-tags an encoded value, keeping length and content intact.
///
/// This is how signed attributes are embedded: the SET encoding is
/// hashed, the `[0] IMPLICIT` encoding is written.
fn retag(encoded: &[u8], tag: Tag) -> Vec<u8> {
    let mut out = encoded.to_vec();
    if !out.is_empty() {
        out[0] = tag.octet();
    }
    out
}

/// `Attribute ::= SEQUENCE { attrType OID, attrValues SET }`.
fn attribute(oid_body: &[u8], value: &[u8]) -> Vec<u8> {
    let mut content = tlv(Tag::Oid, oid_body);
    content.extend_from_slice(&tlv(Tag::Set, value));
    tlv(Tag::Sequence, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullSigner;

    impl ExternalSignature for NullSigner {
        fn hash_algorithm(&self) -> &str {
            "SHA-256"
        }

        fn encryption_algorithm(&self) -> &str {
            "RSA"
        }

        fn sign(&self, _message: &[u8]) -> SignatureResult<Vec<u8>> {
            Ok(vec![0xAB; 64])
        }
    }

    #[test]
    fn test_tag_octets() {
        assert_eq!(Tag::Integer.octet(), 0x02);
        assert_eq!(Tag::OctetString.octet(), 0x04);
        assert_eq!(Tag::Oid.octet(), 0x06);
        assert_eq!(Tag::Sequence.octet(), 0x30);
        assert_eq!(Tag::Set.octet(), 0x31);
        assert_eq!(Tag::Context(0).octet(), 0xA0);
        assert_eq!(Tag::Context(1).octet(), 0xA1);
    }

    #[test]
    fn test_tlv_short_form() {
        assert_eq!(tlv(Tag::OctetString, &[0x01, 0x02, 0x03]), vec![0x04, 0x03, 0x01, 0x02, 0x03]);
        assert_eq!(tlv(Tag::Sequence, &[]), vec![0x30, 0x00]);
    }

    #[test]
    fn test_tlv_long_form_lengths() {
        let one_byte = tlv(Tag::Sequence, &[0u8; 200]);
        assert_eq!(&one_byte[..3], &[0x30, 0x81, 200]);

        let two_bytes = tlv(Tag::Sequence, &[0u8; 0x1234]);
        assert_eq!(&two_bytes[..4], &[0x30, 0x82, 0x12, 0x34]);
    }

    #[test]
    fn test_der_integer_strips_and_keeps_sign_byte() {
        assert_eq!(der_integer(0), vec![0x02, 0x01, 0x00]);
        assert_eq!(der_integer(1), vec![0x02, 0x01, 0x01]);
        assert_eq!(der_integer(127), vec![0x02, 0x01, 0x7F]);
        // High bit set: a leading zero keeps the value positive
        assert_eq!(der_integer(128), vec![0x02, 0x02, 0x00, 0x80]);
    }

    #[test]
    fn test_retag_keeps_length_and_content() {
        let set = tlv(Tag::Set, &[0x02, 0x01, 0x05]);
        let retagged = retag(&set, Tag::Context(0));
        assert_eq!(retagged[0], 0xA0);
        assert_eq!(&retagged[1..], &set[1..]);
    }

    #[test]
    fn test_attribute_shape() {
        let attr = attribute(OID_CONTENT_TYPE, &tlv(Tag::Oid, OID_DATA));
        // SEQUENCE { OID contentType, SET { OID data } }
        assert_eq!(attr[0], 0x30);
        assert_eq!(attr[2], 0x06);
        let set_at = 2 + 2 + OID_CONTENT_TYPE.len();
        assert_eq!(attr[set_at], 0x31);
    }

    #[test]
    fn test_digest_algorithm_identifier() {
        let alg = digest_algorithm_identifier("SHA-256").unwrap();
        assert_eq!(alg[0], 0x30);
        assert!(alg.ends_with(&[0x05, 0x00]));
        assert!(digest_algorithm_identifier("MD5").is_err());
    }

    #[test]
    fn test_signature_algorithm_identifier() {
        let rsa = signature_algorithm_identifier("RSA", "SHA-256").unwrap();
        assert!(rsa.ends_with(&[0x05, 0x00]));

        let ecdsa = signature_algorithm_identifier("ECDSA", "SHA-256").unwrap();
        assert!(!ecdsa.ends_with(&[0x05, 0x00]));

        assert!(signature_algorithm_identifier("DSA", "SHA-256").is_err());
    }

    #[test]
    fn test_empty_chain_rejected() {
        let chain: Vec<Certificate> = Vec::new();
        let signer = NullSigner;
        let builder = SignedDataBuilder::new(&chain, &signer, CryptoStandard::Cms);
        let err = builder.build(&[0u8; 32], None).unwrap_err();
        assert!(matches!(err, SignatureError::Crypto(_)));
    }
}
