//! The signer state machine.
//!
//! A [`PdfSigner`] drives one signing operation over one document:
//! pre-close serializes the document with reserved literals, the
//! hashable ranges are digested, the container is assembled, and close
//! overwrites the reserved gaps and streams the result to the output
//! sink. The lifecycle is strictly Open -> PreClosed -> Closed; any
//! operation outside its state fails.

use crate::document::{field_widget_dictionary, Document};
use crate::error::{SignatureError, SignatureResult};
use crate::forms::{FieldKind, FieldLock, FormField, SIG_FLAG_APPEND_ONLY, SIG_FLAG_SIGNATURES_EXIST};
use crate::object::{Object, PdfArray, PdfDictionary, PdfName, PdfString};
use crate::types::{ObjectId, Rectangle};
use crate::writer::PdfWriter;
use chrono::{DateTime, Utc};
use log::debug;
use std::io::Write;
use super::backing::BackingStore;
use super::certificate::Certificate;
use super::config::SigningConfig;
use super::dictionary::SignatureDictionary;
use super::hashable::{digest_stream, RangeReader};
use super::pkcs7::SignedDataBuilder;
use super::placeholder::{PlaceholderTable, BYTE_RANGE_KEY, CONTENTS_KEY};
use super::ranges::{compute_ranges, format_byte_range};
use super::traits::{
    CrlClient, ExternalDigest, ExternalSignature, ExternalSignatureContainer, OcspClient,
    SignatureEvent, TsaClient,
};
use super::{filters, CertificationLevel, CryptoStandard};

/// Lifecycle of a signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignerState {
    Open,
    PreClosed,
    Closed,
}

/// Signs one document, once.
///
/// The signer exclusively owns the document, the backing store, and the
/// output sink. The sink receives bytes only when a signature was
/// embedded successfully, and is closed exactly once.
pub struct PdfSigner<W: Write> {
    document: Document,
    output: Option<W>,
    backing: BackingStore,
    config: SigningConfig,
    sign_date: DateTime<Utc>,
    field_lock: Option<FieldLock>,
    signature_event: Option<Box<dyn SignatureEvent>>,
    crypto_dict: Option<SignatureDictionary>,
    placeholders: PlaceholderTable,
    range: Vec<i64>,
    state: SignerState,
}

impl<W: Write> PdfSigner<W> {
    /// Creates a signer staging the document in memory.
    pub fn new(document: Document, output: W) -> Self {
        Self::with_backing(document, output, BackingStore::in_memory())
    }

    /// Creates a signer staging the document in a temporary file.
    ///
    /// The file is unlinked at creation; the OS reclaims it when the
    /// signer is dropped, on every exit path.
    pub fn with_temp_file(document: Document, output: W) -> SignatureResult<Self> {
        Ok(Self::with_backing(document, output, BackingStore::temp_file()?))
    }

    fn with_backing(document: Document, output: W, backing: BackingStore) -> Self {
        Self {
            document,
            output: Some(output),
            backing,
            config: SigningConfig::new(),
            sign_date: Utc::now(),
            field_lock: None,
            signature_event: None,
            crypto_dict: None,
            placeholders: PlaceholderTable::new(),
            range: Vec::new(),
            state: SignerState::Open,
        }
    }

    /// Replaces the whole signing configuration.
    pub fn set_config(&mut self, config: SigningConfig) {
        self.config = config;
    }

    /// Sets the signature field name (no `.` allowed).
    pub fn set_field_name(&mut self, name: impl Into<String>) {
        self.config.field_name = Some(name.into());
    }

    /// Sets the signer's name.
    pub fn set_signer_name(&mut self, name: impl Into<String>) {
        self.config.signer_name = Some(name.into());
    }

    /// Sets the reason for signing.
    pub fn set_reason(&mut self, reason: impl Into<String>) {
        self.config.reason = Some(reason.into());
    }

    /// Sets the location of signing.
    pub fn set_location(&mut self, location: impl Into<String>) {
        self.config.location = Some(location.into());
    }

    /// Sets the contact information.
    pub fn set_contact_info(&mut self, info: impl Into<String>) {
        self.config.contact_info = Some(info.into());
    }

    /// Sets the DocMDP certification level.
    pub fn set_certification_level(&mut self, level: CertificationLevel) {
        self.config.certification_level = level;
    }

    /// Sets the lock applied through the signature field.
    ///
    /// A lock already present on a pre-existing field takes precedence.
    pub fn set_field_lock(&mut self, lock: FieldLock) {
        self.field_lock = Some(lock);
    }

    /// Sets the widget placement used when the field does not exist.
    pub fn set_visible_signature(&mut self, page_index: usize, rect: Rectangle) {
        self.config.page_index = page_index;
        self.config.rect = rect;
    }

    /// Sets the signing date written as `/M`.
    pub fn set_sign_date(&mut self, date: DateTime<Utc>) {
        self.sign_date = date;
    }

    /// Registers a callback run on the dictionary before pre-close.
    pub fn set_signature_event(&mut self, event: Box<dyn SignatureEvent>) {
        self.signature_event = Some(event);
    }

    /// Returns the computed hashable ranges (empty before pre-close).
    pub fn range(&self) -> &[i64] {
        &self.range
    }

    /// Returns the placeholder table (empty before pre-close).
    pub fn placeholders(&self) -> &PlaceholderTable {
        &self.placeholders
    }

    /// Signs the document with a detached CMS or CAdES container.
    ///
    /// When `estimated_size` is 0 the reservation defaults to
    /// 8192 + 4192 per OCSP/TSA client + the combined CRL sizes.
    #[allow(clippy::too_many_arguments)]
    pub fn sign_detached(
        &mut self,
        digest: &dyn ExternalDigest,
        signature: &dyn ExternalSignature,
        chain: &[Certificate],
        crl_clients: &[&dyn CrlClient],
        ocsp_client: Option<&dyn OcspClient>,
        tsa_client: Option<&dyn TsaClient>,
        estimated_size: usize,
        standard: CryptoStandard,
    ) -> SignatureResult<()> {
        if self.state != SignerState::Open {
            return Err(SignatureError::AlreadyClosed);
        }

        // CRLs are fetched up front so the reservation can hold them
        let mut crls: Vec<Vec<u8>> = Vec::new();
        for client in crl_clients {
            for cert in chain {
                crls.extend(client.get_encoded(cert, None)?);
            }
        }

        let estimated = if estimated_size > 0 {
            estimated_size
        } else {
            let mut estimate = 8192;
            if ocsp_client.is_some() {
                estimate += 4192;
            }
            if tsa_client.is_some() {
                estimate += 4192;
            }
            for crl in &crls {
                estimate += crl.len() + 10;
            }
            estimate
        };

        let mut dict = SignatureDictionary::signature(standard.sub_filter());
        dict.set_signing_date(self.sign_date);
        apply_config_entries(&mut dict, &self.config);
        self.crypto_dict = Some(dict);

        self.pre_close(vec![(CONTENTS_KEY.to_string(), estimated * 2 + 2)])?;

        let hash = {
            let md = digest.message_digest(signature.hash_algorithm())?;
            let mut reader = RangeReader::new(&mut self.backing, &self.range);
            digest_stream(&mut reader, md)?
        };

        let ocsp = match ocsp_client {
            Some(client) if chain.len() >= 2 => {
                Some(client.get_encoded(&chain[0], &chain[1], None)?)
            }
            _ => None,
        };

        let container = SignedDataBuilder::new(chain, signature, standard)
            .crls(crls)
            .ocsp(ocsp)
            .build(&hash, tsa_client)?;

        self.embed_container(container, estimated)
    }

    /// Signs the document with an opaque, caller-supplied container.
    ///
    /// The container first adjusts the signature dictionary, then
    /// receives the hashable byte stream and returns the final octet
    /// string. `estimated_size` of 0 defaults to 8192.
    pub fn sign_external_container(
        &mut self,
        container: &dyn ExternalSignatureContainer,
        estimated_size: usize,
    ) -> SignatureResult<()> {
        if self.state != SignerState::Open {
            return Err(SignatureError::AlreadyClosed);
        }

        let estimated = if estimated_size > 0 { estimated_size } else { 8192 };

        let mut dict = SignatureDictionary::signature(filters::SUB_FILTER_CMS);
        dict.set_signing_date(self.sign_date);
        apply_config_entries(&mut dict, &self.config);
        container.modify_signing_dictionary(&mut dict);
        self.crypto_dict = Some(dict);

        self.pre_close(vec![(CONTENTS_KEY.to_string(), estimated * 2 + 2)])?;

        let bytes = {
            let mut reader = RangeReader::new(&mut self.backing, &self.range);
            container.sign(&mut reader)?
        };

        self.embed_container(bytes, estimated)
    }

    /// Produces a standalone `/DocTimeStamp` signature.
    pub fn timestamp(
        &mut self,
        tsa: &dyn TsaClient,
        field_name: Option<&str>,
    ) -> SignatureResult<()> {
        if self.state != SignerState::Open {
            return Err(SignatureError::AlreadyClosed);
        }

        if let Some(name) = field_name {
            self.config.field_name = Some(name.to_string());
        }

        let estimated = match tsa.token_size_estimate() {
            0 => 4096,
            n => n,
        };

        self.crypto_dict = Some(SignatureDictionary::timestamp());
        self.pre_close(vec![(CONTENTS_KEY.to_string(), estimated * 2 + 2)])?;

        let imprint = {
            let mut reader = RangeReader::new(&mut self.backing, &self.range);
            digest_stream(&mut reader, tsa.message_digest())?
        };
        let token = tsa.get_time_stamp_token(&imprint)?;

        self.embed_container(token, estimated)
    }

    /// Serializes the document with reserved literals and computes the
    /// byte ranges of the final file.
    fn pre_close(&mut self, exclusions: Vec<(String, usize)>) -> SignatureResult<()> {
        match self.state {
            SignerState::Open => {}
            SignerState::PreClosed => return Err(SignatureError::AlreadyPreClosed),
            SignerState::Closed => return Err(SignatureError::AlreadyClosed),
        }
        self.state = SignerState::PreClosed;

        let mut crypto_dict = self
            .crypto_dict
            .take()
            .ok_or(SignatureError::NoCryptoDictionary)?;

        // Locate or create the signature field
        let field_name = self
            .config
            .field_name
            .clone()
            .unwrap_or_else(|| self.document.next_signature_name());
        if field_name.contains('.') {
            return Err(SignatureError::FieldNameContainsDot);
        }

        let field_index = match self.document.fields.iter().position(|f| f.name == field_name) {
            Some(index) => {
                let field = &self.document.fields[index];
                if field.kind != FieldKind::Signature {
                    return Err(SignatureError::FieldTypeNotSignature);
                }
                if field.signed {
                    return Err(SignatureError::FieldAlreadySigned);
                }
                index
            }
            None => {
                if self.config.page_index >= self.document.pages.len() {
                    return Err(SignatureError::Io(std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "signature page index out of range",
                    )));
                }
                self.document.fields.push(FormField::signature(
                    &field_name,
                    self.config.page_index,
                    self.config.rect,
                ));
                self.document.fields.len() - 1
            }
        };

        // A lock carried by a pre-existing field wins over the caller's
        let effective_lock = self.document.fields[field_index]
            .lock
            .clone()
            .or_else(|| self.field_lock.clone());
        self.document.fields[field_index].lock = effective_lock.clone();
        self.document.fields[field_index].signed = true;

        debug!("pre-closing with signature field '{}'", field_name);

        let version = self.document.version;
        let mut writer = PdfWriter::new(&mut self.backing, version.as_str());

        // ID plan mirrors the write order below
        let catalog_id = writer.allocate_id();
        let pages_id = writer.allocate_id();
        let page_ids: Vec<ObjectId> = self.document.pages.iter().map(|_| writer.allocate_id()).collect();
        let field_ids: Vec<ObjectId> = self.document.fields.iter().map(|_| writer.allocate_id()).collect();
        let sig_dict_id = writer.allocate_id();
        let acroform_id = writer.allocate_id();
        let info_id = if self.document.info.is_empty() {
            None
        } else {
            Some(writer.allocate_id())
        };

        if self.config.certification_level.is_certified() {
            crypto_dict.add_doc_mdp_reference(catalog_id, self.config.certification_level, version);
        }
        if let Some(lock) = &effective_lock {
            crypto_dict.add_field_mdp_reference(lock, catalog_id, version);
        }
        if let Some(event) = &self.signature_event {
            event.on_signature_dictionary(&mut crypto_dict);
        }

        writer.write_header()?;

        // Catalog, with certification permissions and profile extensions
        let mut catalog = PdfDictionary::new();
        catalog.set("Type", Object::Name(PdfName::catalog()));
        catalog.set("Pages", Object::Reference(pages_id));
        catalog.set("AcroForm", Object::Reference(acroform_id));
        if self.config.certification_level.is_certified() {
            let mut perms = PdfDictionary::new();
            perms.set("DocMDP", Object::Reference(sig_dict_id));
            catalog.set("Perms", Object::Dictionary(perms));
        }
        match crypto_dict.sub_filter() {
            Some(filters::SUB_FILTER_CADES) => {
                catalog.set("Extensions", Object::Dictionary(esic_extensions(2)));
            }
            Some(filters::SUB_FILTER_RFC3161) => {
                catalog.set("Extensions", Object::Dictionary(esic_extensions(5)));
            }
            _ => {}
        }
        writer.write_object_with_id(catalog_id, &Object::Dictionary(catalog))?;

        // Pages tree
        let mut pages_dict = PdfDictionary::new();
        pages_dict.set("Type", Object::Name(PdfName::pages()));
        pages_dict.set(
            "Kids",
            Object::Array(PdfArray::references(page_ids.iter().copied())),
        );
        pages_dict.set("Count", Object::Integer(self.document.pages.len() as i64));
        writer.write_object_with_id(pages_id, &Object::Dictionary(pages_dict))?;

        // Pages with widget annotations
        for (i, page) in self.document.pages.iter().enumerate() {
            let mut page_dict = PdfDictionary::new();
            page_dict.set("Type", Object::Name(PdfName::page()));
            page_dict.set("Parent", Object::Reference(pages_id));

            page_dict.set(
                "MediaBox",
                Object::Array(PdfArray::reals(page.media_box.to_array())),
            );

            let annots = PdfArray::references(
                self.document
                    .fields
                    .iter()
                    .zip(&field_ids)
                    .filter(|(f, _)| f.page_index == i)
                    .map(|(_, id)| *id),
            );
            if !annots.is_empty() {
                page_dict.set("Annots", Object::Array(annots));
            }

            writer.write_object_with_id(page_ids[i], &Object::Dictionary(page_dict))?;
        }

        // Field widgets; the bound field carries /V and is locked
        for (index, (field, &field_id)) in self.document.fields.iter().zip(&field_ids).enumerate() {
            let value = if index == field_index {
                Some(sig_dict_id)
            } else {
                None
            };
            let dict = field_widget_dictionary(field, page_ids[field.page_index], value);
            writer.write_object_with_id(field_id, &Object::Dictionary(dict))?;
        }

        // Signature dictionary with reserved literals
        let sig_dict = crypto_dict.to_object(&exclusions);
        writer.write_object_with_id(sig_dict_id, &Object::Dictionary(sig_dict))?;

        // AcroForm
        let mut acroform = PdfDictionary::new();
        acroform.set(
            "Fields",
            Object::Array(PdfArray::references(field_ids.iter().copied())),
        );
        acroform.set(
            "SigFlags",
            Object::Integer(SIG_FLAG_SIGNATURES_EXIST | SIG_FLAG_APPEND_ONLY),
        );
        writer.write_object_with_id(acroform_id, &Object::Dictionary(acroform))?;

        if let Some(info_id) = info_id {
            let info_dict = self.document.info.to_dictionary();
            writer.write_object_with_id(info_id, &Object::Dictionary(info_dict))?;
        }

        writer.write_trailer(catalog_id, info_id)?;

        self.placeholders = PlaceholderTable::from_records(writer.take_placeholders());
        drop(writer);

        let file_len = self.backing.len()?;
        self.range = compute_ranges(&self.placeholders.exclusions(), file_len)?;

        // Overwrite the /ByteRange placeholder in place
        let literal = format_byte_range(&self.range)?;
        let slot = self
            .placeholders
            .get(BYTE_RANGE_KEY)
            .ok_or_else(|| SignatureError::KeyNotReserved {
                key: BYTE_RANGE_KEY.to_string(),
            })?;
        self.backing.overwrite_at(slot.offset, &literal)?;

        debug!(
            "pre-closed: {} bytes, ranges {:?}",
            file_len, self.range
        );

        self.crypto_dict = Some(crypto_dict);
        Ok(())
    }

    /// Overwrites the reserved gaps and streams the store to the sink.
    ///
    /// `update` must supply a value for every reserved key except
    /// `/ByteRange`. The sink is closed exactly once, even when the
    /// update is rejected.
    pub fn close(&mut self, update: Vec<(String, Object)>) -> SignatureResult<()> {
        match self.state {
            SignerState::PreClosed => {}
            SignerState::Open => return Err(SignatureError::MustBePreClosed),
            SignerState::Closed => return Err(SignatureError::AlreadyClosed),
        }
        self.state = SignerState::Closed;

        let result = self.apply_updates(&update);
        let mut output = self.output.take();
        let result = result.and_then(|_| {
            if let Some(sink) = output.as_mut() {
                let written = self.backing.stream_to(sink)?;
                sink.flush()?;
                debug!("streamed {} bytes to output sink", written);
            }
            Ok(())
        });
        drop(output);
        result
    }

    fn apply_updates(&mut self, update: &[(String, Object)]) -> SignatureResult<()> {
        for key in self.placeholders.update_keys() {
            if !update.iter().any(|(k, _)| k == key) {
                return Err(SignatureError::UpdateKeysMissing {
                    key: key.to_string(),
                });
            }
        }

        for (key, value) in update {
            if key == BYTE_RANGE_KEY || !self.placeholders.contains(key) {
                return Err(SignatureError::KeyNotReserved { key: key.clone() });
            }
            let slot = self.placeholders.get(key).ok_or_else(|| {
                SignatureError::KeyNotReserved { key: key.clone() }
            })?;
            let bytes = value.to_pdf_string().into_bytes();
            if bytes.len() > slot.len {
                return Err(SignatureError::ValueTooLarge { key: key.clone() });
            }
            self.backing.overwrite_at(slot.offset, &bytes)?;
        }

        Ok(())
    }

    /// Pads the container to the reservation and closes.
    fn embed_container(&mut self, mut container: Vec<u8>, estimated_size: usize) -> SignatureResult<()> {
        if container.len() > estimated_size {
            return Err(SignatureError::NotEnoughSpace);
        }
        container.resize(estimated_size, 0);

        self.close(vec![(
            CONTENTS_KEY.to_string(),
            Object::String(PdfString::hex(container)),
        )])
    }
}

/// Writes the configured reason, location, contact, and name entries.
fn apply_config_entries(dict: &mut SignatureDictionary, config: &SigningConfig) {
    if let Some(name) = &config.signer_name {
        dict.set_name(name);
    }
    if let Some(reason) = &config.reason {
        dict.set_reason(reason);
    }
    if let Some(location) = &config.location {
        dict.set_location(location);
    }
    if let Some(info) = &config.contact_info {
        dict.set_contact_info(info);
    }
}

/// `/Extensions` entry registering the ESIC developer extension.
fn esic_extensions(level: i64) -> PdfDictionary {
    let mut esic = PdfDictionary::new();
    esic.set("BaseVersion", Object::Name(PdfName::new_unchecked("1.7")));
    esic.set("ExtensionLevel", Object::Integer(level));
    let mut extensions = PdfDictionary::new();
    extensions.set("ESIC", Object::Dictionary(esic));
    extensions
}
