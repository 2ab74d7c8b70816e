//! Signing configuration.

use crate::types::Rectangle;
use super::CertificationLevel;

/// Configuration for a signing operation.
#[derive(Debug, Clone)]
pub struct SigningConfig {
    /// Name of the signature field to bind. Defaults to the first free
    /// `Signature<k>` name.
    pub field_name: Option<String>,
    /// The signer's name.
    pub signer_name: Option<String>,
    /// Reason for signing.
    pub reason: Option<String>,
    /// Location of signing.
    pub location: Option<String>,
    /// Contact information.
    pub contact_info: Option<String>,
    /// DocMDP certification level.
    pub certification_level: CertificationLevel,
    /// Page carrying the widget when a new field is created.
    pub page_index: usize,
    /// Widget rectangle when a new field is created.
    pub rect: Rectangle,
}

impl SigningConfig {
    /// Creates a new configuration with default settings.
    pub fn new() -> Self {
        Self {
            field_name: None,
            signer_name: None,
            reason: None,
            location: None,
            contact_info: None,
            certification_level: CertificationLevel::NotCertified,
            page_index: 0,
            rect: Rectangle::new(0.0, 0.0, 0.0, 0.0),
        }
    }

    /// Sets the signature field name.
    pub fn field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = Some(name.into());
        self
    }

    /// Sets the signer's name.
    pub fn signer_name(mut self, name: impl Into<String>) -> Self {
        self.signer_name = Some(name.into());
        self
    }

    /// Sets the reason for signing.
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Sets the location of signing.
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets contact information.
    pub fn contact_info(mut self, info: impl Into<String>) -> Self {
        self.contact_info = Some(info.into());
        self
    }

    /// Sets the certification level.
    pub fn certification_level(mut self, level: CertificationLevel) -> Self {
        self.certification_level = level;
        self
    }

    /// Sets the page for a newly created widget.
    pub fn page_index(mut self, index: usize) -> Self {
        self.page_index = index;
        self
    }

    /// Sets the rectangle for a newly created widget.
    pub fn rect(mut self, rect: Rectangle) -> Self {
        self.rect = rect;
        self
    }
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = SigningConfig::new()
            .field_name("Approval")
            .signer_name("John Doe")
            .reason("Document approval")
            .location("San Francisco, CA")
            .contact_info("john@example.com")
            .certification_level(CertificationLevel::NoChanges)
            .page_index(2);

        assert_eq!(config.field_name.as_deref(), Some("Approval"));
        assert_eq!(config.signer_name.as_deref(), Some("John Doe"));
        assert_eq!(config.reason.as_deref(), Some("Document approval"));
        assert_eq!(config.certification_level, CertificationLevel::NoChanges);
        assert_eq!(config.page_index, 2);
    }

    #[test]
    fn test_config_default() {
        let config = SigningConfig::default();
        assert!(config.field_name.is_none());
        assert!(config.reason.is_none());
        assert_eq!(config.certification_level, CertificationLevel::NotCertified);
    }
}
