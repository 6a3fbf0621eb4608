//! Signing field entities
//!
//! A signing field is a positioned signature capture region anchored to one
//! page. Coordinates are document-space (unscaled page units); the geometry
//! module owns all view-space conversion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of signing fields per document
pub const MAX_SIGNING_FIELDS: usize = 5;

/// Default field dimensions at creation
pub const DEFAULT_FIELD_WIDTH: f64 = 200.0;
pub const DEFAULT_FIELD_HEIGHT: f64 = 50.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningField {
    pub id: String,
    /// 1-based page index the field is anchored to
    pub page: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub signed_by: Option<String>,
    /// Rasterized signature payload (data URL), present iff `signed_by` is
    pub signature_image_data: Option<String>,
    pub signed_timestamp: Option<DateTime<Utc>>,
}

impl SigningField {
    /// Create an unsigned field at the given document-space position
    pub fn new(page: u32, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            page,
            x,
            y,
            width,
            height,
            signed_by: None,
            signature_image_data: None,
            signed_timestamp: None,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.signed_by.is_some()
    }

    /// Set the signature triple. The three fields always change together.
    pub(crate) fn apply_signature(&mut self, email: &str, image_data: String, now: DateTime<Utc>) {
        self.signed_by = Some(email.to_string());
        self.signature_image_data = Some(image_data);
        self.signed_timestamp = Some(now);
    }

    /// Clear the signature triple.
    pub(crate) fn clear_signature(&mut self) {
        self.signed_by = None;
        self.signature_image_data = None;
        self.signed_timestamp = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_field_is_unsigned() {
        let field = SigningField::new(1, 100.0, 200.0, DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT);
        assert!(!field.is_signed());
        assert_eq!(field.signed_by, None);
        assert_eq!(field.signature_image_data, None);
        assert_eq!(field.signed_timestamp, None);
        assert_eq!(field.page, 1);
    }

    #[test]
    fn test_field_ids_are_unique() {
        let a = SigningField::new(1, 0.0, 0.0, 200.0, 50.0);
        let b = SigningField::new(1, 0.0, 0.0, 200.0, 50.0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_signature_triple_set_and_cleared_together() {
        let mut field = SigningField::new(1, 0.0, 0.0, 200.0, 50.0);
        let now = Utc::now();

        field.apply_signature("a@x.com", "data:image/png;base64,AAAA".to_string(), now);
        assert!(field.is_signed());
        assert_eq!(field.signed_by.as_deref(), Some("a@x.com"));
        assert!(field.signature_image_data.is_some());
        assert_eq!(field.signed_timestamp, Some(now));

        field.clear_signature();
        assert!(!field.is_signed());
        assert_eq!(field.signature_image_data, None);
        assert_eq!(field.signed_timestamp, None);
    }
}
