//! Signature capture: uncommitted drawing state and payload validation
//!
//! The drawing surface (a canvas collaborator) rasterizes strokes into a
//! data URL; this module tracks the uncommitted drawing session and vets
//! the payload before it reaches a field. Cancel discards the session
//! without mutating anything.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::SignError;

/// PNG magic bytes: 89 50 4E 47 0D 0A 1A 0A
const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Validate a rasterized signature payload (data URL) before applying it
/// to a field.
pub fn validate_signature_image(data: &str) -> Result<(), SignError> {
    if data.is_empty() {
        return Err(SignError::InvalidSignatureImage(
            "signature image must not be empty".to_string(),
        ));
    }
    let rest = data.strip_prefix("data:image/").ok_or_else(|| {
        SignError::InvalidSignatureImage("signature image must be an image data URL".to_string())
    })?;
    let (mime, encoded) = rest.split_once(";base64,").ok_or_else(|| {
        SignError::InvalidSignatureImage("signature image must be base64-encoded".to_string())
    })?;
    let bytes = BASE64.decode(encoded).map_err(|e| {
        SignError::InvalidSignatureImage(format!("invalid base64 payload: {}", e))
    })?;
    if bytes.is_empty() {
        return Err(SignError::InvalidSignatureImage(
            "signature image payload is empty".to_string(),
        ));
    }
    if mime == "png" && !bytes.starts_with(&PNG_MAGIC) {
        return Err(SignError::InvalidSignatureImage(
            "invalid PNG magic bytes".to_string(),
        ));
    }
    Ok(())
}

/// One in-progress signature drawing session.
///
/// Strokes accumulate while the user draws; `clear` wipes the surface but
/// keeps drawing, `cancel` discards the whole session, and `complete`
/// accepts the rasterized payload only for a non-empty drawing.
#[derive(Debug, Default)]
pub struct SignatureCapture {
    strokes: Vec<Vec<(f64, f64)>>,
    current: Option<Vec<(f64, f64)>>,
}

impl SignatureCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pen down.
    pub fn start_stroke(&mut self, x: f64, y: f64) {
        self.current = Some(vec![(x, y)]);
    }

    /// Pen move; a no-op unless a stroke is in progress.
    pub fn extend_stroke(&mut self, x: f64, y: f64) {
        if let Some(stroke) = self.current.as_mut() {
            stroke.push((x, y));
        }
    }

    /// Pen up.
    pub fn end_stroke(&mut self) {
        if let Some(stroke) = self.current.take() {
            self.strokes.push(stroke);
        }
    }

    /// Wipe the surface, staying in capture mode.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.current = None;
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.current.is_none()
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    /// Discard the session without committing anything.
    pub fn cancel(self) {}

    /// Accept the rasterized payload for this drawing. Rejects a blank
    /// drawing and malformed payloads; on success returns the validated
    /// data URL ready for `sign_field`.
    pub fn complete(mut self, image_data: &str) -> Result<String, SignError> {
        self.end_stroke();
        if self.strokes.is_empty() {
            return Err(SignError::InvalidSignatureImage(
                "nothing was drawn".to_string(),
            ));
        }
        validate_signature_image(image_data)?;
        Ok(image_data.to_string())
    }
}
