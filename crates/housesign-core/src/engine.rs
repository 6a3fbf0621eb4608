//! Document lifecycle operations
//!
//! Signing, revocation and the authorization rules between them. Every
//! operation validates all of its preconditions before the first mutation,
//! so a returned error always leaves the document exactly as it was. All
//! operations take `now` explicitly; callers in request/session context
//! pass `Utc::now()`.

use chrono::{DateTime, Duration, Utc};

use crate::capture::validate_signature_image;
use crate::document::{Document, Signer, SignerStatus};
use crate::error::SignError;
use crate::geometry::{self, PageBounds};
use crate::store::{decode_document, encode_document, DocumentStore};

/// How long a signer may retract a signature after signing
pub const REVOCATION_WINDOW_SECS: i64 = 5 * 60;

/// Who may revoke a signed field. The default is the strict rule: only the
/// signer who produced the signature. `OwnerOverride` additionally lets the
/// document owner revoke anyone's signature; it is an explicit opt-in, not
/// the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevocationPolicy {
    #[default]
    SignerOnly,
    OwnerOverride,
}

impl Document {
    /// Whether `email` may currently sign this document: either a pending
    /// listed signer, or the owner while not yet listed as any signer (the
    /// owner is implicitly added as a signer the first time they sign).
    pub fn can_sign(&self, email: &str) -> bool {
        match self.signer(email) {
            Some(signer) => signer.status == SignerStatus::Pending,
            None => email == self.owner,
        }
    }

    /// Sign one field. Marks the field's signature triple, marks (or
    /// lazily creates, for the owner) the matching signer record, and
    /// recomputes the document status.
    pub fn sign_field(
        &mut self,
        field_id: &str,
        signer_email: &str,
        image_data: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SignError> {
        validate_signature_image(image_data)?;
        let idx = self
            .signing_fields
            .iter()
            .position(|f| f.id == field_id)
            .ok_or_else(|| SignError::FieldNotFound(field_id.to_string()))?;
        if self.signing_fields[idx].is_signed() {
            return Err(SignError::AlreadySigned);
        }
        if !self.can_sign(signer_email) {
            return Err(SignError::NotAuthorized);
        }

        self.signing_fields[idx].apply_signature(signer_email, image_data.to_string(), now);
        self.mark_signer_signed(signer_email, now);
        self.recompute_status();
        self.updated_at = now;
        Ok(())
    }

    /// Whole-document signature path, used when a document has no discrete
    /// signing fields.
    pub fn sign_document(&mut self, signer_email: &str, now: DateTime<Utc>) -> Result<(), SignError> {
        if !self.can_sign(signer_email) {
            return Err(SignError::NotAuthorized);
        }
        self.mark_signer_signed(signer_email, now);
        self.recompute_status();
        self.updated_at = now;
        Ok(())
    }

    /// Retract a signature from a field, within the revocation window and
    /// under the strict signer-only rule.
    pub fn revoke_signature(
        &mut self,
        field_id: &str,
        requester_email: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SignError> {
        self.revoke_signature_with_policy(field_id, requester_email, now, RevocationPolicy::SignerOnly)
    }

    pub fn revoke_signature_with_policy(
        &mut self,
        field_id: &str,
        requester_email: &str,
        now: DateTime<Utc>,
        policy: RevocationPolicy,
    ) -> Result<(), SignError> {
        let idx = self
            .signing_fields
            .iter()
            .position(|f| f.id == field_id)
            .ok_or_else(|| SignError::FieldNotFound(field_id.to_string()))?;

        let field = &self.signing_fields[idx];
        let (signed_by, signed_at) = match (&field.signed_by, field.signed_timestamp) {
            (Some(email), Some(ts)) => (email.clone(), ts),
            _ => return Err(SignError::NotSigned),
        };
        let authorized = requester_email == signed_by
            || (policy == RevocationPolicy::OwnerOverride && requester_email == self.owner);
        if !authorized {
            return Err(SignError::NotAuthorized);
        }
        if now - signed_at > Duration::seconds(REVOCATION_WINDOW_SECS) {
            return Err(SignError::RevocationWindowExpired);
        }

        self.signing_fields[idx].clear_signature();
        let has_other_signed = self
            .signing_fields
            .iter()
            .any(|f| f.signed_by.as_deref() == Some(signed_by.as_str()));
        if !has_other_signed {
            if let Some(signer) = self.signer_mut(&signed_by) {
                signer.status = SignerStatus::Pending;
                signer.timestamp = None;
            }
        }
        self.recompute_status();
        self.updated_at = now;
        Ok(())
    }

    fn mark_signer_signed(&mut self, email: &str, now: DateTime<Utc>) {
        if let Some(signer) = self.signer_mut(email) {
            signer.status = SignerStatus::Signed;
            signer.timestamp = Some(now);
        } else {
            // Owner signing without being pre-listed: appended on first sign
            let mut signer = Signer::pending(email);
            signer.status = SignerStatus::Signed;
            signer.timestamp = Some(now);
            self.signers.push(signer);
        }
    }
}

/// An editing session holding the in-memory aggregate for one document.
///
/// The in-memory document is the source of truth for the session; the
/// store is written after every successful mutation (fire-and-forget from
/// the caller's point of view, synchronous here).
pub struct DocumentSession<S: DocumentStore> {
    document: Document,
    store: S,
}

impl<S: DocumentStore> DocumentSession<S> {
    /// Start a session for a freshly created document, persisting it.
    pub fn create(document: Document, store: S) -> Result<Self, SignError> {
        let mut session = Self { document, store };
        session.persist()?;
        Ok(session)
    }

    /// Load a previously persisted document.
    pub fn open(document_id: &str, store: S) -> Result<Self, SignError> {
        let bytes = store
            .get(document_id)?
            .ok_or_else(|| SignError::DocumentNotFound(document_id.to_string()))?;
        let document = decode_document(&bytes)?;
        Ok(Self { document, store })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn sign_field(
        &mut self,
        field_id: &str,
        signer_email: &str,
        image_data: &str,
    ) -> Result<(), SignError> {
        self.document.sign_field(field_id, signer_email, image_data, Utc::now())?;
        self.persist()
    }

    pub fn sign_document(&mut self, signer_email: &str) -> Result<(), SignError> {
        self.document.sign_document(signer_email, Utc::now())?;
        self.persist()
    }

    pub fn revoke_signature(&mut self, field_id: &str, requester_email: &str) -> Result<(), SignError> {
        self.document.revoke_signature(field_id, requester_email, Utc::now())?;
        self.persist()
    }

    /// Place a field centered on a view-space drop point; returns its id.
    pub fn place_field(
        &mut self,
        page: u32,
        drop_view: (f64, f64),
        scale: f64,
        page_view: (f64, f64),
    ) -> Result<String, SignError> {
        let field = geometry::place_field(&self.document.signing_fields, page, drop_view, scale, page_view)?;
        let id = field.id.clone();
        self.document.push_field(field, Utc::now())?;
        self.persist()?;
        Ok(id)
    }

    /// Toolbar path: add a field at the default position; returns its id.
    pub fn add_field(&mut self, page: u32) -> Result<String, SignError> {
        let field = geometry::add_field(&self.document.signing_fields, page)?;
        let id = field.id.clone();
        self.document.push_field(field, Utc::now())?;
        self.persist()?;
        Ok(id)
    }

    pub fn move_field(
        &mut self,
        field_id: &str,
        delta_view: (f64, f64),
        scale: f64,
        bounds: PageBounds,
    ) -> Result<(), SignError> {
        let field = self
            .document
            .signing_fields
            .iter_mut()
            .find(|f| f.id == field_id)
            .ok_or_else(|| SignError::FieldNotFound(field_id.to_string()))?;
        geometry::move_field(field, delta_view, scale, bounds);
        self.document.updated_at = Utc::now();
        self.persist()
    }

    pub fn resize_field(
        &mut self,
        field_id: &str,
        pointer_view: (f64, f64),
        scale: f64,
        bounds: PageBounds,
    ) -> Result<(), SignError> {
        let field = self
            .document
            .signing_fields
            .iter_mut()
            .find(|f| f.id == field_id)
            .ok_or_else(|| SignError::FieldNotFound(field_id.to_string()))?;
        geometry::resize_field(field, pointer_view, scale, bounds);
        self.document.updated_at = Utc::now();
        self.persist()
    }

    pub fn delete_field(&mut self, field_id: &str) -> Result<(), SignError> {
        self.document.delete_field(field_id, Utc::now())?;
        self.persist()
    }

    fn persist(&mut self) -> Result<(), SignError> {
        let bytes = encode_document(&self.document)?;
        self.store.set(&self.document.id, &bytes)
    }
}
