//! Document aggregate, signer records and status recomputation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SignError;
use crate::fields::{SigningField, MAX_SIGNING_FIELDS};

/// Document lifecycle status. Derived from signer and field state, never
/// set directly by a user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    AwaitingSignatures,
    Completed,
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentStatus::Draft => write!(f, "draft"),
            DocumentStatus::AwaitingSignatures => write!(f, "awaiting_signatures"),
            DocumentStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerStatus {
    Pending,
    Signed,
}

/// A party required to sign a document, identified by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signer {
    pub email: String,
    pub name: String,
    pub status: SignerStatus,
    /// Signing time, `None` while pending
    pub timestamp: Option<DateTime<Utc>>,
}

impl Signer {
    pub fn pending(email: &str) -> Self {
        Self {
            email: email.to_string(),
            name: display_name(email),
            status: SignerStatus::Pending,
            timestamp: None,
        }
    }
}

/// Signer list entries arrive either as bare email strings or as structured
/// records. Both forms normalize to [`Signer`] at the boundary; core logic
/// never branches on the wire representation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignerInput {
    Email(String),
    Record {
        email: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl SignerInput {
    pub fn email(&self) -> &str {
        match self {
            SignerInput::Email(email) => email,
            SignerInput::Record { email, .. } => email,
        }
    }

    pub fn into_signer(self) -> Signer {
        match self {
            SignerInput::Email(email) => Signer::pending(&email),
            SignerInput::Record { email, name } => {
                let name = name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| display_name(&email));
                Signer {
                    email,
                    name,
                    status: SignerStatus::Pending,
                    timestamp: None,
                }
            }
        }
    }
}

/// Derive a display name from the local part of an email address
pub fn display_name(email: &str) -> String {
    email
        .split('@')
        .next()
        .filter(|part| !part.is_empty())
        .unwrap_or(email)
        .to_string()
}

/// Format a timestamp for activity display
pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => ts.format("%b %-d, %Y, %I:%M %p").to_string(),
        None => "N/A".to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub status: DocumentStatus,
    /// Email of the creator; may also be a signer
    pub owner: String,
    /// Insertion order at creation, stable thereafter
    pub signers: Vec<Signer>,
    /// Reference into the blob store; the document never holds file bytes
    pub file_id: Option<String>,
    pub signing_fields: Vec<SigningField>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a document from an upload. An empty recipient list saves a
    /// draft; otherwise the document is immediately awaiting signatures.
    pub fn new(
        title: &str,
        owner: &str,
        file_id: Option<String>,
        recipients: Vec<SignerInput>,
        now: DateTime<Utc>,
    ) -> Result<Self, SignError> {
        if recipients.iter().any(|r| r.email().trim().is_empty()) {
            return Err(SignError::MissingRecipient);
        }

        let signers: Vec<Signer> = recipients.into_iter().map(SignerInput::into_signer).collect();
        let status = if signers.is_empty() {
            DocumentStatus::Draft
        } else {
            DocumentStatus::AwaitingSignatures
        };

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            status,
            owner: owner.to_string(),
            signers,
            file_id,
            signing_fields: Vec::new(),
            updated_at: now,
        })
    }

    pub fn signer(&self, email: &str) -> Option<&Signer> {
        self.signers.iter().find(|s| s.email == email)
    }

    pub(crate) fn signer_mut(&mut self, email: &str) -> Option<&mut Signer> {
        self.signers.iter_mut().find(|s| s.email == email)
    }

    pub fn field(&self, field_id: &str) -> Option<&SigningField> {
        self.signing_fields.iter().find(|f| f.id == field_id)
    }

    pub fn fields_on_page(&self, page: u32) -> Vec<&SigningField> {
        self.signing_fields.iter().filter(|f| f.page == page).collect()
    }

    pub fn all_signers_signed(&self) -> bool {
        self.signers.iter().all(|s| s.status == SignerStatus::Signed)
    }

    /// A document with zero fields signs at the document level, so an empty
    /// field list counts as fully signed.
    pub fn all_fields_signed(&self) -> bool {
        self.signing_fields.iter().all(SigningField::is_signed)
    }

    /// Attach a field, enforcing the per-document cap. Rejected placements
    /// leave the field list untouched.
    pub fn push_field(&mut self, field: SigningField, now: DateTime<Utc>) -> Result<(), SignError> {
        if self.signing_fields.len() >= MAX_SIGNING_FIELDS {
            return Err(SignError::FieldLimitReached);
        }
        self.signing_fields.push(field);
        self.updated_at = now;
        Ok(())
    }

    /// Remove a field by id. Deleting a signed field discards that
    /// signature along with the field; the signer record is left as-is.
    pub fn delete_field(&mut self, field_id: &str, now: DateTime<Utc>) -> Result<(), SignError> {
        let idx = self
            .signing_fields
            .iter()
            .position(|f| f.id == field_id)
            .ok_or_else(|| SignError::FieldNotFound(field_id.to_string()))?;
        self.signing_fields.remove(idx);
        self.recompute_status();
        self.updated_at = now;
        Ok(())
    }

    /// Recompute `status` from current signer and field state. Pure except
    /// for the draft special case: a document with no signers was never
    /// sent for signatures and stays a draft.
    pub(crate) fn recompute_status(&mut self) {
        if self.signers.is_empty() {
            self.status = DocumentStatus::Draft;
            return;
        }
        self.status = if self.all_signers_signed() && self.all_fields_signed() {
            DocumentStatus::Completed
        } else {
            DocumentStatus::AwaitingSignatures
        };
    }
}
