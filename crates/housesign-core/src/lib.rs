//! Document signing core logic
//!
//! This crate owns the document/signature lifecycle engine (who may sign or
//! revoke, and when a document counts as completed) and the field geometry
//! model (placement, drag and resize in document-space coordinates). The
//! file itself is an opaque blob; everything here operates on positioned
//! metadata overlaid on it.

pub mod capture;
pub mod document;
pub mod engine;
pub mod error;
pub mod fields;
pub mod geometry;
pub mod share;
pub mod store;

pub use capture::{validate_signature_image, SignatureCapture};
pub use document::{display_name, Document, DocumentStatus, Signer, SignerInput, SignerStatus};
pub use engine::{DocumentSession, RevocationPolicy, REVOCATION_WINDOW_SECS};
pub use error::SignError;
pub use fields::{SigningField, MAX_SIGNING_FIELDS};
pub use geometry::{FieldInteraction, PageBounds};
pub use store::{BlobStore, DocumentStore, MemoryBlobStore, MemoryStore};
