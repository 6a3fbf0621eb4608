//! Persistence interfaces: documents as JSON bytes, files as opaque blobs
//!
//! Documents serialize to JSON with ISO-8601 timestamps and travel through
//! a byte-oriented key-value store. File contents are opaque; the document
//! only ever holds a `file_id` reference.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::document::Document;
use crate::error::SignError;

/// Maximum accepted upload size (10 MB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Key-value store for serialized documents. `set` is called after every
/// mutating operation; `get` returns the last-written value.
pub trait DocumentStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SignError>;
    fn set(&mut self, key: &str, bytes: &[u8]) -> Result<(), SignError>;
}

/// Opaque binary blob store addressed by file id.
pub trait BlobStore {
    fn save(&mut self, bytes: &[u8], filename: &str) -> Result<String, SignError>;
    /// Returns the stored blob rendered as a data URL, or `None` when the
    /// id is unknown.
    fn load(&self, file_id: &str) -> Result<Option<String>, SignError>;
}

/// In-memory store used by tests and single-session tools
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SignError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, bytes: &[u8]) -> Result<(), SignError> {
        self.entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn save(&mut self, bytes: &[u8], _filename: &str) -> Result<String, SignError> {
        validate_upload(bytes)?;
        let file_id = Uuid::new_v4().to_string();
        self.blobs.insert(file_id.clone(), bytes.to_vec());
        Ok(file_id)
    }

    fn load(&self, file_id: &str) -> Result<Option<String>, SignError> {
        Ok(self.blobs.get(file_id).map(|bytes| blob_data_url(bytes)))
    }
}

pub fn encode_document(document: &Document) -> Result<Vec<u8>, SignError> {
    Ok(serde_json::to_vec(document)?)
}

pub fn decode_document(bytes: &[u8]) -> Result<Document, SignError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Render stored file bytes as a data URL for the viewer
pub fn blob_data_url(bytes: &[u8]) -> String {
    format!("data:application/pdf;base64,{}", BASE64.encode(bytes))
}

/// Resolve a document's file for rendering. A missing or unreferenced blob
/// falls back to the placeholder sample rather than failing the render.
pub fn load_or_placeholder<B: BlobStore>(
    store: &B,
    file_id: Option<&str>,
) -> Result<String, SignError> {
    match file_id {
        Some(id) => Ok(store.load(id)?.unwrap_or_else(placeholder_data_url)),
        None => Ok(placeholder_data_url()),
    }
}

/// A minimal single-page sample document shown when no blob is stored
pub fn placeholder_data_url() -> String {
    blob_data_url(sample_document())
}

/// Raw bytes of the placeholder sample document
pub fn sample_document() -> &'static [u8] {
    PLACEHOLDER_PDF
}

const PLACEHOLDER_PDF: &[u8] = b"%PDF-1.4\n\
1 0 obj<</Type/Catalog/Pages 2 0 R>>endobj\n\
2 0 obj<</Type/Pages/Kids[3 0 R]/Count 1>>endobj\n\
3 0 obj<</Type/Page/Parent 2 0 R/MediaBox[0 0 612 792]>>endobj\n\
trailer<</Root 1 0 R>>\n\
%%EOF\n";

/// Validate an uploaded file before storing it
pub fn validate_upload(bytes: &[u8]) -> Result<(), SignError> {
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(SignError::InvalidUpload("maximum file size is 10MB".to_string()));
    }
    if !bytes.starts_with(b"%PDF-") {
        return Err(SignError::InvalidUpload(
            "not a PDF file (missing %PDF- header)".to_string(),
        ));
    }
    Ok(())
}

/// Hex-encoded SHA-256 of the uploaded file, stored for integrity display
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SignerInput;
    use chrono::Utc;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("doc-1", b"payload").unwrap();
        assert_eq!(store.get("doc-1").unwrap().as_deref(), Some(&b"payload"[..]));

        // Later writes win
        store.set("doc-1", b"newer").unwrap();
        assert_eq!(store.get("doc-1").unwrap().as_deref(), Some(&b"newer"[..]));
    }

    #[test]
    fn test_document_encode_decode() {
        let doc = Document::new(
            "Lease",
            "owner@x.com",
            Some("file-1".to_string()),
            vec![SignerInput::Email("a@x.com".to_string())],
            Utc::now(),
        )
        .unwrap();

        let bytes = encode_document(&doc).unwrap();
        let back = decode_document(&bytes).unwrap();
        assert_eq!(back.id, doc.id);
        assert_eq!(back.updated_at, doc.updated_at);
        assert_eq!(back.signers.len(), 1);
    }

    #[test]
    fn test_blob_store_save_and_load() {
        let mut store = MemoryBlobStore::new();
        let file_id = store.save(PLACEHOLDER_PDF, "lease.pdf").unwrap();

        let url = store.load(&file_id).unwrap().unwrap();
        assert!(url.starts_with("data:application/pdf;base64,"));
        assert_eq!(store.load("missing").unwrap(), None);
    }

    #[test]
    fn test_load_or_placeholder_falls_back() {
        let store = MemoryBlobStore::new();
        let url = load_or_placeholder(&store, Some("missing")).unwrap();
        assert_eq!(url, placeholder_data_url());
        let url = load_or_placeholder(&store, None).unwrap();
        assert_eq!(url, placeholder_data_url());
    }

    #[test]
    fn test_validate_upload_rejects_non_pdf() {
        let result = validate_upload(b"not a pdf");
        assert!(matches!(result, Err(SignError::InvalidUpload(_))));
    }

    #[test]
    fn test_validate_upload_rejects_oversize() {
        let mut big = b"%PDF-1.4".to_vec();
        big.resize(MAX_UPLOAD_BYTES + 1, 0);
        let result = validate_upload(&big);
        assert!(matches!(result, Err(SignError::InvalidUpload(_))));
    }

    #[test]
    fn test_content_hash_is_stable_hex() {
        let a = content_hash(b"%PDF-1.4 test");
        let b = content_hash(b"%PDF-1.4 test");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
