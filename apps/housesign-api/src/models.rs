//! Request and response models for the HouseSign API

use housesign_core::{Document, SignerInput, SigningField};
use serde::{Deserialize, Serialize};

/// Request to create a document from an upload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDocumentRequest {
    pub owner: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    /// Uploaded file content; a document may also be created without one
    #[serde(default)]
    pub pdf_base64: Option<String>,
    /// Bare email strings and structured records are both accepted
    #[serde(default)]
    pub recipients: Vec<SignerInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentResponse {
    pub document: Document,
    /// SHA-256 of the stored file, when one was uploaded
    pub document_hash: Option<String>,
}

/// View-space drop point for drag-and-drop field placement
#[derive(Debug, Clone, Deserialize)]
pub struct DropPoint {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    /// Page dimensions in view-space (already scaled)
    pub page_width: f64,
    pub page_height: f64,
}

/// Request to place a signing field. With a drop point the field is
/// centered on it; without one the toolbar default position is used.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceFieldRequest {
    pub page: u32,
    #[serde(default)]
    pub drop: Option<DropPoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveFieldRequest {
    /// View-space pointer delta
    pub dx: f64,
    pub dy: f64,
    pub scale: f64,
    /// Page dimensions in document-space
    pub page_width: f64,
    pub page_height: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResizeFieldRequest {
    /// View-space pointer position
    pub pointer_x: f64,
    pub pointer_y: f64,
    pub scale: f64,
    /// Page dimensions in document-space
    pub page_width: f64,
    pub page_height: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldResponse {
    pub field: SigningField,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignFieldRequest {
    pub signer_email: String,
    /// Rasterized signature payload (data URL)
    pub signature_image_data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignDocumentRequest {
    pub signer_email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RevokeRequest {
    pub requester_email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShareQuery {
    #[serde(default)]
    pub origin: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareLinkResponse {
    pub url: String,
    pub token_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileResponse {
    /// Stored file rendered as a data URL; a sample document when no blob
    /// is stored
    pub data_url: String,
}
