//! HTTP handlers for the HouseSign API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use housesign_core::geometry::{self, PageBounds};
use housesign_core::share;
use housesign_core::store::{blob_data_url, content_hash, sample_document, validate_upload};
use housesign_core::{Document, SignError};

use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;

const DEFAULT_ORIGIN: &str = "http://localhost:3001";

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Create a new document from an upload
pub async fn create_document(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    // Store the file first, when one was uploaded
    let mut file_id = None;
    let mut document_hash = None;
    if let Some(encoded) = &req.pdf_base64 {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid PDF base64: {}", e)))?;
        validate_upload(&bytes)?;

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO blobs (file_id, filename, data, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(req.filename.as_deref().unwrap_or("document.pdf"))
        .bind(&bytes)
        .bind(Utc::now().to_rfc3339())
        .execute(&state.db)
        .await?;

        document_hash = Some(content_hash(&bytes));
        file_id = Some(id);
    }

    // Title falls back to the uploaded filename stem
    let title = req
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| req.filename.as_deref().map(filename_stem))
        .unwrap_or_else(|| "Untitled Document".to_string());

    let document = Document::new(&title, &req.owner, file_id, req.recipients, Utc::now())?;
    insert_document(&state, &document, document_hash.as_deref()).await?;

    tracing::info!("Created document: {} ({})", document.id, document.status);

    Ok(Json(DocumentResponse {
        document,
        document_hash,
    }))
}

/// Get a document by ID
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let (document, document_hash) = load_document(&state, &id).await?;
    Ok(Json(DocumentResponse {
        document,
        document_hash,
    }))
}

/// Place a signing field on a page
pub async fn place_field(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PlaceFieldRequest>,
) -> Result<Json<FieldResponse>, ApiError> {
    let (mut document, _) = load_document(&state, &id).await?;

    let field = match req.drop {
        Some(drop) => geometry::place_field(
            &document.signing_fields,
            req.page,
            (drop.x, drop.y),
            drop.scale,
            (drop.page_width, drop.page_height),
        )?,
        None => geometry::add_field(&document.signing_fields, req.page)?,
    };
    let placed = field.clone();
    document.push_field(field, Utc::now())?;
    save_document(&state, &document).await?;

    tracing::info!("Placed field {} on document {}", placed.id, id);

    Ok(Json(FieldResponse { field: placed }))
}

/// Move a field by a view-space pointer delta
pub async fn move_field(
    State(state): State<Arc<AppState>>,
    Path((id, field_id)): Path<(String, String)>,
    Json(req): Json<MoveFieldRequest>,
) -> Result<Json<FieldResponse>, ApiError> {
    let (mut document, _) = load_document(&state, &id).await?;
    let bounds = PageBounds::new(req.page_width, req.page_height);

    let field = document
        .signing_fields
        .iter_mut()
        .find(|f| f.id == field_id)
        .ok_or_else(|| SignError::FieldNotFound(field_id.clone()))?;
    geometry::move_field(field, (req.dx, req.dy), req.scale, bounds);
    let moved = field.clone();

    document.updated_at = Utc::now();
    save_document(&state, &document).await?;
    Ok(Json(FieldResponse { field: moved }))
}

/// Resize a field toward a view-space pointer position
pub async fn resize_field(
    State(state): State<Arc<AppState>>,
    Path((id, field_id)): Path<(String, String)>,
    Json(req): Json<ResizeFieldRequest>,
) -> Result<Json<FieldResponse>, ApiError> {
    let (mut document, _) = load_document(&state, &id).await?;
    let bounds = PageBounds::new(req.page_width, req.page_height);

    let field = document
        .signing_fields
        .iter_mut()
        .find(|f| f.id == field_id)
        .ok_or_else(|| SignError::FieldNotFound(field_id.clone()))?;
    geometry::resize_field(field, (req.pointer_x, req.pointer_y), req.scale, bounds);
    let resized = field.clone();

    document.updated_at = Utc::now();
    save_document(&state, &document).await?;
    Ok(Json(FieldResponse { field: resized }))
}

/// Delete a field. A signed field may be deleted; its signature goes with it.
pub async fn delete_field(
    State(state): State<Arc<AppState>>,
    Path((id, field_id)): Path<(String, String)>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let (mut document, document_hash) = load_document(&state, &id).await?;
    document.delete_field(&field_id, Utc::now())?;
    save_document(&state, &document).await?;

    tracing::info!("Deleted field {} from document {}", field_id, id);

    Ok(Json(DocumentResponse {
        document,
        document_hash,
    }))
}

/// Sign one field
pub async fn sign_field(
    State(state): State<Arc<AppState>>,
    Path((id, field_id)): Path<(String, String)>,
    Json(req): Json<SignFieldRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let (mut document, document_hash) = load_document(&state, &id).await?;
    document.sign_field(&field_id, &req.signer_email, &req.signature_image_data, Utc::now())?;
    save_document(&state, &document).await?;

    tracing::info!(
        "Field {} on document {} signed by {}, status: {}",
        field_id,
        id,
        req.signer_email,
        document.status
    );

    Ok(Json(DocumentResponse {
        document,
        document_hash,
    }))
}

/// Whole-document signature path for documents without fields
pub async fn sign_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SignDocumentRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let (mut document, document_hash) = load_document(&state, &id).await?;
    document.sign_document(&req.signer_email, Utc::now())?;
    save_document(&state, &document).await?;

    tracing::info!(
        "Document {} signed by {}, status: {}",
        id,
        req.signer_email,
        document.status
    );

    Ok(Json(DocumentResponse {
        document,
        document_hash,
    }))
}

/// Revoke a signature within the 5-minute window
pub async fn revoke_signature(
    State(state): State<Arc<AppState>>,
    Path((id, field_id)): Path<(String, String)>,
    Json(req): Json<RevokeRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let (mut document, document_hash) = load_document(&state, &id).await?;
    document.revoke_signature(&field_id, &req.requester_email, Utc::now())?;
    save_document(&state, &document).await?;

    tracing::info!(
        "Signature on field {} of document {} revoked by {}",
        field_id,
        id,
        req.requester_email
    );

    Ok(Json(DocumentResponse {
        document,
        document_hash,
    }))
}

/// Produce share links for a document
pub async fn share_link(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ShareQuery>,
) -> Result<Json<ShareLinkResponse>, ApiError> {
    // Confirm the document exists before handing out links
    load_document(&state, &id).await?;

    let origin = query
        .origin
        .or_else(|| std::env::var("PUBLIC_ORIGIN").ok())
        .unwrap_or_else(|| DEFAULT_ORIGIN.to_string());

    Ok(Json(ShareLinkResponse {
        url: share::share_link(&origin, &id),
        token_url: share::share_link_with_token(&origin, &id, Utc::now().timestamp_millis()),
    }))
}

/// Get the document file as a data URL for the viewer. Falls back to the
/// sample document when no blob is stored.
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FileResponse>, ApiError> {
    let (document, _) = load_document(&state, &id).await?;
    let bytes = load_blob(&state, document.file_id.as_deref()).await?;
    Ok(Json(FileResponse {
        data_url: blob_data_url(&bytes),
    }))
}

/// Download the document as a PDF attachment
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, [(String, String); 2], Vec<u8>), ApiError> {
    let (document, _) = load_document(&state, &id).await?;
    let bytes = load_blob(&state, document.file_id.as_deref()).await?;
    let (filename, body) = share::prepare_download(&document.title, &bytes, &document.signing_fields);

    Ok((
        StatusCode::OK,
        [
            ("Content-Type".to_string(), "application/pdf".to_string()),
            (
                "Content-Disposition".to_string(),
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    ))
}

async fn load_document(
    state: &AppState,
    id: &str,
) -> Result<(Document, Option<String>), ApiError> {
    let row: Option<(String, Option<String>)> = sqlx::query_as(
        r#"
        SELECT document_json, document_hash FROM documents WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?;

    let (json, hash) = row.ok_or_else(|| ApiError::DocumentNotFound(id.to_string()))?;
    let document: Document =
        serde_json::from_str(&json).map_err(|e| ApiError::Internal(e.into()))?;
    Ok((document, hash))
}

async fn insert_document(
    state: &AppState,
    document: &Document,
    document_hash: Option<&str>,
) -> Result<(), ApiError> {
    let json = serde_json::to_string(document).map_err(|e| ApiError::Internal(e.into()))?;
    sqlx::query(
        r#"
        INSERT INTO documents (id, document_json, document_hash, updated_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&document.id)
    .bind(&json)
    .bind(document_hash)
    .bind(document.updated_at.to_rfc3339())
    .execute(&state.db)
    .await?;
    Ok(())
}

async fn save_document(state: &AppState, document: &Document) -> Result<(), ApiError> {
    let json = serde_json::to_string(document).map_err(|e| ApiError::Internal(e.into()))?;
    sqlx::query(
        r#"
        UPDATE documents SET document_json = ?, updated_at = ? WHERE id = ?
        "#,
    )
    .bind(&json)
    .bind(document.updated_at.to_rfc3339())
    .bind(&document.id)
    .execute(&state.db)
    .await?;
    Ok(())
}

async fn load_blob(state: &AppState, file_id: Option<&str>) -> Result<Vec<u8>, ApiError> {
    let Some(file_id) = file_id else {
        return Ok(sample_document().to_vec());
    };
    let row: Option<(Vec<u8>,)> = sqlx::query_as(
        r#"
        SELECT data FROM blobs WHERE file_id = ?
        "#,
    )
    .bind(file_id)
    .fetch_optional(&state.db)
    .await?;

    // A dangling file reference falls back to the sample document
    Ok(row.map(|(data,)| data).unwrap_or_else(|| sample_document().to_vec()))
}

/// Strip the extension from an uploaded filename
fn filename_stem(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name.to_string(),
    }
}
