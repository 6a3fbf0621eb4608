//! HouseSign API Server - Backend for document e-signatures
//!
//! Provides REST endpoints for:
//! - Document creation and retrieval
//! - Signing field placement and geometry edits
//! - Per-field and whole-document signing, with revocation
//! - Share links and file download

use anyhow::Result;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

mod error;
mod handlers;
mod models;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("housesign_api=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    info!("Initializing HouseSign API...");
    let state = AppState::new().await?;
    let state = Arc::new(state);

    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Documents
        .route("/api/document", post(handlers::create_document))
        .route("/api/document/:id", get(handlers::get_document))
        // Signing fields and geometry
        .route("/api/document/:id/fields", post(handlers::place_field))
        .route(
            "/api/document/:id/fields/:field_id",
            delete(handlers::delete_field),
        )
        .route(
            "/api/document/:id/fields/:field_id/move",
            post(handlers::move_field),
        )
        .route(
            "/api/document/:id/fields/:field_id/resize",
            post(handlers::resize_field),
        )
        // Signing and revocation
        .route(
            "/api/document/:id/fields/:field_id/sign",
            post(handlers::sign_field),
        )
        .route(
            "/api/document/:id/fields/:field_id/revoke",
            post(handlers::revoke_signature),
        )
        .route("/api/document/:id/sign", post(handlers::sign_document))
        // Sharing and delivery
        .route("/api/document/:id/share", get(handlers::share_link))
        .route("/api/document/:id/file", get(handlers::get_file))
        .route("/api/document/:id/download", get(handlers::download))
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // Parse bind address
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HouseSign API on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
