//! # SchemaForge
//!
//! Visual editor for JSON Schema documents. Users build a product schema
//! through a recursive property editor, preview it, and render a data-entry
//! form generated from it.
//!
//! This crate is the registry service: an in-memory schema store behind a
//! JSON API, a notification stream for the front-end's toasts, and the
//! embedded front-end bundle. The schema model and the schema-to-form
//! compiler live in `schemaforge-core`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use schemaforge::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration
//!     let settings = Settings::new()?;
//!
//!     // Server will start on configured host:port
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: the registry port and its errors
//! - **Adapters**: in-memory registry, HTTP handlers, notification hub, UI
//! - **Config**: configuration management

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;

use crate::adapters::api_handler::{self, ApiState};
use crate::adapters::health_handler::HealthHandler;
use crate::adapters::notifications::{self, NotificationHub};
use crate::domain::SchemaRegistryPort;
use axum::{routing::{get, post}, Router};
use std::sync::Arc;

/// Creates the Axum application router with all endpoints configured.
///
/// # Arguments
///
/// * `registry` - Schema storage
/// * `notifications` - Hub the registry posts to, streamed to the UI
///
/// # Returns
///
/// Configured Axum Router
pub fn create_app(registry: Arc<dyn SchemaRegistryPort>, notifications: NotificationHub) -> Router {
    let health_handler = Arc::new(HealthHandler::new(registry.clone()));

    // Health check endpoints
    let health_router = Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/ready", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.ready().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }));

    let api_state = ApiState {
        registry,
        notifications,
    };

    // API routes for the Web UI
    let api_router = Router::new()
        .route("/schemas", get(api_handler::list_schemas).post(api_handler::create_schema))
        .route(
            "/schemas/:id",
            get(api_handler::get_schema)
                .put(api_handler::update_schema)
                .delete(api_handler::delete_schema),
        )
        .route("/schemas/:id/plan", get(api_handler::get_plan))
        .route("/schemas/:id/submit", post(api_handler::submit_form))
        .route("/notifications", get(notifications::stream_notifications))
        .with_state(api_state);

    let router = health_router
        .nest("/api", api_router)
        // UI endpoint (catch-all for SPA)
        .fallback(crate::adapters::ui_handler::UIHandler::serve);

    router.layer(
        tower_http::cors::CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
