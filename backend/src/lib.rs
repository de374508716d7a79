//! # CCA Records Backend
//!
//! Record keeping for a school's students, classes, subjects, CCAs and
//! activities, plus the relations between students and the last three.
//!
//! ```text
//! HTTP client (forms, scripts)
//!     ↓
//! IO Layer (REST handlers, form normalisation)
//!     ↓
//! Storage Layer (collections over SQLite)
//! ```

pub mod config;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use axum::Router;
use tracing::info;

use crate::config::AppConfig;
use crate::io::rest::{create_router, AppState};
use crate::storage::{DbConnection, Storage};

/// Open storage and build the application state
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.storage.database_url);
    let db_conn = DbConnection::new(&config.storage)
        .await
        .context("Failed to open database")?;

    info!("Setting up collections");
    let storage = Storage::new(db_conn);

    Ok(AppState::new(storage))
}

/// Build the fully configured router
pub fn build_app(config: &AppConfig, app_state: AppState) -> Result<Router> {
    let cors_origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", config.cors_origin))?;

    Ok(create_router(app_state, cors_origin))
}
