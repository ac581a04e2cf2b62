//! HTTP handler definitions for the concerts server.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and re-exports all handler functions for convenient access
//! when building the router.

pub mod concerts;
pub mod error;
pub mod health;
pub mod negotiation;
pub mod openapi;

pub use concerts::{
    create_concert, delete_concert, list_concerts, show_concert, update_concert,
};
pub use error::ApiError;
pub use health::{health_handler, liveness_handler, readiness_handler};
pub use negotiation::Negotiation;
pub use openapi::{openapi_handler, ApiDoc};

use std::sync::Arc;
use std::time::Instant;

use concerts_core::CodecRegistry;

use super::ShutdownController;
use crate::storage::ConcertStore;

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc` references to shared resources so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// The concert collection.
    pub store: Arc<ConcertStore>,
    /// Media-type registry used to negotiate request and response formats.
    pub codecs: Arc<CodecRegistry>,
    /// Health state and in-flight tracking.
    pub shutdown: Arc<ShutdownController>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// State with an empty store, the default codecs and a fresh controller.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(ConcertStore::new()),
            codecs: Arc::new(CodecRegistry::default()),
            shutdown: Arc::new(ShutdownController::new()),
            start_time: Instant::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
