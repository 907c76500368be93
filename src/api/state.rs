//! Application state for the salary tax engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::engine::TaxEngine;

/// Shared application state.
///
/// Holds the tax engine, whose rule book and resolution cache are shared
/// across all request handlers.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<TaxEngine>,
}

impl AppState {
    /// Creates a new application state around an engine.
    pub fn new(engine: TaxEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Returns a reference to the tax engine.
    pub fn engine(&self) -> &TaxEngine {
        &self.engine
    }
}
