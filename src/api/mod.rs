//! HTTP API module for the salary tax engine.
//!
//! This module provides a thin REST adapter over [`TaxEngine`](crate::engine::TaxEngine):
//! `POST /calculate`, `GET /regimes` and `GET /health`.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CalculationRequest, RegimesQuery};
pub use response::{ApiError, ApiErrorResponse, HealthResponse, RegimesResponse};
pub use state::AppState;
