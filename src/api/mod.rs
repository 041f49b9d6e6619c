//! HTTP API module for the personnel cost engine.
//!
//! This module provides the REST API endpoints for projecting costs and
//! looking up salaries in the loaded tariff.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CalculationRequest, PositionRequest};
pub use response::{ApiError, ApiErrorResponse, CalculationResponse, SalaryResponse};
pub use state::AppState;
