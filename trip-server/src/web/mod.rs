//! Web layer for the trip planner.
//!
//! Provides HTTP endpoints for managing locations, planning trips and
//! requesting rides leg by leg.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
