//! HTTP surface for the team activity monitor.
//!
//! Exposes health and provider status checks plus the natural-language
//! query endpoint over axum.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
