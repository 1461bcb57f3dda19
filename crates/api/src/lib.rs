//! Brandmark API
//!
//! Axum-based HTTP and websocket API for the Brandmark aggregator.

pub mod handlers;
pub mod router;
pub mod security;
pub mod state;

pub use router::create_router;
pub use state::AppState;
