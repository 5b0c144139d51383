//! API Module
//!
//! HTTP handlers and routing for the prediction service.
//!
//! # Endpoints
//! - `POST /login` - Exchange credentials for a session token
//! - `POST /predict` - Price estimate (API key + bearer token)
//! - `GET /cache/stats` - Prediction cache counters (API key)
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;
pub mod state;

pub use handlers::*;
pub use routes::create_router;
pub use state::AppState;
