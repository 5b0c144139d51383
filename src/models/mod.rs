//! Request and Response models for the prediction API
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.
//! The predict body is a raw [`FeaturePayload`](crate::engine::FeaturePayload).

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::LoginRequest;
pub use responses::{
    ErrorResponse, HealthResponse, PredictionResponse, StatsResponse, TokenResponse,
};
