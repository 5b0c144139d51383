//! Car Price API - authenticated price prediction service
//!
//! Serves a pre-trained vehicle price model behind an API key and bearer
//! token, memoising predictions in a cache keyed by the feature payload.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod ml;
pub mod models;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use engine::PredictionEngine;
pub use ml::ModelArtifact;
pub use tasks::spawn_cleanup_task;
