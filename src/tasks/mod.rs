//! Background Tasks Module
//!
//! # Tasks
//! - Cache cleanup: purges expired predictions from the in-memory backend

mod cleanup;

pub use cleanup::spawn_cleanup_task;
