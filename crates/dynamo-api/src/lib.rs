//! Dynamo API Library
//!
//! This crate provides the HTTP API handlers, middleware, and application setup
//! for the upload service.

// Module declarations
mod handlers;
mod middleware;
mod utils;

// Public modules
pub mod error;
pub mod setup;
pub mod state;

// Re-exports
pub use error::HttpAppError;
pub use setup::{RunningServer, Server};
pub use state::AppState;
