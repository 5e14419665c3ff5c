//! Dynamo Infrastructure Library
//!
//! Shared infrastructure for the Dynamo services:
//! - Middleware (request ID)
//! - Telemetry initialization (tracing subscriber from environment)

pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use middleware::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use telemetry::{init_telemetry, LogSettings};
