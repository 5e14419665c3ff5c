//! Tracing subscriber initialization
//!
//! Levels and output format come from the environment; see [`LogSettings`].

mod init_basic;

pub use init_basic::{init_telemetry, LogSettings};
