//! Application setup and initialization
//!
//! Startup order: validate settings, select the storage backend, build the
//! router, then serve. Shutdown runs the other way round.

pub mod routes;
pub mod server;
pub mod storage;

pub use server::{shutdown_signal, RunningServer, Server};
