//! Core domain types for the mindoc document service.
//!
//! This crate holds the domain models, the unified error taxonomy, shared
//! constants, and environment-driven configuration. It performs no I/O; the
//! db, storage, and api crates build on it.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
