//! Core types, configuration, and utilities for ThreadMirror.
//!
//! This crate holds everything the replication engine and the CLI share:
//! strongly-typed platform identifiers, the inbound message model, the
//! configuration schema with its JSON5 loader, and credential handling.

pub mod config;
pub mod error;
pub mod secret;
pub mod types;

pub use config::Config;
pub use error::ConfigError;
pub use secret::SecretString;
