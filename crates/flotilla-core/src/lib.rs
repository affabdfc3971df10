//! flotilla-core: shared types for the flotilla rollout engine.
//!
//! A release is rolled out to many clusters through three companion
//! targets: installation (which clusters), capacity (what share of
//! replicas) and traffic (what traffic weight). This crate holds those
//! types, the error taxonomy, `flotilla.toml` parsing, and the [`Catalog`]
//! snapshot that callers use to pick a contender and incumbent.

pub mod catalog;
pub mod config;
pub mod error;
pub mod types;

pub use catalog::Catalog;
pub use config::FlotillaConfig;
pub use error::{Error, ErrorKind, Result};
pub use types::*;
