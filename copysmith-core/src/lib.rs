//! Copysmith Core - shared data model, configuration and infrastructure
//!
//! Error taxonomy, typed configuration, logging, retry and the cache store
//! used by every other copysmith crate.

pub mod async_utils;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod text;
pub mod types;

pub use async_utils::*;
pub use cache::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tokio;
pub use tracing;
