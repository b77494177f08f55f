//! # pagenav-cache
//!
//! Time- and size-bounded in-memory cache for client-side navigation
//! runtimes.
//!
//! ## Features
//!
//! - Per-entry expiry with lazy removal on read
//! - One collection sweep guaranteed after every store
//! - Oldest-first capacity trimming
//! - TOML-loadable configuration

pub mod cache;
pub mod config;
mod entry;
pub mod error;

pub use cache::Cache;
pub use config::CacheConfig;
pub use error::CacheError;
