//! Cache errors.

use thiserror::Error;

/// Cache error types.
///
/// Cache operations themselves never fail; errors only arise when loading
/// configuration.
#[derive(Debug, Error)]
pub enum CacheError {
    /// IO error while reading a configuration file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parse error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}
