//! Layered configuration for Arbor.
//!
//! # Usage
//!
//! ```rust,no_run
//! use arbor_config::Config;
//!
//! // defaults -> /etc/arbor -> ~/.arbor -> explicit file -> ARBOR_* env
//! let loaded = Config::load(None).unwrap();
//! println!("issuer: {}", loaded.config.claims.issuer);
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Environment variables** (`ARBOR_LOG_LEVEL`, `ARBOR_CATALOG`, ...)
//! 2. **Explicit file** (`arbor --config <path>`)
//! 3. **User** (`~/.arbor/config.toml`, or `$ARBOR_HOME/config.toml`)
//! 4. **System** (`/etc/arbor/config.toml`)
//! 5. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! This crate depends on no other Arbor crate. Conversion to engine types
//! happens at the CLI boundary.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

/// `ARBOR_*` environment overrides.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
mod merge;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{LoadOptions, LoadedConfig, MAX_CONFIG_FILE_SIZE};
pub use types::*;

impl Config {
    /// Load with the full precedence chain, optionally adding an explicit
    /// file above the user layer.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load(explicit: Option<&std::path::Path>) -> ConfigResult<LoadedConfig> {
        loader::load(&LoadOptions {
            explicit: explicit.map(std::path::Path::to_path_buf),
            ..LoadOptions::default()
        })
    }

    /// Check this configuration's invariants.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::ValidationError`] found.
    pub fn validate(&self) -> ConfigResult<()> {
        validate::validate(self)
    }
}
