//! Configuration file loading
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `ENSEMBLE_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./ensemble.toml` or `./.ensemble.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/ensemble/config.toml`
//! 5. Fallback: `~/.config/ensemble/config.toml`
//! 6. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileDatabaseConfig, FileModelsConfig, FileProviderConfig,
    FileProvidersConfig, FileServerConfig, ProviderConfig, ProvidersConfig,
};
pub use loader::ConfigLoader;
