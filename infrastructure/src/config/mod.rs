//! Configuration file loading for concord
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CONCORD_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./concord.toml` or `./.concord.toml`
//! 4. Global: `$XDG_CONFIG_HOME/concord/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileConsensusConfig, FileLoggingConfig, FileOutputConfig,
    FileProviderConfig, OUTPUT_FORMATS, ProviderKind,
};
pub use loader::{ConfigError, ConfigLoader, ConfigSources, ENV_PREFIX};
