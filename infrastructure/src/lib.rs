//! Infrastructure layer for concord
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: completion providers, configuration file
//! loading and the JSONL execution logger.

pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, ConfigSources, ConfigValidationError, FileConfig,
    FileProviderConfig, ProviderKind,
};
pub use logging::JsonlExecutionLogger;
pub use providers::{CommandProvider, ProviderBuildError, ProviderFactory, StaticProvider};

#[cfg(feature = "http")]
pub use providers::OpenAiCompatibleProvider;
