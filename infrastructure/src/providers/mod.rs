//! Completion provider adapters
//!
//! Each adapter implements the
//! [`CompletionProvider`](concord_application::CompletionProvider) port:
//!
//! - [`CommandProvider`]: local CLI tool, prompt on stdin
//! - [`OpenAiCompatibleProvider`]: chat completions over HTTP (`http` feature)
//! - [`StaticProvider`]: fixed response, for offline runs
//!
//! [`ProviderFactory`] builds them from `[[providers]]` configuration.

mod command;
mod factory;
mod fixed;
#[cfg(feature = "http")]
mod openai;

pub use command::CommandProvider;
pub use factory::{ProviderBuildError, ProviderFactory};
pub use fixed::StaticProvider;
#[cfg(feature = "http")]
pub use openai::OpenAiCompatibleProvider;
