//! Builds provider handles from configuration

use super::command::CommandProvider;
use super::fixed::StaticProvider;
use crate::config::{FileProviderConfig, ProviderKind};
use concord_application::ports::provider::ProviderHandle;
use concord_domain::ProviderSpec;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while turning configuration into providers
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    #[error("provider '{id}': {field} is required for kind \"{kind}\"")]
    MissingField {
        id: String,
        kind: &'static str,
        field: &'static str,
    },

    #[error("provider '{id}': {reason}")]
    CommandNotFound { id: String, reason: String },

    #[error("provider '{0}': built without HTTP support (enable the \"http\" feature)")]
    HttpDisabled(String),
}

/// Builds [`ProviderHandle`]s from `[[providers]]` entries
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn build(config: &FileProviderConfig) -> Result<ProviderHandle, ProviderBuildError> {
        let spec = ProviderSpec::new(&config.id, config.model_name()).with_weight(config.weight);
        debug!("Building provider {} ({:?})", spec, config.kind);

        match config.kind {
            ProviderKind::Command => {
                let command = config
                    .command
                    .as_deref()
                    .filter(|c| !c.trim().is_empty())
                    .ok_or_else(|| ProviderBuildError::MissingField {
                        id: config.id.clone(),
                        kind: "command",
                        field: "command",
                    })?;
                let provider = CommandProvider::resolve(command, config.args.clone()).map_err(
                    |e| ProviderBuildError::CommandNotFound {
                        id: config.id.clone(),
                        reason: e.to_string(),
                    },
                )?;
                Ok(ProviderHandle::new(spec, provider))
            }
            ProviderKind::Static => {
                let response =
                    config
                        .response
                        .clone()
                        .ok_or_else(|| ProviderBuildError::MissingField {
                            id: config.id.clone(),
                            kind: "static",
                            field: "response",
                        })?;
                let provider =
                    StaticProvider::new(response).with_delay(Duration::from_millis(config.delay_ms));
                Ok(ProviderHandle::new(spec, provider))
            }
            ProviderKind::Openai => Self::build_http(spec, config),
        }
    }

    #[cfg(feature = "http")]
    fn build_http(
        spec: ProviderSpec,
        config: &FileProviderConfig,
    ) -> Result<ProviderHandle, ProviderBuildError> {
        use super::openai::OpenAiCompatibleProvider;

        let mut provider = OpenAiCompatibleProvider::new(&config.base_url, &spec.model)
            .with_max_tokens(config.max_tokens);

        match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => provider = provider.with_api_key(key),
            _ => tracing::warn!(
                "Provider {}: ${} is not set, sending requests without an API key",
                spec.id, config.api_key_env
            ),
        }

        Ok(ProviderHandle::new(spec, provider))
    }

    #[cfg(not(feature = "http"))]
    fn build_http(
        spec: ProviderSpec,
        _config: &FileProviderConfig,
    ) -> Result<ProviderHandle, ProviderBuildError> {
        Err(ProviderBuildError::HttpDisabled(spec.id))
    }

    /// Build every enabled entry, optionally restricted to `only` ids.
    ///
    /// Stops at the first entry that cannot be built.
    pub fn build_all<'a>(
        configs: impl IntoIterator<Item = &'a FileProviderConfig>,
        only: &[String],
    ) -> Result<Vec<ProviderHandle>, ProviderBuildError> {
        configs
            .into_iter()
            .filter(|c| c.enabled)
            .filter(|c| only.is_empty() || only.iter().any(|id| id == &c.id))
            .map(Self::build)
            .collect()
    }
}
