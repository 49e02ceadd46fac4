//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Enum-like values stay strings here and are parsed into domain types by
//! [`FileConfig::to_execution_config`], so a typo surfaces as a validation
//! issue instead of a deserialization failure.

use concord_domain::{ExecutionConfig, MAX_TIMEOUT, SynthesisMethod, WaitMode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error(
        "consensus.timeout_seconds must be between 1 and {max}, got {0}",
        max = MAX_TIMEOUT.as_secs()
    )]
    InvalidTimeout(u64),

    #[error("consensus.threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("consensus.synthesis: unknown method '{0}'")]
    UnknownSynthesisMethod(String),

    #[error("consensus.wait: {0}")]
    InvalidWaitMode(String),

    #[error("output.format: unknown format '{0}' (expected full, answer or json)")]
    UnknownOutputFormat(String),

    #[error("providers[{index}]: id cannot be empty")]
    EmptyProviderId { index: usize },

    #[error("provider '{0}' is defined more than once")]
    DuplicateProviderId(String),

    #[error("provider '{0}': weight must be a non-negative number")]
    InvalidWeight(String),

    #[error("provider '{0}': kind = \"command\" requires a command")]
    MissingCommand(String),

    #[error("provider '{0}': kind = \"static\" requires a response")]
    MissingResponse(String),
}

/// Raw `[consensus]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsensusConfig {
    /// Global deadline for every provider call
    pub timeout_seconds: u64,
    /// Successful providers required for a result
    pub min_providers: usize,
    /// cross_verification, first_success, concatenate or weighted_vote
    pub synthesis: String,
    /// Agreement ratio a claim needs to be accepted
    pub threshold: f64,
    /// all, quorum:N or first:N
    pub wait: String,
}

impl Default for FileConsensusConfig {
    fn default() -> Self {
        let defaults = ExecutionConfig::default();
        Self {
            timeout_seconds: defaults.timeout.as_secs(),
            min_providers: defaults.min_providers,
            synthesis: defaults.synthesis_method.to_string(),
            threshold: defaults.consensus_threshold,
            wait: defaults.wait_mode.to_string(),
        }
    }
}

/// How a provider entry is backed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// External program reading the prompt on stdin
    #[default]
    Command,
    /// OpenAI-compatible chat completions endpoint
    Openai,
    /// Fixed response, for offline runs
    Static,
}

/// Raw `[[providers]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    pub id: String,
    pub model: String,
    pub kind: ProviderKind,
    pub weight: f64,
    pub enabled: bool,

    // kind = "command"
    pub command: Option<String>,
    pub args: Vec<String>,

    // kind = "openai"
    pub base_url: String,
    pub api_key_env: String,
    pub max_tokens: u32,

    // kind = "static"
    pub response: Option<String>,
    pub delay_ms: u64,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            model: String::new(),
            kind: ProviderKind::default(),
            weight: concord_domain::core::provider::DEFAULT_WEIGHT,
            enabled: true,
            command: None,
            args: Vec::new(),
            base_url: "https://api.openai.com".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 4096,
            response: None,
            delay_ms: 0,
        }
    }
}

impl FileProviderConfig {
    /// Model name, falling back to the id when unset
    pub fn model_name(&self) -> &str {
        if self.model.trim().is_empty() {
            &self.id
        } else {
            &self.model
        }
    }
}

/// Accepted values of `output.format`
pub const OUTPUT_FORMATS: [&str; 3] = ["full", "answer", "json"];

/// Raw `[output]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// full, answer or json
    pub format: Option<String>,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

/// Raw `[logging]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Path of the JSONL execution log; disabled when unset
    pub execution_log: Option<String>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub consensus: FileConsensusConfig,
    pub providers: Vec<FileProviderConfig>,
    pub output: FileOutputConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning every detected issue.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();
        let consensus = &self.consensus;

        if consensus.timeout_seconds == 0 || consensus.timeout_seconds > MAX_TIMEOUT.as_secs() {
            issues.push(ConfigValidationError::InvalidTimeout(consensus.timeout_seconds));
        }
        if !consensus.threshold.is_finite() || !(0.0..=1.0).contains(&consensus.threshold) {
            issues.push(ConfigValidationError::InvalidThreshold(consensus.threshold));
        }
        if consensus.synthesis.parse::<SynthesisMethod>().is_err() {
            issues.push(ConfigValidationError::UnknownSynthesisMethod(
                consensus.synthesis.clone(),
            ));
        }
        match consensus.wait.parse::<WaitMode>() {
            Ok(WaitMode::WaitForQuorum(0)) | Ok(WaitMode::WaitForFirst(0)) => {
                issues.push(ConfigValidationError::InvalidWaitMode(
                    "count must be at least 1".to_string(),
                ));
            }
            Ok(_) => {}
            Err(e) => issues.push(ConfigValidationError::InvalidWaitMode(e.to_string())),
        }
        if let Some(format) = &self.output.format
            && !OUTPUT_FORMATS.contains(&format.to_lowercase().as_str())
        {
            issues.push(ConfigValidationError::UnknownOutputFormat(format.clone()));
        }

        let mut seen = HashSet::new();
        for (index, provider) in self.providers.iter().enumerate() {
            if provider.id.trim().is_empty() {
                issues.push(ConfigValidationError::EmptyProviderId { index });
                continue;
            }
            if !seen.insert(provider.id.as_str()) {
                issues.push(ConfigValidationError::DuplicateProviderId(
                    provider.id.clone(),
                ));
            }
            if !provider.weight.is_finite() || provider.weight < 0.0 {
                issues.push(ConfigValidationError::InvalidWeight(provider.id.clone()));
            }
            match provider.kind {
                ProviderKind::Command
                    if provider
                        .command
                        .as_deref()
                        .is_none_or(|c| c.trim().is_empty()) =>
                {
                    issues.push(ConfigValidationError::MissingCommand(provider.id.clone()));
                }
                ProviderKind::Static if provider.response.is_none() => {
                    issues.push(ConfigValidationError::MissingResponse(provider.id.clone()));
                }
                _ => {}
            }
        }

        issues
    }

    /// Enabled provider entries, in file order
    pub fn enabled_providers(&self) -> impl Iterator<Item = &FileProviderConfig> {
        self.providers.iter().filter(|p| p.enabled)
    }

    /// Build the per-call execution config from the `[consensus]` section.
    ///
    /// Unparseable values fall back to their defaults; [`FileConfig::validate`]
    /// reports them.
    pub fn to_execution_config(&self) -> ExecutionConfig {
        let defaults = ExecutionConfig::default();
        let consensus = &self.consensus;

        ExecutionConfig {
            timeout: if consensus.timeout_seconds == 0 {
                defaults.timeout
            } else {
                Duration::from_secs(consensus.timeout_seconds)
            },
            min_providers: consensus.min_providers,
            synthesis_method: consensus
                .synthesis
                .parse()
                .unwrap_or(defaults.synthesis_method),
            consensus_threshold: consensus.threshold,
            wait_mode: consensus.wait.parse().unwrap_or(defaults.wait_mode),
        }
    }
}
