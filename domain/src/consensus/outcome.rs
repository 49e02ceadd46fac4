//! Provider outcomes
//!
//! One [`ProviderOutcome`] is produced for every dispatched provider. It is
//! immutable once built and carries content only when the call succeeded.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Terminal status of one provider call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    /// The provider failed; the reason is kept for diagnostics
    Error(String),
    /// The shared deadline expired before the provider answered
    Timeout,
    /// Collection finished early and this call was cut off
    Cancelled,
}

impl OutcomeStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeStatus::Success)
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutcomeStatus::Success => "success",
            OutcomeStatus::Error(_) => "error",
            OutcomeStatus::Timeout => "timeout",
            OutcomeStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeStatus::Error(reason) => write!(f, "error: {}", reason),
            other => write!(f, "{}", other.label()),
        }
    }
}

/// Result of one provider call within one execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderOutcome {
    pub provider_id: String,
    pub model: String,
    pub status: OutcomeStatus,
    /// Time from dispatch start until the outcome was recorded
    pub latency: Duration,
    /// Response text, present only on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ProviderOutcome {
    /// Create a non-success outcome
    pub fn new(
        provider_id: impl Into<String>,
        model: impl Into<String>,
        status: OutcomeStatus,
        latency: Duration,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            model: model.into(),
            status,
            latency,
            content: None,
        }
    }

    pub fn success(
        provider_id: impl Into<String>,
        model: impl Into<String>,
        content: impl Into<String>,
        latency: Duration,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            model: model.into(),
            status: OutcomeStatus::Success,
            latency,
            content: Some(content.into()),
        }
    }

    pub fn error(
        provider_id: impl Into<String>,
        model: impl Into<String>,
        reason: impl Into<String>,
        latency: Duration,
    ) -> Self {
        Self::new(provider_id, model, OutcomeStatus::Error(reason.into()), latency)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Content of a successful outcome
    pub fn success_content(&self) -> Option<&str> {
        match self.status {
            OutcomeStatus::Success => self.content.as_deref(),
            _ => None,
        }
    }
}
