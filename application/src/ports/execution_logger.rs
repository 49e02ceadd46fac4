//! Execution log port
//!
//! An [`ExecutionLogger`] receives one [`ExecutionEvent`] per step of an
//! execution: the run starting, each provider's terminal outcome, and the
//! final result or fatal error. Events are typed; an adapter decides how to
//! persist them (JSON lines, a database, nothing at all).

use concord_domain::{
    ConsensusError, ExecutionConfig, ExecutionResult, ProviderOutcome, ProviderSpec,
};
use serde::Serialize;

/// One step of an execution, serialized with a `type` tag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionEvent {
    ExecutionStarted {
        prompt_chars: usize,
        providers: Vec<String>,
        timeout_ms: u64,
        min_providers: usize,
        synthesis_method: String,
        consensus_threshold: f64,
        wait_mode: String,
    },
    ProviderOutcome {
        provider: String,
        model: String,
        status: &'static str,
        detail: String,
        latency_ms: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        response_chars: Option<usize>,
    },
    ExecutionCompleted {
        consensus_score: f64,
        facts_verified: usize,
        facts_rejected: usize,
        success_count: usize,
        cross_verified: bool,
        total_latency_ms: u64,
    },
    ExecutionFailed {
        error: String,
        outcomes: usize,
    },
}

impl ExecutionEvent {
    pub fn started(prompt: &str, providers: &[ProviderSpec], config: &ExecutionConfig) -> Self {
        ExecutionEvent::ExecutionStarted {
            prompt_chars: prompt.chars().count(),
            providers: providers.iter().map(|p| p.id.clone()).collect(),
            timeout_ms: config.timeout.as_millis() as u64,
            min_providers: config.min_providers,
            synthesis_method: config.synthesis_method.to_string(),
            consensus_threshold: config.consensus_threshold,
            wait_mode: config.wait_mode.to_string(),
        }
    }

    pub fn outcome(outcome: &ProviderOutcome) -> Self {
        ExecutionEvent::ProviderOutcome {
            provider: outcome.provider_id.clone(),
            model: outcome.model.clone(),
            status: outcome.status.label(),
            detail: outcome.status.to_string(),
            latency_ms: outcome.latency.as_millis() as u64,
            response_chars: outcome.content.as_ref().map(|c| c.chars().count()),
        }
    }

    pub fn completed(result: &ExecutionResult) -> Self {
        ExecutionEvent::ExecutionCompleted {
            consensus_score: result.consensus_score,
            facts_verified: result.facts_verified,
            facts_rejected: result.facts_rejected,
            success_count: result.success_count(),
            cross_verified: result.cross_verified,
            total_latency_ms: result.total_latency.as_millis() as u64,
        }
    }

    pub fn failed(error: &ConsensusError) -> Self {
        ExecutionEvent::ExecutionFailed {
            error: error.to_string(),
            outcomes: error.outcomes().len(),
        }
    }

    /// Tag written as the `type` field
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutionEvent::ExecutionStarted { .. } => "execution_started",
            ExecutionEvent::ProviderOutcome { .. } => "provider_outcome",
            ExecutionEvent::ExecutionCompleted { .. } => "execution_completed",
            ExecutionEvent::ExecutionFailed { .. } => "execution_failed",
        }
    }
}

/// Sink for execution events. Must not fail or block the execution.
pub trait ExecutionLogger: Send + Sync {
    fn log(&self, event: &ExecutionEvent);
}

/// Discards every event
pub struct NoExecutionLogger;

impl ExecutionLogger for NoExecutionLogger {
    fn log(&self, _event: &ExecutionEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_domain::OutcomeStatus;
    use std::time::Duration;

    #[test]
    fn test_outcome_event_serializes_with_type_tag() {
        let outcome = ProviderOutcome::new(
            "gpt",
            "gpt-4o",
            OutcomeStatus::Error("HTTP 502".to_string()),
            Duration::from_millis(340),
        );
        let event = ExecutionEvent::outcome(&outcome);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], event.kind());
        assert_eq!(json["type"], "provider_outcome");
        assert_eq!(json["provider"], "gpt");
        assert_eq!(json["latency_ms"], 340);
        assert!(json.get("response_chars").is_none());
    }

    #[test]
    fn test_started_event_records_policy() {
        let config = ExecutionConfig::default().with_timeout(Duration::from_secs(5));
        let event = ExecutionEvent::started("Hi there", &[ProviderSpec::new("a", "m")], &config);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "execution_started");
        assert_eq!(json["prompt_chars"], 8);
        assert_eq!(json["timeout_ms"], 5000);
        assert_eq!(json["wait_mode"], "all");
        assert_eq!(json["synthesis_method"], "cross_verification");
        assert_eq!(json["providers"][0], "a");
    }
}
