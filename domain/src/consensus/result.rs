//! Execution result

use super::config::SynthesisMethod;
use super::outcome::{OutcomeStatus, ProviderOutcome};
use super::verdict::ClaimVerdict;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Terminal artifact of one execution.
///
/// Owns copies of everything that contributed to it. `provider_outcomes`
/// holds exactly one entry per dispatched provider: collected outcomes first
/// in completion order, then providers cut off by the wait policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub content: String,
    /// In `[0, 1]`; see [`crate::consensus::scoring`] for its caveats
    pub consensus_score: f64,
    pub synthesis_method: SynthesisMethod,
    pub total_latency: Duration,
    pub facts_verified: usize,
    pub facts_rejected: usize,
    pub provider_outcomes: Vec<ProviderOutcome>,
    pub verdicts: Vec<ClaimVerdict>,
    /// At least two providers succeeded, so claims were actually compared
    pub cross_verified: bool,
}

impl ExecutionResult {
    pub fn new(
        content: String,
        consensus_score: f64,
        synthesis_method: SynthesisMethod,
        total_latency: Duration,
        provider_outcomes: Vec<ProviderOutcome>,
        verdicts: Vec<ClaimVerdict>,
    ) -> Self {
        let facts_verified = verdicts.iter().filter(|v| v.accepted).count();
        let facts_rejected = verdicts.len() - facts_verified;
        let cross_verified = provider_outcomes.iter().filter(|o| o.is_success()).count() >= 2;

        Self {
            content,
            consensus_score: consensus_score.clamp(0.0, 1.0),
            synthesis_method,
            total_latency,
            facts_verified,
            facts_rejected,
            provider_outcomes,
            verdicts,
            cross_verified,
        }
    }

    pub fn success_count(&self) -> usize {
        self.successful_outcomes().count()
    }

    pub fn successful_outcomes(&self) -> impl Iterator<Item = &ProviderOutcome> {
        self.provider_outcomes.iter().filter(|o| o.is_success())
    }

    /// Outcomes recorded before collection terminated, in completion order
    pub fn authoritative_outcomes(&self) -> impl Iterator<Item = &ProviderOutcome> {
        self.provider_outcomes
            .iter()
            .filter(|o| o.status != OutcomeStatus::Cancelled)
    }

    pub fn total_claims(&self) -> usize {
        self.facts_verified + self.facts_rejected
    }
}
