//! Consensus scoring
//!
//! `score = provider_success_ratio * claim_agreement`, clamped to `[0, 1]`.
//!
//! - `provider_success_ratio` = successful outcomes / dispatched providers
//! - `claim_agreement` = mean agreement ratio of accepted claims; `1.0` when
//!   no claims were extracted at all, `0.0` when claims existed but every
//!   one was rejected
//!
//! A single provider answering alone scores `1.0`. That means "nothing
//! contradicted it", not "independently confirmed"; check
//! [`ExecutionResult::cross_verified`](super::ExecutionResult::cross_verified)
//! before treating a high score as high confidence.

use super::outcome::ProviderOutcome;
use super::verdict::ClaimVerdict;
use serde::{Deserialize, Serialize};

/// The two factors of a consensus score and their product
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsensusScore {
    pub provider_success_ratio: f64,
    pub claim_agreement: f64,
    pub value: f64,
}

/// Score an execution from its verdicts and every dispatched provider's outcome
pub fn score(verdicts: &[ClaimVerdict], outcomes: &[ProviderOutcome]) -> ConsensusScore {
    let provider_success_ratio = if outcomes.is_empty() {
        0.0
    } else {
        outcomes.iter().filter(|o| o.is_success()).count() as f64 / outcomes.len() as f64
    };

    let claim_agreement = claim_agreement(verdicts);
    let value = (provider_success_ratio * claim_agreement).clamp(0.0, 1.0);

    ConsensusScore {
        provider_success_ratio,
        claim_agreement,
        value,
    }
}

fn claim_agreement(verdicts: &[ClaimVerdict]) -> f64 {
    if verdicts.is_empty() {
        return 1.0;
    }

    let accepted: Vec<f64> = verdicts
        .iter()
        .filter(|v| v.accepted)
        .map(|v| v.agreement_ratio)
        .collect();

    if accepted.is_empty() {
        0.0
    } else {
        accepted.iter().sum::<f64>() / accepted.len() as f64
    }
}
