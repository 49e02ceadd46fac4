//! Post-collection evaluation
//!
//! Everything after the response collector is pure computation: enforce the
//! provider requirements, extract claims, cross-verify, score, and build the
//! [`ExecutionResult`]. Nothing here suspends or performs I/O.

use super::config::ExecutionConfig;
use super::outcome::ProviderOutcome;
use super::result::ExecutionResult;
use super::scoring::score;
use super::synthesis::{ProviderClaims, synthesize};
use crate::core::error::ConsensusError;
use crate::core::provider::{DEFAULT_WEIGHT, ProviderSpec};
use std::time::Duration;

/// Turn the collected outcomes of every dispatched provider into a result.
///
/// `outcomes` must hold one entry per dispatched provider, collected ones
/// first in completion order. `providers` supplies vote weights; providers
/// missing from it weigh [`DEFAULT_WEIGHT`].
pub fn evaluate(
    outcomes: Vec<ProviderOutcome>,
    providers: &[ProviderSpec],
    config: &ExecutionConfig,
    total_latency: Duration,
) -> Result<ExecutionResult, ConsensusError> {
    let success_count = outcomes.iter().filter(|o| o.is_success()).count();

    // Zero successes always wins over the quorum check, even with min_providers == 0
    if success_count == 0 {
        return Err(ConsensusError::NoSuccessfulProviders { outcomes });
    }

    if success_count < config.min_providers {
        return Err(ConsensusError::InsufficientProviders {
            success_count,
            required: config.min_providers,
            outcomes,
        });
    }

    let claims_by_provider: Vec<ProviderClaims> = outcomes
        .iter()
        .filter_map(|outcome| {
            let weight = providers
                .iter()
                .find(|p| p.id == outcome.provider_id)
                .map_or(DEFAULT_WEIGHT, |p| p.weight);
            ProviderClaims::from_outcome(outcome, weight)
        })
        .collect();

    let synthesis = synthesize(&claims_by_provider, config).ok_or_else(|| {
        ConsensusError::NoSuccessfulProviders {
            outcomes: outcomes.clone(),
        }
    })?;

    let consensus = score(&synthesis.verdicts, &outcomes);

    Ok(ExecutionResult::new(
        synthesis.content,
        consensus.value,
        config.synthesis_method,
        total_latency,
        outcomes,
        synthesis.verdicts,
    ))
}
