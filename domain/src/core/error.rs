//! Fatal engine errors
//!
//! Individual provider failures are never errors at this level: they are
//! recorded as [`OutcomeStatus`](crate::consensus::OutcomeStatus) data.
//! Only the conditions below end an execution without a result.

use crate::consensus::ProviderOutcome;
use thiserror::Error;

/// Errors that terminate a consensus execution
#[derive(Error, Debug, Clone)]
pub enum ConsensusError {
    #[error("No providers configured")]
    NoProvidersConfigured,

    #[error("No provider returned a successful response ({} dispatched)", outcomes.len())]
    NoSuccessfulProviders { outcomes: Vec<ProviderOutcome> },

    #[error("Insufficient providers: {success_count} succeeded, {required} required")]
    InsufficientProviders {
        success_count: usize,
        required: usize,
        outcomes: Vec<ProviderOutcome>,
    },

    #[error("Invalid execution config: {0}")]
    InvalidConfig(String),
}

impl ConsensusError {
    /// Partial provider outcomes attached for diagnostics, if any
    pub fn outcomes(&self) -> &[ProviderOutcome] {
        match self {
            ConsensusError::NoSuccessfulProviders { outcomes }
            | ConsensusError::InsufficientProviders { outcomes, .. } => outcomes,
            _ => &[],
        }
    }
}
