//! Domain layer for concord
//!
//! This crate contains the data model and the pure computation of the
//! consensus engine. It has no dependencies on async runtimes,
//! infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Provider**: an AI completion service, identified by [`ProviderSpec`]
//! - **Outcome**: terminal status of one provider call ([`ProviderOutcome`])
//! - **Claim**: an atomic statement extracted from a successful response
//! - **Verdict**: whether enough providers agree on a claim ([`ClaimVerdict`])
//! - **Consensus score**: provider success ratio × claim agreement

pub mod consensus;
pub mod core;

// Re-export commonly used types
pub use consensus::{
    Claim, ClaimVerdict, ConsensusScore, ExecutionConfig, ExecutionResult, MAX_TIMEOUT, OutcomeStatus,
    ProviderClaims, ProviderOutcome, Synthesis, SynthesisMethod, WaitMode, evaluate,
    extract_claims,
};
pub use core::{error::ConsensusError, prompt::Prompt, provider::ProviderSpec};
