//! Multi-provider consensus domain
//!
//! Pure building blocks of the consensus engine. Dispatch and collection
//! live in the application layer; everything downstream of collection is
//! here and performs no I/O.
//!
//! ```text
//! outcomes ──► claim extraction ──► cross verification ──► scoring ──► ExecutionResult
//!              (per success)        (group by key,          (success ratio
//!                                    accept / reject,        × agreement)
//!                                    assemble answer)
//! ```

pub mod claim;
pub mod config;
pub mod evaluation;
pub mod outcome;
pub mod result;
pub mod scoring;
pub mod synthesis;
pub mod verdict;

pub use claim::{Claim, extract_claims, extract_from_text, normalize_key, split_statements};
pub use config::{ExecutionConfig, MAX_TIMEOUT, SynthesisMethod, WaitMode};
pub use evaluation::evaluate;
pub use outcome::{OutcomeStatus, ProviderOutcome};
pub use result::ExecutionResult;
pub use scoring::{ConsensusScore, score};
pub use synthesis::{ProviderClaims, Synthesis, cross_verify, synthesize};
pub use verdict::ClaimVerdict;
