//! Application layer for concord
//!
//! This crate contains the execution use case and its port definitions.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    execution_logger::{ExecutionEvent, ExecutionLogger, NoExecutionLogger},
    progress::{NoProgress, ProgressNotifier},
    provider::{CompletionProvider, ProviderError, ProviderHandle},
};
pub use use_cases::collect::{CANCELLATION_GRACE, Collection, ResponseCollector, Termination};
pub use use_cases::dispatch::{Completion, OutcomeStream, ProviderCall, ProviderDispatcher};
pub use use_cases::run_consensus::{RunConsensusInput, RunConsensusUseCase};
