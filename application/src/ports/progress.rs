//! Progress notification port
//!
//! Defines the interface for reporting progress during a consensus execution.

use concord_domain::{ExecutionResult, ProviderOutcome, ProviderSpec};

/// Callback for progress updates during an execution
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain text, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called once every provider call has been started
    fn on_dispatch_start(&self, providers: &[ProviderSpec]);

    /// Called for each outcome accepted by the collector, in completion order
    fn on_outcome(&self, outcome: &ProviderOutcome);

    /// Called when collection stops; `cut_off` providers never reported
    fn on_collection_complete(&self, collected: usize, cut_off: usize);

    /// Called when a result has been synthesized and scored
    fn on_synthesis_complete(&self, _result: &ExecutionResult) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_dispatch_start(&self, _providers: &[ProviderSpec]) {}
    fn on_outcome(&self, _outcome: &ProviderOutcome) {}
    fn on_collection_complete(&self, _collected: usize, _cut_off: usize) {}
}
