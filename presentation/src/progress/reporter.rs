//! Progress reporting for consensus executions

use colored::Colorize;
use concord_application::ports::progress::ProgressNotifier;
use concord_domain::{ExecutionResult, OutcomeStatus, ProviderOutcome, ProviderSpec};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress during an execution with a progress bar on stderr
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn outcome_label(outcome: &ProviderOutcome) -> String {
        match &outcome.status {
            OutcomeStatus::Success => format!("{} {}", "v".green(), outcome.provider_id),
            OutcomeStatus::Error(_) => format!("{} {}", "x".red(), outcome.provider_id),
            OutcomeStatus::Timeout => format!("{} {} (timeout)", "x".yellow(), outcome.provider_id),
            OutcomeStatus::Cancelled => format!("- {} (cancelled)", outcome.provider_id),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_dispatch_start(&self, providers: &[ProviderSpec]) {
        let bar = ProgressBar::new(providers.len() as u64);
        bar.set_style(Self::bar_style());
        bar.set_prefix("Collecting");
        bar.set_message("Waiting for providers...");

        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn on_outcome(&self, outcome: &ProviderOutcome) {
        if let Ok(slot) = self.bar.lock()
            && let Some(bar) = slot.as_ref()
        {
            bar.set_message(Self::outcome_label(outcome));
            bar.inc(1);
        }
    }

    fn on_collection_complete(&self, collected: usize, cut_off: usize) {
        if let Ok(mut slot) = self.bar.lock()
            && let Some(bar) = slot.take()
        {
            let message = if cut_off == 0 {
                format!("{} responses collected", collected)
            } else {
                format!("{} collected, {} cut off", collected, cut_off)
            };
            bar.finish_and_clear();
            eprintln!("{} {}", "Collection complete:".green(), message);
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_dispatch_start(&self, providers: &[ProviderSpec]) {
        let names: Vec<String> = providers.iter().map(|p| p.to_string()).collect();
        eprintln!(
            "{} {} ({} providers: {})",
            "->".cyan(),
            "Dispatching".bold(),
            providers.len(),
            names.join(", ")
        );
    }

    fn on_outcome(&self, outcome: &ProviderOutcome) {
        eprintln!(
            "  {} [{}ms]",
            ProgressReporter::outcome_label(outcome),
            outcome.latency.as_millis()
        );
    }

    fn on_collection_complete(&self, collected: usize, cut_off: usize) {
        if cut_off > 0 {
            eprintln!("  {} {} providers cut off", "-".dimmed(), cut_off);
        }
        eprintln!("{} {} responses collected", "->".cyan(), collected);
    }

    fn on_synthesis_complete(&self, result: &ExecutionResult) {
        eprintln!(
            "{} Synthesized with {} (score {:.2})\n",
            "->".cyan(),
            result.synthesis_method,
            result.consensus_score
        );
    }
}
