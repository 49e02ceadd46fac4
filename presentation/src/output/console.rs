//! Console output formatter for execution results

use colored::Colorize;
use concord_domain::{ConsensusError, ExecutionResult, OutcomeStatus, ProviderOutcome};
use std::time::Duration;

/// Scores below this are shown as weak consensus
const WEAK_CONSENSUS: f64 = 0.5;

/// Formats execution results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete execution result
    pub fn format(result: &ExecutionResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Consensus Result"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}  {} {}  {} {}\n",
            "Method:".cyan().bold(),
            result.synthesis_method,
            "Score:".cyan().bold(),
            Self::score(result.consensus_score),
            "Latency:".cyan().bold(),
            Self::latency(result.total_latency)
        ));

        if !result.cross_verified {
            output.push_str(&format!(
                "{}\n",
                "! Not cross-verified: fewer than two providers answered".yellow()
            ));
        }

        output.push_str(&Self::section_header("Answer"));
        if result.content.trim().is_empty() {
            output.push_str(&format!("{}\n", "(no claim reached consensus)".dimmed()));
        } else {
            output.push_str(&format!("{}\n", result.content));
        }

        if !result.verdicts.is_empty() {
            output.push_str(&Self::section_header(&format!(
                "Claims ({} verified, {} rejected)",
                result.facts_verified, result.facts_rejected
            )));
            let successful = result.success_count();
            for verdict in &result.verdicts {
                let marker = if verdict.accepted {
                    "v".green()
                } else {
                    "x".red()
                };
                output.push_str(&format!(
                    "  {} {} {}\n",
                    marker,
                    verdict.support_summary(successful).dimmed(),
                    verdict.claim.text
                ));
            }
        }

        output.push_str(&Self::section_header("Providers"));
        output.push_str(&Self::outcome_table(&result.provider_outcomes));

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(result: &ExecutionResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the answer only (concise output)
    pub fn format_answer(result: &ExecutionResult) -> String {
        let mut output = String::new();
        output.push_str(&result.content);
        output.push('\n');
        output.push_str(&format!(
            "\n{} {} ({}/{} providers, {} claims verified)\n",
            "consensus".dimmed(),
            Self::score(result.consensus_score),
            result.success_count(),
            result.provider_outcomes.len(),
            result.facts_verified
        ));
        if !result.cross_verified {
            output.push_str(&format!("{}\n", "not cross-verified".yellow()));
        }
        output
    }

    /// Format a fatal error together with the outcomes gathered before it
    pub fn format_error(error: &ConsensusError) -> String {
        let mut output = format!("{} {}\n", "Error:".red().bold(), error);

        let outcomes = error.outcomes();
        if !outcomes.is_empty() {
            output.push_str(&Self::section_header("Providers"));
            output.push_str(&Self::outcome_table(outcomes));
        }
        output
    }

    /// Format an error as JSON, including partial outcomes
    pub fn format_error_json(error: &ConsensusError) -> String {
        let value = serde_json::json!({
            "error": error.to_string(),
            "provider_outcomes": error.outcomes(),
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    fn outcome_table(outcomes: &[ProviderOutcome]) -> String {
        let width = outcomes
            .iter()
            .map(|o| o.provider_id.len())
            .max()
            .unwrap_or(0);

        outcomes
            .iter()
            .map(|outcome| {
                let status = match &outcome.status {
                    OutcomeStatus::Success => "success".green(),
                    OutcomeStatus::Error(_) => "error".red(),
                    OutcomeStatus::Timeout => "timeout".yellow(),
                    OutcomeStatus::Cancelled => "cancelled".dimmed(),
                };
                let mut line = format!(
                    "  {:<width$}  {:<9}  {:>8}  {}",
                    outcome.provider_id,
                    status,
                    Self::latency(outcome.latency),
                    outcome.model.dimmed(),
                    width = width
                );
                if let OutcomeStatus::Error(reason) = &outcome.status {
                    line.push_str(&format!("\n  {:<width$}  {}", "", reason.red(), width = width));
                }
                line.push('\n');
                line
            })
            .collect()
    }

    fn score(value: f64) -> String {
        let text = format!("{:.2}", value);
        if value >= WEAK_CONSENSUS {
            text.green().bold().to_string()
        } else {
            text.yellow().bold().to_string()
        }
    }

    fn latency(duration: Duration) -> String {
        if duration.as_secs() >= 1 {
            format!("{:.1}s", duration.as_secs_f64())
        } else {
            format!("{}ms", duration.as_millis())
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
