//! CLI command definitions

use clap::{Parser, ValueEnum};
use concord_domain::{MAX_TIMEOUT, SynthesisMethod, WaitMode};
use std::path::PathBuf;
use std::time::Duration;

/// Output format for execution results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Answer, consensus score, claim counts and per-provider outcomes
    #[default]
    Full,
    /// Only the answer and its score
    #[value(alias = "synthesis")]
    Answer,
    /// JSON output
    Json,
}

/// CLI arguments for concord
#[derive(Parser, Debug)]
#[command(name = "concord")]
#[command(author, version, about = "Ask several AI providers at once and keep what they agree on")]
#[command(long_about = r#"
Concord sends one prompt to every configured provider in parallel, waits
according to the wait policy, then cross-verifies the answers claim by claim.

The process has three steps:
1. Dispatch: every provider is called concurrently under one shared deadline
2. Collection: outcomes are gathered until all report, a quorum succeeds,
   the first N answer, or the deadline passes
3. Synthesis: claims backed by enough providers form the final answer,
   scored by provider success ratio x claim agreement

Configuration files are loaded from (in priority order):
1. CONCORD_* environment variables
2. --config <path>     Explicit config file
3. ./concord.toml      Project-level config
4. ~/.config/concord/config.toml   Global config

Example:
  concord "What year did the Berlin Wall fall?"
  concord -p claude -p gpt --wait quorum:2 "Is Rust memory safe?"
  concord --synthesis concatenate -o json "Summarise RFC 9110"
"#)]
pub struct Cli {
    /// The prompt to send to every provider
    pub prompt: Option<String>,

    /// Providers to use, by id (can be specified multiple times; default: all enabled)
    #[arg(short, long = "provider", value_name = "ID")]
    pub providers: Vec<String>,

    /// Global deadline in seconds, shared by all providers
    #[arg(short, long, value_name = "SECONDS", value_parser = parse_seconds)]
    pub timeout: Option<Duration>,

    /// Successful providers required for a result
    #[arg(long, value_name = "N")]
    pub min_providers: Option<usize>,

    /// Synthesis method (cross_verification, first_success, concatenate, weighted_vote)
    #[arg(short, long, value_name = "METHOD")]
    pub synthesis: Option<SynthesisMethod>,

    /// Agreement ratio a claim needs to be accepted, within [0, 1]
    #[arg(long, value_name = "RATIO")]
    pub threshold: Option<f64>,

    /// When to stop collecting (all, quorum:N, first:N)
    #[arg(short, long, value_name = "MODE")]
    pub wait: Option<WaitMode>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err("timeout must be greater than zero".to_string());
    }
    let timeout = Duration::try_from_secs_f64(seconds).map_err(|e| e.to_string())?;
    if timeout > MAX_TIMEOUT {
        return Err(format!(
            "timeout must be at most {} seconds",
            MAX_TIMEOUT.as_secs()
        ));
    }
    Ok(timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "concord",
            "-p",
            "claude",
            "--provider",
            "gpt",
            "--timeout",
            "2.5",
            "--min-providers",
            "2",
            "--synthesis",
            "weighted-vote",
            "--threshold",
            "0.6",
            "--wait",
            "quorum:2",
            "-o",
            "json",
            "-vv",
            "Is the sky blue?",
        ])
        .unwrap();

        assert_eq!(cli.prompt.as_deref(), Some("Is the sky blue?"));
        assert_eq!(cli.providers, vec!["claude", "gpt"]);
        assert_eq!(cli.timeout, Some(Duration::from_millis(2500)));
        assert_eq!(cli.min_providers, Some(2));
        assert_eq!(cli.synthesis, Some(SynthesisMethod::WeightedVote));
        assert_eq!(cli.threshold, Some(0.6));
        assert_eq!(cli.wait, Some(WaitMode::WaitForQuorum(2)));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Cli::try_parse_from(["concord", "--timeout", "0", "q"]).is_err());
        assert!(Cli::try_parse_from(["concord", "--timeout", "1e12", "q"]).is_err());
        assert!(Cli::try_parse_from(["concord", "--timeout", "86400", "q"]).is_ok());
        assert!(Cli::try_parse_from(["concord", "--wait", "most", "q"]).is_err());
        assert!(Cli::try_parse_from(["concord", "--synthesis", "majority", "q"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["concord", "hello"]).unwrap();
        assert!(cli.providers.is_empty());
        assert!(cli.output.is_none());
        assert!(!cli.quiet);
        assert!(!cli.no_config);
    }
}
