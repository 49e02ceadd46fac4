//! CLI entrypoint for concord
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, ValueEnum};
use concord_application::{
    ExecutionLogger, NoExecutionLogger, NoProgress, ProgressNotifier, RunConsensusInput,
    RunConsensusUseCase,
};
use concord_domain::{ExecutionConfig, Prompt};
use concord_infrastructure::{
    ConfigLoader, ConfigSources, FileConfig, JsonlExecutionLogger, ProviderFactory,
};
use concord_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(&cli)?;

    info!("Starting concord");

    let sources = if cli.no_config {
        ConfigSources::default()
    } else {
        ConfigSources::discover(cli.config.as_deref())
    };

    if cli.show_config {
        for line in ConfigLoader::describe_sources(&sources) {
            println!("{}", line);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load_sources(&sources)?
    };

    let issues = file_config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("config: {}", issue);
        }
        bail!("Configuration has {} problem(s)", issues.len());
    }

    if !file_config.output.color {
        colored::control::set_override(false);
    }

    let prompt = match cli.prompt.as_deref().and_then(Prompt::try_new) {
        Some(prompt) => prompt,
        None => bail!("A prompt is required, e.g. concord \"What is the capital of France?\""),
    };

    let config = apply_overrides(file_config.to_execution_config(), &cli);
    let output = output_format(&cli, &file_config);

    // === Dependency Injection ===
    check_provider_filter(&file_config, &cli.providers)?;
    let providers = ProviderFactory::build_all(&file_config.providers, &cli.providers)?;
    if providers.is_empty() {
        warn!("No providers configured; add [[providers]] entries to concord.toml");
    }

    let logger: Arc<dyn ExecutionLogger> = match &file_config.logging.execution_log {
        Some(path) => match JsonlExecutionLogger::open(path) {
            Ok(logger) => {
                info!("Execution log: {}", logger.path().display());
                Arc::new(logger)
            }
            Err(e) => {
                warn!("Execution log {} disabled: {}", path, e);
                Arc::new(NoExecutionLogger)
            }
        },
        None => Arc::new(NoExecutionLogger),
    };

    let use_case = RunConsensusUseCase::new(providers).with_logger(logger);
    let input = RunConsensusInput::new(prompt, config);

    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressReporter::new())
    };

    match use_case.execute_with_progress(input, progress.as_ref()).await {
        Ok(result) => {
            let rendered = match output {
                OutputFormat::Full => ConsoleFormatter::format(&result),
                OutputFormat::Answer => ConsoleFormatter::format_answer(&result),
                OutputFormat::Json => ConsoleFormatter::format_json(&result),
            };
            println!("{}", rendered);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            match output {
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_error_json(&e)),
                _ => eprintln!("{}", ConsoleFormatter::format_error(&e)),
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Install the tracing subscriber; `RUST_LOG` wins over `-v`
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let Some(path) = &cli.log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("Invalid log file path: {}", path.display()))?;
    std::fs::create_dir_all(directory)
        .with_context(|| format!("Could not create log directory {}", directory.display()))?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();

    Ok(Some(guard))
}

/// CLI flags take precedence over file values
fn apply_overrides(mut config: ExecutionConfig, cli: &Cli) -> ExecutionConfig {
    if let Some(timeout) = cli.timeout {
        config = config.with_timeout(timeout);
    }
    if let Some(min) = cli.min_providers {
        config = config.with_min_providers(min);
    }
    if let Some(method) = cli.synthesis {
        config = config.with_synthesis_method(method);
    }
    if let Some(threshold) = cli.threshold {
        config = config.with_consensus_threshold(threshold);
    }
    if let Some(mode) = cli.wait {
        config = config.with_wait_mode(mode);
    }
    config
}

fn output_format(cli: &Cli, file_config: &FileConfig) -> OutputFormat {
    cli.output
        .or_else(|| {
            file_config
                .output
                .format
                .as_deref()
                .and_then(|f| OutputFormat::from_str(f, true).ok())
        })
        .unwrap_or_default()
}

/// Every `--provider` id must name a configured provider
fn check_provider_filter(file_config: &FileConfig, requested: &[String]) -> Result<()> {
    let unknown: Vec<&str> = requested
        .iter()
        .filter(|id| !file_config.providers.iter().any(|p| &p.id == *id))
        .map(String::as_str)
        .collect();

    if !unknown.is_empty() {
        bail!("Unknown provider(s): {}", unknown.join(", "));
    }
    Ok(())
}
