//! Run Consensus use case
//!
//! Orchestrates one execution end to end: dispatch the prompt to every
//! provider, collect outcomes under the wait policy, then cross-verify and
//! score what came back.

use super::collect::ResponseCollector;
use super::dispatch::ProviderDispatcher;
use crate::ports::execution_logger::{ExecutionEvent, ExecutionLogger, NoExecutionLogger};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::provider::ProviderHandle;
use concord_domain::{ConsensusError, ExecutionConfig, ExecutionResult, Prompt, ProviderSpec, evaluate};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, warn};

/// Input for the RunConsensus use case
#[derive(Debug, Clone)]
pub struct RunConsensusInput {
    pub prompt: Prompt,
    pub config: ExecutionConfig,
}

impl RunConsensusInput {
    pub fn new(prompt: Prompt, config: ExecutionConfig) -> Self {
        Self { prompt, config }
    }
}

/// Use case for running a consensus execution over a fixed provider set
pub struct RunConsensusUseCase {
    providers: Vec<ProviderHandle>,
    logger: Arc<dyn ExecutionLogger>,
}

impl RunConsensusUseCase {
    pub fn new(providers: Vec<ProviderHandle>) -> Self {
        Self {
            providers,
            logger: Arc::new(NoExecutionLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ExecutionLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunConsensusInput,
    ) -> Result<ExecutionResult, ConsensusError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunConsensusInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<ExecutionResult, ConsensusError> {
        let result = self.run(&input, progress).await;

        match &result {
            Ok(result) => {
                self.logger.log(&ExecutionEvent::completed(result));
                progress.on_synthesis_complete(result);
            }
            Err(e) => {
                warn!("Execution failed: {}", e);
                self.logger.log(&ExecutionEvent::failed(e));
            }
        }

        result
    }

    async fn run(
        &self,
        input: &RunConsensusInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<ExecutionResult, ConsensusError> {
        input.config.validate()?;
        self.check_providers()?;

        let specs: Vec<ProviderSpec> = self.providers.iter().map(|h| h.spec.clone()).collect();

        info!(
            "Starting execution with {} providers ({}, wait {})",
            specs.len(),
            input.config.synthesis_method,
            input.config.wait_mode
        );
        self.logger.log(&ExecutionEvent::started(
            input.prompt.content(),
            &specs,
            &input.config,
        ));

        let started = Instant::now();
        let stream = ProviderDispatcher::dispatch(input.prompt.content(), &self.providers, &input.config)?;
        progress.on_dispatch_start(&specs);

        let collection = ResponseCollector::collect(stream, &input.config, progress).await;
        let total_latency = started.elapsed();

        for outcome in &collection.outcomes {
            self.logger.log(&ExecutionEvent::outcome(outcome));
        }

        evaluate(collection.outcomes, &specs, &input.config, total_latency)
    }

    fn check_providers(&self) -> Result<(), ConsensusError> {
        if self.providers.is_empty() {
            return Err(ConsensusError::NoProvidersConfigured);
        }

        let mut seen = HashSet::new();
        for handle in &self.providers {
            if !seen.insert(handle.id()) {
                return Err(ConsensusError::InvalidConfig(format!(
                    "duplicate provider id '{}'",
                    handle.id()
                )));
            }
        }
        Ok(())
    }
}
