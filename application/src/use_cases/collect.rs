//! Response collector
//!
//! Applies the [`WaitMode`] to a dispatch's outcome stream and decides when
//! collection is done. Once it stops, every call still in flight is
//! cancelled and joined, and the providers that never reported are given a
//! terminal outcome so each dispatched provider appears exactly once:
//!
//! | Stopped because | Missing providers recorded as |
//! |-----------------|-------------------------------|
//! | quorum / first-N reached | `Cancelled` |
//! | global deadline | `Timeout` |
//! | call ended without reporting (panicked) | `Error` |
//!
//! Outcomes are counted in the order they come off the channel, so when
//! several calls finish at the same moment the first one delivered wins.
//! After a quorum of `n` successes nothing more is read, which caps the
//! success count at `min(n, dispatched)`.

use super::dispatch::{Completion, OutcomeStream};
use crate::ports::progress::ProgressNotifier;
use concord_domain::{ExecutionConfig, OutcomeStatus, ProviderOutcome, WaitMode};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Slack after the deadline for in-flight calls to report their own timeout
pub const CANCELLATION_GRACE: Duration = Duration::from_millis(100);

/// Why collection stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Every dispatched provider reported
    AllReported,
    /// `WaitForQuorum(n)` saw `n` successes
    QuorumReached,
    /// `WaitForFirst(n)` saw `n` outcomes
    FirstReached,
    /// The global deadline (plus grace) passed with calls still running
    Deadline,
}

/// Outcomes of one dispatch after collection
#[derive(Debug, Clone)]
pub struct Collection {
    /// One per dispatched provider: collected outcomes in completion order,
    /// then providers cut off by termination in dispatch order
    pub outcomes: Vec<ProviderOutcome>,
    /// How many outcomes were collected before termination
    pub collected: usize,
    pub termination: Termination,
}

impl Collection {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Providers that never reported before termination
    pub fn cut_off(&self) -> usize {
        self.outcomes.len() - self.collected
    }
}

enum Next {
    Outcome(Option<Completion>),
    Deadline,
}

/// Fan-in side of an execution
pub struct ResponseCollector;

impl ResponseCollector {
    /// Collect outcomes until the wait policy is satisfied or the deadline passes.
    ///
    /// Never waits longer than `config.timeout` plus [`CANCELLATION_GRACE`]
    /// and the time needed to join cancelled tasks.
    pub async fn collect(
        mut stream: OutcomeStream,
        config: &ExecutionConfig,
        progress: &dyn ProgressNotifier,
    ) -> Collection {
        let total = stream.calls().len();
        let hard_stop = stream
            .deadline()
            .checked_add(CANCELLATION_GRACE)
            .unwrap_or_else(|| stream.deadline());

        let mut reported = vec![false; total];
        let mut outcomes = Vec::with_capacity(total);
        let mut successes = 0usize;

        let termination = loop {
            if outcomes.len() == total {
                break Termination::AllReported;
            }

            let next = tokio::select! {
                biased;
                completion = stream.next() => Next::Outcome(completion),
                _ = tokio::time::sleep_until(hard_stop) => Next::Deadline,
            };

            let completion = match next {
                Next::Outcome(Some(completion)) => completion,
                // Every sender is gone: remaining calls ended without reporting
                Next::Outcome(None) => break Termination::AllReported,
                Next::Deadline => break Termination::Deadline,
            };

            let Completion { index, outcome } = completion;
            if reported.get(index).copied().unwrap_or(true) {
                warn!("Ignoring duplicate or unknown outcome for index {}", index);
                continue;
            }
            reported[index] = true;

            if outcome.is_success() {
                successes += 1;
            }
            progress.on_outcome(&outcome);
            outcomes.push(outcome);

            match config.wait_mode {
                WaitMode::WaitForQuorum(n) if successes >= n => {
                    break Termination::QuorumReached;
                }
                WaitMode::WaitForFirst(n) if outcomes.len() >= n => {
                    break Termination::FirstReached;
                }
                _ => {}
            }
        };

        let terminated_at = Instant::now();
        stream.shutdown().await;

        let collected = outcomes.len();
        for (index, call) in stream.calls().iter().enumerate() {
            if reported[index] {
                continue;
            }

            let (status, latency) = match termination {
                Termination::QuorumReached | Termination::FirstReached => (
                    OutcomeStatus::Cancelled,
                    terminated_at.duration_since(call.started_at),
                ),
                Termination::Deadline => (OutcomeStatus::Timeout, config.timeout),
                Termination::AllReported => (
                    OutcomeStatus::Error("provider call ended without an outcome".to_string()),
                    terminated_at.duration_since(call.started_at),
                ),
            };
            debug!("Provider {} cut off: {}", call.provider_id, status);
            outcomes.push(ProviderOutcome::new(
                &call.provider_id,
                &call.model,
                status,
                latency,
            ));
        }

        info!(
            "Collection finished ({:?}): {} collected, {} successes, {} cut off",
            termination,
            collected,
            successes,
            total - collected
        );
        progress.on_collection_complete(collected, total - collected);

        Collection {
            outcomes,
            collected,
            termination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoProgress;
    use crate::ports::provider::{CompletionProvider, ProviderError, ProviderHandle};
    use crate::use_cases::dispatch::ProviderDispatcher;
    use async_trait::async_trait;
    use concord_domain::ProviderSpec;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Delayed {
        delay: Duration,
        reply: Result<String, ProviderError>,
        finished: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CompletionProvider for Delayed {
        async fn complete(&self, _prompt: &str, _deadline: Instant) -> Result<String, ProviderError> {
            tokio::time::sleep(self.delay).await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    struct Panicking;

    #[async_trait]
    impl CompletionProvider for Panicking {
        async fn complete(&self, _prompt: &str, _deadline: Instant) -> Result<String, ProviderError> {
            panic!("provider bug");
        }
    }

    struct Fixture {
        providers: Vec<ProviderHandle>,
        finished: Arc<AtomicUsize>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                providers: Vec::new(),
                finished: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn with(mut self, id: &str, delay_ms: u64, reply: Result<&str, ProviderError>) -> Self {
            self.providers.push(ProviderHandle::new(
                ProviderSpec::new(id, "test-model"),
                Delayed {
                    delay: Duration::from_millis(delay_ms),
                    reply: reply.map(str::to_string),
                    finished: Arc::clone(&self.finished),
                },
            ));
            self
        }

        async fn collect(&self, config: ExecutionConfig) -> Collection {
            let stream = ProviderDispatcher::dispatch("q", &self.providers, &config).unwrap();
            ResponseCollector::collect(stream, &config, &NoProgress).await
        }
    }

    fn failure() -> Result<&'static str, ProviderError> {
        Err(ProviderError::Unavailable("down".to_string()))
    }

    fn ids(collection: &Collection) -> Vec<&str> {
        collection
            .outcomes
            .iter()
            .map(|o| o.provider_id.as_str())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_all() {
        let fixture = Fixture::new()
            .with("a", 30, Ok("A"))
            .with("b", 10, failure())
            .with("c", 20, Ok("C"));
        let collection = fixture.collect(ExecutionConfig::default()).await;

        assert_eq!(collection.termination, Termination::AllReported);
        assert_eq!(ids(&collection), vec!["b", "c", "a"]);
        assert_eq!(collection.collected, 3);
        assert_eq!(collection.success_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_all_with_deadline() {
        let fixture = Fixture::new()
            .with("fast", 10, Ok("A"))
            .with("hung", 60_000, Ok("B"));
        let config = ExecutionConfig::default().with_timeout(Duration::from_millis(500));
        let started = Instant::now();
        let collection = fixture.collect(config).await;

        assert!(started.elapsed() <= Duration::from_millis(500) + CANCELLATION_GRACE);
        assert_eq!(collection.outcomes.len(), 2);
        assert_eq!(collection.outcomes[1].status, OutcomeStatus::Timeout);
        assert_eq!(fixture.finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_quorum_cancels_the_rest() {
        let fixture = Fixture::new()
            .with("a", 10, Ok("A"))
            .with("b", 20, failure())
            .with("c", 30, Ok("C"))
            .with("d", 1_000, Ok("D"));
        let config = ExecutionConfig::default().with_wait_mode(WaitMode::WaitForQuorum(2));
        let collection = fixture.collect(config).await;

        assert_eq!(collection.termination, Termination::QuorumReached);
        assert_eq!(collection.collected, 3);
        assert_eq!(ids(&collection), vec!["a", "b", "c", "d"]);
        assert_eq!(collection.outcomes[3].status, OutcomeStatus::Cancelled);
        assert_eq!(collection.outcomes[3].latency, Duration::from_millis(30));

        // The cancelled call never completes in the background
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fixture.finished.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simultaneous_quorum_counts_first_writer_only() {
        let fixture = Fixture::new()
            .with("a", 50, Ok("A"))
            .with("b", 50, Ok("B"))
            .with("c", 50, Ok("C"));
        let config = ExecutionConfig::default().with_wait_mode(WaitMode::WaitForQuorum(2));
        let collection = fixture.collect(config).await;

        assert_eq!(collection.termination, Termination::QuorumReached);
        assert_eq!(collection.collected, 2);
        assert_eq!(collection.success_count(), 2);
        assert_eq!(collection.outcomes.len(), 3);
        assert_eq!(collection.outcomes[2].status, OutcomeStatus::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quorum_larger_than_dispatch_waits_for_all() {
        let fixture = Fixture::new().with("a", 10, Ok("A")).with("b", 20, Ok("B"));
        let config = ExecutionConfig::default().with_wait_mode(WaitMode::WaitForQuorum(5));
        let collection = fixture.collect(config).await;

        assert_eq!(collection.termination, Termination::AllReported);
        assert_eq!(collection.success_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quorum_deadline_returns_what_arrived() {
        let fixture = Fixture::new()
            .with("a", 10, Ok("A"))
            .with("b", 5_000, Ok("B"))
            .with("c", 5_000, Ok("C"));
        let config = ExecutionConfig::default()
            .with_timeout(Duration::from_millis(200))
            .with_wait_mode(WaitMode::WaitForQuorum(2));
        let collection = fixture.collect(config).await;

        assert_eq!(collection.success_count(), 1);
        assert_eq!(collection.outcomes.len(), 3);
        assert!(
            collection.outcomes[1..]
                .iter()
                .all(|o| o.status == OutcomeStatus::Timeout)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_first_accepts_failures() {
        let fixture = Fixture::new()
            .with("a", 40, Ok("A"))
            .with("b", 10, failure())
            .with("c", 30, Ok("C"));
        let config = ExecutionConfig::default().with_wait_mode(WaitMode::WaitForFirst(1));
        let collection = fixture.collect(config).await;

        assert_eq!(collection.termination, Termination::FirstReached);
        assert_eq!(collection.collected, 1);
        assert_eq!(collection.cut_off(), 2);
        assert_eq!(ids(&collection), vec!["b", "a", "c"]);
        assert!(matches!(collection.outcomes[0].status, OutcomeStatus::Error(_)));
        assert!(
            collection.outcomes[1..]
                .iter()
                .all(|o| o.status == OutcomeStatus::Cancelled)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicked_call_gets_exactly_one_error_outcome() {
        let mut providers = Fixture::new().with("a", 10, Ok("A")).providers;
        providers.push(ProviderHandle::new(
            ProviderSpec::new("broken", "test-model"),
            Panicking,
        ));
        let config = ExecutionConfig::default();
        let stream = ProviderDispatcher::dispatch("q", &providers, &config).unwrap();
        let collection = ResponseCollector::collect(stream, &config, &NoProgress).await;

        assert_eq!(collection.termination, Termination::AllReported);
        assert_eq!(collection.collected, 1);
        assert_eq!(ids(&collection), vec!["a", "broken"]);
        assert!(matches!(
            &collection.outcomes[1].status,
            OutcomeStatus::Error(reason) if reason == "provider call ended without an outcome"
        ));
    }
}
