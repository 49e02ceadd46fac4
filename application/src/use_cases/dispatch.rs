//! Provider dispatcher
//!
//! Fans one prompt out to every provider at once. Each call runs as its own
//! task on the runtime and reports exactly one [`ProviderOutcome`] through a
//! channel, so outcomes surface in completion order as they happen.
//!
//! All calls share a single deadline measured from dispatch start. A call
//! still running at the deadline is dropped (which cancels its I/O) and
//! reported as `Timeout`; a call interrupted by cancellation reports
//! `Cancelled`. Provider failures are captured as data and never retried.

use crate::ports::provider::{CompletionProvider, ProviderError, ProviderHandle};
use concord_domain::{ConsensusError, ExecutionConfig, OutcomeStatus, ProviderOutcome, ProviderSpec};
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// One in-flight provider invocation
#[derive(Debug, Clone)]
pub struct ProviderCall {
    pub provider_id: String,
    pub model: String,
    pub started_at: Instant,
}

/// An outcome tagged with the dispatch index of its provider
#[derive(Debug, Clone)]
pub struct Completion {
    pub index: usize,
    pub outcome: ProviderOutcome,
}

/// Stream of outcomes from one dispatch, in completion order.
///
/// Owns the provider tasks. Dropping it aborts any that are still running;
/// [`OutcomeStream::shutdown`] does the same and waits for them to finish.
pub struct OutcomeStream {
    receiver: mpsc::UnboundedReceiver<Completion>,
    calls: Vec<ProviderCall>,
    deadline: Instant,
    cancellation: CancellationToken,
    tasks: JoinSet<()>,
}

impl OutcomeStream {
    /// Calls in dispatch order
    pub fn calls(&self) -> &[ProviderCall] {
        &self.calls
    }

    /// Deadline shared by every call
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Signal every in-flight call to stop
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Stop accepting outcomes, cancel in-flight calls and wait until every
    /// task has terminated. Results arriving after this point are discarded.
    pub async fn shutdown(&mut self) {
        self.receiver.close();
        self.cancellation.cancel();
        self.tasks.abort_all();

        let mut stopped = 0usize;
        while self.tasks.join_next().await.is_some() {
            stopped += 1;
        }
        debug!("Dispatcher shut down ({} tasks joined)", stopped);
    }
}

impl Stream for OutcomeStream {
    type Item = Completion;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

/// Launches one concurrent call per provider
pub struct ProviderDispatcher;

impl ProviderDispatcher {
    /// Start every provider call and return the stream of their outcomes.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(
        prompt: &str,
        providers: &[ProviderHandle],
        config: &ExecutionConfig,
    ) -> Result<OutcomeStream, ConsensusError> {
        if providers.is_empty() {
            return Err(ConsensusError::NoProvidersConfigured);
        }

        let started_at = Instant::now();
        let deadline = started_at.checked_add(config.timeout).ok_or_else(|| {
            ConsensusError::InvalidConfig(format!("timeout {:?} is out of range", config.timeout))
        })?;
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancellation = CancellationToken::new();
        let prompt: Arc<str> = Arc::from(prompt);

        let mut tasks = JoinSet::new();
        let mut calls = Vec::with_capacity(providers.len());

        for (index, handle) in providers.iter().enumerate() {
            calls.push(ProviderCall {
                provider_id: handle.spec.id.clone(),
                model: handle.spec.model.clone(),
                started_at,
            });

            let sender = sender.clone();
            let token = cancellation.child_token();
            let capability = Arc::clone(&handle.capability);
            let spec = handle.spec.clone();
            let prompt = Arc::clone(&prompt);

            tasks.spawn(async move {
                let outcome = run_call(
                    capability.as_ref(),
                    &spec,
                    &prompt,
                    started_at,
                    deadline,
                    &token,
                )
                .await;
                debug!("Provider {} finished: {}", spec.id, outcome.status);
                // The collector may already be gone; late outcomes are discarded
                let _ = sender.send(Completion { index, outcome });
            });
        }

        info!(
            "Dispatched prompt to {} providers (timeout {:?})",
            providers.len(),
            config.timeout
        );

        Ok(OutcomeStream {
            receiver,
            calls,
            deadline,
            cancellation,
            tasks,
        })
    }
}

/// Run one provider call to its single outcome
async fn run_call(
    capability: &dyn CompletionProvider,
    spec: &ProviderSpec,
    prompt: &str,
    started_at: Instant,
    deadline: Instant,
    cancellation: &CancellationToken,
) -> ProviderOutcome {
    let result = tokio::select! {
        biased;
        _ = cancellation.cancelled() => None,
        result = tokio::time::timeout_at(deadline, capability.complete(prompt, deadline)) => Some(result),
    };

    let latency = started_at.elapsed();
    let failed = |status| ProviderOutcome::new(&spec.id, &spec.model, status, latency);

    match result {
        None | Some(Ok(Err(ProviderError::Cancelled))) => failed(OutcomeStatus::Cancelled),
        Some(Err(_)) | Some(Ok(Err(ProviderError::DeadlineExceeded))) => {
            failed(OutcomeStatus::Timeout)
        }
        Some(Ok(Err(e))) => failed(OutcomeStatus::Error(e.to_string())),
        Some(Ok(Ok(content))) => ProviderOutcome::success(&spec.id, &spec.model, content, latency),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::time::Duration;

    struct Delayed {
        delay: Duration,
        reply: Result<String, ProviderError>,
    }

    #[async_trait]
    impl CompletionProvider for Delayed {
        async fn complete(&self, _prompt: &str, _deadline: Instant) -> Result<String, ProviderError> {
            tokio::time::sleep(self.delay).await;
            self.reply.clone()
        }
    }

    fn handle(id: &str, delay_ms: u64, reply: Result<&str, ProviderError>) -> ProviderHandle {
        ProviderHandle::new(
            ProviderSpec::new(id, "test-model"),
            Delayed {
                delay: Duration::from_millis(delay_ms),
                reply: reply.map(str::to_string),
            },
        )
    }

    fn config(timeout_ms: u64) -> ExecutionConfig {
        ExecutionConfig::default().with_timeout(Duration::from_millis(timeout_ms))
    }

    #[tokio::test]
    async fn test_empty_providers_fail_immediately() {
        let result = ProviderDispatcher::dispatch("q", &[], &config(100));
        assert!(matches!(result, Err(ConsensusError::NoProvidersConfigured)));
    }

    #[tokio::test]
    async fn test_unrepresentable_deadline_is_rejected() {
        let providers = vec![handle("a", 10, Ok("x"))];
        let config = ExecutionConfig::default().with_timeout(Duration::from_secs(u64::MAX / 2));

        let result = ProviderDispatcher::dispatch("q", &providers, &config);
        assert!(matches!(result, Err(ConsensusError::InvalidConfig(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_outcomes_arrive_in_completion_order() {
        let providers = vec![
            handle("slow", 300, Ok("slow answer")),
            handle("fast", 10, Ok("fast answer")),
            handle("mid", 100, Err(ProviderError::Request("HTTP 500".to_string()))),
        ];
        let stream = ProviderDispatcher::dispatch("q", &providers, &config(1_000)).unwrap();
        let completions: Vec<Completion> = stream.collect().await;

        let order: Vec<&str> = completions
            .iter()
            .map(|c| c.outcome.provider_id.as_str())
            .collect();
        assert_eq!(order, vec!["fast", "mid", "slow"]);
        assert_eq!(completions[0].index, 1);
        assert_eq!(
            completions[1].outcome.status,
            OutcomeStatus::Error("Request failed: HTTP 500".to_string())
        );
        assert_eq!(completions[1].outcome.latency, Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_deadline_times_out_slow_calls() {
        let providers = vec![
            handle("fast", 50, Ok("ok")),
            handle("hung", 10_000, Ok("too late")),
        ];
        let stream = ProviderDispatcher::dispatch("q", &providers, &config(200)).unwrap();
        let completions: Vec<Completion> = stream.collect().await;

        assert_eq!(completions.len(), 2);
        let hung = &completions[1].outcome;
        assert_eq!(hung.provider_id, "hung");
        assert_eq!(hung.status, OutcomeStatus::Timeout);
        assert_eq!(hung.latency, Duration::from_millis(200));
        assert!(hung.content.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_reported_errors_map_to_status() {
        let providers = vec![
            handle("deadline", 5, Err(ProviderError::DeadlineExceeded)),
            handle("cancelled", 10, Err(ProviderError::Cancelled)),
        ];
        let stream = ProviderDispatcher::dispatch("q", &providers, &config(1_000)).unwrap();
        let completions: Vec<Completion> = stream.collect().await;

        assert_eq!(completions[0].outcome.status, OutcomeStatus::Timeout);
        assert_eq!(completions[1].outcome.status, OutcomeStatus::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_in_flight_calls() {
        let providers = vec![handle("a", 5_000, Ok("x")), handle("b", 5_000, Ok("y"))];
        let mut stream = ProviderDispatcher::dispatch("q", &providers, &config(10_000)).unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        stream.cancel();

        let first = stream.next().await.unwrap();
        let second = stream.next().await.unwrap();
        assert_eq!(first.outcome.status, OutcomeStatus::Cancelled);
        assert_eq!(second.outcome.status, OutcomeStatus::Cancelled);
        assert_eq!(first.outcome.latency, Duration::from_millis(20));

        stream.shutdown().await;
        assert!(stream.next().await.is_none());
    }
}
