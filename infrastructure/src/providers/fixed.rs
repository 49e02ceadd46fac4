//! Fixed-response provider for offline runs and demos

use async_trait::async_trait;
use concord_application::ports::provider::{CompletionProvider, ProviderError};
use std::time::Duration;
use tokio::time::Instant;

/// Answers every prompt with the same text after an optional delay
#[derive(Debug, Clone)]
pub struct StaticProvider {
    response: String,
    delay: Duration,
}

impl StaticProvider {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl CompletionProvider for StaticProvider {
    async fn complete(&self, _prompt: &str, deadline: Instant) -> Result<String, ProviderError> {
        if Instant::now() + self.delay > deadline {
            tokio::time::sleep_until(deadline).await;
            return Err(ProviderError::DeadlineExceeded);
        }
        tokio::time::sleep(self.delay).await;
        Ok(self.response.clone())
    }
}
