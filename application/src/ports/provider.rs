//! Completion provider port
//!
//! Defines the single-call capability every provider adapter implements.
//! Adapters (command line tools, HTTP APIs, fixtures) live in the
//! infrastructure layer.

use async_trait::async_trait;
use concord_domain::ProviderSpec;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;

/// Errors a provider call can fail with
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("Cancelled")]
    Cancelled,

    #[error("Other error: {0}")]
    Other(String),
}

/// Uniform single-call interface to one AI completion service.
///
/// Implementations must be safe to cancel: the engine drops the returned
/// future when the shared deadline passes or collection ends early. They
/// should not block past `deadline` by more than a short grace period.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete `prompt`, answering before `deadline`
    async fn complete(&self, prompt: &str, deadline: Instant) -> Result<String, ProviderError>;
}

/// A provider identity paired with its capability
#[derive(Clone)]
pub struct ProviderHandle {
    pub spec: ProviderSpec,
    pub capability: Arc<dyn CompletionProvider>,
}

impl ProviderHandle {
    pub fn new(spec: ProviderSpec, capability: impl CompletionProvider + 'static) -> Self {
        Self {
            spec,
            capability: Arc::new(capability),
        }
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }
}

impl std::fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}
