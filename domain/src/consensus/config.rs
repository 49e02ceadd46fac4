//! Per-execution configuration
//!
//! [`ExecutionConfig`] is created by the caller for each request and never
//! read from process-wide settings, so concurrent executions with different
//! policies cannot interfere with each other.

use crate::core::error::ConsensusError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

/// Default wall-clock budget shared by all providers
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest accepted timeout (one day)
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Default agreement ratio a claim needs to be accepted
pub const DEFAULT_CONSENSUS_THRESHOLD: f64 = 0.5;

/// Strategy used to assemble the final answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisMethod {
    /// Keep claims enough providers agree on, ordered by agreement
    #[default]
    CrossVerification,
    /// Return the first successful response verbatim
    FirstSuccess,
    /// Join every successful response, no deduplication
    Concatenate,
    /// Cross verification where each provider's support is weighted
    WeightedVote,
}

impl SynthesisMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SynthesisMethod::CrossVerification => "cross_verification",
            SynthesisMethod::FirstSuccess => "first_success",
            SynthesisMethod::Concatenate => "concatenate",
            SynthesisMethod::WeightedVote => "weighted_vote",
        }
    }
}

impl std::fmt::Display for SynthesisMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SynthesisMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "cross_verification" | "crossverification" | "verify" => {
                Ok(SynthesisMethod::CrossVerification)
            }
            "first_success" | "firstsuccess" | "first" => Ok(SynthesisMethod::FirstSuccess),
            "concatenate" | "concat" => Ok(SynthesisMethod::Concatenate),
            "weighted_vote" | "weightedvote" | "weighted" => Ok(SynthesisMethod::WeightedVote),
            other => Err(format!(
                "Unknown synthesis method: {}. Valid: cross_verification, first_success, concatenate, weighted_vote",
                other
            )),
        }
    }
}

/// When the response collector considers dispatch done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WaitMode {
    /// Every provider has an outcome, or the global timeout fired
    #[default]
    WaitForAll,
    /// `n` successful outcomes arrived; the rest are cancelled
    WaitForQuorum(usize),
    /// `n` outcomes of any status arrived; the rest are cancelled
    WaitForFirst(usize),
}

impl std::fmt::Display for WaitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitMode::WaitForAll => write!(f, "all"),
            WaitMode::WaitForQuorum(n) => write!(f, "quorum:{}", n),
            WaitMode::WaitForFirst(n) => write!(f, "first:{}", n),
        }
    }
}

impl std::str::FromStr for WaitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let (kind, count) = match s.split_once(':') {
            Some((kind, count)) => (kind, Some(count)),
            None => (s.as_str(), None),
        };

        let parse_count = |count: Option<&str>| -> Result<usize, String> {
            count
                .ok_or_else(|| format!("Missing count after {}:", kind))?
                .trim()
                .parse()
                .map_err(|_| format!("Invalid count for {}", kind))
        };

        match kind {
            "all" => Ok(WaitMode::WaitForAll),
            "quorum" => Ok(WaitMode::WaitForQuorum(parse_count(count)?)),
            "first" => Ok(WaitMode::WaitForFirst(parse_count(count)?)),
            other => Err(format!(
                "Unknown wait mode: {}. Valid: all, quorum:N, first:N",
                other
            )),
        }
    }
}

impl Serialize for WaitMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WaitMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Immutable policy for one execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Wall-clock budget measured from dispatch start, shared by all providers
    pub timeout: Duration,
    /// Successful outcomes required to produce a result
    pub min_providers: usize,
    /// How accepted claims (or raw responses) become the final answer
    pub synthesis_method: SynthesisMethod,
    /// Agreement ratio in `[0, 1]` a claim needs to be accepted
    pub consensus_threshold: f64,
    /// When collection stops
    pub wait_mode: WaitMode,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            min_providers: 1,
            synthesis_method: SynthesisMethod::default(),
            consensus_threshold: DEFAULT_CONSENSUS_THRESHOLD,
            wait_mode: WaitMode::default(),
        }
    }
}

impl ExecutionConfig {
    // ==================== Builder Methods ====================

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_min_providers(mut self, min: usize) -> Self {
        self.min_providers = min;
        self
    }

    pub fn with_synthesis_method(mut self, method: SynthesisMethod) -> Self {
        self.synthesis_method = method;
        self
    }

    pub fn with_consensus_threshold(mut self, threshold: f64) -> Self {
        self.consensus_threshold = threshold;
        self
    }

    pub fn with_wait_mode(mut self, mode: WaitMode) -> Self {
        self.wait_mode = mode;
        self
    }

    /// Check the config before any provider is called
    pub fn validate(&self) -> Result<(), ConsensusError> {
        if self.timeout.is_zero() {
            return Err(ConsensusError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        if self.timeout > MAX_TIMEOUT {
            return Err(ConsensusError::InvalidConfig(format!(
                "timeout must be at most {:?}, got {:?}",
                MAX_TIMEOUT, self.timeout
            )));
        }

        if !self.consensus_threshold.is_finite() || !(0.0..=1.0).contains(&self.consensus_threshold)
        {
            return Err(ConsensusError::InvalidConfig(format!(
                "consensus_threshold must be within [0, 1], got {}",
                self.consensus_threshold
            )));
        }

        match self.wait_mode {
            WaitMode::WaitForQuorum(0) | WaitMode::WaitForFirst(0) => Err(
                ConsensusError::InvalidConfig(format!("wait mode {} needs a count >= 1", self.wait_mode)),
            ),
            _ => Ok(()),
        }
    }
}
