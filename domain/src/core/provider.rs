//! Provider identity value object

use serde::{Deserialize, Serialize};

/// Default weight of a provider in a weighted vote
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Identity of one provider taking part in an execution (Value Object)
///
/// The engine treats providers as exchangeable: the only per-provider
/// knob that influences synthesis is `weight`, and only under
/// [`SynthesisMethod::WeightedVote`](crate::consensus::SynthesisMethod::WeightedVote).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSpec {
    /// Unique identifier within one execution (e.g., "openai", "local-llama")
    pub id: String,
    /// Model the provider answers with (e.g., "gpt-4.1")
    pub model: String,
    /// Vote weight, non-negative
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

impl ProviderSpec {
    pub fn new(id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            weight: DEFAULT_WEIGHT,
        }
    }

    /// Set the vote weight. Negative or non-finite weights become 0.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = if weight.is_finite() {
            weight.max(0.0)
        } else {
            0.0
        };
        self
    }
}

impl std::fmt::Display for ProviderSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.model)
    }
}
