//! Cross-verification synthesis
//!
//! Claims are grouped across providers by exact equality of their
//! normalized key. Each group's agreement ratio is the share of successful
//! providers backing it (or, for [`SynthesisMethod::WeightedVote`], the
//! share of their total weight). A group is accepted when its ratio reaches
//! the consensus threshold, or unconditionally when only one provider
//! succeeded since there is nothing to verify against.

use super::claim::{Claim, extract_claims};
use super::config::{ExecutionConfig, SynthesisMethod};
use super::outcome::ProviderOutcome;
use super::verdict::ClaimVerdict;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Tolerance for comparing ratios against the threshold
const RATIO_EPSILON: f64 = 1e-9;

/// Separator between responses under [`SynthesisMethod::Concatenate`]
pub const CONCATENATE_SEPARATOR: &str = "\n\n";

/// Separator between accepted claims in a cross-verified answer
pub const CLAIM_SEPARATOR: &str = "\n";

/// One successful provider's contribution to synthesis
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderClaims {
    pub provider_id: String,
    pub weight: f64,
    /// Full response text
    pub content: String,
    pub claims: Vec<Claim>,
}

impl ProviderClaims {
    /// Extract claims from a successful outcome; None for any other status
    pub fn from_outcome(outcome: &ProviderOutcome, weight: f64) -> Option<Self> {
        let content = outcome.success_content()?;
        Some(Self {
            provider_id: outcome.provider_id.clone(),
            weight,
            content: content.to_string(),
            claims: extract_claims(outcome),
        })
    }
}

/// Final answer plus every claim verdict
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub content: String,
    /// In order of first appearance across providers
    pub verdicts: Vec<ClaimVerdict>,
}

struct ClaimGroup {
    claim: Claim,
    supporters: BTreeSet<String>,
}

/// Cross-verify the claims of all successful providers and assemble the answer.
///
/// `claims_by_provider` must be in completion order; [`SynthesisMethod::FirstSuccess`]
/// and first-appearance ordering depend on it. Returns None when no provider
/// succeeded.
pub fn synthesize(
    claims_by_provider: &[ProviderClaims],
    config: &ExecutionConfig,
) -> Option<Synthesis> {
    let first = claims_by_provider.first()?;
    let verdicts = cross_verify(claims_by_provider, config);

    let content = match config.synthesis_method {
        SynthesisMethod::CrossVerification | SynthesisMethod::WeightedVote => {
            assemble_accepted(&verdicts)
        }
        SynthesisMethod::FirstSuccess => first.content.clone(),
        SynthesisMethod::Concatenate => claims_by_provider
            .iter()
            .map(|p| p.content.as_str())
            .filter(|c| !c.trim().is_empty())
            .collect::<Vec<_>>()
            .join(CONCATENATE_SEPARATOR),
    };

    Some(Synthesis { content, verdicts })
}

/// Group equivalent claims and decide acceptance for each group
pub fn cross_verify(
    claims_by_provider: &[ProviderClaims],
    config: &ExecutionConfig,
) -> Vec<ClaimVerdict> {
    let successful = claims_by_provider.len();
    let weighted = config.synthesis_method == SynthesisMethod::WeightedVote;

    let weights: HashMap<&str, f64> = claims_by_provider
        .iter()
        .map(|p| (p.provider_id.as_str(), p.weight))
        .collect();
    let total_weight: f64 = claims_by_provider.iter().map(|p| p.weight).sum();

    let mut groups: Vec<ClaimGroup> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for provider in claims_by_provider {
        for claim in &provider.claims {
            match index_by_key.get(&claim.normalized_key) {
                Some(&idx) => {
                    groups[idx].supporters.insert(provider.provider_id.clone());
                }
                None => {
                    index_by_key.insert(claim.normalized_key.clone(), groups.len());
                    groups.push(ClaimGroup {
                        claim: claim.clone(),
                        supporters: BTreeSet::from([provider.provider_id.clone()]),
                    });
                }
            }
        }
    }

    groups
        .into_iter()
        .map(|group| {
            let agreement_ratio = if weighted {
                let support: f64 = group
                    .supporters
                    .iter()
                    .filter_map(|id| weights.get(id.as_str()))
                    .sum();
                if total_weight > 0.0 {
                    support / total_weight
                } else {
                    0.0
                }
            } else {
                group.supporters.len() as f64 / successful as f64
            };
            let agreement_ratio = agreement_ratio.clamp(0.0, 1.0);

            let accepted = successful == 1
                || agreement_ratio + RATIO_EPSILON >= config.consensus_threshold;

            ClaimVerdict {
                claim: group.claim,
                supporting_providers: group.supporters,
                agreement_ratio,
                accepted,
            }
        })
        .collect()
}

/// Accepted claims by descending agreement, ties kept in appearance order
fn assemble_accepted(verdicts: &[ClaimVerdict]) -> String {
    let mut accepted: Vec<&ClaimVerdict> = verdicts.iter().filter(|v| v.accepted).collect();
    accepted.sort_by(|a, b| {
        b.agreement_ratio
            .partial_cmp(&a.agreement_ratio)
            .unwrap_or(Ordering::Equal)
    });

    accepted
        .iter()
        .map(|v| v.claim.text.as_str())
        .collect::<Vec<_>>()
        .join(CLAIM_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::claim::extract_from_text;

    fn provider(id: &str, text: &str) -> ProviderClaims {
        weighted(id, text, 1.0)
    }

    fn weighted(id: &str, text: &str, weight: f64) -> ProviderClaims {
        ProviderClaims {
            provider_id: id.to_string(),
            weight,
            content: text.to_string(),
            claims: extract_from_text(text, id),
        }
    }

    fn config(method: SynthesisMethod, threshold: f64) -> ExecutionConfig {
        ExecutionConfig::default()
            .with_synthesis_method(method)
            .with_consensus_threshold(threshold)
    }

    #[test]
    fn test_identical_responses_form_one_group() {
        let providers = vec![
            provider("a", "The sky is blue."),
            provider("b", "The sky is blue."),
            provider("c", "the sky is BLUE"),
        ];
        let synthesis =
            synthesize(&providers, &config(SynthesisMethod::CrossVerification, 0.6)).unwrap();

        assert_eq!(synthesis.verdicts.len(), 1);
        let verdict = &synthesis.verdicts[0];
        assert_eq!(verdict.agreement_ratio, 1.0);
        assert!(verdict.accepted);
        assert_eq!(verdict.support_count(), 3);
        // Casing comes from the first supporting provider
        assert_eq!(synthesis.content, "The sky is blue.");
    }

    #[test]
    fn test_contradicting_claims_are_rejected() {
        let providers = vec![provider("a", "X is true."), provider("b", "X is false.")];
        let synthesis =
            synthesize(&providers, &config(SynthesisMethod::CrossVerification, 0.6)).unwrap();

        assert_eq!(synthesis.verdicts.len(), 2);
        assert!(synthesis.verdicts.iter().all(|v| !v.accepted));
        assert!(synthesis.verdicts.iter().all(|v| v.agreement_ratio == 0.5));
        assert!(synthesis.content.is_empty());
    }

    #[test]
    fn test_single_provider_accepts_everything() {
        let providers = vec![provider("solo", "One. Two. Three.")];
        let synthesis =
            synthesize(&providers, &config(SynthesisMethod::CrossVerification, 1.0)).unwrap();

        assert_eq!(synthesis.verdicts.len(), 3);
        assert!(synthesis.verdicts.iter().all(|v| v.accepted));
        assert_eq!(synthesis.content, "One.\nTwo.\nThree.");
    }

    #[test]
    fn test_order_by_agreement_then_appearance() {
        let providers = vec![
            provider("a", "Only A says this. Everyone agrees. Two agree."),
            provider("b", "Everyone agrees. Two agree."),
            provider("c", "Everyone agrees."),
        ];
        let synthesis =
            synthesize(&providers, &config(SynthesisMethod::CrossVerification, 0.3)).unwrap();

        assert_eq!(
            synthesis.content,
            "Everyone agrees.\nTwo agree.\nOnly A says this."
        );
        // Verdicts keep appearance order
        assert_eq!(synthesis.verdicts[0].claim.text, "Only A says this.");
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let providers = vec![
            provider("a", "Shared."),
            provider("b", "Shared."),
            provider("c", "Other."),
        ];
        let synthesis =
            synthesize(&providers, &config(SynthesisMethod::CrossVerification, 2.0 / 3.0))
                .unwrap();

        let shared = &synthesis.verdicts[0];
        assert!(shared.accepted);
        assert!(!synthesis.verdicts[1].accepted);
    }

    #[test]
    fn test_first_success_is_verbatim() {
        let providers = vec![
            provider("fast", "Fast answer.  With   spacing."),
            provider("slow", "Slow answer."),
        ];
        let synthesis =
            synthesize(&providers, &config(SynthesisMethod::FirstSuccess, 0.9)).unwrap();

        assert_eq!(synthesis.content, "Fast answer.  With   spacing.");
        // Claims are still scored for reporting
        assert_eq!(synthesis.verdicts.len(), 3);
    }

    #[test]
    fn test_concatenate_keeps_duplicates() {
        let providers = vec![
            provider("a", "Same."),
            provider("b", "   "),
            provider("c", "Same."),
        ];
        let synthesis =
            synthesize(&providers, &config(SynthesisMethod::Concatenate, 0.5)).unwrap();

        assert_eq!(synthesis.content, "Same.\n\nSame.");
    }

    #[test]
    fn test_weighted_vote() {
        let providers = vec![
            weighted("heavy", "Heavy claim. Shared.", 3.0),
            weighted("light1", "Light claim. Shared.", 1.0),
            weighted("light2", "Light claim.", 1.0),
        ];
        let synthesis =
            synthesize(&providers, &config(SynthesisMethod::WeightedVote, 0.5)).unwrap();

        let ratio = |text: &str| {
            synthesis
                .verdicts
                .iter()
                .find(|v| v.claim.text == text)
                .map(|v| (v.agreement_ratio, v.accepted))
                .unwrap()
        };

        assert_eq!(ratio("Heavy claim."), (0.6, true));
        assert_eq!(ratio("Shared."), (0.8, true));
        assert_eq!(ratio("Light claim."), (0.4, false));
        assert_eq!(synthesis.content, "Shared.\nHeavy claim.");
    }

    #[test]
    fn test_weighted_vote_with_zero_total_weight() {
        let providers = vec![
            weighted("a", "Claim.", 0.0),
            weighted("b", "Claim.", 0.0),
        ];
        let verdicts = cross_verify(&providers, &config(SynthesisMethod::WeightedVote, 0.5));
        assert_eq!(verdicts[0].agreement_ratio, 0.0);
        assert!(!verdicts[0].accepted);
    }

    #[test]
    fn test_provider_with_no_claims_still_counts() {
        let providers = vec![provider("a", "Claim."), provider("b", "")];
        let verdicts =
            cross_verify(&providers, &config(SynthesisMethod::CrossVerification, 0.6));
        assert_eq!(verdicts[0].agreement_ratio, 0.5);
        assert!(!verdicts[0].accepted);
    }

    #[test]
    fn test_no_providers() {
        assert!(synthesize(&[], &ExecutionConfig::default()).is_none());
    }
}
