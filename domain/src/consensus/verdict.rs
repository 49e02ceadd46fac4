//! Claim verdicts

use super::claim::Claim;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Cross-verification result for one group of equivalent claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimVerdict {
    /// Representative claim, as written by the first supporting provider
    pub claim: Claim,
    /// Providers whose responses contain an equivalent claim
    pub supporting_providers: BTreeSet<String>,
    /// Share of successful providers (or of their weight) backing the claim
    pub agreement_ratio: f64,
    pub accepted: bool,
}

impl ClaimVerdict {
    pub fn support_count(&self) -> usize {
        self.supporting_providers.len()
    }

    /// Visual support summary, e.g. "[●●○]" for 2 of 3 providers
    pub fn support_summary(&self, successful_providers: usize) -> String {
        let backed = self.support_count().min(successful_providers);
        let mut summary = String::from("[");
        summary.extend(std::iter::repeat_n('●', backed));
        summary.extend(std::iter::repeat_n('○', successful_providers - backed));
        summary.push(']');
        summary
    }
}
