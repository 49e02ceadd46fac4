//! Core domain concepts shared across all subdomains.
//!
//! - [`provider::ProviderSpec`]: identity, model and vote weight of one provider
//! - [`prompt::Prompt`]: a validated prompt to fan out to every provider
//! - [`error::ConsensusError`]: fatal engine errors

pub mod error;
pub mod prompt;
pub mod provider;
