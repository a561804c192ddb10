//! Boundary for external candidate-suggestion services.

use crate::error::Result;
use crate::name::PersonName;

/// An external source of additional email candidates for a person+domain
/// pair. The core places no trust in the output beyond the same syntax
/// filter applied to template-derived candidates, so implementations can
/// wrap any backing service.
pub(crate) trait CandidateSuggester {
    async fn suggest(&self, name: &PersonName, domain: &str) -> Result<Vec<String>>;
}

/// Null implementation used when no suggestion service is wired in.
pub(crate) struct NoSuggestions;

impl CandidateSuggester for NoSuggestions {
    async fn suggest(&self, _name: &PersonName, _domain: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}
