//! Engine error types.

use eipr_provider::ProviderError;
use thiserror::Error;

/// Error that aborts a whole reconciliation run.
///
/// This is deliberately a single-variant enum: every other problem a run
/// encounters is per-pairing data in the run report, never an error. A run
/// only refuses to proceed when it could not read a complete inventory,
/// because mutating against partial inventory is how addresses end up
/// pointed at the wrong machine.
#[derive(Debug, Error)]
pub enum RunError {
    /// Provider reads failed or were incomplete; no mutation was attempted.
    #[error("inventory unavailable: {source}")]
    InventoryUnavailable {
        #[source]
        source: ProviderError,
    },
}

impl RunError {
    /// Wrap a provider read failure.
    #[must_use]
    pub fn inventory_unavailable(source: ProviderError) -> Self {
        RunError::InventoryUnavailable { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_provider_reason() {
        let err = RunError::inventory_unavailable(ProviderError::throttled("rate exceeded"));
        assert_eq!(
            err.to_string(),
            "inventory unavailable: request throttled: rate exceeded"
        );
    }

    #[test]
    fn test_source_is_preserved() {
        let err = RunError::inventory_unavailable(ProviderError::unavailable("maintenance"));
        let source = std::error::Error::source(&err).expect("source");
        assert!(source.to_string().contains("maintenance"));
    }
}
