//! Reconciler.
//!
//! Drives one run end-to-end: read inventory, compute the matching, issue
//! the minimal set of mutating calls. Pairings are independent, so they
//! are processed with bounded concurrency; one pairing failing never
//! touches another and never aborts the run.

use std::sync::Arc;
use std::time::Duration;

use eipr_provider::{ElasticIpProvider, ProviderError, ProviderResult};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn, Span};

use crate::error::RunError;
use crate::inventory::InventoryReader;
use crate::matcher::{match_inventory, Pairing};
use crate::report::{PairingDisposition, PairingResult, RunReport};

/// Settings for one reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// The tag key correlating addresses to targets.
    pub label_key: String,
    /// Disable the source/destination check after successful association,
    /// where the target supports it.
    pub disable_source_dest_check: bool,
    /// Maximum number of pairings processed at once.
    pub concurrency: usize,
    /// Upper bound on each individual provider call.
    pub call_timeout: Duration,
    /// Compute and report pairings without issuing mutating calls.
    pub dry_run: bool,
}

impl ReconcilerConfig {
    /// Defaults for everything except the label key, which has no sane
    /// default.
    #[must_use]
    pub fn new(label_key: impl Into<String>) -> Self {
        Self {
            label_key: label_key.into(),
            disable_source_dest_check: false,
            concurrency: 4,
            call_timeout: Duration::from_secs(30),
            dry_run: false,
        }
    }
}

/// One-shot convergence engine over a provider.
pub struct Reconciler {
    provider: Arc<dyn ElasticIpProvider>,
    config: ReconcilerConfig,
}

impl Reconciler {
    #[must_use]
    pub fn new(provider: Arc<dyn ElasticIpProvider>, config: ReconcilerConfig) -> Self {
        Self { provider, config }
    }

    /// Execute one reconciliation run.
    ///
    /// Fails only with [`RunError::InventoryUnavailable`]; every other
    /// problem is recorded per pairing in the returned report.
    #[instrument(skip(self), fields(run_id, label_key = %self.config.label_key))]
    pub async fn run(&self) -> Result<RunReport, RunError> {
        let mut report = RunReport::new(&self.config.label_key, self.config.dry_run);
        Span::current().record("run_id", tracing::field::display(report.run_id));

        info!(
            provider = self.provider.provider_name(),
            dry_run = self.config.dry_run,
            "starting reconciliation run"
        );

        let reader = InventoryReader::new(Arc::clone(&self.provider), self.config.call_timeout);
        let inventory = match reader.list_labeled().await {
            Ok(inventory) => inventory,
            Err(err) => {
                error!(error = %err, "aborting run, no mutations were attempted");
                return Err(err);
            }
        };

        let outcome = match_inventory(inventory.addresses, inventory.targets);
        for label in &outcome.ambiguous_labels {
            warn!(label_value = %label, "ambiguous label excluded from pairing");
        }
        report.record_exclusions(
            outcome.ambiguous_labels,
            outcome
                .unmatched_addresses
                .into_iter()
                .map(|a| a.id)
                .collect(),
            outcome.unmatched_targets.into_iter().map(|t| t.id).collect(),
        );

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut handles = Vec::with_capacity(outcome.pairings.len());

        for pairing in outcome.pairings {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break; // semaphore closed, no more work can be admitted
            };
            let provider = Arc::clone(&self.provider);
            let disable_check = self.config.disable_source_dest_check;
            let call_timeout = self.config.call_timeout;
            let dry_run = self.config.dry_run;

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                process_pairing(provider, pairing, disable_check, call_timeout, dry_run).await
            }));
        }

        for handle in handles {
            match handle.await {
                Ok(result) => report.record(result),
                Err(err) => error!(error = %err, "pairing task panicked"),
            }
        }

        report.complete();
        report.log_summary();
        Ok(report)
    }
}

/// Process one pairing through its state machine.
#[instrument(skip_all, fields(label_value = %pairing.label_value, address_id = %pairing.address.id, target_id = %pairing.target.id))]
async fn process_pairing(
    provider: Arc<dyn ElasticIpProvider>,
    pairing: Pairing,
    disable_source_dest_check: bool,
    call_timeout: Duration,
    dry_run: bool,
) -> PairingResult {
    let Pairing {
        address,
        target,
        label_value,
    } = pairing;

    let disposition = if address.associated_target.as_ref() == Some(&target.id) {
        debug!("already associated with matched target, nothing to do");
        PairingDisposition::AlreadyCorrect
    } else if dry_run {
        info!("dry run, association not issued");
        PairingDisposition::SkippedDryRun
    } else {
        let associate = bounded(
            call_timeout,
            provider.associate_address(&address.id, &target.id, target.kind),
        )
        .await;

        match associate {
            Err(error) => {
                warn!(
                    error = %error,
                    error_code = error.error_code(),
                    "association failed"
                );
                PairingDisposition::AssociationFailed { error }
            }
            Ok(association_id) => {
                info!(association_id = %association_id, "address associated");
                if disable_source_dest_check && target.supports_source_dest_check() {
                    let modify = bounded(
                        call_timeout,
                        provider.set_source_dest_check(&target.id, target.kind, false),
                    )
                    .await;
                    match modify {
                        Ok(()) => PairingDisposition::Associated,
                        Err(error) => {
                            warn!(
                                error = %error,
                                error_code = error.error_code(),
                                "source/dest check modification failed, association kept"
                            );
                            PairingDisposition::AssociatedSideEffectFailed { error }
                        }
                    }
                } else {
                    PairingDisposition::Associated
                }
            }
        }
    };

    PairingResult {
        label_value,
        address_id: address.id,
        target_id: target.id,
        disposition,
    }
}

/// Bound a provider call by the configured timeout. A timeout is treated
/// like any other per-call failure.
async fn bounded<T>(
    timeout: Duration,
    fut: impl std::future::Future<Output = ProviderResult<T>>,
) -> ProviderResult<T> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| ProviderError::Timeout {
            timeout_secs: timeout.as_secs(),
        })?
}
