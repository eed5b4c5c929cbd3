//! Run report.
//!
//! The structured outcome of one reconciliation run. The report is the
//! only artifact a run produces: it is rendered as structured log output
//! for the observability pipeline, never persisted by the engine itself.

use chrono::{DateTime, Utc};
use eipr_provider::{AddressId, ProviderError, TargetId};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// How a single pairing ended.
#[derive(Debug)]
pub enum PairingDisposition {
    /// The address was already associated with the matched target; no
    /// mutating call was issued.
    AlreadyCorrect,
    /// Association succeeded (and the source/dest-check side effect, if
    /// requested, succeeded too).
    Associated,
    /// Association succeeded but the requested source/dest-check
    /// modification failed. The pairing still counts as succeeded: the two
    /// effects are independent and the second is advisory to routing, not
    /// to reachability.
    AssociatedSideEffectFailed { error: ProviderError },
    /// The associate call failed; nothing was changed for this pairing.
    AssociationFailed { error: ProviderError },
    /// Dry-run mode: the association would have been issued.
    SkippedDryRun,
}

/// Outcome of processing one pairing.
#[derive(Debug)]
pub struct PairingResult {
    pub label_value: String,
    pub address_id: AddressId,
    pub target_id: TargetId,
    pub disposition: PairingDisposition,
}

/// Which provider call failed for a pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Associate,
    SourceDestCheck,
}

/// One recorded per-pairing failure.
#[derive(Debug, Clone, Serialize)]
pub struct PairingFailure {
    pub label_value: String,
    pub address_id: AddressId,
    pub target_id: TargetId,
    pub stage: FailureStage,
    pub error_code: String,
    pub reason: String,
    /// Whether the next scheduled run is likely to clear this on its own.
    pub transient: bool,
}

/// Structured outcome of one reconciliation run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub label_key: String,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    /// Pairings handed to the reconciler (everything below except the
    /// ambiguity count sums to this).
    pub pairings_attempted: usize,
    /// Associations issued and accepted, including those whose optional
    /// side effect failed.
    pub pairings_succeeded: usize,
    pub pairings_already_correct: usize,
    pub pairings_skipped_ambiguous: usize,
    pub pairings_skipped_dry_run: usize,
    pub pairings_failed: usize,

    pub failures: Vec<PairingFailure>,
    pub ambiguous_labels: Vec<String>,
    pub unmatched_addresses: Vec<AddressId>,
    pub unmatched_targets: Vec<TargetId>,
}

impl RunReport {
    /// Start a report for a new run.
    #[must_use]
    pub fn new(label_key: impl Into<String>, dry_run: bool) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            label_key: label_key.into(),
            dry_run,
            started_at: Utc::now(),
            completed_at: None,
            pairings_attempted: 0,
            pairings_succeeded: 0,
            pairings_already_correct: 0,
            pairings_skipped_ambiguous: 0,
            pairings_skipped_dry_run: 0,
            pairings_failed: 0,
            failures: Vec::new(),
            ambiguous_labels: Vec::new(),
            unmatched_addresses: Vec::new(),
            unmatched_targets: Vec::new(),
        }
    }

    /// Record the outcome of one pairing.
    pub fn record(&mut self, result: PairingResult) {
        self.pairings_attempted += 1;
        match result.disposition {
            PairingDisposition::AlreadyCorrect => self.pairings_already_correct += 1,
            PairingDisposition::Associated => self.pairings_succeeded += 1,
            PairingDisposition::AssociatedSideEffectFailed { error } => {
                self.pairings_succeeded += 1;
                self.push_failure(
                    result.label_value,
                    result.address_id,
                    result.target_id,
                    FailureStage::SourceDestCheck,
                    &error,
                );
            }
            PairingDisposition::AssociationFailed { error } => {
                self.pairings_failed += 1;
                self.push_failure(
                    result.label_value,
                    result.address_id,
                    result.target_id,
                    FailureStage::Associate,
                    &error,
                );
            }
            PairingDisposition::SkippedDryRun => self.pairings_skipped_dry_run += 1,
        }
    }

    fn push_failure(
        &mut self,
        label_value: String,
        address_id: AddressId,
        target_id: TargetId,
        stage: FailureStage,
        error: &ProviderError,
    ) {
        self.failures.push(PairingFailure {
            label_value,
            address_id,
            target_id,
            stage,
            error_code: error.error_code().to_string(),
            reason: error.to_string(),
            transient: error.is_transient(),
        });
    }

    /// Copy the matcher's exclusions into the report verbatim.
    pub fn record_exclusions(
        &mut self,
        ambiguous_labels: Vec<String>,
        unmatched_addresses: Vec<AddressId>,
        unmatched_targets: Vec<TargetId>,
    ) {
        self.pairings_skipped_ambiguous = ambiguous_labels.len();
        self.ambiguous_labels = ambiguous_labels;
        self.unmatched_addresses = unmatched_addresses;
        self.unmatched_targets = unmatched_targets;
    }

    /// Mark the run complete.
    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Wall-clock duration, once complete.
    #[must_use]
    pub fn duration_ms(&self) -> Option<i64> {
        self.completed_at
            .map(|done| (done - self.started_at).num_milliseconds())
    }

    /// Whether any associate call failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.pairings_failed > 0
    }

    /// Emit the one-event structured summary for this run.
    pub fn log_summary(&self) {
        info!(
            run_id = %self.run_id,
            label_key = %self.label_key,
            dry_run = self.dry_run,
            attempted = self.pairings_attempted,
            succeeded = self.pairings_succeeded,
            already_correct = self.pairings_already_correct,
            skipped_ambiguous = self.pairings_skipped_ambiguous,
            skipped_dry_run = self.pairings_skipped_dry_run,
            failed = self.pairings_failed,
            unmatched_addresses = self.unmatched_addresses.len(),
            unmatched_targets = self.unmatched_targets.len(),
            duration_ms = self.duration_ms(),
            "reconciliation run complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(label: &str, disposition: PairingDisposition) -> PairingResult {
        PairingResult {
            label_value: label.to_string(),
            address_id: AddressId::new("eipalloc-1"),
            target_id: TargetId::new("i-1"),
            disposition,
        }
    }

    #[test]
    fn test_counters_per_disposition() {
        let mut report = RunReport::new("eipr", false);
        report.record(result("a", PairingDisposition::Associated));
        report.record(result("b", PairingDisposition::AlreadyCorrect));
        report.record(result(
            "c",
            PairingDisposition::AssociationFailed {
                error: ProviderError::throttled("slow down"),
            },
        ));

        assert_eq!(report.pairings_attempted, 3);
        assert_eq!(report.pairings_succeeded, 1);
        assert_eq!(report.pairings_already_correct, 1);
        assert_eq!(report.pairings_failed, 1);
        assert!(report.has_failures());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].error_code, "THROTTLED");
        assert!(report.failures[0].transient);
    }

    #[test]
    fn test_side_effect_failure_still_counts_as_success() {
        let mut report = RunReport::new("eipr", false);
        report.record(result(
            "nat",
            PairingDisposition::AssociatedSideEffectFailed {
                error: ProviderError::internal("attribute call failed"),
            },
        ));

        assert_eq!(report.pairings_succeeded, 1);
        assert_eq!(report.pairings_failed, 0);
        assert!(!report.has_failures());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].stage, FailureStage::SourceDestCheck);
    }

    #[test]
    fn test_exclusions_are_copied_verbatim() {
        let mut report = RunReport::new("eipr", false);
        report.record_exclusions(
            vec!["db".to_string()],
            vec![AddressId::new("eipalloc-9")],
            vec![],
        );

        assert_eq!(report.pairings_skipped_ambiguous, 1);
        assert_eq!(report.ambiguous_labels, vec!["db".to_string()]);
        assert_eq!(report.unmatched_addresses.len(), 1);
    }

    #[test]
    fn test_duration_requires_completion() {
        let mut report = RunReport::new("eipr", true);
        assert_eq!(report.duration_ms(), None);
        report.complete();
        assert!(report.duration_ms().is_some());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let mut report = RunReport::new("eipr", false);
        report.record(result("web", PairingDisposition::Associated));
        report.complete();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["label_key"], "eipr");
        assert_eq!(json["pairings_succeeded"], 1);
        assert!(json["run_id"].is_string());
        assert!(json["completed_at"].is_string());
    }
}
