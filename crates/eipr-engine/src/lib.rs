//! # Reconciliation Engine
//!
//! Converges a cloud account's elastic IP associations to the state
//! implied by resource tags, one run at a time.
//!
//! A run is stateless: inventory is reconstructed fresh from the provider
//! every time, so nothing here caches across invocations and nothing can
//! go stale. The flow is fixed:
//!
//! 1. [`inventory`] reads every labeled address and resolves labeled
//!    compute resources into association targets (read-only, paginated;
//!    any failure aborts before mutation).
//! 2. [`matcher`] computes the conflict-free one-to-one matching by label
//!    value, excluding ambiguous labels entirely (pure, no I/O).
//! 3. [`reconciler`] issues the minimal mutating calls per pairing with
//!    bounded concurrency, tolerating per-pairing failure.
//! 4. [`report`] captures the structured outcome for the observability
//!    pipeline.

pub mod error;
pub mod inventory;
pub mod matcher;
pub mod reconciler;
pub mod report;

pub use error::RunError;
pub use inventory::{Inventory, InventoryReader, Target};
pub use matcher::{match_inventory, MatchOutcome, Pairing};
pub use reconciler::{Reconciler, ReconcilerConfig};
pub use report::{
    FailureStage, PairingDisposition, PairingFailure, PairingResult, RunReport,
};
