//! eipr — scheduled elastic IP reconciler.
//!
//! One invocation performs one convergent reconciliation pass: read the
//! labeled inventory, match addresses to targets, apply the minimal set of
//! mutations, log the run report. Scheduling is external; the process
//! holds no state between invocations.

mod config;
mod logging;

use std::sync::Arc;

use config::Config;
use eipr_engine::{Reconciler, ReconcilerConfig};
use eipr_provider::{ElasticIpProvider, MemoryProvider};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values)
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        label_key = %config.label_key,
        dry_run = config.dry_run,
        disable_source_dest_check = config.disable_source_dest_check,
        "Starting eipr"
    );

    let provider: Arc<dyn ElasticIpProvider> = match &config.inventory_file {
        Some(path) => match MemoryProvider::from_json_file(path) {
            Ok(p) => {
                info!(path = %path.display(), "Loaded inventory fixture");
                Arc::new(p)
            }
            Err(e) => {
                error!(error = %e, path = %path.display(), "Cannot load inventory fixture");
                eprintln!("FATAL: {e}");
                std::process::exit(1);
            }
        },
        None => {
            // Cloud adapters are deployed out-of-tree behind the provider
            // trait; without one, only fixture-backed runs are possible.
            eprintln!(
                "FATAL: no provider configured. Set EIPR_INVENTORY_FILE to run \
                 against a JSON inventory fixture."
            );
            std::process::exit(1);
        }
    };

    let reconciler = Reconciler::new(
        provider,
        ReconcilerConfig {
            label_key: config.label_key.clone(),
            disable_source_dest_check: config.disable_source_dest_check,
            concurrency: config.concurrency,
            call_timeout: config.call_timeout,
            dry_run: config.dry_run,
        },
    );

    match reconciler.run().await {
        Ok(report) => {
            match serde_json::to_string(&report) {
                Ok(json) => info!(report = %json, "Run report"),
                Err(e) => warn!(error = %e, "Run report could not be serialized"),
            }
            // Per-pairing failures do not fail the invocation: one bad tag
            // must not mask convergence of the rest.
            if report.has_failures() {
                warn!(
                    failed = report.pairings_failed,
                    "Run completed with per-pairing failures"
                );
            }
        }
        Err(e) => {
            error!(error = %e, "Run aborted");
            std::process::exit(1);
        }
    }
}
