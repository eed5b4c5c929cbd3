//! Inventory reader.
//!
//! Drains the provider's paginated tag-filtered listings into two flat
//! collections and resolves attachment cardinality into association
//! targets. Strictly read-only: any failure here aborts the run before a
//! single mutation happens.

use std::sync::Arc;
use std::time::Duration;

use eipr_provider::{
    AddressRecord, ElasticIpProvider, Page, PageToken, ProviderError, ProviderResult, TargetId,
    TargetKind,
};
use tracing::{debug, warn};

use crate::error::RunError;

/// An association target resolved from the labeled inventory.
///
/// Cardinality is resolved here, once: downstream code never needs to know
/// whether the provider resource was an instance or an attachment beyond
/// the kind tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub id: TargetId,
    pub label_value: String,
    pub kind: TargetKind,
}

impl Target {
    /// Whether the source/destination check attribute can be disabled on
    /// this target.
    #[must_use]
    pub fn supports_source_dest_check(&self) -> bool {
        self.kind.supports_source_dest_check()
    }
}

/// The complete labeled inventory for one run.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub addresses: Vec<AddressRecord>,
    pub targets: Vec<Target>,
}

/// Reads the complete labeled inventory from a provider.
pub struct InventoryReader {
    provider: Arc<dyn ElasticIpProvider>,
    call_timeout: Duration,
}

impl InventoryReader {
    /// Create a reader over the given provider. `call_timeout` bounds each
    /// individual page fetch.
    #[must_use]
    pub fn new(provider: Arc<dyn ElasticIpProvider>, call_timeout: Duration) -> Self {
        Self {
            provider,
            call_timeout,
        }
    }

    /// Read all labeled addresses and resolve all labeled targets.
    ///
    /// Every page of every listing must succeed; a single read failure
    /// (including a timeout) surfaces as [`RunError::InventoryUnavailable`]
    /// so the run aborts with zero mutations issued.
    pub async fn list_labeled(&self) -> Result<Inventory, RunError> {
        let addresses = self
            .drain(|token| {
                let provider = Arc::clone(&self.provider);
                async move { provider.list_addresses(token).await }
            })
            .await
            .map_err(RunError::inventory_unavailable)?;

        let instances = self
            .drain(|token| {
                let provider = Arc::clone(&self.provider);
                async move { provider.list_instances(token).await }
            })
            .await
            .map_err(RunError::inventory_unavailable)?;

        let attachments = self
            .drain(|token| {
                let provider = Arc::clone(&self.provider);
                async move { provider.list_attachments(token).await }
            })
            .await
            .map_err(RunError::inventory_unavailable)?;

        let mut targets = Vec::with_capacity(instances.len() + attachments.len());

        for instance in instances {
            // A single-homed instance is addressable as a whole. A
            // multi-homed one is reachable only through a specific
            // attachment, so the instance itself is never a target and the
            // labeled attachments (listed separately) stand in for it.
            match instance.attachment_count {
                1 => targets.push(Target {
                    id: instance.id,
                    label_value: instance.label_value,
                    kind: TargetKind::Instance,
                }),
                0 => {
                    warn!(
                        instance_id = %instance.id,
                        "labeled instance has no network attachment, skipping"
                    );
                }
                n => {
                    debug!(
                        instance_id = %instance.id,
                        attachment_count = n,
                        "multi-homed instance, deferring to labeled attachments"
                    );
                }
            }
        }

        for attachment in attachments {
            targets.push(Target {
                id: attachment.id,
                label_value: attachment.label_value,
                kind: TargetKind::Attachment,
            });
        }

        debug!(
            addresses = addresses.len(),
            targets = targets.len(),
            "inventory read complete"
        );

        Ok(Inventory { addresses, targets })
    }

    /// Drain every page of one listing, in order.
    async fn drain<T, F, Fut>(&self, fetch: F) -> ProviderResult<Vec<T>>
    where
        F: Fn(PageToken) -> Fut,
        Fut: std::future::Future<Output = ProviderResult<Page<T>>>,
    {
        let mut all = Vec::new();
        let mut token = PageToken::first();
        loop {
            let page = tokio::time::timeout(self.call_timeout, fetch(token))
                .await
                .map_err(|_| ProviderError::Timeout {
                    timeout_secs: self.call_timeout.as_secs(),
                })??;
            all.extend(page.items);
            match page.next {
                Some(next) => token = next,
                None => break,
            }
        }
        Ok(all)
    }
}
