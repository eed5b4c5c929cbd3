//! In-memory provider implementation.
//!
//! Serves a fixed inventory from process memory, with real pagination and
//! real mutation semantics (associations are recorded and visible to later
//! listings). Used by the test suites and by local runs against a JSON
//! inventory file. Failure injection is deliberate and explicit so tests
//! can exercise the engine's partial-failure paths.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::ids::{AddressId, AssociationId, TargetId};
use crate::traits::ElasticIpProvider;
use crate::types::{AddressRecord, AttachmentRecord, InstanceRecord, Page, PageToken, TargetKind};

const DEFAULT_PAGE_SIZE: usize = 100;

/// On-disk inventory fixture shape for [`MemoryProvider::from_json_str`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryFixture {
    #[serde(default)]
    pub addresses: Vec<AddressRecord>,
    #[serde(default)]
    pub instances: Vec<InstanceRecord>,
    #[serde(default)]
    pub attachments: Vec<AttachmentRecord>,
}

#[derive(Debug, Default)]
struct Inner {
    addresses: Vec<AddressRecord>,
    instances: Vec<InstanceRecord>,
    attachments: Vec<AttachmentRecord>,
    /// Source/dest check state per target; absent means enabled (the
    /// provider default for fresh instances).
    source_dest_check: HashMap<TargetId, bool>,
}

/// Builder for [`MemoryProvider`].
#[derive(Debug, Default)]
pub struct MemoryProviderBuilder {
    inner: Inner,
    page_size: Option<usize>,
    fail_listings: bool,
    fail_associate_for: HashSet<AddressId>,
    fail_source_dest_check_for: HashSet<TargetId>,
}

impl MemoryProviderBuilder {
    /// Number of records per page returned by list operations.
    #[must_use]
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size.max(1));
        self
    }

    /// Add an address record to the inventory.
    #[must_use]
    pub fn address(mut self, record: AddressRecord) -> Self {
        self.inner.addresses.push(record);
        self
    }

    /// Add an instance record to the inventory.
    #[must_use]
    pub fn instance(mut self, record: InstanceRecord) -> Self {
        self.inner.instances.push(record);
        self
    }

    /// Add an attachment record to the inventory.
    #[must_use]
    pub fn attachment(mut self, record: AttachmentRecord) -> Self {
        self.inner.attachments.push(record);
        self
    }

    /// Make every list operation fail with an unavailable error.
    #[must_use]
    pub fn fail_listings(mut self) -> Self {
        self.fail_listings = true;
        self
    }

    /// Make `associate_address` fail for the given address.
    #[must_use]
    pub fn fail_associate_for(mut self, address_id: AddressId) -> Self {
        self.fail_associate_for.insert(address_id);
        self
    }

    /// Make `set_source_dest_check` fail for the given target.
    #[must_use]
    pub fn fail_source_dest_check_for(mut self, target_id: TargetId) -> Self {
        self.fail_source_dest_check_for.insert(target_id);
        self
    }

    /// Build the provider.
    #[must_use]
    pub fn build(self) -> MemoryProvider {
        MemoryProvider {
            inner: Mutex::new(self.inner),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            fail_listings: self.fail_listings,
            fail_associate_for: self.fail_associate_for,
            fail_source_dest_check_for: self.fail_source_dest_check_for,
            list_calls: AtomicUsize::new(0),
            associate_calls: AtomicUsize::new(0),
            modify_calls: AtomicUsize::new(0),
            association_seq: AtomicUsize::new(0),
        }
    }
}

/// In-memory [`ElasticIpProvider`].
#[derive(Debug)]
pub struct MemoryProvider {
    inner: Mutex<Inner>,
    page_size: usize,
    fail_listings: bool,
    fail_associate_for: HashSet<AddressId>,
    fail_source_dest_check_for: HashSet<TargetId>,
    list_calls: AtomicUsize,
    associate_calls: AtomicUsize,
    modify_calls: AtomicUsize,
    association_seq: AtomicUsize,
}

impl MemoryProvider {
    /// Start building a provider with an empty inventory.
    #[must_use]
    pub fn builder() -> MemoryProviderBuilder {
        MemoryProviderBuilder::default()
    }

    /// Load an inventory fixture from a JSON string.
    pub fn from_json_str(json: &str) -> ProviderResult<Self> {
        let fixture: InventoryFixture = serde_json::from_str(json)
            .map_err(|e| ProviderError::invalid_request(format!("bad inventory fixture: {e}")))?;
        Ok(Self::from_fixture(fixture))
    }

    /// Load an inventory fixture from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ProviderError::Internal {
            message: format!("cannot read inventory file {}", path.display()),
            source: Some(Box::new(e)),
        })?;
        Self::from_json_str(&json)
    }

    /// Build a provider from a parsed fixture.
    #[must_use]
    pub fn from_fixture(fixture: InventoryFixture) -> Self {
        debug!(
            addresses = fixture.addresses.len(),
            instances = fixture.instances.len(),
            attachments = fixture.attachments.len(),
            "building provider from fixture"
        );
        let mut builder = Self::builder();
        for a in fixture.addresses {
            builder = builder.address(a);
        }
        for i in fixture.instances {
            builder = builder.instance(i);
        }
        for n in fixture.attachments {
            builder = builder.attachment(n);
        }
        builder.build()
    }

    /// Number of list pages served so far.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `associate_address` calls received, including failed ones.
    #[must_use]
    pub fn associate_calls(&self) -> usize {
        self.associate_calls.load(Ordering::SeqCst)
    }

    /// Number of `set_source_dest_check` calls received, including failed
    /// ones.
    #[must_use]
    pub fn modify_calls(&self) -> usize {
        self.modify_calls.load(Ordering::SeqCst)
    }

    /// Current association of an address, if any.
    #[must_use]
    pub fn association_of(&self, address_id: &AddressId) -> Option<TargetId> {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner
            .addresses
            .iter()
            .find(|a| &a.id == address_id)
            .and_then(|a| a.associated_target.clone())
    }

    /// Current source/dest check state of a target. `None` means the
    /// attribute was never modified (provider default applies).
    #[must_use]
    pub fn source_dest_check_of(&self, target_id: &TargetId) -> Option<bool> {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.source_dest_check.get(target_id).copied()
    }

    fn page_of<T: Clone>(&self, all: &[T], token: &PageToken) -> ProviderResult<Page<T>> {
        let start = match token.cursor() {
            None => 0,
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| ProviderError::invalid_request(format!("bad page cursor: {c}")))?,
        };
        if start > all.len() {
            return Err(ProviderError::invalid_request(format!(
                "page cursor {start} past end of listing"
            )));
        }
        let end = (start + self.page_size).min(all.len());
        let items = all[start..end].to_vec();
        if end < all.len() {
            Ok(Page::with_next(items, end.to_string()))
        } else {
            Ok(Page::last(items))
        }
    }

    fn check_listing(&self) -> ProviderResult<()> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listings {
            return Err(ProviderError::unavailable("injected listing failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ElasticIpProvider for MemoryProvider {
    fn provider_name(&self) -> &str {
        "memory"
    }

    async fn list_addresses(&self, token: PageToken) -> ProviderResult<Page<AddressRecord>> {
        self.check_listing()?;
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        self.page_of(&inner.addresses, &token)
    }

    async fn list_instances(&self, token: PageToken) -> ProviderResult<Page<InstanceRecord>> {
        self.check_listing()?;
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        self.page_of(&inner.instances, &token)
    }

    async fn list_attachments(&self, token: PageToken) -> ProviderResult<Page<AttachmentRecord>> {
        self.check_listing()?;
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        self.page_of(&inner.attachments, &token)
    }

    async fn associate_address(
        &self,
        address_id: &AddressId,
        target_id: &TargetId,
        _kind: TargetKind,
    ) -> ProviderResult<AssociationId> {
        self.associate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_associate_for.contains(address_id) {
            return Err(ProviderError::internal("injected associate failure"));
        }

        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let record = inner
            .addresses
            .iter_mut()
            .find(|a| &a.id == address_id)
            .ok_or_else(|| ProviderError::AddressNotFound {
                address_id: address_id.clone(),
            })?;

        if let Some(current) = &record.associated_target {
            if current != target_id {
                return Err(ProviderError::AlreadyAssociated {
                    address_id: address_id.clone(),
                    current_target: current.clone(),
                });
            }
        }
        record.associated_target = Some(target_id.clone());

        let seq = self.association_seq.fetch_add(1, Ordering::SeqCst);
        Ok(AssociationId::new(format!("assoc-{seq:04}")))
    }

    async fn set_source_dest_check(
        &self,
        target_id: &TargetId,
        kind: TargetKind,
        enabled: bool,
    ) -> ProviderResult<()> {
        self.modify_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_source_dest_check_for.contains(target_id) {
            return Err(ProviderError::internal("injected attribute failure"));
        }
        if !kind.supports_source_dest_check() {
            return Err(ProviderError::AttributeNotSupported {
                target_id: target_id.clone(),
                attribute: "source-dest-check".to_string(),
            });
        }

        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let known = inner.instances.iter().any(|i| &i.id == target_id);
        if !known {
            return Err(ProviderError::TargetNotFound {
                target_id: target_id.clone(),
            });
        }
        inner.source_dest_check.insert(target_id.clone(), enabled);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(id: &str, label: &str) -> AddressRecord {
        AddressRecord {
            id: AddressId::new(id),
            label_value: label.to_string(),
            associated_target: None,
        }
    }

    fn instance(id: &str, label: &str, attachments: u32) -> InstanceRecord {
        InstanceRecord {
            id: TargetId::new(id),
            label_value: label.to_string(),
            attachment_count: attachments,
        }
    }

    #[tokio::test]
    async fn test_pagination_drains_in_order() {
        let provider = MemoryProvider::builder()
            .page_size(2)
            .address(address("eipalloc-1", "a"))
            .address(address("eipalloc-2", "b"))
            .address(address("eipalloc-3", "c"))
            .build();

        let first = provider.list_addresses(PageToken::first()).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert!(first.has_more());

        let second = provider
            .list_addresses(first.next.unwrap())
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(!second.has_more());
        assert_eq!(second.items[0].id.as_str(), "eipalloc-3");
    }

    #[tokio::test]
    async fn test_associate_records_and_is_idempotent_for_same_target() {
        let provider = MemoryProvider::builder()
            .address(address("eipalloc-1", "web"))
            .build();

        let addr = AddressId::new("eipalloc-1");
        let target = TargetId::new("i-1");

        provider
            .associate_address(&addr, &target, TargetKind::Instance)
            .await
            .unwrap();
        assert_eq!(provider.association_of(&addr), Some(target.clone()));

        // Re-associating with the same target is accepted
        provider
            .associate_address(&addr, &target, TargetKind::Instance)
            .await
            .unwrap();
        assert_eq!(provider.associate_calls(), 2);
    }

    #[tokio::test]
    async fn test_associate_does_not_steal() {
        let provider = MemoryProvider::builder()
            .address(AddressRecord {
                id: AddressId::new("eipalloc-1"),
                label_value: "web".to_string(),
                associated_target: Some(TargetId::new("i-other")),
            })
            .build();

        let err = provider
            .associate_address(
                &AddressId::new("eipalloc-1"),
                &TargetId::new("i-1"),
                TargetKind::Instance,
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "ALREADY_ASSOCIATED");
    }

    #[tokio::test]
    async fn test_source_dest_check_rejects_attachment_kind() {
        let provider = MemoryProvider::builder()
            .instance(instance("i-1", "web", 1))
            .build();

        let err = provider
            .set_source_dest_check(&TargetId::new("eni-1"), TargetKind::Attachment, false)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "ATTRIBUTE_NOT_SUPPORTED");

        provider
            .set_source_dest_check(&TargetId::new("i-1"), TargetKind::Instance, false)
            .await
            .unwrap();
        assert_eq!(
            provider.source_dest_check_of(&TargetId::new("i-1")),
            Some(false)
        );
    }

    #[tokio::test]
    async fn test_injected_listing_failure() {
        let provider = MemoryProvider::builder()
            .address(address("eipalloc-1", "a"))
            .fail_listings()
            .build();

        let err = provider
            .list_addresses(PageToken::first())
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn test_fixture_parsing() {
        let json = r#"{
            "addresses": [
                {"id": "eipalloc-1", "label_value": "web"}
            ],
            "instances": [
                {"id": "i-1", "label_value": "web", "attachment_count": 1}
            ]
        }"#;
        let provider = MemoryProvider::from_json_str(json).unwrap();
        assert_eq!(provider.association_of(&AddressId::new("eipalloc-1")), None);
    }
}
