//! Provider capability trait.
//!
//! [`ElasticIpProvider`] is the seam between the reconciliation engine and
//! a cloud account. List operations are read-only and paginated; the two
//! mutating operations each touch exactly one resource.

use async_trait::async_trait;

use crate::error::ProviderResult;
use crate::ids::{AddressId, AssociationId, TargetId};
use crate::types::{AddressRecord, AttachmentRecord, InstanceRecord, Page, PageToken, TargetKind};

/// Operations the engine performs against a cloud account.
///
/// Implementations must be safe to share across tasks. The list operations
/// filter server-side on a single label key, returning only resources that
/// carry the key; the caller supplies the key once at adapter construction
/// and it is not repeated per call.
#[async_trait]
pub trait ElasticIpProvider: Send + Sync {
    /// Short name identifying the adapter in logs and reports.
    fn provider_name(&self) -> &str;

    /// List allocated addresses carrying the configured label key.
    ///
    /// Returns one page; pass the returned token back to continue. The
    /// engine drains all pages before matching begins.
    async fn list_addresses(&self, token: PageToken) -> ProviderResult<Page<AddressRecord>>;

    /// List compute instances carrying the configured label key.
    async fn list_instances(&self, token: PageToken) -> ProviderResult<Page<InstanceRecord>>;

    /// List network attachments carrying the configured label key.
    async fn list_attachments(&self, token: PageToken) -> ProviderResult<Page<AttachmentRecord>>;

    /// Associate an address with a target.
    ///
    /// Must not steal: if the address is already associated elsewhere the
    /// call fails with [`ProviderError::AlreadyAssociated`] rather than
    /// re-pointing it.
    ///
    /// [`ProviderError::AlreadyAssociated`]: crate::error::ProviderError::AlreadyAssociated
    async fn associate_address(
        &self,
        address_id: &AddressId,
        target_id: &TargetId,
        kind: TargetKind,
    ) -> ProviderResult<AssociationId>;

    /// Disable the source/destination check attribute on a target.
    ///
    /// Only meaningful for targets whose kind supports the attribute;
    /// implementations reject others with
    /// [`ProviderError::AttributeNotSupported`].
    ///
    /// [`ProviderError::AttributeNotSupported`]: crate::error::ProviderError::AttributeNotSupported
    async fn set_source_dest_check(
        &self,
        target_id: &TargetId,
        kind: TargetKind,
        enabled: bool,
    ) -> ProviderResult<()>;
}
