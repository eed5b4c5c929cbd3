//! # Provider Surface
//!
//! The external-collaborator boundary of eipr: everything the engine is
//! allowed to ask of a cloud account, and nothing more.
//!
//! The engine consumes exactly five provider operations:
//! - list addresses by tag
//! - list instances by tag
//! - list network attachments by tag
//! - associate an address with a target
//! - modify the source/destination check attribute of a target
//!
//! All of them are expressed on the [`ElasticIpProvider`] trait. Concrete
//! cloud SDK adapters live behind that trait and are deliberately not part
//! of this crate; the in-memory [`MemoryProvider`] is the only shipped
//! implementation and exists for tests and local dry runs.

pub mod error;
pub mod ids;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{ProviderError, ProviderResult};
pub use ids::{AddressId, AssociationId, TargetId};
pub use memory::{InventoryFixture, MemoryProvider, MemoryProviderBuilder};
pub use traits::ElasticIpProvider;
pub use types::{
    AddressRecord, AttachmentRecord, InstanceRecord, Page, PageToken, TargetKind,
};
