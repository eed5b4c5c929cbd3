//! Provider inventory records and pagination types.
//!
//! These are the shapes the provider returns from the tag-filtered list
//! operations, before the engine resolves attachment cardinality into
//! association targets.

use serde::{Deserialize, Serialize};

use crate::ids::{AddressId, TargetId};

/// Kind of association target.
///
/// An address ultimately attaches to a network attachment; a single-homed
/// instance is addressable as a whole, a multi-homed one only through a
/// specific attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// A compute instance with exactly one network attachment.
    Instance,
    /// One specific network attachment of a multi-homed instance.
    Attachment,
}

impl TargetKind {
    /// Whether the source/destination check attribute can be modified on
    /// this kind of target.
    #[must_use]
    pub fn supports_source_dest_check(self) -> bool {
        matches!(self, TargetKind::Instance)
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetKind::Instance => write!(f, "instance"),
            TargetKind::Attachment => write!(f, "attachment"),
        }
    }
}

/// An allocated address carrying the configured label key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Provider-assigned allocation identity.
    pub id: AddressId,
    /// The label value under the configured key.
    pub label_value: String,
    /// Identity of the target the address is currently associated with,
    /// if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub associated_target: Option<TargetId>,
}

impl AddressRecord {
    /// Whether the address is currently associated with any target.
    #[must_use]
    pub fn is_associated(&self) -> bool {
        self.associated_target.is_some()
    }
}

/// A compute instance carrying the configured label key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Provider-assigned instance identity.
    pub id: TargetId,
    /// The label value under the configured key.
    pub label_value: String,
    /// Total number of network attachments on the instance, labeled or
    /// not. Drives cardinality resolution in the inventory reader.
    pub attachment_count: u32,
}

/// A network attachment carrying the configured label key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    /// Provider-assigned attachment identity.
    pub id: TargetId,
    /// The label value under the configured key.
    pub label_value: String,
    /// Identity of the instance the attachment belongs to, when attached.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub instance_id: Option<TargetId>,
}

/// Opaque cursor for paginated list operations.
///
/// `PageToken::first()` starts a listing; the provider hands back the
/// cursor for the next page in [`Page::next`], or `None` when drained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageToken(Option<String>);

impl PageToken {
    /// Start of a listing.
    #[must_use]
    pub fn first() -> Self {
        Self(None)
    }

    /// Resume a listing from a provider-issued cursor.
    pub fn resume(cursor: impl Into<String>) -> Self {
        Self(Some(cursor.into()))
    }

    /// The raw cursor, if this token resumes a listing.
    #[must_use]
    pub fn cursor(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// One page of a list operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Records in this page.
    pub items: Vec<T>,
    /// Token for the next page; `None` when the listing is drained.
    pub next: Option<PageToken>,
}

impl<T> Page<T> {
    /// A final page containing all remaining records.
    #[must_use]
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    /// A page with a continuation token.
    pub fn with_next(items: Vec<T>, cursor: impl Into<String>) -> Self {
        Self {
            items,
            next: Some(PageToken::resume(cursor)),
        }
    }

    /// Whether more pages remain.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_kind_source_dest_check_support() {
        assert!(TargetKind::Instance.supports_source_dest_check());
        assert!(!TargetKind::Attachment.supports_source_dest_check());
    }

    #[test]
    fn test_target_kind_display() {
        assert_eq!(TargetKind::Instance.to_string(), "instance");
        assert_eq!(TargetKind::Attachment.to_string(), "attachment");
    }

    #[test]
    fn test_address_record_association_state() {
        let free = AddressRecord {
            id: AddressId::new("eipalloc-1"),
            label_value: "web".to_string(),
            associated_target: None,
        };
        assert!(!free.is_associated());

        let held = AddressRecord {
            associated_target: Some(TargetId::new("i-1")),
            ..free
        };
        assert!(held.is_associated());
    }

    #[test]
    fn test_page_token_lifecycle() {
        let first = PageToken::first();
        assert_eq!(first.cursor(), None);

        let resumed = PageToken::resume("cursor-2");
        assert_eq!(resumed.cursor(), Some("cursor-2"));
    }

    #[test]
    fn test_page_has_more() {
        let done: Page<u8> = Page::last(vec![1, 2]);
        assert!(!done.has_more());

        let more: Page<u8> = Page::with_next(vec![1], "c");
        assert!(more.has_more());
        assert_eq!(more.next.unwrap().cursor(), Some("c"));
    }

    #[test]
    fn test_address_record_json_shape() {
        let record = AddressRecord {
            id: AddressId::new("eipalloc-7"),
            label_value: "db".to_string(),
            associated_target: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "eipalloc-7");
        assert_eq!(json["label_value"], "db");
        // Unassociated addresses omit the field entirely
        assert!(json.get("associated_target").is_none());
    }
}
