//! Label matcher.
//!
//! Pure function from inventory to pairings. No I/O happens here, which
//! makes this the natural place to enforce the ambiguity invariant: a
//! label value that maps to more than one address or more than one target
//! produces no pairing at all, ever.

use std::collections::BTreeMap;

use eipr_provider::AddressRecord;

use crate::inventory::Target;

/// A computed (address, target) match due to a shared label value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub address: AddressRecord,
    pub target: Target,
    pub label_value: String,
}

/// Output of one matching pass.
///
/// All collections are sorted by label value so reports and tests are
/// stable across runs.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// Unambiguous one-to-one matches, to be reconciled.
    pub pairings: Vec<Pairing>,
    /// Label values with more than one address or more than one target.
    /// Excluded from pairing: guessing here could point an address at the
    /// wrong machine.
    pub ambiguous_labels: Vec<String>,
    /// Addresses whose label value has no target. Informational.
    pub unmatched_addresses: Vec<AddressRecord>,
    /// Targets whose label value has no address. Informational.
    pub unmatched_targets: Vec<Target>,
}

/// Compute the conflict-free matching between addresses and targets.
///
/// Both sides are grouped by label value. A value present on both sides
/// with exactly one member in each group emits a [`Pairing`]; a value with
/// two or more members on either side is ambiguous and emits nothing; a
/// value present on only one side is unmatched.
#[must_use]
pub fn match_inventory(addresses: Vec<AddressRecord>, targets: Vec<Target>) -> MatchOutcome {
    let mut by_label: BTreeMap<String, (Vec<AddressRecord>, Vec<Target>)> = BTreeMap::new();

    for address in addresses {
        by_label
            .entry(address.label_value.clone())
            .or_default()
            .0
            .push(address);
    }
    for target in targets {
        by_label
            .entry(target.label_value.clone())
            .or_default()
            .1
            .push(target);
    }

    let mut outcome = MatchOutcome::default();

    for (label_value, (mut group_addresses, mut group_targets)) in by_label {
        match (group_addresses.len(), group_targets.len()) {
            (1, 1) => {
                let address = group_addresses.remove(0);
                let target = group_targets.remove(0);
                outcome.pairings.push(Pairing {
                    address,
                    target,
                    label_value,
                });
            }
            (_, 0) => outcome.unmatched_addresses.extend(group_addresses),
            (0, _) => outcome.unmatched_targets.extend(group_targets),
            _ => outcome.ambiguous_labels.push(label_value),
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use eipr_provider::{AddressId, TargetId, TargetKind};

    fn address(id: &str, label: &str) -> AddressRecord {
        AddressRecord {
            id: AddressId::new(id),
            label_value: label.to_string(),
            associated_target: None,
        }
    }

    fn target(id: &str, label: &str) -> Target {
        Target {
            id: TargetId::new(id),
            label_value: label.to_string(),
            kind: TargetKind::Instance,
        }
    }

    #[test]
    fn test_one_to_one_label_emits_pairing() {
        let outcome = match_inventory(vec![address("A1", "web")], vec![target("I1", "web")]);

        assert_eq!(outcome.pairings.len(), 1);
        assert_eq!(outcome.pairings[0].address.id.as_str(), "A1");
        assert_eq!(outcome.pairings[0].target.id.as_str(), "I1");
        assert_eq!(outcome.pairings[0].label_value, "web");
        assert!(outcome.ambiguous_labels.is_empty());
    }

    #[test]
    fn test_duplicate_addresses_make_label_ambiguous() {
        let outcome = match_inventory(
            vec![address("A1", "db"), address("A2", "db")],
            vec![target("I1", "db")],
        );

        assert!(outcome.pairings.is_empty());
        assert_eq!(outcome.ambiguous_labels, vec!["db".to_string()]);
    }

    #[test]
    fn test_duplicate_targets_make_label_ambiguous() {
        let outcome = match_inventory(
            vec![address("A1", "web")],
            vec![target("I1", "web"), target("I2", "web")],
        );

        assert!(outcome.pairings.is_empty());
        assert_eq!(outcome.ambiguous_labels, vec!["web".to_string()]);
    }

    #[test]
    fn test_ambiguity_does_not_disturb_other_labels() {
        let outcome = match_inventory(
            vec![
                address("A1", "db"),
                address("A2", "db"),
                address("A3", "web"),
            ],
            vec![target("I1", "db"), target("I2", "web")],
        );

        assert_eq!(outcome.ambiguous_labels, vec!["db".to_string()]);
        assert_eq!(outcome.pairings.len(), 1);
        assert_eq!(outcome.pairings[0].label_value, "web");
    }

    #[test]
    fn test_one_sided_labels_are_unmatched_not_errors() {
        let outcome = match_inventory(
            vec![address("A1", "orphan-addr")],
            vec![target("I1", "orphan-target")],
        );

        assert!(outcome.pairings.is_empty());
        assert!(outcome.ambiguous_labels.is_empty());
        assert_eq!(outcome.unmatched_addresses.len(), 1);
        assert_eq!(outcome.unmatched_targets.len(), 1);
    }

    #[test]
    fn test_output_is_sorted_by_label_value() {
        let outcome = match_inventory(
            vec![address("A1", "zeta"), address("A2", "alpha")],
            vec![target("I1", "zeta"), target("I2", "alpha")],
        );

        let labels: Vec<&str> = outcome
            .pairings
            .iter()
            .map(|p| p.label_value.as_str())
            .collect();
        assert_eq!(labels, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_empty_inventory_matches_nothing() {
        let outcome = match_inventory(vec![], vec![]);
        assert!(outcome.pairings.is_empty());
        assert!(outcome.ambiguous_labels.is_empty());
        assert!(outcome.unmatched_addresses.is_empty());
        assert!(outcome.unmatched_targets.is_empty());
    }
}
