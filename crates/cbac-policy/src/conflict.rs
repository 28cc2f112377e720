//! Comparison of two independently authored rule sets.
//!
//! Administrative tooling only; nothing on the authorization path calls
//! into this module. Grants are purely additive, so two rule sets "conflict"
//! wherever one grants something the other does not.

use cbac_contracts::{registry, Capability, CapabilitySet, Rules, TagAccess};

/// Return the first grant held by one side but not covered by the other.
///
/// `a` is scanned before `b`, each in grant order. A literal grant is
/// covered when the other side would grant that tag. A glob grant is
/// covered when the other side holds the same pattern or a glob whose
/// pattern text matches it, so differently spelled but equivalent globs
/// may be reported.
pub fn check_tag_conflict(a: &TagAccess, b: &TagAccess) -> Option<String> {
    uncovered(a, b).or_else(|| uncovered(b, a))
}

fn uncovered(from: &TagAccess, against: &TagAccess) -> Option<String> {
    let matcher = against.matcher();
    from.grants.iter().find(|g| !matcher.matches(g)).cloned()
}

/// Capabilities granted by exactly one of `a` and `b`, in declaration order.
pub fn capability_conflicts(a: &CapabilitySet, b: &CapabilitySet) -> Vec<Capability> {
    registry()
        .all()
        .iter()
        .copied()
        .filter(|c| a.has(*c) != b.has(*c))
        .collect()
}

/// Every difference between two rule sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleConflicts {
    pub capabilities: Vec<Capability>,
    pub tag: Option<String>,
}

impl RuleConflicts {
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty() && self.tag.is_none()
    }
}

pub fn compare_rules(a: &Rules, b: &Rules) -> RuleConflicts {
    RuleConflicts {
        capabilities: capability_conflicts(&a.capabilities, &b.capabilities),
        tag: check_tag_conflict(&a.tags, &b.tags),
    }
}
