//! Packed capability grant bitmaps.
//!
//! Bit `i % 8` of byte `i / 8` holds capability `i`. The layout is shared
//! with every persisted grant buffer, so it must not change.
//!
//! The model is default-deny: a capability is granted only when its bit is
//! set. There is no explicit deny.

use serde::{Deserialize, Serialize};

use crate::capability::{registry, Capability, CapabilityDesc};
use crate::error::CbacResult;

/// Byte offset and bit mask locating `c` in a packed buffer.
pub fn bitmask(c: Capability) -> (usize, u8) {
    let i = usize::from(c.0);
    (i / 8, 1u8 << (i % 8))
}

/// A set of granted capabilities stored as a packed bitmap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    grants: Vec<u8>,
}

impl CapabilitySet {
    /// Wrap a packed buffer as-is.
    pub fn from_bytes(grants: Vec<u8>) -> Self {
        Self { grants }
    }

    /// The packed buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.grants
    }

    /// True if no valid capability is granted.
    pub fn is_empty(&self) -> bool {
        !registry().all().iter().any(|c| self.has(*c))
    }

    /// Return true if `c` is granted.
    pub fn has(&self, c: Capability) -> bool {
        if !c.valid() {
            return false;
        }
        let (off, mask) = bitmask(c);
        self.grants.get(off).is_some_and(|b| b & mask != 0)
    }

    /// Grant `c`, growing the buffer to fit.
    ///
    /// Returns false, leaving the set untouched, if `c` is not a valid
    /// capability.
    pub fn set(&mut self, c: Capability) -> bool {
        if !c.valid() {
            return false;
        }
        let (off, mask) = bitmask(c);
        if off >= self.grants.len() {
            self.grants.resize(off + 1, 0);
        }
        self.grants[off] |= mask;
        true
    }

    /// Revoke `c`. Never shrinks the buffer.
    ///
    /// Returns false, leaving the set untouched, if `c` is not a valid
    /// capability.
    pub fn clear(&mut self, c: Capability) -> bool {
        if !c.valid() {
            return false;
        }
        let (off, mask) = bitmask(c);
        if let Some(b) = self.grants.get_mut(off) {
            *b &= !mask;
        }
        true
    }

    /// Grant every capability yielded by `caps`, skipping invalid ones.
    pub fn grant_all(&mut self, caps: impl IntoIterator<Item = Capability>) {
        for c in caps {
            self.set(c);
        }
    }

    /// Add every grant held by `other`.
    pub fn union(&mut self, other: &CapabilitySet) {
        self.grant_all(other.iter());
    }

    /// Granted capabilities in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        registry().all().iter().copied().filter(|c| self.has(*c))
    }

    /// Descriptors of every granted capability, in declaration order.
    pub fn capability_list(&self) -> Vec<CapabilityDesc> {
        self.iter().map(|c| c.desc()).collect()
    }

    /// The string form of this set.
    pub fn capability_state(&self) -> CapabilityState {
        CapabilityState {
            grants: self.iter().map(|c| c.name().to_string()).collect(),
        }
    }

    /// Convert a default-allow/default-deny override buffer into grants.
    ///
    /// Under `Deny` the overrides are the grants. Under `Allow` every valid
    /// capability is granted except the overridden ones.
    pub fn from_legacy(default: DefaultAccessRule, overrides: &[u8]) -> Self {
        let overridden = CapabilitySet::from_bytes(overrides.to_vec());
        let mut set = CapabilitySet::default();
        match default {
            DefaultAccessRule::Deny => set.union(&overridden),
            DefaultAccessRule::Allow => {
                set.grant_all(registry().all().iter().copied().filter(|c| !overridden.has(*c)))
            }
        }
        set
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = CapabilitySet::default();
        set.grant_all(iter);
        set
    }
}

/// Default rule of the older override-based grant format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DefaultAccessRule {
    Allow,
    #[default]
    Deny,
}

/// Capability grants as a list of names.
///
/// This is the form grant lists take on the wire and on disk; it stays
/// stable even if integer values are ever remapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CapabilityState {
    #[serde(default)]
    pub grants: Vec<String>,
}

impl CapabilityState {
    /// Parse every name into a packed set.
    ///
    /// A single unknown name rejects the whole list.
    pub fn capability_set(&self) -> CbacResult<CapabilitySet> {
        let mut set = CapabilitySet::default();
        for name in &self.grants {
            set.set(Capability::parse(name)?);
        }
        Ok(set)
    }
}
