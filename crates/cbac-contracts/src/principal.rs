//! Users, groups, and the rules attached to each.
//!
//! These are snapshots supplied by a user/session store. The store is
//! responsible for populating `UserDetails::groups` with the complete,
//! current membership list before any decision is made.

use crate::grants::CapabilitySet;
use crate::tags::TagAccess;

/// Capability and tag grants held by one user or group.
///
/// Internal authorization state; it has no wire representation of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rules {
    pub capabilities: CapabilitySet,
    pub tags: TagAccess,
}

/// A group and its rules. Groups do not nest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupDetails {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub rules: Rules,
}

/// A principal, the groups it belongs to, and its own rules.
///
/// `admin` overrides every capability and tag check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDetails {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub admin: bool,
    pub groups: Vec<GroupDetails>,
    pub rules: Rules,
}

impl UserDetails {
    pub fn in_group(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g.name == name)
    }
}
