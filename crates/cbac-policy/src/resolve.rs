//! Resolution of a principal's own grants together with its groups' grants.
//!
//! Policy:
//!
//! 1. An admin principal holds every capability and every tag.
//! 2. A grant on the principal itself is honored regardless of its groups.
//! 3. Otherwise the principal holds a capability or tag if *any* group it
//!    belongs to grants it.
//!
//! Grants only ever add. There is no explicit deny, so the result is the
//! union of the principal's grants and every group's grants.

use tracing::{debug, trace};

use cbac_contracts::{
    registry, Capability, CapabilityDesc, TagAccess, TagMatcher, UserDetails,
};

/// Where a capability decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityGrant<'a> {
    /// The principal is an administrator.
    Admin,
    /// Granted directly on the principal.
    User,
    /// Granted by the named group (the first in membership order).
    Group(&'a str),
    /// Nothing grants it.
    Denied,
}

impl CapabilityGrant<'_> {
    pub fn is_granted(&self) -> bool {
        !matches!(self, CapabilityGrant::Denied)
    }
}

/// Resolve `cap` for `user` and report which rule decided it.
pub fn explain_capability(user: &UserDetails, cap: Capability) -> CapabilityGrant<'_> {
    if user.admin {
        return CapabilityGrant::Admin;
    }
    if user.rules.capabilities.has(cap) {
        return CapabilityGrant::User;
    }
    user.groups
        .iter()
        .find(|g| g.rules.capabilities.has(cap))
        .map_or(CapabilityGrant::Denied, |g| CapabilityGrant::Group(&g.name))
}

/// Return true if `user` holds `cap` directly, through a group, or as admin.
pub fn has_capability(user: &UserDetails, cap: Capability) -> bool {
    let grant = explain_capability(user, cap);
    debug!(
        user = %user.username,
        capability = %cap,
        source = ?grant,
        "capability resolved"
    );
    grant.is_granted()
}

/// Return true if `tag` is granted by `prime` or by any of `groups`.
///
/// No admin bypass here; see [`has_tag_access`].
pub fn check_tag_access(tag: &str, prime: &TagAccess, groups: &[TagAccess]) -> bool {
    prime.check(tag) || groups.iter().any(|g| g.check(tag))
}

/// Return true if `user` may see `tag`.
pub fn has_tag_access(user: &UserDetails, tag: &str) -> bool {
    let granted = user.admin
        || user.rules.tags.check(tag)
        || user.groups.iter().any(|g| g.rules.tags.check(tag));
    trace!(user = %user.username, tag, granted, "tag access resolved");
    granted
}

/// Descriptors of every capability `user` holds, in declaration order.
///
/// Agrees with calling [`has_capability`] on every registered capability.
pub fn capability_list(user: &UserDetails) -> Vec<CapabilityDesc> {
    registry()
        .descriptors()
        .iter()
        .filter(|d| explain_capability(user, d.cap).is_granted())
        .cloned()
        .collect()
}

/// Keep the candidates granted by `prime` or any of `groups`.
///
/// Input order is preserved. An empty input, or no matches, yields an
/// empty, unallocated vector.
pub fn filter_tags<S: AsRef<str>>(
    candidates: &[S],
    prime: &TagAccess,
    groups: &[TagAccess],
) -> Vec<String> {
    if candidates.is_empty() {
        return Vec::new();
    }
    let matchers: Vec<TagMatcher> = std::iter::once(prime)
        .chain(groups.iter())
        .map(TagAccess::matcher)
        .collect();
    filter_with(candidates, &matchers)
}

/// Keep the candidates `user` may see. Admins see every candidate.
pub fn filter_user_tags<S: AsRef<str>>(user: &UserDetails, candidates: &[S]) -> Vec<String> {
    if candidates.is_empty() {
        return Vec::new();
    }
    if user.admin {
        return candidates.iter().map(|t| t.as_ref().to_string()).collect();
    }
    let matchers: Vec<TagMatcher> = std::iter::once(&user.rules.tags)
        .chain(user.groups.iter().map(|g| &g.rules.tags))
        .map(TagAccess::matcher)
        .collect();
    let visible = filter_with(candidates, &matchers);
    debug!(
        user = %user.username,
        candidates = candidates.len(),
        visible = visible.len(),
        "filtered tags"
    );
    visible
}

fn filter_with<S: AsRef<str>>(candidates: &[S], matchers: &[TagMatcher]) -> Vec<String> {
    candidates
        .iter()
        .map(|t| t.as_ref())
        .filter(|tag| matchers.iter().any(|m| m.matches(tag)))
        .map(str::to_string)
        .collect()
}

/// Method-call form of the resolution functions.
pub trait AccessCheck {
    fn has_capability(&self, cap: Capability) -> bool;
    fn has_tag_access(&self, tag: &str) -> bool;
    fn capability_list(&self) -> Vec<CapabilityDesc>;
    fn filter_tags<S: AsRef<str>>(&self, candidates: &[S]) -> Vec<String>;
}

impl AccessCheck for UserDetails {
    fn has_capability(&self, cap: Capability) -> bool {
        has_capability(self, cap)
    }

    fn has_tag_access(&self, tag: &str) -> bool {
        has_tag_access(self, tag)
    }

    fn capability_list(&self) -> Vec<CapabilityDesc> {
        capability_list(self)
    }

    fn filter_tags<S: AsRef<str>>(&self, candidates: &[S]) -> Vec<String> {
        filter_user_tags(self, candidates)
    }
}
