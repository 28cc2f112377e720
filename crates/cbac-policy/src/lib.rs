//! # cbac-policy
//!
//! Capability and tag decisions for a user and the groups it belongs to.
//!
//! ## Overview
//!
//! [`resolve`] combines a user's own grants with every group's grants:
//! admins hold everything, a personal grant is always honored, and
//! otherwise any single group granting a capability or tag is enough.
//! Bulk forms ([`capability_list`], [`filter_tags`]) apply the same rule per
//! item and keep declaration or input order.
//!
//! [`RuleSetEngine`] loads users and groups from a TOML document and serves
//! them through the [`PrincipalStore`] trait.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use cbac_contracts::Capability;
//! use cbac_policy::{AccessCheck, PrincipalStore, RuleSetEngine};
//!
//! let engine = RuleSetEngine::from_file(Path::new("policies/example.toml"))?;
//! let user = engine.load_user("alice")?;
//! if user.has_capability(Capability::DOWNLOAD) { /* ... */ }
//! let visible = user.filter_tags(&["syslog", "winlog", "netflow"]);
//! ```

pub mod conflict;
pub mod engine;
pub mod resolve;
pub mod rule;
pub mod store;

pub use conflict::{capability_conflicts, check_tag_conflict, compare_rules, RuleConflicts};
pub use engine::RuleSetEngine;
pub use resolve::{
    capability_list, check_tag_access, explain_capability, filter_tags, filter_user_tags,
    has_capability, has_tag_access, AccessCheck, CapabilityGrant,
};
pub use rule::{build_rules, GroupConfig, RuleSetConfig, UserConfig};
pub use store::PrincipalStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
