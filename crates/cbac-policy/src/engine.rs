//! In-memory principal store loaded from a TOML rule set.
//!
//! `RuleSetEngine` reads a `RuleSetConfig`, builds and validates every
//! group's and user's rules, resolves group memberships, and then serves
//! immutable `UserDetails` snapshots through `PrincipalStore`.
//!
//! ```rust,ignore
//! use cbac_policy::{AccessCheck, PrincipalStore, RuleSetEngine};
//!
//! let engine = RuleSetEngine::from_file(Path::new("policies/example.toml"))?;
//! let alice = engine.load_user("alice")?;
//! assert!(alice.has_capability(Capability::SEARCH));
//! ```

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use cbac_contracts::{CbacError, CbacResult, GroupDetails, UserDetails};

use crate::rule::RuleSetConfig;
use crate::store::PrincipalStore;

/// A validated rule set held in memory.
#[derive(Debug, Clone, Default)]
pub struct RuleSetEngine {
    groups: Vec<GroupDetails>,
    users: Vec<UserDetails>,
}

impl RuleSetEngine {
    /// Parse `s` as TOML and build a `RuleSetEngine`.
    ///
    /// Returns `CbacError::Config` if the TOML is malformed or does not match
    /// the `RuleSetConfig` schema; grant errors propagate as-is.
    pub fn from_toml_str(s: &str) -> CbacResult<Self> {
        let config: RuleSetConfig = toml::from_str(s).map_err(|e| CbacError::Config {
            reason: format!("failed to parse rule set TOML: {}", e),
        })?;
        Self::from_config(&config)
    }

    /// Read the file at `path` and parse it as a TOML rule set.
    pub fn from_file(path: &Path) -> CbacResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CbacError::Config {
            reason: format!("failed to read rule set file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Build every group and user from an already parsed document.
    ///
    /// Group names and ids, and usernames, must be unique. Every group a user
    /// lists must exist and may only be listed once.
    pub fn from_config(config: &RuleSetConfig) -> CbacResult<Self> {
        let mut names = HashSet::new();
        let mut ids = HashSet::new();
        let mut groups = Vec::with_capacity(config.groups.len());
        for g in &config.groups {
            if !names.insert(g.name.as_str()) {
                return Err(config_error(format!("duplicate group name '{}'", g.name)));
            }
            if !ids.insert(g.id) {
                return Err(config_error(format!("duplicate group id {}", g.id)));
            }
            let rules = g.rules().inspect_err(|e| {
                warn!(group = %g.name, error = %e, "invalid group rules");
            })?;
            groups.push(GroupDetails {
                id: g.id,
                name: g.name.clone(),
                description: g.description.clone(),
                rules,
            });
        }

        let mut usernames = HashSet::new();
        let mut users = Vec::with_capacity(config.users.len());
        for u in &config.users {
            if !usernames.insert(u.username.as_str()) {
                return Err(config_error(format!("duplicate username '{}'", u.username)));
            }

            let mut membership: Vec<GroupDetails> = Vec::with_capacity(u.groups.len());
            for name in &u.groups {
                if membership.iter().any(|g| &g.name == name) {
                    return Err(config_error(format!(
                        "user '{}' lists group '{}' more than once",
                        u.username, name
                    )));
                }
                let group = groups.iter().find(|g| &g.name == name).ok_or_else(|| {
                    config_error(format!(
                        "user '{}' is a member of unknown group '{}'",
                        u.username, name
                    ))
                })?;
                membership.push(group.clone());
            }

            let rules = u.rules().inspect_err(|e| {
                warn!(user = %u.username, error = %e, "invalid user rules");
            })?;
            users.push(UserDetails {
                id: u.id,
                username: u.username.clone(),
                name: u.name.clone(),
                admin: u.admin,
                groups: membership,
                rules,
            });
        }

        debug!(groups = groups.len(), users = users.len(), "loaded rule set");
        Ok(Self { groups, users })
    }

    pub fn users(&self) -> &[UserDetails] {
        &self.users
    }

    pub fn groups(&self) -> &[GroupDetails] {
        &self.groups
    }

    pub fn user(&self, username: &str) -> Option<&UserDetails> {
        self.users.iter().find(|u| u.username == username)
    }

    pub fn group(&self, name: &str) -> Option<&GroupDetails> {
        self.groups.iter().find(|g| g.name == name)
    }
}

fn config_error(reason: String) -> CbacError {
    CbacError::Config { reason }
}

impl PrincipalStore for RuleSetEngine {
    fn load_user(&self, username: &str) -> CbacResult<UserDetails> {
        self.user(username)
            .cloned()
            .ok_or_else(|| CbacError::UnknownPrincipal { name: username.to_string() })
    }

    fn load_group(&self, name: &str) -> CbacResult<GroupDetails> {
        self.group(name)
            .cloned()
            .ok_or_else(|| CbacError::UnknownPrincipal { name: name.to_string() })
    }
}
