//! Rule-set document schema.
//!
//! A `RuleSetConfig` is deserialized from TOML and describes groups and
//! users with their grants. Capabilities are listed by name and parsed with
//! `Capability::parse`; tags are literal names or globs.
//!
//! Example:
//! ```toml
//! [[groups]]
//! id = 10
//! name = "analysts"
//! template = "read-only"
//! capabilities = ["Download"]
//! tags = ["syslog", "netflow*"]
//!
//! [[users]]
//! id = 1
//! username = "alice"
//! groups = ["analysts"]
//! capabilities = ["SaveSearch"]
//! tags = ["winlog"]
//! ```

use serde::{Deserialize, Serialize};

use cbac_contracts::{
    registry, CapabilitySet, CapabilityState, CbacError, CbacResult, Rules, TagAccess,
};

/// One group entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Capability template to start from, e.g. `"read-only"`.
    pub template: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One user entry. `groups` lists group names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub id: i32,
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub groups: Vec<String>,
    pub template: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The top-level structure deserialized from a TOML rule-set file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSetConfig {
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

/// Build validated `Rules` from a template name, capability names, and tags.
///
/// Fails on an unknown template, any unknown capability name, or any tag
/// grant that does not validate.
pub fn build_rules(
    template: Option<&str>,
    capabilities: &[String],
    tags: &[String],
) -> CbacResult<Rules> {
    let mut caps = match template {
        Some(name) => registry()
            .template(name)
            .map(|t| t.capability_set())
            .ok_or_else(|| CbacError::Config {
                reason: format!("unknown capability template '{}'", name),
            })?,
        None => CapabilitySet::default(),
    };

    let state = CapabilityState { grants: capabilities.to_vec() };
    caps.union(&state.capability_set()?);

    let mut tags = TagAccess::new(tags.iter().cloned());
    tags.validate()?;

    Ok(Rules { capabilities: caps, tags })
}

impl GroupConfig {
    pub fn rules(&self) -> CbacResult<Rules> {
        build_rules(self.template.as_deref(), &self.capabilities, &self.tags)
    }
}

impl UserConfig {
    pub fn rules(&self) -> CbacResult<Rules> {
        build_rules(self.template.as_deref(), &self.capabilities, &self.tags)
    }
}
