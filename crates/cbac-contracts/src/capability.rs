//! The capability universe and its metadata registry.
//!
//! A `Capability` is a small integer naming one discrete API permission.
//! Values are append-only: new capabilities are added at the end of the
//! table and existing values are never renumbered, so packed grant buffers
//! persisted by older builds keep their meaning.
//!
//! Grants cross process boundaries as capability *names*, never as raw
//! integers. `Capability::name` and `Capability::parse` are the two halves of
//! that string form.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CbacError, CbacResult};
use crate::grants::CapabilitySet;

/// A single named permission.
///
/// The inner value is public so persisted integers can be carried around,
/// but only values below [`MAX_CAPABILITY`] are ever granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Capability(pub u16);

/// UI grouping for capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Search,
    Dashboards,
    Resources,
    Templates,
    Actionables,
    Macros,
    Libraries,
    Extractors,
    UserFiles,
    Kits,
    Scheduling,
    Automation,
    Playbooks,
    System,
    Users,
    Notifications,
    Tokens,
    Secrets,
    Alerts,
}

impl Category {
    /// Human-facing label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Search => "Search",
            Category::Dashboards => "Dashboards",
            Category::Resources => "Resources",
            Category::Templates => "Templates",
            Category::Actionables => "Actionables",
            Category::Macros => "Macros",
            Category::Libraries => "Libraries",
            Category::Extractors => "Extractors",
            Category::UserFiles => "User Files",
            Category::Kits => "Kits",
            Category::Scheduling => "Scheduled Searches",
            Category::Automation => "Automation",
            Category::Playbooks => "Playbooks",
            Category::System => "System",
            Category::Users => "Users and Groups",
            Category::Notifications => "Notifications",
            Category::Tokens => "Tokens",
            Category::Secrets => "Secrets",
            Category::Alerts => "Alerts",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

struct CapabilityMeta {
    name: &'static str,
    category: Category,
    read_only: bool,
    description: &'static str,
}

const fn meta(
    name: &'static str,
    category: Category,
    read_only: bool,
    description: &'static str,
) -> CapabilityMeta {
    CapabilityMeta { name, category, read_only, description }
}

// Index in this table is the capability value. Append only.
const TABLE: &[CapabilityMeta] = &[
    meta("Search", Category::Search, true, "Run searches over ingested data"),
    meta("Download", Category::Search, true, "Download search results"),
    meta("SaveSearch", Category::Search, false, "Save search results for later retrieval"),
    meta("AttachSearch", Category::Search, false, "Attach to searches launched by other users"),
    meta("BackgroundSearch", Category::Search, false, "Launch searches that run in the background"),
    meta("SetSearchGroup", Category::Search, false, "Share search results with a group"),
    meta("SearchHistory", Category::Search, true, "View own search history"),
    meta("SearchGroupHistory", Category::Search, false, "View search history of group members"),
    meta("SearchAllHistory", Category::Search, false, "View search history of every user"),
    meta("DashboardRead", Category::Dashboards, true, "View dashboards"),
    meta("DashboardWrite", Category::Dashboards, false, "Create, modify, and delete dashboards"),
    meta("ResourceRead", Category::Resources, true, "Read resources"),
    meta("ResourceWrite", Category::Resources, false, "Create, modify, and delete resources"),
    meta("TemplateRead", Category::Templates, true, "View query templates"),
    meta("TemplateWrite", Category::Templates, false, "Create, modify, and delete query templates"),
    meta("PivotRead", Category::Actionables, true, "View actionables"),
    meta("PivotWrite", Category::Actionables, false, "Create, modify, and delete actionables"),
    meta("MacroRead", Category::Macros, true, "View search macros"),
    meta("MacroWrite", Category::Macros, false, "Create, modify, and delete search macros"),
    meta("LibraryRead", Category::Libraries, true, "View script libraries"),
    meta("LibraryWrite", Category::Libraries, false, "Create, modify, and delete script libraries"),
    meta("ExtractorRead", Category::Extractors, true, "View autoextractor definitions"),
    meta("ExtractorWrite", Category::Extractors, false, "Create, modify, and delete autoextractors"),
    meta("UserFileRead", Category::UserFiles, true, "View user files"),
    meta("UserFileWrite", Category::UserFiles, false, "Upload, modify, and delete user files"),
    meta("KitRead", Category::Kits, true, "View installed and staged kits"),
    meta("KitWrite", Category::Kits, false, "Install, upgrade, and remove kits"),
    meta("KitBuild", Category::Kits, false, "Build new kits"),
    meta("KitDownload", Category::Kits, false, "Download kits from the kit server"),
    meta("ScheduleRead", Category::Scheduling, true, "View scheduled searches and scripts"),
    meta("ScheduleWrite", Category::Scheduling, false, "Create, modify, and delete scheduled searches and scripts"),
    meta("SOARLibs", Category::Automation, false, "Import external libraries in automation scripts"),
    meta("SOAREmail", Category::Automation, false, "Send email from automation scripts"),
    meta("PlaybookRead", Category::Playbooks, true, "View playbooks"),
    meta("PlaybookWrite", Category::Playbooks, false, "Create, modify, and delete playbooks"),
    meta("LicenseRead", Category::System, true, "View license information"),
    meta("Stats", Category::System, true, "View system statistics"),
    meta("Ingest", Category::System, false, "Ingest data through the API"),
    meta("ListUsers", Category::Users, true, "List users on the system"),
    meta("ListGroups", Category::Users, true, "List groups on the system"),
    meta("ListGroupMembers", Category::Users, true, "List the members of groups"),
    meta("NotificationRead", Category::Notifications, true, "View notifications"),
    meta("NotificationWrite", Category::Notifications, false, "Create, modify, and delete notifications"),
    meta("SystemInfoRead", Category::System, true, "View system and ingester information"),
    meta("TokenRead", Category::Tokens, true, "View API tokens"),
    meta("TokenWrite", Category::Tokens, false, "Create, modify, and delete API tokens"),
    meta("SecretRead", Category::Secrets, true, "View secret metadata"),
    meta("SecretWrite", Category::Secrets, false, "Create, modify, and delete secrets"),
    meta("AlertRead", Category::Alerts, true, "View alerts"),
    meta("AlertWrite", Category::Alerts, false, "Create, modify, and delete alerts"),
];

/// Exclusive upper bound on capability values in this build.
pub const MAX_CAPABILITY: u16 = TABLE.len() as u16;

impl Capability {
    pub const SEARCH: Capability = Capability(0);
    pub const DOWNLOAD: Capability = Capability(1);
    pub const SAVE_SEARCH: Capability = Capability(2);
    pub const ATTACH_SEARCH: Capability = Capability(3);
    pub const BACKGROUND_SEARCH: Capability = Capability(4);
    pub const SET_SEARCH_GROUP: Capability = Capability(5);
    pub const SEARCH_HISTORY: Capability = Capability(6);
    pub const SEARCH_GROUP_HISTORY: Capability = Capability(7);
    pub const SEARCH_ALL_HISTORY: Capability = Capability(8);
    pub const DASHBOARD_READ: Capability = Capability(9);
    pub const DASHBOARD_WRITE: Capability = Capability(10);
    pub const RESOURCE_READ: Capability = Capability(11);
    pub const RESOURCE_WRITE: Capability = Capability(12);
    pub const TEMPLATE_READ: Capability = Capability(13);
    pub const TEMPLATE_WRITE: Capability = Capability(14);
    pub const PIVOT_READ: Capability = Capability(15);
    pub const PIVOT_WRITE: Capability = Capability(16);
    pub const MACRO_READ: Capability = Capability(17);
    pub const MACRO_WRITE: Capability = Capability(18);
    pub const LIBRARY_READ: Capability = Capability(19);
    pub const LIBRARY_WRITE: Capability = Capability(20);
    pub const EXTRACTOR_READ: Capability = Capability(21);
    pub const EXTRACTOR_WRITE: Capability = Capability(22);
    pub const USER_FILE_READ: Capability = Capability(23);
    pub const USER_FILE_WRITE: Capability = Capability(24);
    pub const KIT_READ: Capability = Capability(25);
    pub const KIT_WRITE: Capability = Capability(26);
    pub const KIT_BUILD: Capability = Capability(27);
    pub const KIT_DOWNLOAD: Capability = Capability(28);
    pub const SCHEDULE_READ: Capability = Capability(29);
    pub const SCHEDULE_WRITE: Capability = Capability(30);
    pub const SOAR_LIBS: Capability = Capability(31);
    pub const SOAR_EMAIL: Capability = Capability(32);
    pub const PLAYBOOK_READ: Capability = Capability(33);
    pub const PLAYBOOK_WRITE: Capability = Capability(34);
    pub const LICENSE_READ: Capability = Capability(35);
    pub const STATS: Capability = Capability(36);
    pub const INGEST: Capability = Capability(37);
    pub const LIST_USERS: Capability = Capability(38);
    pub const LIST_GROUPS: Capability = Capability(39);
    pub const LIST_GROUP_MEMBERS: Capability = Capability(40);
    pub const NOTIFICATION_READ: Capability = Capability(41);
    pub const NOTIFICATION_WRITE: Capability = Capability(42);
    pub const SYSTEM_INFO_READ: Capability = Capability(43);
    pub const TOKEN_READ: Capability = Capability(44);
    pub const TOKEN_WRITE: Capability = Capability(45);
    pub const SECRET_READ: Capability = Capability(46);
    pub const SECRET_WRITE: Capability = Capability(47);
    pub const ALERT_READ: Capability = Capability(48);
    pub const ALERT_WRITE: Capability = Capability(49);

    /// True if this value names a capability known to this build.
    pub fn valid(&self) -> bool {
        self.0 < MAX_CAPABILITY
    }

    fn meta(&self) -> Option<&'static CapabilityMeta> {
        TABLE.get(usize::from(self.0))
    }

    /// Stable machine-readable identifier, `"Unknown"` for invalid values.
    pub fn name(&self) -> &'static str {
        self.meta().map_or("Unknown", |m| m.name)
    }

    /// One-line human description.
    pub fn description(&self) -> &'static str {
        self.meta().map_or("Unknown capability", |m| m.description)
    }

    /// UI grouping, `None` for invalid values.
    pub fn category(&self) -> Option<Category> {
        self.meta().map(|m| m.category)
    }

    /// Whether this capability only ever reads state.
    pub fn is_read_only(&self) -> bool {
        self.meta().is_some_and(|m| m.read_only)
    }

    /// Reverse lookup of [`Capability::name`].
    ///
    /// Surrounding whitespace is ignored and the comparison is
    /// case-insensitive.
    pub fn parse(name: &str) -> CbacResult<Capability> {
        registry().lookup(name).ok_or_else(|| CbacError::UnknownCapability {
            name: name.trim().to_string(),
        })
    }

    /// Display descriptor for this capability.
    pub fn desc(&self) -> CapabilityDesc {
        CapabilityDesc {
            cap: *self,
            name: self.name().to_string(),
            description: self.description().to_string(),
            category: self.category().map(|c| c.as_str().to_string()).unwrap_or_default(),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.meta() {
            Some(m) => f.pad(m.name),
            None => f.pad(&format!("Capability({})", self.0)),
        }
    }
}

impl FromStr for Capability {
    type Err = CbacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::parse(s)
    }
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.meta() {
            Some(m) => serializer.serialize_str(m.name),
            None => Err(serde::ser::Error::custom(format!(
                "cannot serialize invalid capability {}",
                self.0
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Capability::parse(&name).map_err(de::Error::custom)
    }
}

/// Everything a UI needs to render one capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CapabilityDesc {
    pub cap: Capability,
    pub name: String,
    pub description: String,
    pub category: String,
}

/// A named, pre-built set of capabilities used to seed new users and groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CapabilityTemplate {
    pub name: String,
    pub description: String,
    pub caps: Vec<Capability>,
}

impl CapabilityTemplate {
    /// Build a grant bitmap holding every capability in the template.
    pub fn capability_set(&self) -> CapabilitySet {
        let mut set = CapabilitySet::default();
        set.grant_all(self.caps.iter().copied());
        set
    }
}

/// Name of the template holding every read-type capability.
pub const READ_ONLY_TEMPLATE: &str = "read-only";

/// Name of the template holding every capability.
pub const FULL_ACCESS_TEMPLATE: &str = "full-access";

/// Immutable lookup tables over the capability universe.
///
/// Built once on first use and shared for the life of the process.
#[derive(Debug)]
pub struct CapabilityRegistry {
    all: Vec<Capability>,
    descriptors: Vec<CapabilityDesc>,
    by_name: HashMap<String, Capability>,
    templates: Vec<CapabilityTemplate>,
}

static REGISTRY: Lazy<CapabilityRegistry> = Lazy::new(CapabilityRegistry::build);

/// The process-wide capability registry.
pub fn registry() -> &'static CapabilityRegistry {
    &REGISTRY
}

impl CapabilityRegistry {
    fn build() -> Self {
        let all: Vec<Capability> = (0..MAX_CAPABILITY).map(Capability).collect();
        let descriptors = all.iter().map(Capability::desc).collect();
        let by_name = all
            .iter()
            .map(|c| (c.name().to_ascii_lowercase(), *c))
            .collect();

        let templates = vec![
            CapabilityTemplate {
                name: READ_ONLY_TEMPLATE.to_string(),
                description: "View-only access: search and read every resource type".to_string(),
                caps: all.iter().copied().filter(Capability::is_read_only).collect(),
            },
            CapabilityTemplate {
                name: FULL_ACCESS_TEMPLATE.to_string(),
                description: "Every capability".to_string(),
                caps: all.clone(),
            },
        ];

        Self { all, descriptors, by_name, templates }
    }

    /// Every capability, in declaration order.
    pub fn all(&self) -> &[Capability] {
        &self.all
    }

    /// Descriptors for every capability, in declaration order.
    pub fn descriptors(&self) -> &[CapabilityDesc] {
        &self.descriptors
    }

    /// Case-insensitive, whitespace-trimmed name lookup.
    pub fn lookup(&self, name: &str) -> Option<Capability> {
        self.by_name.get(&name.trim().to_ascii_lowercase()).copied()
    }

    pub fn templates(&self) -> &[CapabilityTemplate] {
        &self.templates
    }

    /// Find a template by name, ignoring case.
    pub fn template(&self, name: &str) -> Option<&CapabilityTemplate> {
        let name = name.trim();
        self.templates.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn read_only_template(&self) -> &CapabilityTemplate {
        &self.templates[0]
    }

    pub fn full_access_template(&self) -> &CapabilityTemplate {
        &self.templates[1]
    }
}
