//! # cbac-contracts
//!
//! Data types for capability-based access control.
//!
//! - [`capability`]: the fixed capability universe, its metadata, and the
//!   shared registry with the default templates
//! - [`grants`]: the packed capability bitmap and its string form
//! - [`tags`]: literal and glob tag grants
//! - [`principal`]: users, groups, and the rules attached to each
//!
//! Resolution across a user and its groups lives in `cbac-policy`.

pub mod capability;
pub mod error;
pub mod grants;
pub mod principal;
pub mod tags;

pub use capability::{
    registry, Capability, CapabilityDesc, CapabilityRegistry, CapabilityTemplate, Category,
    MAX_CAPABILITY,
};
pub use error::{CbacError, CbacResult};
pub use grants::{bitmask, CapabilitySet, CapabilityState, DefaultAccessRule};
pub use principal::{GroupDetails, Rules, UserDetails};
pub use tags::{TagAccess, TagMatcher};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{FULL_ACCESS_TEMPLATE, READ_ONLY_TEMPLATE};
    use crate::tags::{check_tag_name, is_glob, MAX_TAG_GRANTS, MAX_TAG_LENGTH};

    // ── Capability metadata ──────────────────────────────────────────────────

    #[test]
    fn every_capability_round_trips_through_its_name() {
        for c in registry().all() {
            assert!(c.valid());
            assert_eq!(Capability::parse(c.name()).unwrap(), *c);
        }
    }

    #[test]
    fn parse_ignores_case_and_surrounding_whitespace() {
        assert_eq!(Capability::parse("  dashboardwrite\t").unwrap(), Capability::DASHBOARD_WRITE);
        assert_eq!(Capability::parse("SOARLIBS").unwrap(), Capability::SOAR_LIBS);
        assert_eq!("TokenRead".parse::<Capability>().unwrap(), Capability::TOKEN_READ);
    }

    #[test]
    fn parse_rejects_unknown_names() {
        match Capability::parse("LaunchMissiles") {
            Err(CbacError::UnknownCapability { name }) => assert_eq!(name, "LaunchMissiles"),
            other => panic!("expected UnknownCapability, got {:?}", other),
        }
        assert!(Capability::parse("").is_err());
    }

    #[test]
    fn registry_is_in_declaration_order() {
        let all = registry().all();
        assert_eq!(all.len(), usize::from(MAX_CAPABILITY));
        for (i, c) in all.iter().enumerate() {
            assert_eq!(usize::from(c.0), i);
            assert_eq!(registry().descriptors()[i].name, c.name());
        }
        assert_eq!(all[0], Capability::SEARCH);
        assert_eq!(all[all.len() - 1], Capability::ALERT_WRITE);
    }

    #[test]
    fn capability_names_are_unique_ignoring_case() {
        let names: std::collections::HashSet<String> =
            registry().all().iter().map(|c| c.name().to_ascii_lowercase()).collect();
        assert_eq!(names.len(), registry().all().len());
    }

    #[test]
    fn invalid_capability_metadata() {
        let bogus = Capability(MAX_CAPABILITY);
        assert!(!bogus.valid());
        assert_eq!(bogus.name(), "Unknown");
        assert_eq!(bogus.category(), None);
        assert_eq!(bogus.to_string(), format!("Capability({})", MAX_CAPABILITY));
        assert_eq!(Capability::MACRO_READ.to_string(), "MacroRead");
        assert_eq!(Capability::MACRO_READ.category(), Some(Category::Macros));
    }

    #[test]
    fn templates_cover_read_types_and_everything() {
        let ro = registry().read_only_template();
        assert_eq!(ro.name, READ_ONLY_TEMPLATE);
        assert!(ro.caps.contains(&Capability::SEARCH));
        assert!(ro.caps.contains(&Capability::DASHBOARD_READ));
        assert!(ro.caps.contains(&Capability::SECRET_READ));
        assert!(!ro.caps.contains(&Capability::DASHBOARD_WRITE));
        assert!(!ro.caps.contains(&Capability::INGEST));
        for c in registry().all() {
            if c.name().ends_with("Read") {
                assert!(ro.caps.contains(c), "{} should be read-only", c);
            }
        }

        let full = registry().full_access_template();
        assert_eq!(full.name, FULL_ACCESS_TEMPLATE);
        assert_eq!(full.caps, registry().all());

        assert_eq!(registry().template("READ-ONLY"), Some(ro));
        assert!(registry().template("superuser").is_none());
    }

    #[test]
    fn template_builds_a_matching_set() {
        let set = registry().read_only_template().capability_set();
        for c in registry().all() {
            assert_eq!(set.has(*c), c.is_read_only());
        }
    }

    // ── CapabilitySet ────────────────────────────────────────────────────────

    #[test]
    fn empty_set_denies_everything() {
        let set = CapabilitySet::default();
        assert!(set.is_empty());
        for c in registry().all() {
            assert!(!set.has(*c));
        }
        assert!(set.capability_list().is_empty());
    }

    #[test]
    fn set_places_bits_exactly() {
        let mut set = CapabilitySet::default();
        assert!(set.set(Capability(17)));
        assert_eq!(set.as_bytes(), &[0u8, 0, 0b0000_0010]);
        assert_eq!(bitmask(Capability(17)), (2, 0b10));
        assert_eq!(bitmask(Capability(0)), (0, 0b1));
        assert_eq!(bitmask(Capability(15)), (1, 0b1000_0000));
    }

    #[test]
    fn set_and_clear_are_idempotent() {
        let mut set = CapabilitySet::default();
        assert!(set.set(Capability::DOWNLOAD));
        let once = set.clone();
        assert!(set.set(Capability::DOWNLOAD));
        assert_eq!(set, once);

        assert!(set.clear(Capability::SEARCH));
        assert_eq!(set, once);

        assert!(set.clear(Capability::DOWNLOAD));
        assert!(!set.has(Capability::DOWNLOAD));
        assert!(set.clear(Capability::DOWNLOAD));
    }

    #[test]
    fn clear_never_shrinks_the_buffer() {
        let mut set = CapabilitySet::default();
        set.set(Capability::ALERT_WRITE);
        set.set(Capability::SEARCH);
        let len = set.as_bytes().len();
        set.clear(Capability::ALERT_WRITE);
        assert_eq!(set.as_bytes().len(), len);
        assert!(set.has(Capability::SEARCH));

        // Clearing beyond the buffer does not grow it either.
        let mut small = CapabilitySet::default();
        assert!(small.clear(Capability::ALERT_WRITE));
        assert!(small.as_bytes().is_empty());
    }

    #[test]
    fn growing_keeps_earlier_bits() {
        let mut set = CapabilitySet::default();
        set.set(Capability::SEARCH);
        set.set(Capability::KIT_BUILD);
        set.set(Capability::ALERT_READ);
        assert!(set.has(Capability::SEARCH));
        assert!(set.has(Capability::KIT_BUILD));
        assert!(set.has(Capability::ALERT_READ));
        assert_eq!(set.as_bytes().len(), usize::from(Capability::ALERT_READ.0) / 8 + 1);
    }

    #[test]
    fn invalid_capabilities_are_rejected_without_mutation() {
        let mut set = CapabilitySet::default();
        set.set(Capability::SEARCH);
        let before = set.clone();

        assert!(!set.set(Capability(MAX_CAPABILITY)));
        assert!(!set.set(Capability(u16::MAX)));
        assert!(!set.clear(Capability(MAX_CAPABILITY + 3)));
        assert_eq!(set, before);

        // Bits beyond the known universe in a raw buffer are never granted.
        let raw = CapabilitySet::from_bytes(vec![0xff; 16]);
        assert!(!raw.has(Capability(MAX_CAPABILITY)));
        assert!(raw.has(Capability::ALERT_WRITE));
    }

    #[test]
    fn capability_list_is_in_declaration_order() {
        let mut set = CapabilitySet::default();
        set.set(Capability::TOKEN_WRITE);
        set.set(Capability::SEARCH);
        set.set(Capability::KIT_READ);

        let names: Vec<String> = set.capability_list().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Search", "KitRead", "TokenWrite"]);
    }

    #[test]
    fn union_adds_grants() {
        let mut a: CapabilitySet = [Capability::SEARCH].into_iter().collect();
        let b: CapabilitySet = [Capability::DOWNLOAD, Capability::STATS].into_iter().collect();
        a.union(&b);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![Capability::SEARCH, Capability::DOWNLOAD, Capability::STATS]);
    }

    // ── CapabilityState ──────────────────────────────────────────────────────

    #[test]
    fn capability_state_round_trips() {
        let state = CapabilityState {
            grants: vec!["SecretWrite".into(), " search ".into(), "macroread".into()],
        };
        let set = state.capability_set().unwrap();
        assert!(set.has(Capability::SECRET_WRITE));
        assert!(set.has(Capability::SEARCH));
        assert!(set.has(Capability::MACRO_READ));

        let back = set.capability_state();
        let mut names = back.grants.clone();
        names.sort();
        assert_eq!(names, vec!["MacroRead", "Search", "SecretWrite"]);
        assert_eq!(back.capability_set().unwrap(), set);
    }

    #[test]
    fn capability_state_rejects_whole_list_on_unknown_name() {
        let state = CapabilityState {
            grants: vec!["Search".into(), "Teleport".into()],
        };
        match state.capability_set() {
            Err(CbacError::UnknownCapability { name }) => assert_eq!(name, "Teleport"),
            other => panic!("expected UnknownCapability, got {:?}", other),
        }
    }

    #[test]
    fn capability_state_json_uses_names() {
        let set: CapabilitySet = [Capability::SEARCH, Capability::DOWNLOAD].into_iter().collect();
        let json = serde_json::to_string(&set.capability_state()).unwrap();
        assert_eq!(json, r#"{"Grants":["Search","Download"]}"#);

        let decoded: CapabilityState = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.capability_set().unwrap(), set);
    }

    #[test]
    fn capability_serializes_as_its_name() {
        assert_eq!(serde_json::to_string(&Capability::KIT_BUILD).unwrap(), r#""KitBuild""#);
        let c: Capability = serde_json::from_str(r#""kitbuild""#).unwrap();
        assert_eq!(c, Capability::KIT_BUILD);
        assert!(serde_json::from_str::<Capability>(r#""Nope""#).is_err());
        assert!(serde_json::to_string(&Capability(MAX_CAPABILITY)).is_err());
    }

    // ── Legacy override conversion ───────────────────────────────────────────

    #[test]
    fn legacy_default_deny_overrides_become_grants() {
        let overrides: CapabilitySet = [Capability::SEARCH, Capability::STATS].into_iter().collect();
        let set = CapabilitySet::from_legacy(DefaultAccessRule::Deny, overrides.as_bytes());
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Capability::SEARCH, Capability::STATS]);
    }

    #[test]
    fn legacy_default_allow_overrides_become_denials() {
        let overrides: CapabilitySet = [Capability::INGEST].into_iter().collect();
        let set = CapabilitySet::from_legacy(DefaultAccessRule::Allow, overrides.as_bytes());
        assert!(!set.has(Capability::INGEST));
        assert_eq!(set.iter().count(), registry().all().len() - 1);

        let everything = CapabilitySet::from_legacy(DefaultAccessRule::Allow, &[]);
        assert_eq!(everything.iter().count(), registry().all().len());
    }

    // ── TagAccess ────────────────────────────────────────────────────────────

    #[test]
    fn empty_tag_access_denies_everything() {
        let ta = TagAccess::default();
        assert!(!ta.check("syslog"));
        assert!(!ta.check(""));
        assert!(!ta.matcher().matches("syslog"));
    }

    #[test]
    fn glob_grants_match_by_shell_rules() {
        let ta = TagAccess::new(["foo*"]);
        assert!(ta.check("foobar"));
        assert!(ta.check("foo"));
        assert!(!ta.check("barfoo"));
        assert!(!ta.check("FOOBAR"));

        let ta = TagAccess::new(["win?og", "net[a-f]low", "{zeek,suricata}-*"]);
        assert!(ta.check("winlog"));
        assert!(!ta.check("winnlog"));
        assert!(ta.check("netflow"));
        assert!(!ta.check("netxlow"));
        assert!(ta.check("zeek-conn"));
        assert!(ta.check("suricata-alert"));
        assert!(!ta.check("snort-alert"));
    }

    #[test]
    fn literal_grants_match_exactly() {
        let ta = TagAccess::new(["foo"]);
        assert!(ta.check("foo"));
        assert!(!ta.check("foobar"));
        assert!(!ta.check("Foo"));
    }

    #[test]
    fn malformed_glob_never_matches() {
        let ta = TagAccess::new(["foo[a-f"]);
        assert!(!ta.check("fooa"));
        assert!(ta.check("foo[a-f"));
        assert!(!ta.matcher().matches("fooa"));
    }

    #[test]
    fn matcher_agrees_with_check() {
        let ta = TagAccess::new(["syslog", "net*", "win[!x]og", "bad[", "k8s-?"]);
        let m = ta.matcher();
        for tag in ["syslog", "netflow", "net", "winlog", "winxog", "bad[", "k8s-a", "k8s-ab", "other"] {
            assert_eq!(m.matches(tag), ta.check(tag), "disagreement on {tag}");
        }
    }

    #[test]
    fn glob_detection() {
        for g in ["a*", "a?", "[ab]", "{a,b}", "a!"] {
            assert!(is_glob(g), "{g}");
        }
        assert!(!is_glob("plain-tag_01"));
    }

    #[test]
    fn validate_deduplicates_preserving_order() {
        let mut ta = TagAccess::new(["foo", "foo", "bar", "foo", "b*"]);
        ta.validate().unwrap();
        assert_eq!(ta.grants, vec!["foo", "bar", "b*"]);
    }

    #[test]
    fn validate_rejects_unterminated_class() {
        let mut ta = TagAccess::new(["foo[a-f"]);
        match ta.validate() {
            Err(CbacError::InvalidGlob { pattern, .. }) => assert_eq!(pattern, "foo[a-f"),
            other => panic!("expected InvalidGlob, got {:?}", other),
        }
    }

    #[test]
    fn validate_failure_leaves_grants_untouched() {
        let mut ta = TagAccess::new(["a", "a", "bad.tag", "b"]);
        let before = ta.clone();
        assert!(matches!(
            ta.validate(),
            Err(CbacError::ForbiddenTagChar { ch: '.', .. })
        ));
        assert_eq!(ta, before);
    }

    #[test]
    fn validate_reports_first_bad_grant() {
        let mut ta = TagAccess::new(["ok", "", "x:y"]);
        assert_eq!(ta.validate(), Err(CbacError::EmptyTag));
    }

    #[test]
    fn validate_limits_grant_count() {
        let mut ta = TagAccess::new((0..=MAX_TAG_GRANTS).map(|i| format!("t{i}")));
        match ta.validate() {
            Err(CbacError::TooManyTagGrants { count, max }) => {
                assert_eq!(count, MAX_TAG_GRANTS + 1);
                assert_eq!(max, MAX_TAG_GRANTS);
            }
            other => panic!("expected TooManyTagGrants, got {:?}", other),
        }

        // Duplicates do not count against the limit.
        let mut ta = TagAccess::new((0..MAX_TAG_GRANTS).map(|i| format!("t{i}")));
        ta.grants.push("t0".to_string());
        ta.validate().unwrap();
        assert_eq!(ta.grants.len(), MAX_TAG_GRANTS);
    }

    #[test]
    fn tag_naming_rules() {
        assert!(check_tag_name("syslog").is_ok());
        assert!(check_tag_name("k8s-audit_v2").is_ok());
        assert_eq!(check_tag_name(""), Err(CbacError::EmptyTag));
        for bad in ["a@b", "a b|c", "quote\"", "semi;", "back`tick", "brace{"] {
            assert!(check_tag_name(bad).is_err(), "{bad} should be rejected");
        }

        let long = "a".repeat(MAX_TAG_LENGTH + 1);
        assert!(matches!(
            check_tag_name(&long),
            Err(CbacError::TagTooLong { len, .. }) if len == MAX_TAG_LENGTH + 1
        ));
        assert!(check_tag_name(&"a".repeat(MAX_TAG_LENGTH)).is_ok());
    }

    // ── Principals ───────────────────────────────────────────────────────────

    #[test]
    fn group_membership_lookup() {
        let user = UserDetails {
            username: "alice".into(),
            groups: vec![GroupDetails { name: "analysts".into(), ..Default::default() }],
            ..Default::default()
        };
        assert!(user.in_group("analysts"));
        assert!(!user.in_group("admins"));
    }

    // ── CbacError display messages ───────────────────────────────────────────

    #[test]
    fn error_messages_carry_context() {
        let msg = CbacError::UnknownCapability { name: "Fly".into() }.to_string();
        assert!(msg.contains("unknown capability") && msg.contains("Fly"));

        let msg = CbacError::ForbiddenTagChar { tag: "a,b".into(), ch: ',' }.to_string();
        assert!(msg.contains("a,b") && msg.contains("','"));

        let msg = CbacError::Config { reason: "missing group".into() }.to_string();
        assert!(msg.contains("configuration error") && msg.contains("missing group"));
    }
}
