//! Tag grants: which ingested data tags a principal may see.
//!
//! A grant is either a literal tag name or a shell-style glob. Any grant
//! containing one of `*?[]{}!` is treated as a glob. Matching is
//! case-sensitive and never normalizes the tag.

use std::collections::HashSet;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CbacError, CbacResult};

/// Longest tag name accepted.
pub const MAX_TAG_LENGTH: usize = 4096;

/// Most grants one `TagAccess` may hold after deduplication.
pub const MAX_TAG_GRANTS: usize = 65536;

/// Characters that may not appear in a literal tag name.
pub const FORBIDDEN_TAG_CHARS: &str = "!@#$%^&*()=+<>,.:;`\"'{[}]|";

const GLOB_CHARS: &[char] = &['*', '?', '[', ']', '{', '}', '!'];

/// True if `grant` should be compiled as a glob.
pub fn is_glob(grant: &str) -> bool {
    grant.contains(GLOB_CHARS)
}

/// Apply the tag naming rules to a literal tag.
pub fn check_tag_name(tag: &str) -> CbacResult<()> {
    if tag.is_empty() {
        return Err(CbacError::EmptyTag);
    }
    if tag.len() > MAX_TAG_LENGTH {
        return Err(CbacError::TagTooLong {
            tag: tag.chars().take(32).collect(),
            len: tag.len(),
            max: MAX_TAG_LENGTH,
        });
    }
    if let Some(ch) = tag.chars().find(|c| FORBIDDEN_TAG_CHARS.contains(*c)) {
        return Err(CbacError::ForbiddenTagChar { tag: tag.to_string(), ch });
    }
    Ok(())
}

fn compile(pattern: &str) -> CbacResult<Glob> {
    Glob::new(pattern).map_err(|e| CbacError::InvalidGlob {
        pattern: pattern.to_string(),
        reason: e.kind().to_string(),
    })
}

/// A set of tag grants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TagAccess {
    #[serde(default)]
    pub grants: Vec<String>,
}

impl TagAccess {
    pub fn new<I, S>(grants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { grants: grants.into_iter().map(Into::into).collect() }
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Return true if `tag` is granted by some literal or glob grant.
    ///
    /// A glob grant that does not compile never matches.
    pub fn check(&self, tag: &str) -> bool {
        self.grants.iter().any(|grant| {
            if grant == tag {
                return true;
            }
            if !is_glob(grant) {
                return false;
            }
            match compile(grant) {
                Ok(glob) => glob.compile_matcher().is_match(tag),
                Err(e) => {
                    warn!(grant = %grant, error = %e, "ignoring malformed tag glob");
                    false
                }
            }
        })
    }

    /// Deduplicate and check every grant.
    ///
    /// Checks run in order: deduplication (first occurrence kept), glob
    /// compilation or tag naming rules per grant, then the grant count. The
    /// first failure is returned and the grant list is left untouched; on
    /// success it is replaced with the deduplicated list.
    pub fn validate(&mut self) -> CbacResult<()> {
        let mut seen = HashSet::new();
        let deduped: Vec<String> = self
            .grants
            .iter()
            .filter(|g| seen.insert(g.as_str()))
            .cloned()
            .collect();

        for grant in &deduped {
            if is_glob(grant) {
                compile(grant)?;
            } else {
                check_tag_name(grant)?;
            }
        }

        if deduped.len() > MAX_TAG_GRANTS {
            return Err(CbacError::TooManyTagGrants {
                count: deduped.len(),
                max: MAX_TAG_GRANTS,
            });
        }

        self.grants = deduped;
        Ok(())
    }

    /// Compile the grants for repeated matching.
    pub fn matcher(&self) -> TagMatcher {
        TagMatcher::new(self)
    }
}

/// A compiled `TagAccess`.
///
/// Agrees with [`TagAccess::check`] for every tag, but compiles each glob
/// once instead of once per check.
#[derive(Debug, Clone)]
pub struct TagMatcher {
    literals: HashSet<String>,
    globs: GlobSet,
}

impl TagMatcher {
    pub fn new(access: &TagAccess) -> Self {
        let mut builder = GlobSetBuilder::new();
        for grant in access.grants.iter().filter(|g| is_glob(g)) {
            match compile(grant) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => warn!(grant = %grant, error = %e, "ignoring malformed tag glob"),
            }
        }
        let globs = builder.build().unwrap_or_else(|e| {
            warn!(error = %e, "tag glob set failed to build; globs will not match");
            GlobSet::empty()
        });

        Self {
            literals: access.grants.iter().cloned().collect(),
            globs,
        }
    }

    pub fn matches(&self, tag: &str) -> bool {
        self.literals.contains(tag) || self.globs.is_match(tag)
    }
}
