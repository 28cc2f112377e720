//! Error types for the access-control engine.
//!
//! The decision path itself never fails: an out-of-range capability is simply
//! not granted. Errors only arise while building rule sets, when a grant list
//! is parsed, a tag grant is validated, or a rule-set document is loaded.

use thiserror::Error;

/// The unified error type for the access-control crates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CbacError {
    /// A capability name did not match any known capability.
    ///
    /// Callers decoding a grant list must reject the whole list.
    #[error("unknown capability '{name}'")]
    UnknownCapability { name: String },

    /// A tag grant looked like a glob but failed to compile.
    #[error("invalid tag glob '{pattern}': {reason}")]
    InvalidGlob { pattern: String, reason: String },

    /// A literal tag grant was empty.
    #[error("tag grant is empty")]
    EmptyTag,

    /// A literal tag grant exceeded the maximum tag length.
    #[error("tag '{tag}' is {len} bytes long, maximum is {max}")]
    TagTooLong { tag: String, len: usize, max: usize },

    /// A literal tag grant contained a character tags may not use.
    #[error("tag '{tag}' contains forbidden character '{ch}'")]
    ForbiddenTagChar { tag: String, ch: char },

    /// A tag grant set held more grants than allowed after deduplication.
    #[error("too many tag grants: {count} exceeds maximum of {max}")]
    TooManyTagGrants { count: usize, max: usize },

    /// A user or group could not be found in the principal store.
    #[error("unknown principal '{name}'")]
    UnknownPrincipal { name: String },

    /// A rule-set document is missing, malformed, or inconsistent.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Convenience alias used throughout the access-control crates.
pub type CbacResult<T> = Result<T, CbacError>;
