//! The seam between the decision engine and whatever owns users and groups.

use cbac_contracts::{CbacResult, GroupDetails, UserDetails};

/// A source of principal snapshots.
///
/// Implementations must return users with `groups` fully populated: the
/// resolution functions trust that list to be the complete, current
/// membership.
pub trait PrincipalStore: Send + Sync {
    /// Load a user by username, with its groups.
    ///
    /// Returns `CbacError::UnknownPrincipal` if no such user exists.
    fn load_user(&self, username: &str) -> CbacResult<UserDetails>;

    /// Load a group by name.
    ///
    /// Returns `CbacError::UnknownPrincipal` if no such group exists.
    fn load_group(&self, name: &str) -> CbacResult<GroupDetails>;
}
