//! Decides whether the current session may act on a resource.
//!
//! Every user-scoped action goes through [`authorize`] so viewing a
//! user page, deleting a user, and adding, updating or deleting
//! feedback all share one ownership check.
use thiserror::Error;

use super::SessionIdentity;

/// Anything that belongs to a user.
pub trait Owned {
    fn owner(&self) -> &str;
}

impl Owned for str {
    fn owner(&self) -> &str {
        self
    }
}

impl Owned for String {
    fn owner(&self) -> &str {
        self
    }
}

impl<T: Owned + ?Sized> Owned for &T {
    fn owner(&self) -> &str {
        (**self).owner()
    }
}

/// Relation between the session and the resource being accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Anonymous,
    Owner,
    Other,
}

impl Access {
    #[must_use]
    pub fn evaluate<R: Owned + ?Sized>(identity: &SessionIdentity, resource: &R) -> Self {
        match identity.current() {
            None => Self::Anonymous,
            Some(username) if username == resource.owner() => Self::Owner,
            Some(..) => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denied {
    #[error("Please log in first!")]
    Anonymous,
    /// Carries the current username so the caller can be sent
    /// back to their own resources.
    #[error("You don't have permission to do that.")]
    NotOwner { current: String },
}

/// Permits the action only if the session owns the resource and
/// returns the session's username in that case.
pub fn authorize<'a, R: Owned + ?Sized>(
    identity: &'a SessionIdentity,
    resource: &R,
) -> Result<&'a str, Denied> {
    match (Access::evaluate(identity, resource), identity.current()) {
        (Access::Owner, Some(username)) => Ok(username),
        (Access::Other, Some(username)) => Err(Denied::NotOwner {
            current: username.to_string(),
        }),
        _ => Err(Denied::Anonymous),
    }
}
