//! Identity module: resolves the acting user of a request.
//!
//! Mutating question operations authorize against the `ActingUser` produced
//! here; callers obtain it from the request credential and pass it explicitly.

pub mod errors;
pub mod jwt;

use std::fmt;

pub use errors::IdentityError;
pub use jwt::JwtIdentityResolver;

/// Id of the authenticated user performing an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActingUser(i32);

impl ActingUser {
    pub fn new(id: i32) -> Self { Self(id) }

    pub fn id(self) -> i32 { self.0 }

    /// Ownership check: does this user own a row with `owner_id`?
    pub fn owns(self, owner_id: i32) -> bool { self.0 == owner_id }
}

impl fmt::Display for ActingUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Resolves the acting user from the raw `Authorization` header value.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, authorization: Option<&str>) -> Result<ActingUser, IdentityError>;
}
