//! Per-endpoint role allow-lists.
//!
//! Membership only, no hierarchy: an admin reaches a lawyer-only endpoint
//! only if the endpoint lists `Role::Admin` too.

use crate::auth::gate::AuthContext;
use crate::db::Role;
use crate::error::AuthError;
use crate::Result;

pub const ADMIN: &[Role] = &[Role::Admin];
pub const LAWYER: &[Role] = &[Role::Lawyer];
pub const LAWYER_OR_ADMIN: &[Role] = &[Role::Lawyer, Role::Admin];
pub const ANY_ROLE: &[Role] = &[Role::Admin, Role::Lawyer, Role::User];

pub fn authorize(context: &AuthContext, allowed: &[Role]) -> Result<()> {
    if allowed.contains(&context.role) {
        Ok(())
    } else {
        Err(AuthError::Forbidden(context.role).into())
    }
}
