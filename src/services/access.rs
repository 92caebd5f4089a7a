//! Role and ownership checks applied before any write.

use uuid::Uuid;

use crate::{dao::models::Role, error::ServiceError};

/// Roles allowed to manage teams, players, rosters and games.
pub const MANAGERS: &[Role] = &[Role::Admin, Role::Coach];

/// Authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

impl Principal {
    /// Admins pass every role and ownership check.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Allow the call when the principal holds one of `allowed`.
pub fn authorize(principal: &Principal, allowed: &[Role]) -> Result<(), ServiceError> {
    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "User role {} is not authorized to access this route",
            principal.role.as_str()
        )))
    }
}

/// Allow the call for admins and for the owner of the resource.
pub fn authorize_owner(
    principal: &Principal,
    owner: Uuid,
    action: &str,
) -> Result<(), ServiceError> {
    if principal.is_admin() || principal.id == owner {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!("Not authorized to {action}")))
    }
}
