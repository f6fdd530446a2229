//! # Authorization Core
//!
//! The role hierarchy and composable guards that wrap every account,
//! credential, and verification operation requiring authentication or
//! elevated privilege.
//!
//! ## Role Hierarchy
//!
//! ```text
//! User(1) < Moderator(2) < Admin(3) < SuperAdmin(4) < Owner(5)
//! ```
//!
//! Guards never compare roles with `>=` when the design calls for strict
//! dominance — a caller acting on a peer or superior is always rejected.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::auth::middleware::{AuthenticatedUser, guards};
//!
//! async fn delete_user(caller: AuthenticatedUser, target_id: i64) -> ApiResult<()> {
//!     guards::require_min_role(&caller, Role::Admin)?;
//!     let target_role = store.get_role(target_id).await?;
//!     guards::check_role_hierarchy(target_id, target_role, &caller)?;
//!     store.soft_delete(target_id).await
//! }
//! ```

use crate::auth::jwt::AccessClaims;
use crate::errors::ApiError;
use actix_web::{Error, HttpMessage};
use std::cmp::Ordering;

// =============================================================================
// Role
// =============================================================================

/// The closed 5-tier role set. Ordering is derived so `role > other` performs
/// the strict-dominance comparisons the guards below rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(i16)]
pub enum Role {
    User = 1,
    Moderator = 2,
    Admin = 3,
    SuperAdmin = 4,
    Owner = 5,
}

impl Role {
    /// Parses a role from its integer representation.
    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            1 => Some(Self::User),
            2 => Some(Self::Moderator),
            3 => Some(Self::Admin),
            4 => Some(Self::SuperAdmin),
            5 => Some(Self::Owner),
            _ => None,
        }
    }

    pub fn as_i16(self) -> i16 {
        self as i16
    }

    /// The display name used in API responses (`user.role`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Moderator => "Moderator",
            Self::Admin => "Admin",
            Self::SuperAdmin => "SuperAdmin",
            Self::Owner => "Owner",
        }
    }
}

// =============================================================================
// Authenticated User
// =============================================================================

/// The caller's identity and role, extracted from a verified access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

impl TryFrom<AccessClaims> for AuthenticatedUser {
    type Error = ApiError;

    fn try_from(claims: AccessClaims) -> Result<Self, Self::Error> {
        let role = Role::from_i16(claims.role).ok_or(ApiError::TokenInvalid)?;
        Ok(Self {
            id: claims.id,
            email: claims.email,
            role,
        })
    }
}

/// Actix-web extractor: pulls `AuthenticatedUser` out of request extensions,
/// where it was placed after token verification (see the HTTP boundary
/// adapter's bearer-extraction helper).
impl actix_web::FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = std::future::Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthenticated.into());
        std::future::ready(result)
    }
}

// =============================================================================
// Guards
// =============================================================================

/// Composable predicates wrapping account/credential/verification
/// operations. Each returns a typed [`ApiError`] that the boundary adapter
/// maps to its HTTP status; guards run before the business action they
/// protect.
pub mod guards {
    use super::*;

    /// Rejects with `Unauthenticated` if `claims` is absent. In practice the
    /// extractor already enforces this; this free function exists for
    /// call sites (e.g. inside a service method) that hold an `Option`.
    pub fn require_authenticated(claims: Option<&AuthenticatedUser>) -> Result<(), ApiError> {
        claims.map(|_| ()).ok_or(ApiError::Unauthenticated)
    }

    /// Rejects with `Forbidden` if `caller.role < r_min`.
    pub fn require_min_role(caller: &AuthenticatedUser, r_min: Role) -> Result<(), ApiError> {
        if caller.role < r_min {
            return Err(ApiError::Forbidden {
                reason: format!("requires role >= {:?}, caller has {:?}", r_min, caller.role),
            });
        }
        Ok(())
    }

    /// `require_admin = require_min_role(Admin)`.
    pub fn require_admin(caller: &AuthenticatedUser) -> Result<(), ApiError> {
        require_min_role(caller, Role::Admin)
    }

    /// Guard for modify/delete on a target account. `target_role` MUST have
    /// been read inside the same transaction as the subsequent mutation.
    ///
    /// Forbids self-delete / self-modify-of-role, and requires
    /// `caller.role > target.role` (strict dominance — equal or higher
    /// targets are rejected).
    pub fn check_role_hierarchy(
        target_id: i64,
        target_role: Role,
        caller: &AuthenticatedUser,
    ) -> Result<(), ApiError> {
        if target_id == caller.id {
            return Err(ApiError::Forbidden {
                reason: "cannot modify or delete your own account".to_string(),
            });
        }
        if caller.role <= target_role {
            return Err(ApiError::Forbidden {
                reason: "caller must strictly outrank the target account".to_string(),
            });
        }
        Ok(())
    }

    /// Guard for `create_user(fields, role)`: the new role must be a valid
    /// member of the role set and no higher than the caller's own role
    /// (equal is allowed — an Admin may create another Admin).
    pub fn validate_role_creation(
        new_role: i16,
        caller: &AuthenticatedUser,
    ) -> Result<Role, ApiError> {
        let new_role = Role::from_i16(new_role).ok_or(ApiError::BadRequest {
            message: "role must be in 1..5".to_string(),
        })?;
        if new_role > caller.role {
            return Err(ApiError::Forbidden {
                reason: "cannot create an account with a role above your own".to_string(),
            });
        }
        Ok(new_role)
    }

    /// The strictest guard, for `change_user_role`. Combines:
    /// - `target_id != caller.id`
    /// - `new_role <= caller.role`
    /// - `target.role < caller.role` (target strictly lower, not just `<=`)
    /// - if `caller.role == Admin`, `new_role <= Admin` (Admins cannot mint
    ///   SuperAdmin or Owner)
    pub fn check_role_change_hierarchy(
        target_id: i64,
        target_role: Role,
        new_role: i16,
        caller: &AuthenticatedUser,
    ) -> Result<Role, ApiError> {
        if target_id == caller.id {
            return Err(ApiError::BadRequest {
                message: "cannot change your own role".to_string(),
            });
        }
        let new_role = Role::from_i16(new_role).ok_or(ApiError::BadRequest {
            message: "role must be in 1..5".to_string(),
        })?;
        if new_role > caller.role {
            return Err(ApiError::Forbidden {
                reason: "cannot assign a role above your own".to_string(),
            });
        }
        if target_role >= caller.role {
            return Err(ApiError::Forbidden {
                reason: "target must strictly outrank below caller".to_string(),
            });
        }
        if caller.role == Role::Admin && new_role > Role::Admin {
            return Err(ApiError::Forbidden {
                reason: "Admins cannot assign SuperAdmin or Owner".to_string(),
            });
        }
        Ok(new_role)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::guards::*;
    use super::*;

    fn user(id: i64, role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            id,
            email: format!("user{id}@x.io"),
            role,
        }
    }

    #[test]
    fn role_ordering_is_strict_total_order() {
        assert!(Role::User < Role::Moderator);
        assert!(Role::Moderator < Role::Admin);
        assert!(Role::Admin < Role::SuperAdmin);
        assert!(Role::SuperAdmin < Role::Owner);
        assert_eq!(Role::Admin.cmp(&Role::Admin), Ordering::Equal);
    }

    #[test]
    fn require_min_role_rejects_below_threshold() {
        let caller = user(1, Role::Moderator);
        assert!(require_min_role(&caller, Role::Admin).is_err());
        assert!(require_min_role(&caller, Role::Moderator).is_ok());
    }

    #[test]
    fn check_role_hierarchy_forbids_self_action() {
        let caller = user(10, Role::Admin);
        assert!(check_role_hierarchy(10, Role::User, &caller).is_err());
    }

    #[test]
    fn check_role_hierarchy_requires_strict_dominance() {
        let caller = user(10, Role::Admin);
        // Equal role target: rejected.
        assert!(check_role_hierarchy(20, Role::Admin, &caller).is_err());
        // Higher role target: rejected.
        assert!(check_role_hierarchy(20, Role::Owner, &caller).is_err());
        // Strictly lower target: allowed.
        assert!(check_role_hierarchy(30, Role::User, &caller).is_ok());
    }

    #[test]
    fn validate_role_creation_allows_equal_rejects_above() {
        let caller = user(1, Role::Admin);
        assert!(validate_role_creation(3, &caller).is_ok()); // equal: allowed
        assert!(validate_role_creation(4, &caller).is_err()); // above: rejected
        assert!(validate_role_creation(1, &caller).is_ok());
    }

    #[test]
    fn scenario_4_admin_role_change_hierarchy() {
        // A (Admin, id=10), B (Admin, id=20), C (User, id=30), O (Owner, id=1)
        let a = user(10, Role::Admin);
        let o = user(1, Role::Owner);

        // A -> C to Moderator: 200
        assert!(check_role_change_hierarchy(30, Role::User, 2, &a).is_ok());
        // A -> B to User: target equal role -> forbidden
        assert!(check_role_change_hierarchy(20, Role::Admin, 1, &a).is_err());
        // A -> self to User: self change -> rejected
        assert!(check_role_change_hierarchy(10, Role::Admin, 1, &a).is_err());
        // A -> C to SuperAdmin: Admin cannot mint SuperAdmin
        assert!(check_role_change_hierarchy(30, Role::User, 4, &a).is_err());
        // O -> A to SuperAdmin: 200
        assert!(check_role_change_hierarchy(10, Role::Admin, 4, &o).is_ok());
    }

    #[test]
    fn check_role_change_hierarchy_rejects_new_role_above_caller() {
        let caller = user(1, Role::Moderator);
        assert!(check_role_change_hierarchy(2, Role::User, 3, &caller).is_err());
    }
}
