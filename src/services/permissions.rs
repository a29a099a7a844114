//! Role resolution and permission grant management
//!
//! Every operation in the service goes through [`PermissionsService::require`]
//! before touching a library; no handler duplicates the check inline.

use std::str::FromStr;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        library::Library,
        permission::{ChangePermission, GrantableRight, PermissionGrant, PermissionView, Role},
    },
    repository::Repository,
};

/// Effective role of a user on a library, combining ownership, the stored
/// grant and public visibility. Pure function of its inputs.
///
/// Ownership beats any stored grant, so an owner can never be downgraded by
/// a stale grant row. A public library is readable by anyone, but public
/// visibility never raises a role above `Read`.
pub fn effective_role(library: &Library, user_id: i32, granted: Option<Role>) -> Role {
    if library.owner_id == user_id {
        return Role::Owner;
    }

    let granted = granted.unwrap_or(Role::None);
    let visible = if library.public { Role::Read } else { Role::None };

    granted.max(visible)
}

/// Outcome of a grant/revoke, with what the notification layer needs
#[derive(Debug)]
pub struct PermissionChange {
    pub library_name: String,
    pub target_email: String,
    pub right: GrantableRight,
    pub granted: bool,
    /// Grant row left standing after the change, if any
    pub remaining: Option<PermissionGrant>,
}

#[derive(Clone)]
pub struct PermissionsService {
    repository: Repository,
}

impl PermissionsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Effective role on an already-fetched library
    async fn role_on(&self, user_id: i32, library: &Library) -> AppResult<Role> {
        let grant = self.repository.permissions.get(library.id, user_id).await?;
        Ok(effective_role(library, user_id, grant.map(|g| g.role())))
    }

    /// Resolve the effective role of a user on a library
    pub async fn resolve(&self, user_id: i32, library_id: Uuid) -> AppResult<Role> {
        let library = self.repository.libraries.get_by_id(library_id).await?;
        self.role_on(user_id, &library).await
    }

    /// Resolve and require at least `minimum`, returning the effective role
    pub async fn require(
        &self,
        user_id: i32,
        library_id: Uuid,
        minimum: Role,
    ) -> AppResult<Role> {
        let role = self.resolve(user_id, library_id).await?;
        if role < minimum {
            return Err(AppError::NoPermission(format!(
                "Operation requires {} access, user has {}",
                minimum, role
            )));
        }
        Ok(role)
    }

    /// List all grants on a library. Requires `admin`.
    pub async fn list_permissions(
        &self,
        requester_id: i32,
        library_id: Uuid,
    ) -> AppResult<Vec<PermissionView>> {
        self.require(requester_id, library_id, Role::Admin).await?;
        self.repository.permissions.list_for_library(library_id).await
    }

    /// Grant or revoke one right for a target user, identified by email.
    ///
    /// Changing the `admin` right requires `owner`; `read` and `write`
    /// require `admin`. A requester can never change their own grant.
    pub async fn change_permission(
        &self,
        requester_id: i32,
        library_id: Uuid,
        request: &ChangePermission,
    ) -> AppResult<PermissionChange> {
        let right = GrantableRight::from_str(&request.permission)
            .map_err(AppError::InvalidOperation)?;

        let library = self.repository.libraries.get_by_id(library_id).await?;
        let requester_role = self.role_on(requester_id, &library).await?;
        let minimum = Role::required_to_change(right);
        if requester_role < minimum {
            return Err(AppError::NoPermission(format!(
                "Changing {} access requires {} access, user has {}",
                right, minimum, requester_role
            )));
        }

        let target = self
            .repository
            .users
            .get_by_email(&request.email)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No user found with email {}", request.email))
            })?;

        // self-service privilege changes are blocked, even for owners
        if target.id == requester_id {
            return Err(AppError::InvalidOperation(
                "You cannot modify your own permissions".to_string(),
            ));
        }

        // the owner's access is implicit and immutable; a grant row for the
        // owner would only show up as a misleading sub-owner role
        if target.id == library.owner_id {
            return Err(AppError::InvalidOperation(
                "You cannot modify the permissions of the library owner".to_string(),
            ));
        }

        let grant = self
            .repository
            .permissions
            .set_right(library_id, target.id, right, request.value)
            .await?;

        tracing::info!(
            library = %library_id,
            requester = requester_id,
            requester_role = %requester_role,
            target_user = target.id,
            right = %right,
            value = request.value,
            "Permission changed"
        );

        Ok(PermissionChange {
            library_name: library.name,
            target_email: target.email,
            right,
            granted: request.value,
            remaining: grant,
        })
    }
}
