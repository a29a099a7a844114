//! Permission grant model and the effective role hierarchy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Effective access level of a user on a library.
///
/// The ordering is the permission hierarchy: every level implies all the
/// rights of the levels below it. `Owner` is derived from library ownership
/// and never stored in a grant row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    None,
    Read,
    Write,
    Admin,
    Owner,
}

impl Role {
    /// Derive the effective role from the per-right flags of a grant row.
    pub fn from_flags(read: bool, write: bool, admin: bool) -> Self {
        if admin {
            Role::Admin
        } else if write {
            Role::Write
        } else if read {
            Role::Read
        } else {
            Role::None
        }
    }

    pub fn can_view(self) -> bool {
        self >= Role::Read
    }

    /// Metadata updates and document add/remove
    pub fn can_edit(self) -> bool {
        self >= Role::Write
    }

    pub fn can_delete_library(self) -> bool {
        self >= Role::Owner
    }

    /// Minimum role required to grant or revoke the given right
    pub fn required_to_change(right: GrantableRight) -> Role {
        match right {
            GrantableRight::Admin => Role::Owner,
            GrantableRight::Read | GrantableRight::Write => Role::Admin,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::None => "none",
            Role::Read => "read",
            Role::Write => "write",
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A right that can be granted or revoked on a library.
///
/// Ownership is not grantable; it is fixed at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GrantableRight {
    Read,
    Write,
    Admin,
}

impl GrantableRight {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantableRight::Read => "read",
            GrantableRight::Write => "write",
            GrantableRight::Admin => "admin",
        }
    }
}

impl std::str::FromStr for GrantableRight {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read" => Ok(GrantableRight::Read),
            "write" => Ok(GrantableRight::Write),
            "admin" => Ok(GrantableRight::Admin),
            _ => Err(format!("Invalid permission name: {}", s)),
        }
    }
}

impl std::fmt::Display for GrantableRight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stored grant row: one per (library, user) pair.
///
/// A row where every flag is false is deleted, never kept around.
#[derive(Debug, Clone, FromRow)]
pub struct PermissionGrant {
    pub library_id: Uuid,
    pub user_id: i32,
    pub can_read: bool,
    pub can_write: bool,
    pub can_admin: bool,
    pub crea_date: DateTime<Utc>,
    pub modif_date: DateTime<Utc>,
}

impl PermissionGrant {
    pub fn role(&self) -> Role {
        Role::from_flags(self.can_read, self.can_write, self.can_admin)
    }
}

/// Grant as presented through the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PermissionView {
    pub email: String,
    pub role: Role,
}

/// Change permission request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePermission {
    /// Email of the user whose access is being changed
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Right to grant or revoke: "read", "write" or "admin"
    pub permission: String,
    /// true to grant the right, false to revoke it
    pub value: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_ordering() {
        assert!(Role::None < Role::Read);
        assert!(Role::Read < Role::Write);
        assert!(Role::Write < Role::Admin);
        assert!(Role::Admin < Role::Owner);
    }

    #[test]
    fn test_from_flags_highest_wins() {
        assert_eq!(Role::from_flags(false, false, false), Role::None);
        assert_eq!(Role::from_flags(true, false, false), Role::Read);
        assert_eq!(Role::from_flags(true, true, false), Role::Write);
        assert_eq!(Role::from_flags(false, true, false), Role::Write);
        assert_eq!(Role::from_flags(true, true, true), Role::Admin);
        assert_eq!(Role::from_flags(false, false, true), Role::Admin);
    }

    #[test]
    fn test_hierarchy_is_monotonic() {
        // admin passes every check write and read would pass
        assert!(Role::Admin.can_view());
        assert!(Role::Admin.can_edit());
        assert!(Role::Write.can_view());
        // but not the owner-only ones
        assert!(!Role::Admin.can_delete_library());
        assert!(Role::Owner.can_delete_library());
    }

    #[test]
    fn test_required_role_per_right() {
        assert_eq!(Role::required_to_change(GrantableRight::Read), Role::Admin);
        assert_eq!(Role::required_to_change(GrantableRight::Write), Role::Admin);
        assert_eq!(Role::required_to_change(GrantableRight::Admin), Role::Owner);
    }

    #[test]
    fn test_parse_grantable_right() {
        assert_eq!(GrantableRight::from_str("read").unwrap(), GrantableRight::Read);
        assert_eq!(GrantableRight::from_str("WRITE").unwrap(), GrantableRight::Write);
        assert!(GrantableRight::from_str("owner").is_err());
        assert!(GrantableRight::from_str("sudo").is_err());
    }
}
