//! Permission grants repository for database operations

use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::permission::{GrantableRight, PermissionGrant, PermissionView, Role},
};

#[derive(Clone)]
pub struct PermissionsRepository {
    pool: Pool<Postgres>,
}

impl PermissionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get the grant row for a (library, user) pair, if any
    pub async fn get(&self, library_id: Uuid, user_id: i32) -> AppResult<Option<PermissionGrant>> {
        let grant = sqlx::query_as::<_, PermissionGrant>(
            "SELECT * FROM permissions WHERE library_id = $1 AND user_id = $2",
        )
        .bind(library_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(grant)
    }

    /// List all grants on a library with the target users' emails
    pub async fn list_for_library(&self, library_id: Uuid) -> AppResult<Vec<PermissionView>> {
        let rows = sqlx::query(
            r#"
            SELECT u.email, p.can_read, p.can_write, p.can_admin
            FROM permissions p
            JOIN users u ON u.id = p.user_id
            WHERE p.library_id = $1
            ORDER BY p.crea_date
            "#,
        )
        .bind(library_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PermissionView {
                email: row.get("email"),
                role: Role::from_flags(
                    row.get("can_read"),
                    row.get("can_write"),
                    row.get("can_admin"),
                ),
            })
            .collect())
    }

    /// Flip one right on the grant row for (library, user), atomically.
    ///
    /// Upserts the row with only the named flag touched, then drops the row
    /// if no right remains set. Returns the remaining grant, or `None` when
    /// the row was deleted. Revoking a right that is not held leaves other
    /// flags as they were, so it degenerates to a no-op.
    pub async fn set_right(
        &self,
        library_id: Uuid,
        user_id: i32,
        right: GrantableRight,
        value: bool,
    ) -> AppResult<Option<PermissionGrant>> {
        let mut tx = self.pool.begin().await?;

        let grant = sqlx::query_as::<_, PermissionGrant>(
            r#"
            INSERT INTO permissions (library_id, user_id, can_read, can_write, can_admin, crea_date, modif_date)
            VALUES ($1, $2,
                    CASE WHEN $3 = 'read' THEN $4 ELSE FALSE END,
                    CASE WHEN $3 = 'write' THEN $4 ELSE FALSE END,
                    CASE WHEN $3 = 'admin' THEN $4 ELSE FALSE END,
                    NOW(), NOW())
            ON CONFLICT (library_id, user_id) DO UPDATE SET
                can_read = CASE WHEN $3 = 'read' THEN $4 ELSE permissions.can_read END,
                can_write = CASE WHEN $3 = 'write' THEN $4 ELSE permissions.can_write END,
                can_admin = CASE WHEN $3 = 'admin' THEN $4 ELSE permissions.can_admin END,
                modif_date = NOW()
            RETURNING *
            "#,
        )
        .bind(library_id)
        .bind(user_id)
        .bind(right.as_str())
        .bind(value)
        .fetch_one(&mut *tx)
        .await?;

        // a grant with every right revoked is deleted, not stored
        let grant = if grant.role() == Role::None {
            sqlx::query(
                "DELETE FROM permissions WHERE library_id = $1 AND user_id = $2",
            )
            .bind(library_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
            None
        } else {
            Some(grant)
        };

        tx.commit().await?;

        Ok(grant)
    }
}
