//! Libraries repository for database operations

use indexmap::IndexSet;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        library::{Library, LibrarySummary},
        permission::Role,
    },
};

#[derive(Clone)]
pub struct LibrariesRepository {
    pool: Pool<Postgres>,
}

impl LibrariesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get library by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Library> {
        sqlx::query_as::<_, Library>("SELECT * FROM libraries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Library {} not found", id)))
    }

    /// Create a new library.
    ///
    /// When `name` is `None` the per-owner sequence is bumped inside the same
    /// transaction as the insert and the generated name is
    /// `"<prefix> <n>"`. The sequence is durable, so names are never reused
    /// after a deletion, even under concurrent creates by the same owner.
    pub async fn create(
        &self,
        owner_id: i32,
        name: Option<String>,
        description: String,
        public: bool,
        default_name_prefix: &str,
    ) -> AppResult<Library> {
        let mut tx = self.pool.begin().await?;

        let name = match name {
            Some(name) => name,
            None => {
                let n: i64 = sqlx::query_scalar(
                    r#"
                    INSERT INTO library_sequences (owner_id, next_value)
                    VALUES ($1, 2)
                    ON CONFLICT (owner_id)
                    DO UPDATE SET next_value = library_sequences.next_value + 1
                    RETURNING next_value - 1
                    "#,
                )
                .bind(owner_id)
                .fetch_one(&mut *tx)
                .await?;

                format!("{} {}", default_name_prefix, n)
            }
        };

        let library = sqlx::query_as::<_, Library>(
            r#"
            INSERT INTO libraries (id, name, description, owner_id, public, documents, crea_date, modif_date)
            VALUES ($1, $2, $3, $4, $5, '{}', NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&name)
        .bind(&description)
        .bind(owner_id)
        .bind(public)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(library)
    }

    /// List libraries visible to a user: owned, or covered by a grant.
    ///
    /// The returned summaries carry the user's effective role on each
    /// library, computed from the joined grant flags.
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<LibrarySummary>> {
        let rows = sqlx::query(
            r#"
            SELECT l.id, l.name, l.description, l.public, l.owner_id,
                   CAST(cardinality(l.documents) AS BIGINT) as num_documents,
                   l.crea_date, l.modif_date,
                   p.can_read, p.can_write, p.can_admin
            FROM libraries l
            LEFT JOIN permissions p ON p.library_id = l.id AND p.user_id = $1
            WHERE l.owner_id = $1 OR p.user_id IS NOT NULL
            ORDER BY l.crea_date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::new();
        for row in rows {
            let owner_id: i32 = row.get("owner_id");
            let role = if owner_id == user_id {
                Role::Owner
            } else {
                Role::from_flags(
                    row.get::<Option<bool>, _>("can_read").unwrap_or(false),
                    row.get::<Option<bool>, _>("can_write").unwrap_or(false),
                    row.get::<Option<bool>, _>("can_admin").unwrap_or(false),
                )
            };

            result.push(LibrarySummary {
                id: row.get("id"),
                name: row.get("name"),
                description: row.get("description"),
                public: row.get("public"),
                num_documents: row.get("num_documents"),
                role,
                crea_date: row.get("crea_date"),
                modif_date: row.get("modif_date"),
            });
        }

        Ok(result)
    }

    /// Update name and/or description in one atomic statement.
    ///
    /// NULL or empty input leaves the stored column untouched, so a partial
    /// update never disturbs the other field and blank never erases a value.
    pub async fn update_metadata(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<Library> {
        sqlx::query_as::<_, Library>(
            r#"
            UPDATE libraries
            SET name = COALESCE(NULLIF($2, ''), name),
                description = COALESCE(NULLIF($3, ''), description),
                modif_date = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name.unwrap_or(""))
        .bind(description.unwrap_or(""))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Library {} not found", id)))
    }

    /// Add and remove document identifiers as one read-modify-write under a
    /// row lock. Add is an order-preserving set union; remove ignores
    /// identifiers that are not present.
    pub async fn mutate_documents(
        &self,
        id: Uuid,
        add: &[String],
        remove: &[String],
    ) -> AppResult<Library> {
        let mut tx = self.pool.begin().await?;

        let current: Vec<String> =
            sqlx::query_scalar("SELECT documents FROM libraries WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Library {} not found", id)))?;

        let mut documents: IndexSet<String> = current.into_iter().collect();
        for bibcode in add {
            documents.insert(bibcode.clone());
        }
        for bibcode in remove {
            documents.shift_remove(bibcode);
        }
        let documents: Vec<String> = documents.into_iter().collect();

        let library = sqlx::query_as::<_, Library>(
            r#"
            UPDATE libraries
            SET documents = $2, modif_date = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&documents)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(library)
    }

    /// Delete a library and all its grants in one transaction.
    ///
    /// A grant referencing a deleted library is never observable afterwards.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM permissions WHERE library_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM libraries WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Library {} not found", id)));
        }

        tx.commit().await?;

        Ok(())
    }
}
