//! Business logic services

pub mod email;
pub mod libraries;
pub mod lookup;
pub mod permissions;
pub mod users;

use std::sync::Arc;

use crate::{
    config::{EmailConfig, LibraryConfig},
    error::{AppError, AppResult},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub libraries: libraries::LibrariesService,
    pub permissions: permissions::PermissionsService,
    pub users: users::UsersService,
    pub email: email::EmailService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        lookup: Arc<dyn lookup::DocumentLookup>,
        library_config: LibraryConfig,
        email_config: EmailConfig,
    ) -> AppResult<Self> {
        let permissions = permissions::PermissionsService::new(repository.clone());

        Ok(Self {
            libraries: libraries::LibrariesService::new(
                repository.clone(),
                permissions.clone(),
                lookup,
                library_config,
            ),
            permissions,
            users: users::UsersService::new(repository.clone()),
            email: email::EmailService::new(email_config),
            repository,
        })
    }

    /// Database connectivity probe for the readiness endpoint
    pub async fn ping_database(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.repository.pool)
            .await
            .map_err(|e| AppError::Transient(format!("Database unreachable: {}", e)))?;
        Ok(())
    }
}
