//! User registry service
//!
//! Accounts live in the platform gateway; this service records every
//! authenticated user locally so they can later be addressed as a grant
//! target by email.

use crate::{error::AppResult, models::user::User, repository::Repository};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Record an authenticated user, refreshing the email if it changed
    /// upstream. Called on every authenticated request.
    pub async fn register(&self, id: i32, email: &str) -> AppResult<User> {
        self.repository.users.upsert(id, email).await
    }
}
