//! Library mutation and read operations
//!
//! All mutations resolve the requester's role first, then apply the change
//! as a single atomic repository call.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    config::LibraryConfig,
    error::{AppError, AppResult},
    models::{
        document::is_valid_bibcode,
        library::{CreateLibrary, Library, LibraryContent, LibrarySummary, MutateDocuments, UpdateLibrary},
        permission::Role,
    },
    repository::Repository,
    services::{
        lookup::{resolve_documents, DocumentLookup},
        permissions::PermissionsService,
    },
};

/// Blank or whitespace-only optional input means "not supplied"
fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[derive(Clone)]
pub struct LibrariesService {
    repository: Repository,
    permissions: PermissionsService,
    lookup: Arc<dyn DocumentLookup>,
    config: LibraryConfig,
}

impl LibrariesService {
    pub fn new(
        repository: Repository,
        permissions: PermissionsService,
        lookup: Arc<dyn DocumentLookup>,
        config: LibraryConfig,
    ) -> Self {
        Self {
            repository,
            permissions,
            lookup,
            config,
        }
    }

    /// Create a library owned by the requester.
    ///
    /// Blank name and description fall back to defaults; the generated name
    /// carries a per-owner sequence number. New libraries are private unless
    /// requested otherwise.
    pub async fn create_library(
        &self,
        owner_id: i32,
        request: CreateLibrary,
    ) -> AppResult<Library> {
        let name = non_blank(request.name);
        let description = non_blank(request.description)
            .unwrap_or_else(|| self.config.default_description.clone());
        let public = request.public.unwrap_or(false);

        let library = self
            .repository
            .libraries
            .create(
                owner_id,
                name,
                description,
                public,
                &self.config.default_name_prefix,
            )
            .await?;

        tracing::info!(library = %library.id, owner = owner_id, "Library created");

        Ok(library)
    }

    /// List the requester's libraries (owned and granted)
    pub async fn list_libraries(&self, user_id: i32) -> AppResult<Vec<LibrarySummary>> {
        self.repository.libraries.list_for_user(user_id).await
    }

    /// View a library's content with documents resolved against the index.
    /// Requires `read`, which public libraries give to everyone.
    pub async fn get_content(&self, requester_id: i32, library_id: Uuid) -> AppResult<LibraryContent> {
        let role = self
            .permissions
            .require(requester_id, library_id, Role::Read)
            .await?;

        let library = self.repository.libraries.get_by_id(library_id).await?;
        let resolved = resolve_documents(self.lookup.as_ref(), &library.documents).await?;

        Ok(LibraryContent {
            library,
            role,
            resolved,
        })
    }

    /// Update name and/or description. Requires `write`.
    ///
    /// Each field is handled independently: blank or absent input leaves the
    /// stored value untouched. Returns the library's full current state so
    /// the caller can confirm the effective result.
    pub async fn update_metadata(
        &self,
        requester_id: i32,
        library_id: Uuid,
        request: UpdateLibrary,
    ) -> AppResult<Library> {
        self.permissions
            .require(requester_id, library_id, Role::Write)
            .await?;

        let name = non_blank(request.name);
        let description = non_blank(request.description);

        if name.is_none() && description.is_none() {
            // nothing to change, report current state
            return self.repository.libraries.get_by_id(library_id).await;
        }

        self.repository
            .libraries
            .update_metadata(library_id, name.as_deref(), description.as_deref())
            .await
    }

    /// Add and/or remove documents. Requires `write`.
    ///
    /// Duplicates in `add` are absorbed silently; identifiers in `remove`
    /// that are not present are ignored.
    pub async fn mutate_documents(
        &self,
        requester_id: i32,
        library_id: Uuid,
        request: MutateDocuments,
    ) -> AppResult<Library> {
        self.permissions
            .require(requester_id, library_id, Role::Write)
            .await?;

        if let Some(bad) = request.add.iter().find(|b| !is_valid_bibcode(b)) {
            return Err(AppError::Validation(format!(
                "Invalid document identifier: {}",
                bad
            )));
        }

        self.repository
            .libraries
            .mutate_documents(library_id, &request.add, &request.remove)
            .await
    }

    /// Delete a library and cascade its grants. Requires `owner`.
    pub async fn delete_library(&self, requester_id: i32, library_id: Uuid) -> AppResult<()> {
        self.permissions
            .require(requester_id, library_id, Role::Owner)
            .await?;

        self.repository.libraries.delete(library_id).await?;

        tracing::info!(library = %library_id, requester = requester_id, "Library deleted");

        Ok(())
    }
}
