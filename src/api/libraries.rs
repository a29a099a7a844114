//! Library management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::library::{
        CreateLibrary, Library, LibraryContent, LibrarySummary, MutateDocuments, UpdateLibrary,
    },
};

use super::AuthenticatedUser;

/// Create a new library owned by the requester
#[utoipa::path(
    post,
    path = "/libraries",
    tag = "libraries",
    security(("bearer_auth" = [])),
    request_body = CreateLibrary,
    responses(
        (status = 201, description = "Library created", body = Library),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_library(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateLibrary>,
) -> AppResult<(StatusCode, Json<Library>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let library = state
        .services
        .libraries
        .create_library(claims.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(library)))
}

/// List the requester's libraries (owned and granted)
#[utoipa::path(
    get,
    path = "/libraries",
    tag = "libraries",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Libraries visible to the requester", body = Vec<LibrarySummary>)
    )
)]
pub async fn list_libraries(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LibrarySummary>>> {
    let libraries = state.services.libraries.list_libraries(claims.user_id).await?;
    Ok(Json(libraries))
}

/// View a library's content with resolved document metadata
#[utoipa::path(
    get,
    path = "/libraries/{id}",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Library ID")
    ),
    responses(
        (status = 200, description = "Library content", body = LibraryContent),
        (status = 403, description = "No read access"),
        (status = 404, description = "Library not found")
    )
)]
pub async fn get_library(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(library_id): Path<Uuid>,
) -> AppResult<Json<LibraryContent>> {
    let content = state
        .services
        .libraries
        .get_content(claims.user_id, library_id)
        .await?;
    Ok(Json(content))
}

/// Update library name and/or description.
///
/// Blank or absent fields leave the stored values untouched.
#[utoipa::path(
    put,
    path = "/libraries/{id}",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Library ID")
    ),
    request_body = UpdateLibrary,
    responses(
        (status = 200, description = "Library state after the update", body = Library),
        (status = 403, description = "No write access"),
        (status = 404, description = "Library not found")
    )
)]
pub async fn update_library(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(library_id): Path<Uuid>,
    Json(request): Json<UpdateLibrary>,
) -> AppResult<Json<Library>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let library = state
        .services
        .libraries
        .update_metadata(claims.user_id, library_id, request)
        .await?;
    Ok(Json(library))
}

/// Add and/or remove documents
#[utoipa::path(
    post,
    path = "/libraries/{id}/documents",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Library ID")
    ),
    request_body = MutateDocuments,
    responses(
        (status = 200, description = "Library state after the mutation", body = Library),
        (status = 400, description = "Malformed document identifier"),
        (status = 403, description = "No write access"),
        (status = 404, description = "Library not found")
    )
)]
pub async fn mutate_documents(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(library_id): Path<Uuid>,
    Json(request): Json<MutateDocuments>,
) -> AppResult<Json<Library>> {
    let library = state
        .services
        .libraries
        .mutate_documents(claims.user_id, library_id, request)
        .await?;
    Ok(Json(library))
}

/// Delete a library, cascading its grants
#[utoipa::path(
    delete,
    path = "/libraries/{id}",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Library ID")
    ),
    responses(
        (status = 204, description = "Library deleted"),
        (status = 403, description = "Only the owner can delete a library"),
        (status = 404, description = "Library not found")
    )
)]
pub async fn delete_library(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(library_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .services
        .libraries
        .delete_library(claims.user_id, library_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
