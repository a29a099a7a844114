//! Permission management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::permission::{ChangePermission, PermissionView, Role},
};

use super::AuthenticatedUser;

/// Permission change acknowledgement
#[derive(Serialize, ToSchema)]
pub struct ChangePermissionResponse {
    /// Email of the affected user
    pub email: String,
    /// Effective stored role after the change
    pub role: Role,
}

/// List the grants on a library
#[utoipa::path(
    get,
    path = "/libraries/{id}/permissions",
    tag = "permissions",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Library ID")
    ),
    responses(
        (status = 200, description = "Grants on the library", body = Vec<PermissionView>),
        (status = 403, description = "No admin access"),
        (status = 404, description = "Library not found")
    )
)]
pub async fn list_permissions(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(library_id): Path<Uuid>,
) -> AppResult<Json<Vec<PermissionView>>> {
    let grants = state
        .services
        .permissions
        .list_permissions(claims.user_id, library_id)
        .await?;
    Ok(Json(grants))
}

/// Grant or revoke a right for a user on a library.
///
/// The target user is notified by email; delivery is best-effort and never
/// fails the operation.
#[utoipa::path(
    post,
    path = "/libraries/{id}/permissions",
    tag = "permissions",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Library ID")
    ),
    request_body = ChangePermission,
    responses(
        (status = 200, description = "Permission changed", body = ChangePermissionResponse),
        (status = 400, description = "Malformed right name or self-modification attempt"),
        (status = 403, description = "Insufficient role for this right"),
        (status = 404, description = "Library or target user not found")
    )
)]
pub async fn change_permission(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(library_id): Path<Uuid>,
    Json(request): Json<ChangePermission>,
) -> AppResult<Json<ChangePermissionResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let change = state
        .services
        .permissions
        .change_permission(claims.user_id, library_id, &request)
        .await?;

    let role = change.remaining.as_ref().map(|g| g.role()).unwrap_or(Role::None);
    let email = change.target_email.clone();

    // fire-and-forget notification
    let email_service = state.services.email.clone();
    tokio::spawn(async move {
        if let Err(e) = email_service
            .send_permission_notification(
                &change.target_email,
                &change.library_name,
                change.right,
                change.granted,
            )
            .await
        {
            tracing::warn!("Failed to send permission notification: {}", e);
        }
    });

    Ok(Json(ChangePermissionResponse { email, role }))
}
