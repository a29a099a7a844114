//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, libraries, permissions};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblib API",
        version = "1.0.0",
        description = "Shared Bibliographic Library Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Biblib Team", email = "contact@biblib.org")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Libraries
        libraries::create_library,
        libraries::list_libraries,
        libraries::get_library,
        libraries::update_library,
        libraries::mutate_documents,
        libraries::delete_library,
        // Permissions
        permissions::list_permissions,
        permissions::change_permission,
    ),
    components(
        schemas(
            // Libraries
            crate::models::library::Library,
            crate::models::library::LibrarySummary,
            crate::models::library::LibraryContent,
            crate::models::library::CreateLibrary,
            crate::models::library::UpdateLibrary,
            crate::models::library::MutateDocuments,
            crate::models::document::DocumentRecord,
            // Permissions
            crate::models::permission::Role,
            crate::models::permission::GrantableRight,
            crate::models::permission::PermissionView,
            crate::models::permission::ChangePermission,
            permissions::ChangePermissionResponse,
            // Users
            crate::models::user::User,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "libraries", description = "Library management"),
        (name = "permissions", description = "Library access grants")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
