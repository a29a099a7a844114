//! Library model and related request/response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::document::DocumentRecord;
use super::permission::Role;

/// A named, owned collection of document identifiers.
///
/// Invariant: `name` and `description` are never empty strings; blank input
/// on create or update is replaced by defaults or ignored.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Library {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner_id: i32,
    pub public: bool,
    /// Ordered document identifiers, duplicates collapsed
    pub documents: Vec<String>,
    pub crea_date: DateTime<Utc>,
    pub modif_date: DateTime<Utc>,
}

/// Create library request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateLibrary {
    /// Library name; blank or omitted gets a generated default
    #[validate(length(max = 200, message = "Name must be at most 200 characters"))]
    pub name: Option<String>,
    /// Description; blank or omitted gets the fixed default
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    /// Visibility; libraries are private unless requested otherwise
    pub public: Option<bool>,
}

/// Update library metadata request.
///
/// Blank or absent fields leave the stored value untouched.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLibrary {
    #[validate(length(max = 200, message = "Name must be at most 200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

/// Document add/remove request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MutateDocuments {
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub remove: Vec<String>,
}

/// Library as listed for a requesting user, with their effective role
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LibrarySummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub public: bool,
    pub num_documents: i64,
    pub role: Role,
    pub crea_date: DateTime<Utc>,
    pub modif_date: DateTime<Utc>,
}

/// Library content view: the library plus its documents resolved against
/// the external lookup service
#[derive(Debug, Serialize, ToSchema)]
pub struct LibraryContent {
    #[serde(flatten)]
    pub library: Library,
    pub role: Role,
    pub resolved: Vec<DocumentRecord>,
}
