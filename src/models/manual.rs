// src/models/manual.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use validator::Validate;

/// Represents the 'manuals' table in the database.
/// `document_url` points into external object storage; this service stores
/// and serves the URL but never dereferences it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Manual {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub document_url: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new manual.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateManualRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, max = 500), custom(function = validate_url_string))]
    pub document_url: String,
}

/// DTO for updating a manual. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateManualRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub document_url: Option<String>,
}

/// Validates that a string is a correctly formatted URL.
fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}
