// src/models/feedback.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'feedback' table in the database.
/// `response` and `responded_at` stay NULL until an admin answers.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub response: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub responded_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Feedback row joined with the author's username for the admin listing.
#[derive(Debug, Serialize, FromRow)]
pub struct FeedbackWithAuthor {
    pub id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub message: String,
    pub response: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub responded_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for a trainee submitting feedback.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFeedbackRequest {
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

/// DTO for an admin responding to a feedback entry.
#[derive(Debug, Deserialize, Validate)]
pub struct RespondFeedbackRequest {
    #[validate(length(min = 1, max = 5000))]
    pub response: String,
}
