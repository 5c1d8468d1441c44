// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::grading::Answer;

/// Represents the 'attempts' table in the database.
/// One graded submission of one quiz by one user. Immutable once written;
/// retakes insert new rows.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attempt {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub score: i64,
    pub total_points: i64,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One row of a user's attempt history, joined with the quiz title.
/// `quiz_title` is None when the quiz has been deleted since.
#[derive(Debug, Serialize, FromRow)]
pub struct AttemptHistoryEntry {
    pub id: i64,
    pub quiz_id: i64,
    pub quiz_title: Option<String>,
    pub score: i64,
    pub total_points: i64,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for submitting an attempt: the final answer set, one entry per
/// answered question.
#[derive(Debug, Deserialize)]
pub struct SubmitAttemptRequest {
    pub answers: Vec<Answer>,
}

/// Response for a graded submission.
#[derive(Debug, Serialize)]
pub struct SubmitAttemptResponse {
    pub attempt_id: i64,
    pub score: i64,
    pub total_points: i64,
    pub answers: Vec<crate::grading::GradedAnswer>,
}
