// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// A fully resolved quiz definition: the quiz row plus its ordered questions
/// and their options, with the correct-option reference resolved.
///
/// This is the shape the grading engine consumes. Handlers must never send it
/// to a client directly (it carries `correct_option_id`); use [`PublicQuiz`].
#[derive(Debug, Clone, Serialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: i64,
    pub text: String,

    /// Configured point value. Currently not consulted by scoring, which is
    /// flat 1 point per answered question; kept pending product clarification.
    pub points: i64,

    pub options: Vec<QuestionOption>,

    /// Id of the correct option. Tracked by identity rather than position so
    /// options can be reordered without touching correctness marking.
    pub correct_option_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionOption {
    pub id: i64,
    pub text: String,
}

/// Raw row shapes used when assembling a [`Quiz`] from the database.
#[derive(Debug, FromRow)]
pub struct QuizRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub quiz_id: i64,
    pub text: String,
    pub points: i64,
    pub correct_option_id: i64,
}

#[derive(Debug, FromRow)]
pub struct OptionRow {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
}

/// DTO for sending a quiz to a test-taker. Excludes the correct-option
/// reference so answers cannot leak before grading.
#[derive(Debug, Serialize)]
pub struct PublicQuiz {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text: String,
    pub points: i64,
    pub options: Vec<QuestionOption>,
}

impl From<Quiz> for PublicQuiz {
    fn from(quiz: Quiz) -> Self {
        PublicQuiz {
            id: quiz.id,
            title: quiz.title,
            description: quiz.description,
            questions: quiz
                .questions
                .into_iter()
                .map(|q| PublicQuestion {
                    id: q.id,
                    text: q.text,
                    points: q.points,
                    options: q.options,
                })
                .collect(),
        }
    }
}

/// Summary row for quiz listings (no questions loaded).
#[derive(Debug, Serialize, FromRow)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub question_count: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for authoring one question. `correct_index` points into `options`;
/// the server resolves it to an option id once the rows exist.
#[derive(Debug, Deserialize, Validate)]
pub struct QuestionInput {
    #[validate(length(min = 1, max = 1000))]
    pub text: String,

    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,

    pub correct_index: usize,

    /// Optional point value, defaults to 1.
    pub points: Option<i64>,
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.len() < 2 {
        return Err(validator::ValidationError::new("need_at_least_two_options"));
    }
    for opt in options {
        if opt.is_empty() || opt.len() > 500 {
            return Err(validator::ValidationError::new("option_length"));
        }
    }
    Ok(())
}

/// DTO for creating a new quiz with its initial questions.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 5000))]
    #[serde(default)]
    pub description: String,

    #[validate(nested)]
    pub questions: Vec<QuestionInput>,
}

/// DTO for replacing a quiz's questions wholesale (delete + reinsert).
#[derive(Debug, Deserialize, Validate)]
pub struct ReplaceQuestionsRequest {
    #[validate(nested)]
    pub questions: Vec<QuestionInput>,
}
