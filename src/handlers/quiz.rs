// src/handlers/quiz.rs

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    cache::QuizCache,
    error::AppError,
    grading,
    models::{
        attempt::{AttemptHistoryEntry, SubmitAttemptRequest, SubmitAttemptResponse},
        quiz::{OptionRow, PublicQuiz, Question, QuestionOption, QuestionRow, Quiz, QuizRow, QuizSummary},
    },
    utils::jwt::Claims,
};

/// Loads a fully resolved quiz: the quiz row, its questions in authored
/// order, and each question's options in authored order.
pub(crate) async fn load_quiz(pool: &PgPool, quiz_id: i64) -> Result<Option<Quiz>, AppError> {
    let Some(quiz_row) = sqlx::query_as::<_, QuizRow>(
        "SELECT id, title, description, created_at FROM quizzes WHERE id = $1",
    )
    .bind(quiz_id)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    let question_rows = sqlx::query_as::<_, QuestionRow>(
        r#"
        SELECT id, quiz_id, text, points, correct_option_id
        FROM questions
        WHERE quiz_id = $1
        ORDER BY position
        "#,
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    let option_rows = sqlx::query_as::<_, OptionRow>(
        r#"
        SELECT o.id, o.question_id, o.text
        FROM options o
        JOIN questions q ON o.question_id = q.id
        WHERE q.quiz_id = $1
        ORDER BY o.question_id, o.position
        "#,
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    let mut options_by_question: HashMap<i64, Vec<QuestionOption>> = HashMap::new();
    for row in option_rows {
        options_by_question
            .entry(row.question_id)
            .or_default()
            .push(QuestionOption {
                id: row.id,
                text: row.text,
            });
    }

    let questions = question_rows
        .into_iter()
        .map(|row| Question {
            id: row.id,
            text: row.text,
            points: row.points,
            options: options_by_question.remove(&row.id).unwrap_or_default(),
            correct_option_id: row.correct_option_id,
        })
        .collect();

    Ok(Some(Quiz {
        id: quiz_row.id,
        title: quiz_row.title,
        description: quiz_row.description,
        questions,
        created_at: quiz_row.created_at,
    }))
}

/// Cache-aware quiz fetch. Misses load from the database and populate the
/// cache; admin mutations invalidate.
async fn fetch_quiz(
    pool: &PgPool,
    cache: &QuizCache,
    quiz_id: i64,
) -> Result<Arc<Quiz>, AppError> {
    if let Some(quiz) = cache.get(quiz_id).await {
        return Ok(quiz);
    }

    let quiz = load_quiz(pool, quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    Ok(cache.insert(quiz).await)
}

/// Lists all quizzes with their question counts.
pub async fn list_quizzes(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let quizzes = sqlx::query_as::<_, QuizSummary>(
        r#"
        SELECT
            z.id, z.title, z.description, z.created_at,
            (SELECT COUNT(*) FROM questions WHERE quiz_id = z.id) AS question_count
        FROM quizzes z
        ORDER BY z.id
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(quizzes))
}

/// Retrieves a single quiz for taking.
///
/// Responds with the answer-stripped DTO: correct-option references never
/// leave the server before grading.
pub async fn get_quiz(
    State(pool): State<PgPool>,
    State(cache): State<QuizCache>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = fetch_quiz(&pool, &cache, id).await?;
    Ok(Json(PublicQuiz::from((*quiz).clone())))
}

/// Submits an attempt: grades the answers against the quiz and persists the
/// result as an immutable historical record.
///
/// Grading is pure; this handler owns the I/O around it. The attempt row and
/// its graded answers are written in one transaction so readers never see a
/// partial attempt. Retakes are kept as separate records.
pub async fn submit_attempt(
    State(pool): State<PgPool>,
    State(cache): State<QuizCache>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    Json(req): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = fetch_quiz(&pool, &cache, quiz_id).await?;

    // An empty answer set is not an error: it grades to 0/0.
    let result = grading::grade(&quiz, &req.answers);

    let mut tx = pool.begin().await?;

    let attempt_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO attempts (user_id, quiz_id, score, total_points)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(claims.user_id())
    .bind(quiz_id)
    .bind(result.score)
    .bind(result.total_points)
    .fetch_one(&mut *tx)
    .await?;

    for answer in &result.answers {
        sqlx::query(
            r#"
            INSERT INTO attempt_answers (attempt_id, question_id, selected_option_id, is_correct)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(attempt_id)
        .bind(answer.question_id)
        .bind(answer.selected_option_id)
        .bind(answer.is_correct)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to persist attempt: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(SubmitAttemptResponse {
        attempt_id,
        score: result.score,
        total_points: result.total_points,
        answers: result.answers,
    }))
}

/// Lists the current user's attempt history, most recent first.
pub async fn my_attempts(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = sqlx::query_as::<_, AttemptHistoryEntry>(
        r#"
        SELECT a.id, a.quiz_id, z.title AS quiz_title, a.score, a.total_points, a.completed_at
        FROM attempts a
        LEFT JOIN quizzes z ON a.quiz_id = z.id
        WHERE a.user_id = $1
        ORDER BY a.completed_at DESC
        "#,
    )
    .bind(claims.user_id())
    .fetch_all(&pool)
    .await?;

    Ok(Json(attempts))
}
