// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};
use validator::Validate;

use crate::{
    cache::QuizCache,
    error::AppError,
    models::{
        quiz::{CreateQuizRequest, QuestionInput, ReplaceQuestionsRequest},
        user::{Role, User},
    },
    utils::{hash::hash_password, jwt::Claims},
};

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, role, created_at
        FROM users
        ORDER BY id DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(users))
}

/// DTO for Admin creating a user (can specify role).
#[derive(Debug, Deserialize, Validate)]
pub struct AdminCreateUserRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username length must be between 3 and 50 characters."
    ))]
    pub username: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    /// 'trainee' or 'admin'.
    pub role: String,
}

/// Creates a new user with a specific role.
/// Admin only.
pub async fn create_user(
    State(pool): State<PgPool>,
    Json(payload): Json<AdminCreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let role = Role::parse(&payload.role)
        .ok_or(AppError::BadRequest("Role must be 'trainee' or 'admin'".to_string()))?;

    let hashed_password = hash_password(&payload.password)?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO users (username, password, role)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(&payload.username)
    .bind(&hashed_password)
    .bind(role.as_str())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
            AppError::Conflict(format!("Username '{}' already exists", payload.username))
        } else {
            tracing::error!("Failed to create user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// DTO for updating a user. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct AdminUpdateUserRequest {
    pub username: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}

/// Updates user information.
/// Admin only.
pub async fn update_user(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Check existence
    let _exists: i64 = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    // Perform updates sequentially if fields are present
    if let Some(new_username) = payload.username {
        sqlx::query("UPDATE users SET username = $1 WHERE id = $2")
            .bind(new_username)
            .bind(id)
            .execute(&pool)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    }

    if let Some(new_role) = payload.role {
        let role = Role::parse(&new_role)
            .ok_or(AppError::BadRequest("Role must be 'trainee' or 'admin'".to_string()))?;
        sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role.as_str())
            .bind(id)
            .execute(&pool)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    }

    if let Some(new_password) = payload.password {
        let hashed = hash_password(&new_password)?;
        sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
            .bind(hashed)
            .bind(id)
            .execute(&pool)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    }

    Ok(StatusCode::OK)
}

/// Deletes a user by ID.
/// Admin only. Prevents deleting self. The user's attempts survive; the
/// analytics aggregator falls back to a placeholder name for them.
pub async fn delete_user(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    // Prevent self-deletion
    if id == claims.user_id() {
        return Err(AppError::BadRequest("Cannot delete yourself".to_string()));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Inserts authored questions for a quiz inside an open transaction.
///
/// Options reference their question, so each question row is written first
/// and its `correct_option_id` patched once the chosen option's id exists.
/// This is what makes the correct option a reference rather than an index.
async fn insert_questions(
    tx: &mut Transaction<'_, Postgres>,
    quiz_id: i64,
    questions: &[QuestionInput],
) -> Result<(), AppError> {
    for (position, question) in questions.iter().enumerate() {
        if question.correct_index >= question.options.len() {
            return Err(AppError::BadRequest(format!(
                "correct_index out of range for question {}",
                position + 1
            )));
        }

        let question_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO questions (quiz_id, position, text, points)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(quiz_id)
        .bind(position as i32)
        .bind(&question.text)
        .bind(question.points.unwrap_or(1))
        .fetch_one(&mut **tx)
        .await?;

        let mut correct_option_id: Option<i64> = None;

        for (option_position, text) in question.options.iter().enumerate() {
            let option_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO options (question_id, position, text)
                VALUES ($1, $2, $3)
                RETURNING id
                "#,
            )
            .bind(question_id)
            .bind(option_position as i32)
            .bind(text)
            .fetch_one(&mut **tx)
            .await?;

            if option_position == question.correct_index {
                correct_option_id = Some(option_id);
            }
        }

        if let Some(correct_id) = correct_option_id {
            sqlx::query("UPDATE questions SET correct_option_id = $1 WHERE id = $2")
                .bind(correct_id)
                .bind(question_id)
                .execute(&mut **tx)
                .await?;
        }
    }

    Ok(())
}

/// Creates a new quiz with its initial questions in one transaction.
/// Admin only.
pub async fn create_quiz(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut tx = pool.begin().await?;

    let quiz_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO quizzes (title, description)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .fetch_one(&mut *tx)
    .await?;

    insert_questions(&mut tx, quiz_id, &payload.questions).await?;

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to create quiz: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": quiz_id}))))
}

/// Replaces a quiz's questions wholesale: delete + reinsert in one
/// transaction. Existing options are destroyed with their questions, so the
/// correctness flag of any surviving physical option never changes.
/// Admin only.
pub async fn replace_questions(
    State(pool): State<PgPool>,
    State(cache): State<QuizCache>,
    Path(id): Path<i64>,
    Json(payload): Json<ReplaceQuestionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let _exists: i64 = sqlx::query_scalar("SELECT id FROM quizzes WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let mut tx = pool.begin().await?;

    // Cascades to the old questions' options.
    sqlx::query("DELETE FROM questions WHERE quiz_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    insert_questions(&mut tx, id, &payload.questions).await?;

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to replace questions for quiz {}: {:?}", id, e);
        AppError::InternalServerError(e.to_string())
    })?;

    cache.invalidate(id).await;

    Ok(StatusCode::OK)
}

/// Deletes a quiz by ID. Cascades to its questions and options. Historical
/// attempts are retained and show a placeholder title in analytics.
/// Admin only.
pub async fn delete_quiz(
    State(pool): State<PgPool>,
    State(cache): State<QuizCache>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete quiz: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    cache.invalidate(id).await;

    Ok(StatusCode::NO_CONTENT)
}
