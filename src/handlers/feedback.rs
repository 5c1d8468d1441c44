// src/handlers/feedback.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::feedback::{
        CreateFeedbackRequest, Feedback, FeedbackWithAuthor, RespondFeedbackRequest,
    },
    utils::{html::clean_html, jwt::Claims},
};

/// Submits a feedback entry from the current user.
pub async fn submit_feedback(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateFeedbackRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let feedback = sqlx::query_as::<_, Feedback>(
        r#"
        INSERT INTO feedback (user_id, message)
        VALUES ($1, $2)
        RETURNING id, user_id, message, response, created_at, responded_at
        "#,
    )
    .bind(claims.user_id())
    .bind(clean_html(&payload.message))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to submit feedback: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(feedback)))
}

/// Lists the current user's feedback with any admin responses.
pub async fn my_feedback(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let feedback = sqlx::query_as::<_, Feedback>(
        r#"
        SELECT id, user_id, message, response, created_at, responded_at
        FROM feedback
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(claims.user_id())
    .fetch_all(&pool)
    .await?;

    Ok(Json(feedback))
}

/// Lists all feedback entries with their authors.
/// Admin only.
pub async fn list_feedback(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let feedback = sqlx::query_as::<_, FeedbackWithAuthor>(
        r#"
        SELECT f.id, f.user_id, u.username, f.message, f.response, f.created_at, f.responded_at
        FROM feedback f
        LEFT JOIN users u ON f.user_id = u.id
        ORDER BY f.created_at DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(feedback))
}

/// Records an admin response on a feedback entry.
/// Admin only.
pub async fn respond_feedback(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<RespondFeedbackRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let result = sqlx::query(
        r#"
        UPDATE feedback
        SET response = $1, responded_at = NOW()
        WHERE id = $2
        "#,
    )
    .bind(clean_html(&payload.response))
    .bind(id)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to respond to feedback: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Feedback not found".to_string()));
    }

    Ok(StatusCode::OK)
}
