// src/handlers/manual.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use validator::Validate;

use crate::{
    error::AppError,
    models::manual::{CreateManualRequest, Manual, UpdateManualRequest},
    utils::html::clean_html,
};

/// Lists all reference manuals.
pub async fn list_manuals(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let manuals = sqlx::query_as::<_, Manual>(
        "SELECT id, title, description, document_url, created_at FROM manuals ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(manuals))
}

/// Retrieves a single manual by ID.
pub async fn get_manual(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let manual = sqlx::query_as::<_, Manual>(
        "SELECT id, title, description, document_url, created_at FROM manuals WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Manual not found".to_string()))?;

    Ok(Json(manual))
}

/// Creates a new manual entry. The document itself lives in object storage;
/// only its URL is recorded here.
/// Admin only.
pub async fn create_manual(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateManualRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO manuals (title, description, document_url)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(&payload.title)
    .bind(clean_html(&payload.description))
    .bind(&payload.document_url)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create manual: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Updates a manual by ID.
/// Admin only.
pub async fn update_manual(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateManualRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.title.is_none() && payload.description.is_none() && payload.document_url.is_none() {
        return Ok(StatusCode::OK);
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE manuals SET ");
    let mut separated = builder.separated(", ");

    if let Some(title) = payload.title {
        separated.push("title = ");
        separated.push_bind_unseparated(title);
    }

    if let Some(description) = payload.description {
        separated.push("description = ");
        separated.push_bind_unseparated(clean_html(&description));
    }

    if let Some(document_url) = payload.document_url {
        separated.push("document_url = ");
        separated.push_bind_unseparated(document_url);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update manual: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Manual not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a manual by ID.
/// Admin only.
pub async fn delete_manual(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM manuals WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete manual: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Manual not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
