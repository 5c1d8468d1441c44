// src/handlers/analytics.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::PgPool;

use crate::{
    analytics::{self, AttemptRecord},
    error::AppError,
};

/// Optional filter for the attempt history scan.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryFilter {
    pub quiz_id: Option<i64>,
    pub user_id: Option<i64>,
}

/// Fetches the attempt history denormalized with quiz titles and usernames.
///
/// LEFT JOINs keep attempts whose quiz or user has since been deleted; the
/// aggregator substitutes placeholder labels for those. Ordered by insertion
/// so grouping encounter-order is deterministic.
pub(crate) async fn fetch_attempt_history(
    pool: &PgPool,
    filter: &HistoryFilter,
) -> Result<Vec<AttemptRecord>, AppError> {
    let attempts = sqlx::query_as::<_, AttemptRecord>(
        r#"
        SELECT
            a.quiz_id, a.user_id,
            z.title AS quiz_title,
            u.username,
            a.score, a.total_points
        FROM attempts a
        LEFT JOIN quizzes z ON a.quiz_id = z.id
        LEFT JOIN users u ON a.user_id = u.id
        WHERE ($1::BIGINT IS NULL OR a.quiz_id = $1)
          AND ($2::BIGINT IS NULL OR a.user_id = $2)
        ORDER BY a.id
        "#,
    )
    .bind(filter.quiz_id)
    .bind(filter.user_id)
    .fetch_all(pool)
    .await?;

    Ok(attempts)
}

/// Public leaderboard: top users by average score.
pub async fn get_leaderboard(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let attempts = fetch_attempt_history(&pool, &HistoryFilter::default()).await?;
    let summary = analytics::summarize(&attempts);
    Ok(Json(summary.leaderboard))
}

/// Full analytics summary over the (optionally filtered) attempt history.
/// Admin only.
pub async fn get_summary(
    State(pool): State<PgPool>,
    Query(filter): Query<HistoryFilter>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = fetch_attempt_history(&pool, &filter).await?;
    Ok(Json(analytics::summarize(&attempts)))
}
