use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::Utc;
use repeatro_db::{models::ReviewFilter, repositories::review as review_repo};

use super::model::{AverageGradeResponse, ReviewCountResponse, StatsQuery};
use crate::{ApiState, auth::AuthUser, error::ApiError};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/stats/average", get(average_grade))
        .route("/stats/count", get(review_count))
}

fn review_filter(auth_user: &AuthUser, query: &StatsQuery) -> Result<ReviewFilter, ApiError> {
    let (from, to) = query.time_range()?.bounds(Utc::now());

    Ok(ReviewFilter {
        user_id: auth_user.user_id,
        deck_id: query.deck_id,
        from,
        to,
    })
}

async fn average_grade(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<AverageGradeResponse>, ApiError> {
    let filter = review_filter(&auth_user, &query)?;
    let average_grade = review_repo::average_grade(&state.pool, &filter).await?;

    Ok(Json(AverageGradeResponse { average_grade }))
}

async fn review_count(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ReviewCountResponse>, ApiError> {
    let filter = review_filter(&auth_user, &query)?;
    let count = review_repo::count_reviews(&state.pool, &filter).await?;

    Ok(Json(ReviewCountResponse { count }))
}
