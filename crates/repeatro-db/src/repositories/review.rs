use sqlx::{Executor, Postgres};

use crate::models::{NewReview, ReviewFilter};

/// Append one graded review to the log.
pub async fn insert_review<'e, E>(executor: E, review: &NewReview) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO reviews (user_id, deck_id, card_id, grade, created_at)
            VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(review.user_id)
    .bind(review.deck_id)
    .bind(review.card_id)
    .bind(review.grade)
    .bind(review.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Mean grade over the filtered reviews, `0.0` when there are none.
pub async fn average_grade<'e, E>(executor: E, filter: &ReviewFilter) -> Result<f64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COALESCE(AVG(grade)::FLOAT8, 0.0)
            FROM reviews
            WHERE user_id = $1
              AND ($2::UUID IS NULL OR deck_id = $2)
              AND created_at BETWEEN $3 AND $4
        "#,
    )
    .bind(filter.user_id)
    .bind(filter.deck_id)
    .bind(filter.from)
    .bind(filter.to)
    .fetch_one(executor)
    .await
}

pub async fn count_reviews<'e, E>(executor: E, filter: &ReviewFilter) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM reviews
            WHERE user_id = $1
              AND ($2::UUID IS NULL OR deck_id = $2)
              AND created_at BETWEEN $3 AND $4
        "#,
    )
    .bind(filter.user_id)
    .bind(filter.deck_id)
    .bind(filter.from)
    .bind(filter.to)
    .fetch_one(executor)
    .await
}
