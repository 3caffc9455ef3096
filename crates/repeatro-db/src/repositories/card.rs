use chrono::{DateTime, Utc};
use repeatro_srs::SchedulingState;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Card, CardContentUpdate, NewCard};

pub async fn insert_card<'e, E>(executor: E, card: &NewCard<'_>) -> Result<Card, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO cards (created_by, deck_id, word, translation, tags, is_public,
                               interval_minutes, easiness, repetitions, next_review_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, created_by, deck_id, word, translation, tags, is_public,
                      interval_minutes, easiness, repetitions, next_review_at, created_at, updated_at
        "#,
    )
    .bind(card.created_by)
    .bind(card.deck_id)
    .bind(card.word)
    .bind(card.translation)
    .bind(card.tags)
    .bind(card.is_public)
    .bind(card.schedule.interval)
    .bind(card.schedule.easiness)
    .bind(card.schedule.repetitions)
    .bind(card.schedule.next_review_at)
    .fetch_one(executor)
    .await
}

pub async fn find_card<'e, E>(executor: E, card_id: Uuid) -> Result<Option<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, created_by, deck_id, word, translation, tags, is_public,
                   interval_minutes, easiness, repetitions, next_review_at, created_at, updated_at
            FROM cards
            WHERE id = $1
        "#,
    )
    .bind(card_id)
    .fetch_optional(executor)
    .await
}

/// Lock the card row until the surrounding transaction ends.
///
/// Concurrent reviews of the same card serialize on this lock, so each one
/// schedules from the state the previous one wrote.
pub async fn find_card_for_update<'e, E>(
    executor: E,
    card_id: Uuid,
) -> Result<Option<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, created_by, deck_id, word, translation, tags, is_public,
                   interval_minutes, easiness, repetitions, next_review_at, created_at, updated_at
            FROM cards
            WHERE id = $1
            FOR UPDATE
        "#,
    )
    .bind(card_id)
    .fetch_optional(executor)
    .await
}

pub async fn list_cards_by_owner<'e, E>(executor: E, owner: Uuid) -> Result<Vec<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, created_by, deck_id, word, translation, tags, is_public,
                   interval_minutes, easiness, repetitions, next_review_at, created_at, updated_at
            FROM cards
            WHERE created_by = $1
            ORDER BY created_at
        "#,
    )
    .bind(owner)
    .fetch_all(executor)
    .await
}

/// Cards of `owner` whose review time has come, most overdue first.
pub async fn list_due_cards<'e, E>(
    executor: E,
    owner: Uuid,
    now: DateTime<Utc>,
) -> Result<Vec<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, created_by, deck_id, word, translation, tags, is_public,
                   interval_minutes, easiness, repetitions, next_review_at, created_at, updated_at
            FROM cards
            WHERE created_by = $1 AND next_review_at <= $2
            ORDER BY next_review_at
        "#,
    )
    .bind(owner)
    .bind(now)
    .fetch_all(executor)
    .await
}

pub async fn list_public_cards<'e, E>(executor: E) -> Result<Vec<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, created_by, deck_id, word, translation, tags, is_public,
                   interval_minutes, easiness, repetitions, next_review_at, created_at, updated_at
            FROM cards
            WHERE is_public
            ORDER BY created_at DESC
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn list_public_cards_by_owner<'e, E>(
    executor: E,
    owner: Uuid,
) -> Result<Vec<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, created_by, deck_id, word, translation, tags, is_public,
                   interval_minutes, easiness, repetitions, next_review_at, created_at, updated_at
            FROM cards
            WHERE created_by = $1 AND is_public
            ORDER BY created_at DESC
        "#,
    )
    .bind(owner)
    .fetch_all(executor)
    .await
}

pub async fn list_cards_in_deck<'e, E>(executor: E, deck_id: Uuid) -> Result<Vec<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, created_by, deck_id, word, translation, tags, is_public,
                   interval_minutes, easiness, repetitions, next_review_at, created_at, updated_at
            FROM cards
            WHERE deck_id = $1
            ORDER BY created_at
        "#,
    )
    .bind(deck_id)
    .fetch_all(executor)
    .await
}

/// Update the editable fields of a card. Scheduling columns are untouched.
pub async fn update_card_content<'e, E>(
    executor: E,
    card_id: Uuid,
    update: &CardContentUpdate<'_>,
) -> Result<Option<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE cards
            SET word = COALESCE($2, word),
                translation = COALESCE($3, translation),
                tags = COALESCE($4, tags),
                is_public = COALESCE($5, is_public),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, created_by, deck_id, word, translation, tags, is_public,
                      interval_minutes, easiness, repetitions, next_review_at, created_at, updated_at
        "#,
    )
    .bind(card_id)
    .bind(update.word)
    .bind(update.translation)
    .bind(update.tags)
    .bind(update.is_public)
    .fetch_optional(executor)
    .await
}

/// Overwrite the four scheduling columns with a reviewed state.
pub async fn update_schedule<'e, E>(
    executor: E,
    card_id: Uuid,
    schedule: &SchedulingState,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE cards
            SET interval_minutes = $2,
                easiness = $3,
                repetitions = $4,
                next_review_at = $5,
                updated_at = NOW()
            WHERE id = $1
        "#,
    )
    .bind(card_id)
    .bind(schedule.interval)
    .bind(schedule.easiness)
    .bind(schedule.repetitions)
    .bind(schedule.next_review_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn set_card_deck<'e, E>(
    executor: E,
    card_id: Uuid,
    deck_id: Option<Uuid>,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE cards
            SET deck_id = $2, updated_at = NOW()
            WHERE id = $1
        "#,
    )
    .bind(card_id)
    .bind(deck_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Returns `false` when no card was deleted.
pub async fn delete_card<'e, E>(executor: E, card_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM cards
            WHERE id = $1
        "#,
    )
    .bind(card_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
