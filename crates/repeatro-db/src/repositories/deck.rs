use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Deck, DeckAccess};

pub async fn insert_deck<'e, E>(
    executor: E,
    created_by: Uuid,
    name: &str,
    description: Option<&str>,
    is_public: bool,
) -> Result<Deck, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO decks (created_by, name, description, is_public)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_by, name, description, is_public, 0::BIGINT AS cards_quantity, created_at
        "#,
    )
    .bind(created_by)
    .bind(name)
    .bind(description)
    .bind(is_public)
    .fetch_one(executor)
    .await
}

pub async fn find_deck<'e, E>(executor: E, deck_id: Uuid) -> Result<Option<Deck>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT d.id, d.created_by, d.name, d.description, d.is_public,
                   (SELECT COUNT(*) FROM cards c WHERE c.deck_id = d.id) AS cards_quantity,
                   d.created_at
            FROM decks d
            WHERE d.id = $1
        "#,
    )
    .bind(deck_id)
    .fetch_optional(executor)
    .await
}

pub async fn find_deck_access<'e, E>(
    executor: E,
    deck_id: Uuid,
) -> Result<Option<DeckAccess>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT created_by, is_public
            FROM decks
            WHERE id = $1
        "#,
    )
    .bind(deck_id)
    .fetch_optional(executor)
    .await
}

pub async fn list_decks_by_owner<'e, E>(executor: E, owner: Uuid) -> Result<Vec<Deck>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT d.id, d.created_by, d.name, d.description, d.is_public,
                   (SELECT COUNT(*) FROM cards c WHERE c.deck_id = d.id) AS cards_quantity,
                   d.created_at
            FROM decks d
            WHERE d.created_by = $1
            ORDER BY d.created_at
        "#,
    )
    .bind(owner)
    .fetch_all(executor)
    .await
}

pub async fn list_public_decks<'e, E>(executor: E) -> Result<Vec<Deck>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT d.id, d.created_by, d.name, d.description, d.is_public,
                   (SELECT COUNT(*) FROM cards c WHERE c.deck_id = d.id) AS cards_quantity,
                   d.created_at
            FROM decks d
            WHERE d.is_public
            ORDER BY d.created_at DESC
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn list_public_decks_by_owner<'e, E>(
    executor: E,
    owner: Uuid,
) -> Result<Vec<Deck>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT d.id, d.created_by, d.name, d.description, d.is_public,
                   (SELECT COUNT(*) FROM cards c WHERE c.deck_id = d.id) AS cards_quantity,
                   d.created_at
            FROM decks d
            WHERE d.created_by = $1 AND d.is_public
            ORDER BY d.created_at DESC
        "#,
    )
    .bind(owner)
    .fetch_all(executor)
    .await
}

/// Cards in the deck are detached by the `ON DELETE SET NULL` foreign key.
pub async fn delete_deck<'e, E>(executor: E, deck_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM decks
            WHERE id = $1
        "#,
    )
    .bind(deck_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
