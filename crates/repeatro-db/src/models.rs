use chrono::{DateTime, Utc};
use repeatro_srs::SchedulingState;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view of a user account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

/// Login lookup row, never serialized
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

/// Flashcard with its scheduling state
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Card {
    pub id: Uuid,
    /// Owner; the only user allowed to review or edit the card
    pub created_by: Uuid,
    pub deck_id: Option<Uuid>,
    pub word: String,
    pub translation: String,
    pub tags: Vec<String>,
    pub is_public: bool,
    /// Minutes until the next review after the last one
    #[sqlx(rename = "interval_minutes")]
    pub interval: i32,
    pub easiness: f64,
    /// Consecutive successful reviews, reset on lapse
    pub repetitions: i32,
    pub next_review_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub fn scheduling_state(&self) -> SchedulingState {
        SchedulingState {
            interval: self.interval,
            easiness: self.easiness,
            repetitions: self.repetitions,
            next_review_at: self.next_review_at,
        }
    }
}

/// Fields required to insert a card
#[derive(Debug, Clone)]
pub struct NewCard<'a> {
    pub created_by: Uuid,
    pub deck_id: Option<Uuid>,
    pub word: &'a str,
    pub translation: &'a str,
    pub tags: &'a [String],
    pub is_public: bool,
    pub schedule: SchedulingState,
}

/// Editable card content; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct CardContentUpdate<'a> {
    pub word: Option<&'a str>,
    pub translation: Option<&'a str>,
    pub tags: Option<&'a [String]>,
    pub is_public: Option<bool>,
}

/// Deck with its current card count
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Deck {
    pub id: Uuid,
    pub created_by: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub cards_quantity: i64,
    pub created_at: DateTime<Utc>,
}

/// Owner and visibility of a deck, used for access checks
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct DeckAccess {
    pub created_by: Uuid,
    pub is_public: bool,
}

/// One graded review, as appended to the review log
#[derive(Debug, Clone, Copy)]
pub struct NewReview {
    pub user_id: Uuid,
    pub deck_id: Option<Uuid>,
    pub card_id: Uuid,
    pub grade: i32,
    pub created_at: DateTime<Utc>,
}

/// Filter shared by the review aggregates
#[derive(Debug, Clone, Copy)]
pub struct ReviewFilter {
    pub user_id: Uuid,
    pub deck_id: Option<Uuid>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}
