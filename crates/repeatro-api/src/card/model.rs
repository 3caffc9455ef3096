use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCardRequest {
    #[validate(length(min = 1, max = 100))]
    pub word: String,
    #[validate(length(min = 1, max = 100))]
    pub translation: String,
    pub deck_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
}

/// Partial update of a card's content. Scheduling fields cannot be set here.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCardRequest {
    #[validate(length(min = 1, max = 100))]
    pub word: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub translation: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

/// One graded answer. The grade is checked against 0..=5 before any card is read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub card_id: Uuid,
    pub grade: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedAnswer {
    pub card_id: Uuid,
    pub error: String,
}

/// Result of a batch of answers.
///
/// `applied` answers updated the card and were logged, `skipped` ones hit a
/// card that was not due yet. Everything else is listed in `failed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerReport {
    pub message: String,
    pub applied: usize,
    pub skipped: usize,
    pub failed: Vec<FailedAnswer>,
}
