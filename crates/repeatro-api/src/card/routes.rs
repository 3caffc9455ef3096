use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::Utc;
use repeatro_db::{
    models::{Card, CardContentUpdate, NewCard},
    repositories::{card as card_repo, deck as deck_repo},
};
use repeatro_srs::SchedulingState;
use uuid::Uuid;

use super::{
    model::{AnswerReport, AnswerRequest, CreateCardRequest, UpdateCardRequest},
    service,
};
use crate::{
    ApiState,
    auth::AuthUser,
    error::ApiError,
    validation::{validate_not_blank, validate_payload, validate_tags},
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/cards", post(create_card).get(list_cards))
        .route("/cards/learn", get(list_due_cards))
        .route("/cards/search", get(list_public_cards))
        .route("/cards/search/{user_id}", get(list_user_public_cards))
        .route("/cards/answers", post(submit_answers))
        .route("/cards/{id}", put(update_card).delete(delete_card))
}

/// Load a card and make sure `user_id` owns it.
pub(crate) async fn load_owned_card(
    state: &ApiState,
    card_id: Uuid,
    user_id: Uuid,
) -> Result<Card, ApiError> {
    let card = card_repo::find_card(&state.pool, card_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;

    if card.created_by != user_id {
        return Err(ApiError::Forbidden(
            "You can only modify your own cards".to_string(),
        ));
    }

    Ok(card)
}

async fn create_card(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(request): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<Card>), ApiError> {
    validate_payload(&request)?;
    validate_not_blank("word", &request.word)?;
    validate_not_blank("translation", &request.translation)?;
    validate_tags(&request.tags)?;

    if let Some(deck_id) = request.deck_id {
        let access = deck_repo::find_deck_access(&state.pool, deck_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Deck not found".to_string()))?;
        if access.created_by != auth_user.user_id {
            return Err(ApiError::Forbidden(
                "You can only add cards to your own decks".to_string(),
            ));
        }
    }

    let card = card_repo::insert_card(
        &state.pool,
        &NewCard {
            created_by: auth_user.user_id,
            deck_id: request.deck_id,
            word: request.word.trim(),
            translation: request.translation.trim(),
            tags: &request.tags,
            is_public: request.is_public,
            schedule: SchedulingState::new(Utc::now(), state.first_review_delay),
        },
    )
    .await?;

    tracing::info!(card_id = %card.id, user_id = %auth_user.user_id, "card created");

    Ok((StatusCode::CREATED, Json(card)))
}

async fn list_cards(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<Card>>, ApiError> {
    let cards = card_repo::list_cards_by_owner(&state.pool, auth_user.user_id).await?;
    Ok(Json(cards))
}

async fn list_due_cards(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<Card>>, ApiError> {
    let cards = card_repo::list_due_cards(&state.pool, auth_user.user_id, Utc::now()).await?;
    Ok(Json(cards))
}

async fn list_public_cards(
    _auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<Card>>, ApiError> {
    let cards = card_repo::list_public_cards(&state.pool).await?;
    Ok(Json(cards))
}

async fn list_user_public_cards(
    _auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Card>>, ApiError> {
    let cards = card_repo::list_public_cards_by_owner(&state.pool, user_id).await?;
    Ok(Json(cards))
}

async fn update_card(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(card_id): Path<Uuid>,
    Json(request): Json<UpdateCardRequest>,
) -> Result<Json<Card>, ApiError> {
    validate_payload(&request)?;
    if let Some(word) = &request.word {
        validate_not_blank("word", word)?;
    }
    if let Some(translation) = &request.translation {
        validate_not_blank("translation", translation)?;
    }
    if let Some(tags) = &request.tags {
        validate_tags(tags)?;
    }

    load_owned_card(&state, card_id, auth_user.user_id).await?;

    let update = CardContentUpdate {
        word: request.word.as_deref().map(str::trim),
        translation: request.translation.as_deref().map(str::trim),
        tags: request.tags.as_deref(),
        is_public: request.is_public,
    };

    let card = card_repo::update_card_content(&state.pool, card_id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;

    Ok(Json(card))
}

async fn delete_card(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(card_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    load_owned_card(&state, card_id, auth_user.user_id).await?;

    if !card_repo::delete_card(&state.pool, card_id).await? {
        return Err(ApiError::NotFound("Card not found".to_string()));
    }

    tracing::info!(%card_id, user_id = %auth_user.user_id, "card deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Grade a batch of cards.
///
/// Responds 200 whenever the batch is well-formed; per-card problems are
/// listed in the report instead of failing the request.
async fn submit_answers(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(answers): Json<Vec<AnswerRequest>>,
) -> Result<Json<AnswerReport>, ApiError> {
    let answers = service::parse_answers(&answers)?;

    let report =
        service::submit_answers(&state.pool, auth_user.user_id, &answers, Utc::now()).await;

    Ok(Json(report))
}
