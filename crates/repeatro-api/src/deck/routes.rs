use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use repeatro_db::{
    models::{Card, Deck, DeckAccess},
    repositories::{card as card_repo, deck as deck_repo},
};
use uuid::Uuid;

use super::model::CreateDeckRequest;
use crate::{
    ApiState,
    auth::AuthUser,
    card::routes::load_owned_card,
    error::ApiError,
    validation::{validate_not_blank, validate_payload},
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/decks", post(create_deck).get(list_decks))
        .route("/decks/search", get(list_public_decks))
        .route("/decks/search/{user_id}", get(list_user_public_decks))
        .route("/decks/{id}", get(get_deck).delete(delete_deck))
        .route("/decks/{id}/cards", get(list_deck_cards))
        .route("/decks/{id}/cards/{card_id}", post(add_card_to_deck))
}

async fn load_deck_access(state: &ApiState, deck_id: Uuid) -> Result<DeckAccess, ApiError> {
    deck_repo::find_deck_access(&state.pool, deck_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Deck not found".to_string()))
}

/// Owners can read their decks, everyone can read public ones.
fn ensure_readable(access: &DeckAccess, user_id: Uuid) -> Result<(), ApiError> {
    if access.is_public || access.created_by == user_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden("This deck is private".to_string()))
    }
}

fn ensure_owner(access: &DeckAccess, user_id: Uuid) -> Result<(), ApiError> {
    if access.created_by == user_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You can only modify your own decks".to_string(),
        ))
    }
}

async fn create_deck(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(request): Json<CreateDeckRequest>,
) -> Result<(StatusCode, Json<Deck>), ApiError> {
    validate_payload(&request)?;
    validate_not_blank("name", &request.name)?;

    let deck = deck_repo::insert_deck(
        &state.pool,
        auth_user.user_id,
        request.name.trim(),
        request.description.as_deref(),
        request.is_public,
    )
    .await?;

    tracing::info!(deck_id = %deck.id, user_id = %auth_user.user_id, "deck created");

    Ok((StatusCode::CREATED, Json(deck)))
}

async fn list_decks(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<Deck>>, ApiError> {
    let decks = deck_repo::list_decks_by_owner(&state.pool, auth_user.user_id).await?;
    Ok(Json(decks))
}

async fn list_public_decks(
    _auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<Deck>>, ApiError> {
    let decks = deck_repo::list_public_decks(&state.pool).await?;
    Ok(Json(decks))
}

async fn list_user_public_decks(
    _auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Deck>>, ApiError> {
    let decks = deck_repo::list_public_decks_by_owner(&state.pool, user_id).await?;
    Ok(Json(decks))
}

async fn get_deck(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<Deck>, ApiError> {
    let deck = deck_repo::find_deck(&state.pool, deck_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Deck not found".to_string()))?;

    ensure_readable(
        &DeckAccess {
            created_by: deck.created_by,
            is_public: deck.is_public,
        },
        auth_user.user_id,
    )?;

    Ok(Json(deck))
}

async fn list_deck_cards(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<Vec<Card>>, ApiError> {
    let access = load_deck_access(&state, deck_id).await?;
    ensure_readable(&access, auth_user.user_id)?;

    let cards = card_repo::list_cards_in_deck(&state.pool, deck_id).await?;
    Ok(Json(cards))
}

/// Delete a deck. Its cards are kept and detached from it.
async fn delete_deck(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(deck_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let access = load_deck_access(&state, deck_id).await?;
    ensure_owner(&access, auth_user.user_id)?;

    if !deck_repo::delete_deck(&state.pool, deck_id).await? {
        return Err(ApiError::NotFound("Deck not found".to_string()));
    }

    tracing::info!(%deck_id, user_id = %auth_user.user_id, "deck deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn add_card_to_deck(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path((deck_id, card_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let access = load_deck_access(&state, deck_id).await?;
    ensure_owner(&access, auth_user.user_id)?;
    load_owned_card(&state, card_id, auth_user.user_id).await?;

    card_repo::set_card_deck(&state.pool, card_id, Some(deck_id)).await?;

    tracing::info!(%deck_id, %card_id, "card added to deck");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_deck_readable_by_owner_only() {
        let owner = Uuid::new_v4();
        let access = DeckAccess {
            created_by: owner,
            is_public: false,
        };

        assert!(ensure_readable(&access, owner).is_ok());
        assert!(matches!(
            ensure_readable(&access, Uuid::new_v4()),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn test_public_deck_readable_by_anyone_but_owned_by_one() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let access = DeckAccess {
            created_by: owner,
            is_public: true,
        };

        assert!(ensure_readable(&access, stranger).is_ok());
        assert!(ensure_owner(&access, owner).is_ok());
        assert!(ensure_owner(&access, stranger).is_err());
    }
}
