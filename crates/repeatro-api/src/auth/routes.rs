use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use repeatro_db::repositories::user as user_repo;
use repeatro_db::models::UserProfile;

use super::{
    middleware::AuthUser,
    models::{AdminResponse, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    service,
};
use crate::{
    ApiState, error::ApiError, metrics::record_auth_event, middleware::rate_limit,
    validation::validate_payload,
};

pub fn routes() -> Router<ApiState> {
    use crate::make_rate_limit_layer;

    // Unauthenticated endpoints are the brute-force targets
    let public_routes = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .layer(make_rate_limit_layer!(
            rate_limit::AUTH_REPLENISH_SECONDS,
            rate_limit::AUTH_BURST_SIZE
        ));

    let authenticated_routes = Router::new()
        .route("/auth/me", get(me))
        .route("/auth/admin", get(admin));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
}

async fn register(
    State(state): State<ApiState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    validate_payload(&request)?;

    let email = request.email.trim().to_lowercase();
    let result = service::register_user(
        &state.pool,
        &email,
        request.name.trim(),
        &request.password,
        state.bcrypt_cost,
    )
    .await;
    record_auth_event("register", result.is_ok());

    let user_id = result?;
    tracing::info!(%user_id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            message: "User registered successfully".to_string(),
        }),
    ))
}

async fn login(
    State(state): State<ApiState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    validate_payload(&request)?;

    let email = request.email.trim().to_lowercase();
    let result = service::login(
        &state.pool,
        &email,
        &request.password,
        &state.jwt_secret,
        state.jwt_expiry_hours,
    )
    .await;
    record_auth_event("login", result.is_ok());

    let (token, user_id) = result?;
    tracing::info!(%user_id, "user logged in");

    Ok(Json(LoginResponse { token, user_id }))
}

async fn me(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = user_repo::find_profile_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(profile))
}

async fn admin(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<AdminResponse>, ApiError> {
    let is_admin = user_repo::is_admin(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(AdminResponse { is_admin }))
}
