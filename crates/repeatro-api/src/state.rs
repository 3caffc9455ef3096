use axum::extract::FromRef;
use chrono::Duration;
use sqlx::PgPool;

use crate::{ApiConfig, config::Environment};

#[derive(Clone, Debug)]
pub struct ApiState {
    pub pool: PgPool,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub environment: Environment,
    pub bcrypt_cost: u32,
    /// Grace period before a new card becomes due
    pub first_review_delay: Duration,
}

impl ApiState {
    pub fn new(config: &ApiConfig, pool: PgPool) -> Self {
        Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            jwt_expiry_hours: config.jwt_expiry_hours,
            environment: config.env,
            bcrypt_cost: config.bcrypt_cost,
            first_review_delay: Duration::seconds(config.first_review_delay_seconds),
        }
    }
}

/// The slice of state the `AuthUser` extractor needs.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl FromRef<ApiState> for AuthConfig {
    fn from_ref(state: &ApiState) -> Self {
        Self {
            jwt_secret: state.jwt_secret.clone(),
        }
    }
}
