use sqlx::PgPool;
use uuid::Uuid;

use repeatro_db::repositories::user as user_repo;

use super::jwt;
use crate::error::ApiError;

/// Unique-violation SQLSTATE raised by Postgres.
const UNIQUE_VIOLATION: &str = "23505";

/// Hash the password and create the account. A taken email is a conflict.
pub async fn register_user(
    pool: &PgPool,
    email: &str,
    name: &str,
    password: &str,
    bcrypt_cost: u32,
) -> Result<Uuid, ApiError> {
    if user_repo::email_exists(pool, email).await? {
        return Err(ApiError::Conflict("Email is already registered".to_string()));
    }

    let password = password.to_owned();
    let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt_cost))
        .await
        .map_err(|e| ApiError::Internal(format!("password hashing task failed: {e}")))??;

    // A concurrent registration may win between the check and the insert
    user_repo::create_user(pool, name, email, &password_hash)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                ApiError::Conflict("Email is already registered".to_string())
            }
            _ => ApiError::Database(e),
        })
}

/// Check the credentials and issue an access token.
///
/// Unknown email and wrong password produce the same error.
pub async fn login(
    pool: &PgPool,
    email: &str,
    password: &str,
    jwt_secret: &str,
    jwt_expiry_hours: i64,
) -> Result<(String, Uuid), ApiError> {
    let invalid = || ApiError::Auth("Invalid credentials".to_string());

    let credentials = user_repo::find_credentials_by_email(pool, email)
        .await?
        .ok_or_else(invalid)?;

    let password = password.to_owned();
    let hash = credentials.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("password verification task failed: {e}")))??;

    if !matches {
        return Err(invalid());
    }

    let token = jwt::generate_jwt_token(
        credentials.id,
        credentials.email,
        jwt_secret,
        jwt_expiry_hours,
    )?;

    Ok((token, credentials.id))
}
