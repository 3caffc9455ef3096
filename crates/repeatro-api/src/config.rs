use serde::Deserialize;
use thiserror::Error;

/// Minimum JWT secret length in bytes for HS256.
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} bytes, got {0}")]
    JwtSecretTooShort(usize),
    #[error("JWT_EXPIRY_HOURS must be positive, got {0}")]
    InvalidJwtExpiry(i64),
    #[error("FIRST_REVIEW_DELAY_SECONDS must not be negative, got {0}")]
    NegativeFirstReviewDelay(i64),
    #[error("ALLOWED_ORIGINS must contain at least one origin")]
    NoAllowedOrigins,
}

/// Service configuration, read from environment variables.
///
/// Field names map to upper-case variables (`database_url` reads `DATABASE_URL`).
#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub env: Environment,
    pub database_url: String,
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiry_hours")]
    pub jwt_expiry_hours: i64,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Comma separated list of origins
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    /// Delay before a freshly created card becomes due
    #[serde(default = "default_first_review_delay_seconds")]
    pub first_review_delay_seconds: i64,
}

fn default_jwt_expiry_hours() -> i64 {
    24
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_allowed_origins() -> String {
    "http://localhost:8080".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_first_review_delay_seconds() -> i64 {
    10
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::JwtSecretTooShort(self.jwt_secret.len()));
        }
        if self.jwt_expiry_hours <= 0 {
            return Err(ConfigError::InvalidJwtExpiry(self.jwt_expiry_hours));
        }
        if self.first_review_delay_seconds < 0 {
            return Err(ConfigError::NegativeFirstReviewDelay(
                self.first_review_delay_seconds,
            ));
        }
        if self.parsed_allowed_origins().is_empty() {
            return Err(ConfigError::NoAllowedOrigins);
        }
        Ok(())
    }

    pub fn parsed_allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
