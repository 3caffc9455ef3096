use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request, StatusCode},
};
use chrono::Duration;
use http_body_util::BodyExt;
use repeatro_api::{config::Environment, router, state::ApiState};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::sync::OnceCell;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test_jwt_secret_minimum_32_characters_long";

/// Migrations run once per test binary.
static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Test state builder for creating an `ApiState` backed by a real database
pub struct TestStateBuilder {
    first_review_delay: Duration,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            // New cards are due immediately unless a test asks otherwise
            first_review_delay: Duration::zero(),
        }
    }

    pub fn first_review_delay(mut self, delay: Duration) -> Self {
        self.first_review_delay = delay;
        self
    }

    /// `None` when `TEST_DATABASE_URL` is not set; the calling test should return.
    pub async fn build(self) -> Option<ApiState> {
        let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping database test");
            return None;
        };

        let pool = repeatro_db::create_pool(&database_url, 5)
            .await
            .expect("Failed to connect to test database");

        MIGRATED
            .get_or_init(|| async {
                repeatro_db::ensure_db_and_migrate(&database_url, &pool)
                    .await
                    .expect("Failed to migrate test database");
            })
            .await;

        Some(ApiState {
            pool,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            jwt_expiry_hours: 24,
            environment: Environment::Development,
            bcrypt_cost: 4,
            first_review_delay: self.first_review_delay,
        })
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the state or return from the test when no database is configured.
macro_rules! test_state {
    () => {
        match $crate::common::TestStateBuilder::new().build().await {
            Some(state) => state,
            None => return,
        }
    };
    ($builder:expr) => {
        match $builder.build().await {
            Some(state) => state,
            None => return,
        }
    };
}

/// Helper to make requests to the test app
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new(state: ApiState) -> Self {
        Self {
            router: router::router().with_state(state),
        }
    }

    /// Send a request and collect the response
    pub async fn request(&self, mut request: Request<Body>) -> TestResponse {
        // The IP-keyed rate limiter needs connect info
        let test_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080);
        request.extensions_mut().insert(ConnectInfo(test_addr));

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            body: body_bytes.to_vec(),
            headers,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<&serde_json::Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", "127.0.0.1");

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.request(request).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn post_json(&self, uri: &str, body: &serde_json::Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body), None).await
    }

    pub async fn get_with_auth(&self, uri: &str, token: &str) -> TestResponse {
        self.send(Method::GET, uri, None, Some(token)).await
    }

    pub async fn post_with_auth(&self, uri: &str, token: &str) -> TestResponse {
        self.send(Method::POST, uri, None, Some(token)).await
    }

    pub async fn post_json_with_auth(
        &self,
        uri: &str,
        body: &serde_json::Value,
        token: &str,
    ) -> TestResponse {
        self.send(Method::POST, uri, Some(body), Some(token)).await
    }

    pub async fn put_json_with_auth(
        &self,
        uri: &str,
        body: &serde_json::Value,
        token: &str,
    ) -> TestResponse {
        self.send(Method::PUT, uri, Some(body), Some(token)).await
    }

    pub async fn delete_with_auth(&self, uri: &str, token: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None, Some(token)).await
    }
}

/// Test response wrapper
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: axum::http::HeaderMap,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Response body is not valid UTF-8")
    }

    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
    }
}

/// A registered user with a valid token
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

impl TestUser {
    pub async fn create(state: &ApiState, base: &str) -> Self {
        let email = test_data::unique_email(base);
        let id = db::create_user(&state.pool, &email, base, "password123")
            .await
            .expect("Failed to create test user");
        let token = jwt::create_test_token(id, &email, &state.jwt_secret);
        Self { id, email, token }
    }

    /// Delete the user; cards, decks and reviews cascade.
    pub async fn cleanup(self, state: &ApiState) {
        db::delete_user(&state.pool, self.id)
            .await
            .expect("Failed to cleanup test user");
    }
}

/// Database test helper functions
pub mod db {
    use repeatro_db::{models::Card, repositories};
    use sqlx::PgPool;
    use uuid::Uuid;

    pub async fn create_user(
        pool: &PgPool,
        email: &str,
        name: &str,
        password: &str,
    ) -> anyhow::Result<Uuid> {
        let password_hash = bcrypt::hash(password, 4)?;
        Ok(repositories::user::create_user(pool, name, email, &password_hash).await?)
    }

    pub async fn delete_user(pool: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn find_user_id_by_email(pool: &PgPool, email: &str) -> anyhow::Result<Option<Uuid>> {
        Ok(sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?)
    }

    pub async fn card(pool: &PgPool, card_id: Uuid) -> Card {
        repositories::card::find_card(pool, card_id)
            .await
            .expect("Failed to load card")
            .expect("Card should exist")
    }

    /// Make a card due right now without touching the rest of its state.
    pub async fn make_due(pool: &PgPool, card_id: Uuid) {
        sqlx::query("UPDATE cards SET next_review_at = NOW() - INTERVAL '1 second' WHERE id = $1")
            .bind(card_id)
            .execute(pool)
            .await
            .expect("Failed to make card due");
    }

    pub async fn make_not_due(pool: &PgPool, card_id: Uuid) {
        sqlx::query("UPDATE cards SET next_review_at = NOW() + INTERVAL '1 hour' WHERE id = $1")
            .bind(card_id)
            .execute(pool)
            .await
            .expect("Failed to push card review into the future");
    }

    pub async fn review_count(pool: &PgPool, card_id: Uuid) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE card_id = $1")
            .bind(card_id)
            .fetch_one(pool)
            .await
            .expect("Failed to count reviews")
    }
}

/// JWT test helpers
pub mod jwt {
    use repeatro_api::auth::jwt::generate_jwt_token;
    use uuid::Uuid;

    pub fn create_test_token(user_id: Uuid, email: &str, jwt_secret: &str) -> String {
        generate_jwt_token(user_id, email.to_string(), jwt_secret, 24)
            .expect("Failed to generate test JWT token")
    }
}

/// Test data helpers
pub mod test_data {
    use serde_json::{Value, json};

    /// Unique email so concurrently running tests never collide
    pub fn unique_email(base: &str) -> String {
        let uuid = uuid::Uuid::new_v4();
        format!("{}+{}@example.com", base, &uuid.to_string()[..8])
    }

    pub fn card(word: &str, translation: &str) -> Value {
        json!({ "word": word, "translation": translation })
    }
}

/// Card helpers over the HTTP API
pub mod cards {
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use uuid::Uuid;

    use super::{TestClient, test_data};

    pub async fn create(client: &TestClient, token: &str, word: &str) -> Uuid {
        let response = client
            .post_json_with_auth("/cards", &test_data::card(word, "translation"), token)
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        body["id"].as_str().unwrap().parse().unwrap()
    }

    pub async fn answer(client: &TestClient, token: &str, answers: &[(Uuid, i32)]) -> Value {
        let body: Vec<Value> = answers
            .iter()
            .map(|(card_id, grade)| json!({ "card_id": card_id, "grade": grade }))
            .collect();
        let response = client
            .post_json_with_auth("/cards/answers", &Value::Array(body), token)
            .await;
        response.assert_status(StatusCode::OK);
        response.json()
    }
}
