#![allow(dead_code)]

use std::sync::Arc;

use client::config::ClientConfig;
use client::storage::{DurableStorage, MemoryStorage};
use client::AppContext;
use secrecy::SecretString;
use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TIMEOUT_SECS: u64 = 1;

/// Client configuration pointing at the mock server's `/api` prefix.
pub fn test_config(server: &MockServer) -> anyhow::Result<ClientConfig> {
    Ok(ClientConfig {
        api_url: Url::parse(&format!("{}/api", server.uri()))?,
        request_timeout_secs: TEST_TIMEOUT_SECS,
        session_file: None,
    })
}

pub struct TestApp {
    pub server: MockServer,
    pub storage: Arc<MemoryStorage>,
    pub context: AppContext,
}

impl TestApp {
    /// A restored, unauthenticated client talking to a fresh mock server.
    pub async fn start() -> anyhow::Result<Self> {
        let server = MockServer::start().await;
        let storage = Arc::new(MemoryStorage::new());
        let context = AppContext::with_storage(
            test_config(&server)?,
            storage.clone() as Arc<dyn DurableStorage>,
        )?;
        Ok(Self {
            server,
            storage,
            context,
        })
    }

    /// Same as `start`, already logged in as user 42 with token `tok1`.
    pub async fn signed_in() -> anyhow::Result<Self> {
        let app = Self::start().await?;
        app.context.session.login("tok1", 42)?;
        Ok(app)
    }

    pub async fn mount_login(&self, token: &str, user_id: i64) {
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Login successful",
                "access_token": token,
                "user_id": user_id,
            })))
            .mount(&self.server)
            .await;
    }
}

pub fn password(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

pub fn workout_json(id: i64, date: &str) -> Value {
    json!({
        "id": id,
        "date": date,
        "template_id": null,
        "exercises": [{
            "id": id * 10,
            "name": "Squat",
            "sets": [{ "id": id * 100, "set_number": 1, "reps": 5, "weight": 100.0 }],
        }],
    })
}

pub fn weight_json(id: i64, date: &str, weight: f64) -> Value {
    json!({ "id": id, "date": date, "weight": weight })
}

pub fn nutrition_json(id: i64, date: &str) -> Value {
    json!({
        "id": id,
        "date": date,
        "protein": 150.0,
        "carbs": 200.0,
        "fats": 70.0,
        "calories": 2100.0,
    })
}

pub fn goal_json(id: i64, completed: bool) -> Value {
    json!({
        "id": id,
        "goal_type": "workout_count",
        "target_value": 12.0,
        "current_value": 4.0,
        "period": "month",
        "completed": completed,
        "created_at": "2024-01-01T00:00:00",
    })
}
