// tests/common/mod.rs

#![allow(dead_code)]

pub mod memory;

use std::sync::Arc;

use quiz_api::{config::Config, routes, state::AppState, store::DynStore};
use serde_json::{Value, json};

pub use memory::MemoryStore;

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
    pub upload_dir: String,
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

pub fn test_config(upload_dir: &str) -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        port: 0,
        upload_dir: upload_dir.to_string(),
        max_connections: 1,
        allowed_origins: vec!["http://localhost:3000".to_string()],
    }
}

/// Spawns the app on a random port backed by a fresh in-memory store.
pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::default());
    let dyn_store: DynStore = store.clone();
    let (address, upload_dir) = serve(dyn_store).await;

    TestApp {
        address,
        client: reqwest::Client::new(),
        store,
        upload_dir,
    }
}

/// Binds the router over `store` to 127.0.0.1:0 and returns the base URL
/// and the upload directory it writes to.
pub async fn serve(store: DynStore) -> (String, String) {
    let upload_dir = std::env::temp_dir()
        .join(format!("quiz-api-test-{}", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .to_string();

    let state = AppState {
        store,
        config: test_config(&upload_dir),
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://127.0.0.1:{}", port), upload_dir)
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Registers a fresh user and logs them in.
    pub async fn user(&self, name: &str) -> TestUser {
        register_and_login(&self.client, &self.address, name).await
    }

    pub async fn create_quiz(&self, user: &TestUser, body: Value) -> Value {
        let resp = self
            .client
            .post(self.url("/api/users/quizzes"))
            .bearer_auth(&user.token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 201);
        resp.json::<Value>().await.unwrap()["quiz"].clone()
    }

    pub async fn submit(&self, user: &TestUser, quiz_id: &str, correct: i32, total: i32) -> Value {
        let resp = self
            .client
            .post(self.url("/api/results/submit"))
            .bearer_auth(&user.token)
            .json(&json!({
                "quiz_id": quiz_id,
                "correct_answers": correct,
                "wrong_answers": total - correct,
                "unanswered": 0,
                "total_questions": total,
                "time_taken": 5
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 201);
        resp.json().await.unwrap()
    }
}

pub async fn register_and_login(client: &reqwest::Client, address: &str, name: &str) -> TestUser {
    let suffix = &uuid::Uuid::new_v4().to_string()[..8];
    let email = format!("{}_{}@example.com", name, suffix);

    let resp = client
        .post(format!("{}/api/users/register", address))
        .json(&json!({
            "email": email,
            "password": "password123",
            "username": format!("{}_{}", name, suffix),
            "name": name
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let body: Value = resp.json().await.unwrap();
    let id = body["user"]["id"].as_str().unwrap().to_string();

    let resp = client
        .post(format!("{}/api/users/login", address))
        .json(&json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();

    TestUser { id, email, token }
}
