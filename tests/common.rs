use filament_tracker::{
    api::router::create_router,
    config::Config,
    infra::factory::bootstrap_state,
    state::AppState,
};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::Algorithm;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "adminpass";

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let config = Config {
            database_url: db_url,
            port: 0,
            auth_secret_key: "integration-test-secret".to_string(),
            auth_algorithm: Algorithm::HS256,
            token_ttl_minutes: 30,
            bootstrap_admin_username: ADMIN_USERNAME.to_string(),
            bootstrap_admin_password: Some(ADMIN_PASSWORD.to_string()),
            log_dir: "./logs".to_string(),
        };

        let state = Arc::new(bootstrap_state(&config).await.expect("Failed to bootstrap test state"));
        let router = create_router(state.clone());

        Self { router, db_filename, state }
    }

    /// Sends a JSON request and returns the status with the parsed body (`Null` if not JSON).
    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn try_login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        let payload = json!({ "username": username, "password": password });
        self.request(Method::POST, "/api/v1/auth/login", None, Some(payload)).await
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self.try_login(username, password).await;
        if !status.is_success() {
            panic!("Login failed in test helper: status {}, body {:?}", status, body);
        }
        body["access_token"].as_str().expect("No access_token in body").to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    pub async fn create_group(&self, token: &str, name: &str) -> i64 {
        let (status, body) = self.post("/api/v1/groups", token, json!({ "name": name })).await;
        assert_eq!(status, StatusCode::OK, "create group failed: {:?}", body);
        body["id"].as_i64().unwrap()
    }

    pub async fn create_user(&self, token: &str, username: &str, role: &str, group_id: Option<i64>) -> i64 {
        let payload = json!({
            "username": username,
            "password": "password123",
            "role": role,
            "group_id": group_id,
        });
        let (status, body) = self.post("/api/v1/users", token, payload).await;
        assert_eq!(status, StatusCode::OK, "create user failed: {:?}", body);
        body["id"].as_i64().unwrap()
    }

    pub async fn create_plastic_type(&self, token: &str, name: &str) -> i64 {
        let (status, body) = self.post("/api/v1/plastic-types", token, json!({ "name": name })).await;
        assert_eq!(status, StatusCode::OK, "create plastic type failed: {:?}", body);
        body["id"].as_i64().unwrap()
    }

    pub async fn create_spool(&self, token: &str, plastic_type_id: i64, weight: f64, group_id: Option<i64>) -> Value {
        let payload = json!({
            "plastic_type_id": plastic_type_id,
            "color": "Black",
            "weight_total": weight,
            "group_id": group_id,
        });
        let (status, body) = self.post("/api/v1/spools", token, payload).await;
        assert_eq!(status, StatusCode::OK, "create spool failed: {:?}", body);
        body
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.db_filename, suffix));
        }
    }
}
