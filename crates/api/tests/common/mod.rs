#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use websurvey_api::auth::jwt::JwtConfig;
use websurvey_api::auth::password::hash_password;
use websurvey_api::config::ServerConfig;
use websurvey_api::router::build_app_router;
use websurvey_api::state::AppState;
use websurvey_api::storage::ImageStore;
use websurvey_db::models::user::{CreateUser, User};
use websurvey_db::repositories::UserRepo;

pub const PUBLIC_URL: &str = "http://localhost:3000";
pub const PASSWORD: &str = "Sup3r$ecret";

/// Build a test `ServerConfig` with safe defaults, storing images in `storage_dir`.
pub fn test_config(storage_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        public_url: PUBLIC_URL.to_string(),
        storage_dir: storage_dir.to_path_buf(),
        max_body_bytes: 10 * 1024 * 1024,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
            remember_expiry_days: 30,
        },
    }
}

/// Build the production router against `pool` and a fresh temporary storage
/// directory. Keep the returned `TempDir` alive for the test's duration.
pub fn build_test_app(pool: PgPool) -> (Router, TempDir) {
    let storage = tempfile::tempdir().expect("tempdir should be created");
    let config = test_config(storage.path());
    let images = ImageStore::new(&config.storage_dir, &config.public_url);

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        images: Arc::new(images),
    };
    (build_app_router(state, &config), storage)
}

/// Insert a user with [`PASSWORD`] directly in the database.
pub async fn create_user(pool: &PgPool, email: &str) -> User {
    let input = CreateUser {
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: hash_password(PASSWORD).expect("hashing should succeed"),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Create a user and log in through the API, returning the bearer token.
pub async fn login_token(app: &Router, pool: &PgPool, email: &str) -> String {
    create_user(pool, email).await;
    let body = serde_json::json!({ "email": email, "password": PASSWORD });
    let response = post_json(app.clone(), "/api/login", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let json = body_json(response).await;
    json["token"].as_str().expect("token should be a string").to_string()
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    app.oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Read a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}
