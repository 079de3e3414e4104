//! HTTP-level integration tests for sign-up, login, logout and `/me`.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json, post_json_auth, PASSWORD};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Sign-up
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn sign_up_returns_user_and_token(pool: PgPool) {
    let (app, _storage) = common::build_test_app(pool);

    let body = serde_json::json!({
        "name": "Ada",
        "email": "Ada@Example.com",
        "password": PASSWORD,
        "password_confirmation": PASSWORD,
    });
    let response = post_json(app.clone(), "/api/sign-up", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["user"]["name"], "Ada");
    assert_eq!(json["user"]["email"], "ada@example.com");
    assert!(json["user"].get("password_hash").is_none());

    let token = json["token"].as_str().unwrap();
    let me = get_auth(app, "/api/me", token).await;
    assert_eq!(me.status(), StatusCode::OK);
    assert_eq!(body_json(me).await["email"], "ada@example.com");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sign_up_rejects_taken_email(pool: PgPool) {
    common::create_user(&pool, "taken@test.com").await;
    let (app, _storage) = common::build_test_app(pool);

    let body = serde_json::json!({
        "name": "Dup",
        "email": "taken@test.com",
        "password": PASSWORD,
        "password_confirmation": PASSWORD,
    });
    let response = post_json(app, "/api/sign-up", body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["errors"]["email"][0], "The email has already been taken.");
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sign_up_reports_every_invalid_field(pool: PgPool) {
    let (app, _storage) = common::build_test_app(pool);

    let body = serde_json::json!({
        "name": "",
        "email": "nope",
        "password": "weak",
        "password_confirmation": "weak",
    });
    let response = post_json(app, "/api/sign-up", body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["errors"]["name"][0], "The name field is required.");
    assert!(json["errors"]["email"].is_array());
    assert!(json["errors"]["password"].is_array());
    assert_eq!(json["message"], "The email field must be a valid email address. (and 5 more errors)");
}

// ---------------------------------------------------------------------------
// Login / logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn login_with_wrong_password_is_rejected(pool: PgPool) {
    common::create_user(&pool, "user@test.com").await;
    let (app, _storage) = common::build_test_app(pool);

    let body = serde_json::json!({ "email": "user@test.com", "password": "Wrong-pass1" });
    let response = post_json(app, "/api/login", body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["error"],
        "The provided credentials are not correct"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_with_unknown_email_is_rejected(pool: PgPool) {
    let (app, _storage) = common::build_test_app(pool);

    let body = serde_json::json!({ "email": "ghost@test.com", "password": PASSWORD });
    let response = post_json(app, "/api/login", body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_revokes_the_token(pool: PgPool) {
    let (app, _storage) = common::build_test_app(pool.clone());
    let token = common::login_token(&app, &pool, "bye@test.com").await;

    let response = post_json_auth(app.clone(), "/api/logout", serde_json::json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let me = get_auth(app, "/api/me", &token).await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn protected_routes_require_a_token(pool: PgPool) {
    let (app, _storage) = common::build_test_app(pool);

    assert_eq!(get(app.clone(), "/api/me").await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(get(app.clone(), "/api/survey").await.status(), StatusCode::UNAUTHORIZED);

    let forged = get_auth(app, "/api/me", "not.a.jwt").await;
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(forged).await["code"], "UNAUTHORIZED");
}
