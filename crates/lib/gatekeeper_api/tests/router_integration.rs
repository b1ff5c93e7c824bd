//! Router-level tests driven through `tower::ServiceExt::oneshot`.
//!
//! The pool is created lazily and never connected: every path exercised here
//! (liveness, auth-header handling, token validation) must make its decision
//! before touching the database.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use gatekeeper_api::config::ApiConfig;
use gatekeeper_api::AppState;
use gatekeeper_core::auth::token::{self, SigningConfig};

const TEST_SECRET: &str = "integration-test-secret";

fn state() -> AppState {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost:5432/gatekeeper_test")
        .expect("lazy pool");
    AppState {
        pool,
        config: ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            database_url: "postgres://localhost:5432/gatekeeper_test".into(),
            token_ttl_minutes: 30,
        },
        signing: SigningConfig::with_default_ttl(TEST_SECRET),
    }
}

fn app() -> axum::Router {
    gatekeeper_api::router(state()).expect("router builds")
}

#[tokio::test]
async fn health_is_public_and_db_free() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["message"], "ok");
}

#[tokio::test]
async fn protected_route_without_token_is_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/v1/users/me/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
}

#[tokio::test]
async fn non_bearer_scheme_is_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/v1/users/")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/v1/users/me/")
                .header(header::AUTHORIZATION, "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_401_before_any_lookup() {
    let signing = SigningConfig::with_default_ttl(TEST_SECRET);
    let expired = token::issue(&signing, Uuid::new_v4(), Some(Duration::seconds(-60))).unwrap();

    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/v1/users/me/")
                .header(header::AUTHORIZATION, format!("Bearer {expired}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_other_secret_is_401() {
    let other = SigningConfig::with_default_ttl("some-other-secret");
    let forged = token::issue(&other, Uuid::new_v4(), None).unwrap();

    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/v1/users/")
                .header(header::AUTHORIZATION, format!("Bearer {forged}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_a_non_form_body() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"username":"a@example.com"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(resp.status().is_client_error());
}
