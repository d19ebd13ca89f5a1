//! Helpers shared by the router-level tests.
//!
//! Connection and configuration are process globals, so every test binary
//! calls [`setup`] once from a single `#[tokio::test]`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use backend::shared::config::{self, Config};
use backend::shared::data::db;
use backend::system::users::service as user_service;
use contracts::system::users::CreateUserDto;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "pass1234";

/// Fresh database in a temp dir plus a fixed JWT secret. Keep the returned
/// dir alive for the whole test.
pub async fn setup() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("dashboard.db");

    let mut cfg = Config::default();
    cfg.database.path = db_path.to_string_lossy().into_owned();
    cfg.auth.jwt_secret = "integration-test-secret".to_string();
    config::install(cfg);

    db::initialize_database(Some(&db_path.to_string_lossy()))
        .await
        .expect("database init");
    dir
}

pub async fn exec(sql: &str) {
    db::get_connection()
        .expect("connection")
        .execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
        .await
        .expect("seed statement");
}

pub async fn create_user(username: &str, salesman_id: Option<i64>) {
    user_service::create(CreateUserDto {
        username: username.to_string(),
        password: PASSWORD.to_string(),
        salesman_id,
        full_name: None,
    })
    .await
    .expect("create user");
}

pub async fn login(app: &Router, username: &str) -> String {
    let (status, body) = login_raw(app, username, PASSWORD).await;
    assert_eq!(
        status,
        StatusCode::OK,
        "login of {} failed: {}",
        username,
        body
    );
    body["access_token"].as_str().expect("token").to_string()
}

pub async fn login_raw(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    let form = format!(
        "username={}&password={}",
        urlencode(username),
        urlencode(password)
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .expect("request");
    send(app, request).await
}

fn urlencode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => (b as char).to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect()
}

pub async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");
    send(app, request).await
}

pub async fn get(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    call(app, Method::GET, uri, Some(token), None).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

pub fn approx(value: &Value, expected: f64) -> bool {
    value
        .as_f64()
        .map(|v| (v - expected).abs() < 1e-6)
        .unwrap_or(false)
}
