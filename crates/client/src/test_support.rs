//! Local HTTP stand-in for the backend in tests

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router};
use tokio::net::TcpListener;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::session::{Session, SessionStore};

/// Serve `app` on an ephemeral port and return its base URL
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Answers every request with `status` and a `{detail}` body
pub fn failing_with(status: StatusCode, detail: &'static str) -> Router {
    Router::new().fallback(move || async move {
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    })
}

pub fn session() -> Session {
    Session {
        token: "token-1".into(),
        username: "admin".into(),
        is_admin: true,
        is_superadmin: false,
        salesperson: None,
    }
}

/// Client of `base_url` whose store already holds a session
pub fn signed_in(base_url: &str, store: SessionStore) -> ApiClient {
    store.set(session()).unwrap();
    let config = ClientConfig {
        base_url: base_url.to_string(),
        ..ClientConfig::default()
    };
    ApiClient::new(&config, Arc::new(store)).unwrap()
}
