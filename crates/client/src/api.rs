use std::sync::Arc;
use std::time::Duration;

use contracts::shared::keys::GroupRef;
use contracts::shared::response::ErrorResponse;
use contracts::system::auth::{LoginForm, LoginResponse};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::{Session, SessionStore};

/// HTTP client of the dashboard backend.
///
/// Every call except `login` carries the session's bearer token. A 401
/// answer clears the session and surfaces as [`ClientError::AuthExpired`].
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST /login with a form body and store the resulting session
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<Session> {
        let form = LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        };

        tracing::info!("Logging in as {}", username);
        let response = self
            .client
            .post(self.url("/login"))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.detail)
                .unwrap_or_else(|_| "Login failed".to_string());
            tracing::error!("Login failed with status {}: {}", status, detail);
            return Err(ClientError::Http {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.text().await?;
        let login: LoginResponse = serde_json::from_str(&body)?;
        let session = Session::from_login(username, login);
        self.session.set(session.clone())?;
        Ok(session)
    }

    pub fn logout(&self) {
        tracing::info!("Logging out");
        self.session.clear();
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.client.get(self.url(path))).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.client.post(self.url(path))).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send(self.client.put(self.url(path)).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.client.delete(self.url(path))).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let token = self.session.token().ok_or(ClientError::NotAuthenticated)?;
        let request = request.bearer_auth(token).build()?;
        tracing::debug!("{} {}", request.method(), request.url());

        let response = self.client.execute(request).await?;
        let body = self.check(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn check(&self, response: Response) -> ClientResult<String> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Token rejected, clearing session");
            self.session.clear();
            return Err(ClientError::AuthExpired);
        }

        let body = response.text().await?;
        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.detail)
                .unwrap_or_else(|_| format!("HTTP error! status: {}", status.as_u16()));
            return Err(ClientError::Http {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(body)
    }
}

/// `{prefix}/{salesperson}/{class}/{group}` with the text parts URL-encoded
pub fn group_path(prefix: &str, group: &GroupRef) -> String {
    format!(
        "{}/{}/{}/{}",
        prefix,
        group.salesperson_id,
        urlencoding::encode(&group.customer_class),
        urlencoding::encode(&group.group_key)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use axum::http::StatusCode as AxumStatus;

    #[test]
    fn test_group_path_encodes_segments() {
        let group = GroupRef::new(12, "Hospitality", "Hilton / Hampton & Co");
        assert_eq!(
            group_path("/api/division/allocations", &group),
            "/api/division/allocations/12/Hospitality/Hilton%20%2F%20Hampton%20%26%20Co"
        );
    }

    #[tokio::test]
    async fn test_calls_without_token_fail_fast() {
        let session = Arc::new(SessionStore::in_memory());
        let api = ApiClient::new(&ClientConfig::default(), session).unwrap();
        let result: ClientResult<serde_json::Value> = api.get("/api/sales").await;
        assert!(matches!(result, Err(ClientError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_unauthorized_answer_clears_stored_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let base_url = test_support::serve(test_support::failing_with(
            AxumStatus::UNAUTHORIZED,
            "Could not validate credentials",
        ))
        .await;
        let api = test_support::signed_in(&base_url, SessionStore::open(path.clone()));
        assert!(path.exists());

        let result: ClientResult<serde_json::Value> = api.get("/api/sales").await;

        assert!(matches!(result, Err(ClientError::AuthExpired)));
        assert!(!api.session().is_authenticated());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_error_detail_is_surfaced() {
        let base_url = test_support::serve(test_support::failing_with(
            AxumStatus::FORBIDDEN,
            "Admin access required",
        ))
        .await;
        let api = test_support::signed_in(&base_url, SessionStore::in_memory());

        let result: ClientResult<serde_json::Value> = api.get("/api/admin/summary").await;

        match result {
            Err(ClientError::Http { status, detail }) => {
                assert_eq!(status, 403);
                assert_eq!(detail, "Admin access required");
            }
            other => panic!("unexpected result {:?}", other.map(|_| ())),
        }
        assert!(api.session().is_authenticated());
    }
}
