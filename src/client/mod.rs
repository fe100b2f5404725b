//! Typed client for the journal API, plus the client-side disciplines the
//! widgets rely on: optimistic updates with rollback and the chat loop.

pub mod boards;
pub mod chat;
pub mod optimistic;

use std::future::Future;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::jarvis::prompt::trim_history;
use crate::jarvis::ChatMessage;
use crate::models::{Rule, WatchlistItem};

pub use boards::{RulesBoard, WatchlistBoard};
pub use chat::{ChatError, ChatState, JarvisChat};
pub use optimistic::apply_optimistic;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("response carried no data")]
    MissingData,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct JarvisWireReply {
    content: Vec<JarvisWireText>,
}

#[derive(Deserialize)]
struct JarvisWireText {
    text: String,
}

/// Remote side of the rules board.
pub trait RulesRemote {
    fn toggle_rule(&self, id: Uuid) -> impl Future<Output = Result<Rule, ClientError>> + Send;
    fn delete_rule(&self, id: Uuid) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// Remote side of the watchlist board.
pub trait WatchlistRemote {
    fn add_symbol(&self, symbol: &str) -> impl Future<Output = Result<WatchlistItem, ClientError>> + Send;
    fn remove_symbol(&self, symbol: &str) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// Remote side of the Jarvis chat.
pub trait JarvisRemote {
    fn send_message(
        &self,
        history: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> impl Future<Output = Result<String, ClientError>> + Send;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    device_id: Option<String>,
}

impl ApiClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            device_id: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let mut req = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(device_id) = &self.device_id {
            req = req.header("X-Device-Id", device_id);
        }
        req
    }

    /// Send and unwrap the `{ success, data, error }` envelope.
    async fn call<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<Option<T>, ClientError> {
        let resp = req.send().await?;
        let status = resp.status();
        let envelope: Envelope<T> = resp.json().await?;

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: envelope.error.unwrap_or_else(|| status.to_string()),
            });
        }

        Ok(envelope.data)
    }

    pub async fn list_rules(&self) -> Result<Vec<Rule>, ClientError> {
        let req = self.request(reqwest::Method::GET, "/api/rules");
        self.call(req).await?.ok_or(ClientError::MissingData)
    }

    pub async fn list_watchlist(&self) -> Result<Vec<WatchlistItem>, ClientError> {
        let req = self.request(reqwest::Method::GET, "/api/watchlist");
        self.call(req).await?.ok_or(ClientError::MissingData)
    }
}

impl RulesRemote for ApiClient {
    async fn toggle_rule(&self, id: Uuid) -> Result<Rule, ClientError> {
        let req = self.request(reqwest::Method::POST, &format!("/api/rules/{id}/toggle"));
        self.call(req).await?.ok_or(ClientError::MissingData)
    }

    async fn delete_rule(&self, id: Uuid) -> Result<(), ClientError> {
        let req = self.request(reqwest::Method::DELETE, &format!("/api/rules/{id}"));
        self.call::<serde_json::Value>(req).await.map(|_| ())
    }
}

impl WatchlistRemote for ApiClient {
    async fn add_symbol(&self, symbol: &str) -> Result<WatchlistItem, ClientError> {
        let req = self
            .request(reqwest::Method::POST, "/api/watchlist")
            .json(&json!({ "symbol": symbol }));
        self.call(req).await?.ok_or(ClientError::MissingData)
    }

    async fn remove_symbol(&self, symbol: &str) -> Result<(), ClientError> {
        let req = self.request(reqwest::Method::DELETE, &format!("/api/watchlist/{symbol}"));
        self.call::<serde_json::Value>(req).await.map(|_| ())
    }
}

impl JarvisRemote for ApiClient {
    async fn send_message(
        &self,
        history: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<String, ClientError> {
        let req = self
            .request(reqwest::Method::POST, "/api/jarvis")
            .json(&json!({
                "messages": trim_history(history),
                "systemPrompt": system_prompt,
            }));

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body: serde_json::Value = resp.json().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: body["error"].as_str().unwrap_or("Jarvis request failed").to_string(),
            });
        }

        let reply: JarvisWireReply = resp.json().await?;
        reply
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or(ClientError::MissingData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use chrono::Utc;
    use serde_json::Value;

    async fn spawn_api(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn rule_json(id: Uuid, is_active: bool) -> Value {
        json!({
            "id": id,
            "user_id": Uuid::nil(),
            "title": "No trades before 9:45",
            "description": null,
            "category": null,
            "is_active": is_active,
            "created_at": Utc::now(),
        })
    }

    #[tokio::test]
    async fn envelope_data_is_unwrapped() {
        let id = Uuid::new_v4();
        let router = Router::new()
            .route(
                "/api/rules",
                get(move |headers: HeaderMap| async move {
                    assert_eq!(headers["authorization"], "Bearer tok");
                    assert_eq!(headers["x-device-id"], "dev-1");
                    Json(json!({ "success": true, "data": [rule_json(id, true)], "error": null }))
                }),
            )
            .route(
                "/api/rules/:id/toggle",
                post(|Path(id): Path<Uuid>| async move {
                    Json(json!({ "success": true, "data": rule_json(id, false), "error": null }))
                }),
            );
        let base = spawn_api(router).await;

        let client = ApiClient::new(Client::new(), base)
            .with_token("tok")
            .with_device_id("dev-1");

        let rules = client.list_rules().await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, id);

        let toggled = client.toggle_rule(id).await.unwrap();
        assert!(!toggled.is_active);
    }

    #[tokio::test]
    async fn empty_data_on_delete_is_ok() {
        let router = Router::new().route(
            "/api/watchlist/:symbol",
            delete(|| async { Json(json!({ "success": true, "data": null, "error": null })) }),
        );
        let base = spawn_api(router).await;

        let client = ApiClient::new(Client::new(), base);
        client.remove_symbol("AAPL").await.unwrap();
    }

    #[tokio::test]
    async fn error_envelope_becomes_api_error() {
        let router = Router::new().route(
            "/api/rules",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "success": false, "error": "Unauthorized" })),
                )
            }),
        );
        let base = spawn_api(router).await;

        let err = ApiClient::new(Client::new(), base).list_rules().await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 401, ref message } if message == "Unauthorized"));
    }
}
