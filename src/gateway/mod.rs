//! HTTP gateways to the backend: authentication plus the admin and manager
//! resource groups. Every request carries the stored bearer token when there is
//! one; non-2xx answers become `AppError`s.

pub mod models;
pub mod normalize;
mod auth;
mod admin;
mod manager;

pub use admin::AdminGateway;
pub use auth::AuthGateway;
pub use manager::ManagerGateway;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{AppError, AppResult};
use crate::identity::{failure_message, SessionStore};

#[derive(Clone, Debug)]
pub struct ApiClient {
    config: ClientConfig,
    client: reqwest::Client,
    store: SessionStore,
}

impl ApiClient {
    pub fn new(config: ClientConfig, store: SessionStore) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::config("http_client", e.to_string()))?;
        Ok(Self { config, client, store })
    }

    pub fn config(&self) -> &ClientConfig { &self.config }

    pub fn store(&self) -> &SessionStore { &self.store }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        let Some(token) = self.store.get_token() else { return req };
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(v) => req.header(AUTHORIZATION, v),
            Err(_) => {
                warn!(target: "rolegate::gateway", "stored token is not a valid header value; sending unauthenticated");
                req
            }
        }
    }

    /// Send with the bearer token attached; return the status and the JSON body
    /// (`Null` for an empty or non-JSON body).
    pub(crate) async fn send_raw(&self, req: RequestBuilder) -> AppResult<(StatusCode, Value)> {
        let resp = self.authorize(req).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        debug!(target: "rolegate::gateway", "response status={} bytes={}", status, text.len());
        if text.trim().is_empty() {
            return Ok((status, Value::Null));
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(v) => Ok((status, v)),
            Err(_) if !status.is_success() => Ok((status, Value::Null)),
            Err(e) => Err(AppError::decode("invalid_json", format!("{} (status {})", e, status))),
        }
    }

    async fn send(&self, req: RequestBuilder) -> AppResult<Value> {
        let (status, body) = self.send_raw(req).await?;
        if !status.is_success() {
            let msg = failure_message(&body)
                .unwrap_or_else(|| format!("HTTP {}: {}", status.as_u16(), status.canonical_reason().unwrap_or("")));
            return Err(AppError::from_status(status.as_u16(), msg));
        }
        Ok(body)
    }

    pub async fn get_json(&self, path: &str, query: &[(&str, String)]) -> AppResult<Value> {
        let url = self.config.endpoint(path)?;
        debug!(target: "rolegate::gateway", "GET {}", url.path());
        self.send(self.client.get(url).query(query)).await
    }

    pub async fn post_json(&self, path: &str, body: Option<&Value>) -> AppResult<Value> {
        let url = self.config.endpoint(path)?;
        debug!(target: "rolegate::gateway", "POST {}", url.path());
        let req = self.client.post(url);
        let req = match body {
            Some(b) => req.json(b),
            None => req,
        };
        self.send(req).await
    }

    pub(crate) fn post_builder(&self, path: &str) -> AppResult<RequestBuilder> {
        Ok(self.client.post(self.config.endpoint(path)?))
    }
}

/// Percent-encode a value used as a single path segment.
pub(crate) fn segment(id: &str) -> AppResult<String> {
    if id.trim().is_empty() {
        return Err(AppError::user("missing_id", "an id is required"));
    }
    Ok(urlencoding::encode(id).into_owned())
}
