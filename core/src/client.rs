//! Generic JSON client for the event-listing backend.
//!
//! # Design
//! Each call runs in three steps: `build_request` produces an `HttpRequest`,
//! the `Transport` executes it, and `parse_response` turns the `HttpResponse`
//! into a value or an `ApiError`. Only the middle step does I/O.
//! The bearer token is read from session storage at build time, so a login or
//! logout takes effect on the very next request. Traffic is logged through
//! `tracing`; logging never affects the outcome of a call. There is no retry.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::storage::{self, SessionStorage};
use crate::transport::Transport;

/// Longest slice of a non-JSON error body carried into `ApiError::Http`.
const MAX_ERROR_BODY: usize = 200;

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    storage: Arc<dyn SessionStorage>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            storage,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let request = self.build_request(HttpMethod::Get, path, query, None);
        self.send(request).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = encode(body)?;
        let request = self.build_request(HttpMethod::Post, path, &[], Some(body));
        self.send(request).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = encode(body)?;
        let request = self.build_request(HttpMethod::Put, path, &[], Some(body));
        self.send(request).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.build_request(HttpMethod::Delete, path, &[], None);
        self.send(request).await
    }

    /// Build the request for `path` relative to the base URL. `path` may
    /// already carry a query string; `query` pairs are appended, encoded.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, String)],
        body: Option<String>,
    ) -> HttpRequest {
        let mut url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        if !query.is_empty() {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())))
                .finish();
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&encoded);
        }

        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = self.bearer_token() {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }

        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }

    /// Map the response to `T`, or to `ApiError::Http` for any non-2xx
    /// status. An empty 2xx body decodes as JSON `null`.
    pub fn parse_response<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                message: error_message(&response),
            });
        }
        let body = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    async fn send<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        let method = request.method;
        let url = request.url.clone();
        debug!(%method, %url, body = request.body.as_deref().unwrap_or(""), "API request");

        let result = match self.transport.execute(request).await {
            Ok(response) => {
                debug!(status = response.status, %url, "API response");
                self.parse_response(response)
            }
            Err(error) => Err(error),
        };

        if let Err(error) = &result {
            let status = error
                .status()
                .map_or_else(|| "Network Error".to_string(), |s| s.to_string());
            warn!(%method, %url, %status, %error, "API error");
        }
        result
    }

    fn bearer_token(&self) -> Option<String> {
        match storage::load_session(self.storage.as_ref()) {
            Ok(Some(session)) if !session.token.is_empty() => Some(session.token),
            Ok(_) => None,
            Err(error) => {
                warn!(%error, "failed to read stored session for auth header");
                None
            }
        }
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Best-effort message: the body's `message` (or `title`) field, else the
/// raw body, else the status reason phrase.
fn error_message(response: &HttpResponse) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(&response.body) {
        for key in ["message", "title"] {
            if let Some(serde_json::Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }
    let body = response.body.trim();
    if !body.is_empty() {
        return body.chars().take(MAX_ERROR_BODY).collect();
    }
    reqwest::StatusCode::from_u16(response.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown error")
        .to_string()
}
