use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::operation::ListId;

const MAX_RESPONSE_SIZE: usize = 1024 * 1024; // 1MB
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from a single remote call. Every variant counts as a failure of
/// that call only; callers decide whether to retain or skip the work.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Request timed out")]
    Timeout,
    /// The server answered `{"success": false}`
    #[error("Server rejected the request")]
    Rejected,
    /// Body was not the JSON the endpoint promises
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// An item row as reported by the updates endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteItem {
    pub id: Option<i64>,
    pub item_name: String,
    pub category: Option<String>,
    pub is_purchased: bool,
    pub added_at: Option<String>,
}

/// Changes since a timestamp. Older servers call the list `items`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Updates {
    #[serde(default, alias = "items")]
    pub changes: Vec<RemoteItem>,
    /// Server-side marker for the response, in epoch ms. Servers that send
    /// float epoch seconds are converted.
    #[serde(default, deserialize_with = "lenient_ms")]
    pub timestamp: Option<i64>,
}

/// Below this an epoch value is read as seconds (ms would be before 1973).
const SECONDS_CUTOFF: f64 = 1e11;

fn lenient_ms<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| {
        if v.abs() < SECONDS_CUTOFF {
            (v * 1000.0) as i64
        } else {
            v as i64
        }
    }))
}

#[derive(Debug, Deserialize)]
struct Ack {
    #[serde(default = "default_success")]
    success: bool,
}

fn default_success() -> bool {
    true
}

/// The list server, as seen by the sync manager.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Create `item_name` in `list_id`. Success means the server acknowledged it.
    async fn create_item(
        &self,
        list_id: ListId,
        item_name: &str,
        category: &str,
    ) -> Result<(), RemoteError>;

    /// Delete the server-confirmed item `item_id`.
    async fn delete_item(&self, item_id: i64) -> Result<(), RemoteError>;

    /// Changes to `list_id` since `since` (epoch ms).
    async fn fetch_updates(&self, list_id: ListId, since: i64) -> Result<Updates, RemoteError>;
}

#[async_trait]
impl<T: RemoteApi + ?Sized> RemoteApi for Arc<T> {
    async fn create_item(
        &self,
        list_id: ListId,
        item_name: &str,
        category: &str,
    ) -> Result<(), RemoteError> {
        (**self).create_item(list_id, item_name, category).await
    }

    async fn delete_item(&self, item_id: i64) -> Result<(), RemoteError> {
        (**self).delete_item(item_id).await
    }

    async fn fetch_updates(&self, list_id: ListId, since: i64) -> Result<Updates, RemoteError> {
        (**self).fetch_updates(list_id, since).await
    }
}

/// [`RemoteApi`] over the list server's HTTP routes.
///
/// - create: `POST /list/{list_id}` (form `item_name`, `category`)
/// - delete: `POST /item/{item_id}/delete`
/// - updates: `GET /api/list/{list_id}/updates?since={ms}`
///
/// Every request is marked `X-Requested-With: XMLHttpRequest` so the server
/// answers with JSON instead of a redirect.
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: Url,
    session_cookie: Option<SecretString>,
    timeout: Duration,
}

impl HttpRemote {
    pub fn new(client: reqwest::Client, mut base_url: Url) -> Self {
        // Url::join replaces the last segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            client,
            base_url,
            session_cookie: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Send `cookie` (e.g. `session=...`) with every request.
    pub fn with_session_cookie(mut self, cookie: SecretString) -> Self {
        self.session_cookie = Some(cookie);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        Ok(self.base_url.join(path)?)
    }

    fn prepare(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header("X-Requested-With", "XMLHttpRequest");
        match &self.session_cookie {
            Some(cookie) => request.header(COOKIE, cookie.expose_secret()),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, RemoteError> {
        let response = tokio::time::timeout(self.timeout, self.prepare(request).send())
            .await
            .map_err(|_| RemoteError::Timeout)?
            .map_err(RemoteError::Network)?;

        if !response.status().is_success() {
            return Err(RemoteError::HttpStatus(response.status().as_u16()));
        }

        read_limited_bytes(response, MAX_RESPONSE_SIZE).await
    }

    async fn send_for_ack(&self, request: reqwest::RequestBuilder) -> Result<(), RemoteError> {
        let body = self.send(request).await?;
        let ack: Ack =
            serde_json::from_slice(&body).map_err(|e| RemoteError::Malformed(e.to_string()))?;
        if ack.success {
            Ok(())
        } else {
            Err(RemoteError::Rejected)
        }
    }
}

#[async_trait]
impl RemoteApi for HttpRemote {
    async fn create_item(
        &self,
        list_id: ListId,
        item_name: &str,
        category: &str,
    ) -> Result<(), RemoteError> {
        let url = self.endpoint(&format!("list/{list_id}"))?;
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("item_name", item_name)
            .append_pair("category", category)
            .finish();

        tracing::debug!(list_id, item = %item_name, "Creating item on server");
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body);
        self.send_for_ack(request).await
    }

    async fn delete_item(&self, item_id: i64) -> Result<(), RemoteError> {
        let url = self.endpoint(&format!("item/{item_id}/delete"))?;

        tracing::debug!(item_id, "Deleting item on server");
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send_for_ack(request).await
    }

    async fn fetch_updates(&self, list_id: ListId, since: i64) -> Result<Updates, RemoteError> {
        let mut url = self.endpoint(&format!("api/list/{list_id}/updates"))?;
        url.query_pairs_mut()
            .append_pair("since", &since.to_string());

        let body = self.send(self.client.get(url)).await?;
        serde_json::from_slice(&body).map_err(|e| RemoteError::Malformed(e.to_string()))
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, RemoteError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(RemoteError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(RemoteError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(RemoteError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
