use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, Response, Url};
use serde::de::DeserializeOwned;

use crate::errors::{classify, Result, TwelveLabsError};

const DEFAULT_BASE_URL: &str = "https://api.twelvelabs.io/v1.3";
const DEFAULT_MAX_RETRIES: u32 = 0;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const API_KEY_HEADER: &str = "x-api-key";
const API_KEY_ENV: &str = "TWELVELABS_API_KEY";
const BASE_URL_ENV: &str = "TWELVELABS_BASE_URL";

/// Builder for constructing a [`Client`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// use twelvelabs::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> twelvelabs::Result<()> {
/// let client = ClientBuilder::new()
///     .api_key("tlk_abc123")
///     .base_url("https://custom.example.com/v1.3")
///     .max_retries(2)
///     .timeout(Duration::from_secs(120))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    max_retries: u32,
    timeout: Duration,
    user_agent: String,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: None,
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("twelvelabs-rust/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Set the API key sent in the `x-api-key` header.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the base URL (defaults to `https://api.twelvelabs.io/v1.3`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Retries for idempotent requests that fail with a network error, 429, or 5xx
    /// (defaults to 0).
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set the per-request HTTP timeout (defaults to 60 seconds).
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = d;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    /// Build the [`Client`].
    ///
    /// Unset values fall back to the `TWELVELABS_API_KEY` and
    /// `TWELVELABS_BASE_URL` environment variables, read once here.
    ///
    /// Returns [`TwelveLabsError::Config`] if no key is available or the key
    /// cannot be sent as a header.
    pub fn build(self) -> Result<Client> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                TwelveLabsError::Config(
                    "API key is required. Pass it to ClientBuilder::api_key() \
                     or set the TWELVELABS_API_KEY environment variable."
                        .into(),
                )
            })?;

        let base_url = self
            .base_url
            .or_else(|| std::env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| TwelveLabsError::Config(format!("invalid base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(TwelveLabsError::Config(format!(
                "base URL {base_url} cannot carry a path"
            )));
        }

        let mut headers = HeaderMap::new();
        let mut key_value = HeaderValue::from_str(&api_key)
            .map_err(|_| TwelveLabsError::Config("API key contains invalid characters".into()))?;
        key_value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key_value);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|_| TwelveLabsError::Config("invalid user agent".into()))?,
        );

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .build()
            .map_err(TwelveLabsError::Http)?;

        Ok(Client {
            base_url,
            http,
            max_retries: self.max_retries,
            timeout: self.timeout,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The Twelve Labs API client.
///
/// Use [`Client::new`] for quick construction or [`ClientBuilder`] for full control.
/// Cloning is cheap; clones share the connection pool.
///
/// # Example
///
/// ```no_run
/// use twelvelabs::Client;
///
/// # async fn example() -> twelvelabs::Result<()> {
/// let client = Client::new("tlk_abc123")?;
///
/// let task = client.retrieve_task("6659a1c0e5f3").await?;
/// println!("{} is {}", task.id, task.status_str());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    max_retries: u32,
    timeout: Duration,
}

impl Client {
    /// Create a new client with the given API key and default settings.
    ///
    /// For customization, use [`ClientBuilder`] instead.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_key(api_key).build()
    }

    /// Build a client purely from `TWELVELABS_API_KEY` / `TWELVELABS_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        ClientBuilder::new().build()
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Per-request HTTP timeout. Polling deadlines are applied on top of it.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // -----------------------------------------------------------------------
    // Crate-internal transport
    // -----------------------------------------------------------------------

    /// Send a request and decode a JSON response body.
    ///
    /// `path` is a list of raw segments below the base URL; each one is
    /// percent-encoded, so identifiers cannot escape their segment.
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &[&str],
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let response = self.send(method, path, query, body).await?;
        decode_json(response).await
    }

    /// Send a request and discard the response body.
    pub(crate) async fn request_empty(
        &self,
        method: Method,
        path: &[&str],
        body: Option<serde_json::Value>,
    ) -> Result<()> {
        self.send(method, path, &[], body).await?;
        Ok(())
    }

    /// POST a multipart form and decode the JSON response. Sent once: forms
    /// cannot be replayed.
    pub(crate) async fn request_multipart<T: DeserializeOwned>(
        &self,
        path: &[&str],
        form: Form,
    ) -> Result<T> {
        let url = self.endpoint(path);
        tracing::debug!(method = "POST", url = %url, "sending multipart request");

        let response = self.http.post(url).multipart(form).send().await?;
        let response = check_status(response).await?;
        decode_json(response).await
    }

    /// POST a JSON body and hand back the live response without buffering it.
    /// The caller owns the body and must consume or drop it.
    pub(crate) async fn open_stream(
        &self,
        path: &[&str],
        body: serde_json::Value,
    ) -> Result<Response> {
        let url = self.endpoint(path);
        tracing::debug!(method = "POST", url = %url, "opening streaming request");

        let response = self.http.post(url).json(&body).send().await?;
        check_status(response).await
    }

    /// Execute an HTTP request, retrying idempotent methods on transient failures.
    ///
    /// Retries happen only when `max_retries > 0`, for:
    /// - HTTP 5xx server errors
    /// - HTTP 429 rate-limit responses
    /// - Network-level errors (connection refused, timeout, etc.)
    ///
    /// Exponential backoff is applied: 1s, 2s, 4s, ...
    async fn send(
        &self,
        method: Method,
        path: &[&str],
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<Response> {
        let url = self.endpoint(path);
        let attempts = if method.is_idempotent() {
            self.max_retries
        } else {
            0
        };

        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let backoff = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(backoff).await;
            }

            tracing::debug!(method = %method, url = %url, attempt, "sending request");

            let mut req = self.http.request(method.clone(), url.clone());
            if !query.is_empty() {
                req = req.query(query);
            }
            if let Some(ref b) = body {
                req = req.json(b);
            }

            let result = match req.send().await {
                Ok(response) => check_status(response).await,
                Err(e) => Err(TwelveLabsError::Http(e)),
            };

            match result {
                Err(err) if err.is_transient() && attempt < attempts => {
                    tracing::warn!(url = %url, attempt, error = %err, "request failed, retrying");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `build` rejects bases that cannot carry a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Pass 2xx responses through; classify everything else.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    tracing::trace!(status = status.as_u16(), body = %text, "error response");
    Err(classify(status.as_u16(), &text))
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    tracing::trace!(body = %String::from_utf8_lossy(&bytes), "response body");
    Ok(serde_json::from_slice(&bytes)?)
}

/// Read a local file into a named multipart part.
pub(crate) async fn file_part(path: &Path) -> Result<Part> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.bin".to_string());

    let bytes = tokio::fs::read(path).await.map_err(TwelveLabsError::Io)?;
    Ok(Part::bytes(bytes).file_name(file_name))
}

/// Append a text field when the value is present.
pub(crate) fn text_opt(form: Form, name: &'static str, value: Option<impl ToString>) -> Form {
    match value {
        Some(v) => form.text(name, v.to_string()),
        None => form,
    }
}
