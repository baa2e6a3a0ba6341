//! Shared HTTP client for the searchwayback workspace.
//!
//! - Request options: headers, [`Auth`], query params, timeout, retries
//! - Retries 429/5xx with exponential backoff and `Retry-After` support
//! - Redacts secret query params and never logs credential values
//! - [`Fetcher`] follows redirects for non-JSON endpoints (link resolution
//!   and SavePageNow), reporting the final URL and `Content-Location`
//!
//! ```rust
//! # async fn demo() -> Result<(), wayback_http::HttpError> {
//! let client = wayback_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", wayback_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Logs only ever include the auth kind (bearer/basic/header/none), not the
//! secret itself.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LOCATION, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

// ==============================
// Auth & request options
// ==============================

/// Authentication strategies used across the workspace.
///
/// Bearer covers the platform's app-only token, Basic covers the token
/// exchange endpoint, and Header carries a prebuilt `Authorization` value
/// (the OAuth 1.0a signer produces one of those).
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// `Authorization: Bearer <token>`
    Bearer(&'a str),
    /// HTTP basic auth (consumer key/secret for the token exchange).
    Basic { user: &'a str, pass: &'a str },
    /// A fully formed header, e.g. a signed `Authorization: OAuth ...`.
    Header {
        name: HeaderName,
        value: HeaderValue,
    },
    None,
}

/// Per-request tuning knobs.
///
/// ```
/// use std::time::Duration;
/// use wayback_http::{Auth, RequestOpts};
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     retries: Some(1),
///     auth: Some(Auth::Bearer("token")),
///     ..Default::default()
/// };
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
}

enum Payload {
    Json(Vec<u8>),
    Form(Vec<(String, String)>),
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
    pub max_retries: usize,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use std::time::Duration;
    /// use wayback_http::{HttpClient, HttpError};
    ///
    /// let client = HttpClient::new("https://api.example.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
            max_retries: 2,
        })
    }

    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    /// GET JSON with per-request options.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json(Method::GET, path, None, opts).await
    }

    /// POST a JSON body with per-request options.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = serde_json::to_vec(body).map_err(|e| HttpError::Build(e.to_string()))?;
        self.request_json(Method::POST, path, Some(Payload::Json(bytes)), opts)
            .await
    }

    /// POST a form-encoded body (the OAuth2 token exchange wants this).
    pub async fn post_form<T>(
        &self,
        path: &str,
        form: &[(&str, &str)],
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let owned = form
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.request_json(Method::POST, path, Some(Payload::Form(owned)), opts)
            .await
    }

    async fn request_json<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Payload>,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;

        let mut attempt = 0usize;
        let max_retries = opts.retries.unwrap_or(self.max_retries);
        let timeout = opts.timeout.unwrap_or(self.default_timeout);

        let auth_kind = match &opts.auth {
            Some(Auth::Bearer(_)) => "bearer",
            Some(Auth::Basic { .. }) => "basic",
            Some(Auth::Header { .. }) => "header",
            Some(Auth::None) | None => "none",
        };

        loop {
            let mut rb = self.inner.request(method.clone(), url.clone());
            rb = rb.timeout(timeout);

            if let Some(q) = &opts.query {
                let pairs: Vec<(&str, &str)> = q.iter().map(|(k, v)| (*k, v.as_ref())).collect();
                rb = rb.query(&pairs);
            }

            match &body {
                Some(Payload::Json(bytes)) => {
                    rb = rb
                        .header(reqwest::header::CONTENT_TYPE, "application/json")
                        .body(bytes.clone());
                }
                Some(Payload::Form(pairs)) => {
                    rb = rb.form(pairs);
                }
                None => {}
            }

            if let Some(hdrs) = &opts.headers {
                rb = rb.headers(hdrs.clone());
            }

            match &opts.auth {
                Some(Auth::Bearer(tok)) => {
                    let tok = sanitize_token(tok)?;
                    rb = rb.bearer_auth(tok);
                }
                Some(Auth::Basic { user, pass }) => {
                    rb = rb.basic_auth(user, Some(pass));
                }
                Some(Auth::Header { name, value }) => {
                    rb = rb.header(name, value);
                }
                Some(Auth::None) | None => {}
            }

            tracing::debug!(
                attempt = attempt + 1,
                max_retries,
                method = %method,
                host_path = %format!("{}{}", url.domain().unwrap_or("-"), url.path()),
                query = ?redacted_query(&opts),
                timeout_ms = timeout.as_millis() as u64,
                auth_kind,
                "http.request.start"
            );

            let started = std::time::Instant::now();
            let resp = match rb.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff_delay(attempt);
                        tracing::warn!(
                            attempt,
                            max_retries,
                            backoff_ms = delay.as_millis() as u64,
                            error = %err,
                            "http.retrying.send"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    return Err(HttpError::Network(err.to_string()));
                }
            };

            let status = resp.status();
            let headers = resp.headers().clone();
            let bytes = match resp.bytes().await {
                Ok(bytes) => bytes,
                Err(err) => {
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff_delay(attempt);
                        tracing::warn!(
                            attempt,
                            max_retries,
                            backoff_ms = delay.as_millis() as u64,
                            error = %err,
                            "http.retrying.body"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    return Err(HttpError::Network(err.to_string()));
                }
            };

            let snippet = snip_body(&bytes);
            tracing::debug!(
                %status,
                duration_ms = started.elapsed().as_millis() as u64,
                body_len = bytes.len(),
                "http.response"
            );

            if status.is_success() {
                return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                    tracing::warn!(
                        serde_err = %e,
                        body_snippet = %snippet,
                        "http.response.decode_error"
                    );
                    HttpError::Decode(e.to_string(), snippet)
                });
            }

            let message = extract_error_message(&bytes);
            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if retryable && attempt < max_retries {
                attempt += 1;
                let delay = match retry_after_secs(&headers) {
                    Some(secs) => Duration::from_secs(secs),
                    None => {
                        let exp = backoff_delay(attempt);
                        if status == StatusCode::TOO_MANY_REQUESTS {
                            // floor for 429 when no Retry-After is present
                            exp.max(Duration::from_millis(1100))
                        } else {
                            exp
                        }
                    }
                };
                tracing::warn!(
                    %status,
                    attempt,
                    max_retries,
                    backoff_ms = delay.as_millis() as u64,
                    message = %message,
                    "http.retrying"
                );
                sleep(delay).await;
                continue;
            }

            tracing::warn!(%status, message = %message, body_snippet = %snippet, "http.error");
            return Err(HttpError::Api { status, message });
        }
    }
}

// ==============================
// Redirect-following fetcher
// ==============================

/// Outcome of a redirect-following fetch.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub status: StatusCode,
    /// URL after all redirects were followed.
    pub final_url: Url,
    /// `Content-Location` header, when the server sent one (SavePageNow
    /// reports the archived capture there).
    pub content_location: Option<String>,
}

/// Fetcher for endpoints where we care about where a URL *lands*, not about
/// a JSON body: canonicalising embedded links and driving SavePageNow.
#[derive(Clone)]
pub struct Fetcher {
    inner: Client,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(user_agent: &str) -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(user_agent)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            inner,
            timeout: Duration::from_secs(20),
        })
    }

    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.timeout = dur;
        self
    }

    /// GET `url`, follow redirects, and report the landing spot. The body is
    /// discarded.
    pub async fn resolve(&self, url: &Url) -> Result<Resolved, HttpError> {
        tracing::debug!(host = url.domain().unwrap_or("-"), "http.fetch.start");
        let resp = self
            .inner
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| HttpError::Network(e.to_string()))?;

        let status = resp.status();
        let final_url = resp.url().clone();
        let content_location = resp
            .headers()
            .get(CONTENT_LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        tracing::debug!(
            %status,
            final_host = final_url.domain().unwrap_or("-"),
            has_content_location = content_location.is_some(),
            "http.fetch.done"
        );

        Ok(Resolved {
            status,
            final_url,
            content_location,
        })
    }
}

// ==============================
// Helpers
// ==============================

fn backoff_delay(attempt: usize) -> Duration {
    Duration::from_millis(200u64.saturating_mul(1 << (attempt - 1).min(6)))
}

fn retry_after_secs(h: &HeaderMap) -> Option<u64> {
    h.get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())?
        .parse()
        .ok()
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        snip.truncate(500);
        snip.push_str("...");
    }
    snip
}

/// Pull a human-readable message out of the error shapes our upstreams use:
/// Twitter's `{"errors":[{...}]}` / `{"detail":"..."}` and generic
/// `{"message":"..."}` envelopes.
fn extract_error_message(body: &[u8]) -> String {
    #[derive(serde::Deserialize)]
    struct TwErrors {
        errors: Vec<TwErr>,
    }
    #[derive(serde::Deserialize)]
    struct TwErr {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        title: String,
    }
    #[derive(serde::Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(tw) = serde_json::from_slice::<TwErrors>(body) {
        if let Some(first) = tw.errors.into_iter().next() {
            for candidate in [first.message, first.detail, first.title] {
                if !candidate.is_empty() {
                    return candidate;
                }
            }
        }
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        for candidate in [m.message, m.detail, m.error] {
            if !candidate.is_empty() {
                return candidate;
            }
        }
    }
    snip_body(body)
}

fn redacted_query(opts: &RequestOpts<'_>) -> Vec<(String, String)> {
    opts.query
        .as_ref()
        .map(|q| {
            q.iter()
                .map(|(k, v)| {
                    let is_secret = matches!(
                        k.to_ascii_lowercase().as_str(),
                        "access_token"
                            | "authorization"
                            | "auth"
                            | "key"
                            | "api_key"
                            | "token"
                            | "secret"
                            | "client_secret"
                            | "bearer"
                    );
                    (
                        (*k).to_string(),
                        if is_secret {
                            "<redacted>".to_string()
                        } else {
                            v.as_ref().to_string()
                        },
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

fn sanitize_token(raw: &str) -> Result<String, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    s.retain(|ch| !ch.is_ascii_whitespace());

    if !s.is_ascii() {
        return Err(HttpError::Build("token contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build("token contains control characters".into()));
    }
    HeaderValue::from_str(&format!("Bearer {}", s))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_twitter_envelope() {
        let body = br#"{"errors":[{"message":"","detail":"Rule is a duplicate","title":"DuplicateRule"}]}"#;
        assert_eq!(extract_error_message(body), "Rule is a duplicate");
    }

    #[test]
    fn error_message_falls_back_to_snippet() {
        let body = b"upstream timeout";
        assert_eq!(extract_error_message(body), "upstream timeout");
    }

    #[test]
    fn token_sanitizer_strips_quotes_and_whitespace() {
        assert_eq!(sanitize_token(" \"abc def\"\n").unwrap(), "abcdef");
        assert!(sanitize_token("caf\u{e9}").is_err());
    }

    #[test]
    fn redaction_hides_secret_query_params() {
        let opts = RequestOpts {
            query: Some(vec![
                ("url", "https://example.com".into()),
                ("api_key", "hunter2".into()),
            ]),
            ..Default::default()
        };
        let redacted = redacted_query(&opts);
        assert_eq!(redacted[0].1, "https://example.com");
        assert_eq!(redacted[1].1, "<redacted>");
    }
}
