//! A long-lived HTTP session bound to one base URL.

use anyhow::{Context, Result};
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;

use super::status::StatusError;
use crate::retry::{RetryPolicy, is_transient};

/// Time allowed to establish a connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Time allowed for a response on ordinary endpoints.
pub const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Time allowed for a response on endpoints known to be slow.
pub const SLOW_READ_TIMEOUT: Duration = Duration::from_secs(300);

/// Per-request additions on top of the session defaults.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    headers: HeaderMap,
    query: Vec<(String, String)>,
    form: Option<Vec<(String, String)>>,
    read_timeout: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            headers: HeaderMap::new(),
            query: Vec::new(),
            form: None,
            read_timeout: READ_TIMEOUT,
        }
    }
}

impl RequestOptions {
    pub fn header(mut self, name: HeaderName, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }

    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Sends the given pairs as an `application/x-www-form-urlencoded` body.
    pub fn form<'a>(mut self, fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.form = Some(
            fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

/// A response read to the end. Status and body arrive together, so a
/// transfer that stalls or breaks halfway is retried like any other
/// transport failure.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    body: String,
}

impl HttpResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn into_text(self) -> String {
        self.body
    }
}

/// HTTP session: one client (headers, cookie jar, connection pool) and one
/// base URL, with every request wrapped in a [`RetryPolicy`].
#[derive(Clone)]
pub struct HttpSession {
    client: Client,
    base_url: String,
    policy: RetryPolicy,
}

impl HttpSession {
    /// Wraps an already configured client. Paths passed to the request
    /// methods are resolved against `base_url`.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends a request and reads the whole body, retrying only transport
    /// failures. Any status is returned as-is.
    #[tracing::instrument(skip(self, options))]
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        options: &RequestOptions,
    ) -> Result<HttpResponse> {
        let operation = format!("{} {}", method, path);
        let url = self.url_for(path);

        self.policy
            .run(&operation, is_transient, || {
                self.send_once(method.clone(), &url, options)
            })
            .await
            .with_context(|| format!("{} failed", operation))
    }

    /// Like [`HttpSession::send`], but a non-2xx status becomes a
    /// [`StatusError`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: &RequestOptions,
    ) -> Result<HttpResponse> {
        let response = self.send(method.clone(), path, options).await?;
        let status = response.status();
        debug!("{} {} -> {}", method, path, status);

        if !status.is_success() {
            return Err(StatusError::new(method, path, status).into());
        }
        Ok(response)
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(method, url)
            .headers(options.headers.clone())
            .timeout(options.read_timeout);

        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(form) = &options.form {
            builder = builder.form(form);
        }

        // The URL may carry secrets (bot tokens), keep it out of error messages.
        let response = builder
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to read response body")?;

        Ok(HttpResponse { status, body })
    }
}
