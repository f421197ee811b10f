use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::cookie::Jar;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONNECTION, CONTENT_TYPE, DNT, HeaderMap, HeaderName,
    HeaderValue, ORIGIN, REFERER, USER_AGENT,
};
use reqwest::{Client, Method, Url};
use std::sync::Arc;

use super::types::DeliverySchedule;
use super::{Credentials, Retailer};
use crate::config::Config;
use crate::http::{CONNECT_TIMEOUT, HttpResponse, HttpSession, RequestOptions, SLOW_READ_TIMEOUT};
use crate::retry::RetryPolicy;

pub const BASE_URL: &str = "https://barbora.lt";
pub const LOGIN_PATH: &str = "api/eshop/v1/user/login";
pub const DELIVERIES_PATH: &str = "api/eshop/v1/cart/deliveries";

// Static key the web shop itself sends with every API call.
const API_AUTHORIZATION: &str = "Basic YXBpa2V5OlNlY3JldEtleQ==";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_3) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/81.0.4026.0 Safari/537.36";
const REGION_COOKIE: &str = "region=barbora.lt; Domain=.barbora.lt; Path=/";

/// Client for the Barbora web shop API.
///
/// Owns the only session of a run: default headers, the cookie jar (region
/// selector plus whatever the login hands out) and the connection pool.
pub struct BarboraClient {
    session: HttpSession,
    credentials: Credentials,
}

impl BarboraClient {
    #[tracing::instrument(skip(config))]
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config.retailer_url().unwrap_or(BASE_URL);

        let client = Client::builder()
            .default_headers(default_headers())
            .cookie_provider(region_cookie_jar()?)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("Failed to build retailer HTTP client")?;

        debug!("Retailer API at {}", base_url);

        Ok(Self {
            session: HttpSession::new(client, base_url),
            credentials: config.credentials().clone(),
        })
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.session = self.session.with_retry_policy(policy);
        self
    }

    /// Posts the credentials to the login endpoint. Any non-2xx status is an
    /// error.
    #[tracing::instrument(skip(self))]
    pub async fn authenticate(&self) -> Result<HttpResponse> {
        info!("Logging in as {}...", self.credentials.email());

        let options = RequestOptions::default()
            .header(ORIGIN, BASE_URL)
            .header(REFERER, "https://barbora.lt/")
            .form(self.credentials.login_form());

        self.session
            .request(Method::POST, LOGIN_PATH, &options)
            .await
            .context("Login failed")
    }

    /// Gets the raw delivery schedule response, body included. The endpoint
    /// is slow, so the read timeout is much longer than for login.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_delivery_schedule(&self) -> Result<HttpResponse> {
        info!("Fetching delivery schedule...");

        let options = RequestOptions::default()
            .header(REFERER, "https://barbora.lt/pristatymas")
            .read_timeout(SLOW_READ_TIMEOUT);

        self.session
            .request(Method::GET, DELIVERIES_PATH, &options)
            .await
            .context("Fetching delivery schedule failed")
    }
}

#[async_trait]
impl Retailer for BarboraClient {
    async fn login(&self) -> Result<()> {
        self.authenticate().await?;
        Ok(())
    }

    async fn delivery_schedule(&self) -> Result<DeliverySchedule> {
        let body = self.fetch_delivery_schedule().await?.into_text();

        let schedule = DeliverySchedule::from_json(&body)?;
        debug!(
            "Delivery schedule ok={} with {} slots",
            schedule.ok,
            schedule.slots.len()
        );
        Ok(schedule)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-GB,en-US;q=0.9,en;q=0.8"),
    );

    let mut authorization = HeaderValue::from_static(API_AUTHORIZATION);
    authorization.set_sensitive(true);
    headers.insert(AUTHORIZATION, authorization);

    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded; charset=UTF-8"),
    );
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("empty"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("cors"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("same-origin"),
    );
    headers
}

/// Cookie jar pre-seeded with the region selector for the shop's domain.
fn region_cookie_jar() -> Result<Arc<Jar>> {
    let url: Url = BASE_URL.parse().context("Invalid retailer base URL")?;
    let jar = Jar::default();
    jar.add_cookie_str(REGION_COOKIE, &url);
    Ok(Arc::new(jar))
}
