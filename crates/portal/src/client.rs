//! HTTP client for the portal's sharing REST API.
//!
//! [`PortalClient`] owns the current token. Data requests go through
//! [`PortalClient::get_authorized`], which appends the token, classifies
//! expired-token replies and refreshes the token at most once per request.

use std::time::Duration;

use futures::{stream, StreamExt, TryStreamExt};
use mapaudit_core::layers::LayerDetails;
use mapaudit_core::maps::{MapLayer, MapSummary};
use mapaudit_core::search_query::{
    has_next_page, org_web_map_query, page_start, DEFAULT_MAX_PAGES, DEFAULT_ORG_ID, PAGE_SIZE,
};
use mapaudit_core::validation::{normalize_portal_url, DEFAULT_PORTAL_URL};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::error::PortalError;
use crate::retry::RetryPolicy;
use crate::token::{Credentials, DEFAULT_TOKEN_EXPIRATION_MINUTES};
use crate::wire::{portal_error, ItemData, PortalErrorBody, SearchPage, TokenResponse};

/// Default timeout for a single HTTP request.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const OP_TOKEN: &str = "generateToken";
const OP_SEARCH: &str = "search";
const OP_ITEM_DATA: &str = "item data";
const OP_ITEM_DETAILS: &str = "item details";

/// Connection settings for a [`PortalClient`].
#[derive(Debug, Clone)]
pub struct PortalOptions {
    /// Base URL, e.g. `https://example.maps.arcgis.com`.
    pub portal_url: String,
    /// Organization whose web maps are searched.
    pub org_id: String,
    /// `None` runs anonymously against public content only.
    pub credentials: Option<Credentials>,
    pub token_expiration_minutes: u32,
    /// Search pages fetched before giving up with [`PortalError::TooManyPages`].
    pub max_pages: u32,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for PortalOptions {
    fn default() -> Self {
        Self {
            portal_url: DEFAULT_PORTAL_URL.to_string(),
            org_id: DEFAULT_ORG_ID.to_string(),
            credentials: None,
            token_expiration_minutes: DEFAULT_TOKEN_EXPIRATION_MINUTES,
            max_pages: DEFAULT_MAX_PAGES,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

/// Outcome of one authorized GET before refresh handling.
enum Reply {
    Body(serde_json::Value),
    TokenExpired,
}

/// HTTP client for a single portal.
pub struct PortalClient {
    client: reqwest::Client,
    base_url: Url,
    options: PortalOptions,
    token: RwLock<Option<String>>,
}

impl std::fmt::Debug for PortalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalClient")
            .field("base_url", &self.base_url)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl PortalClient {
    /// Create a client with its own connection pool.
    pub fn new(options: PortalOptions) -> Result<Self, PortalError> {
        let client = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .build()?;
        Self::with_client(client, options)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, mut options: PortalOptions) -> Result<Self, PortalError> {
        options.portal_url = normalize_portal_url(&options.portal_url)
            .map_err(|e| PortalError::InvalidUrl(e.to_string()))?;
        let base_url = Url::parse(&options.portal_url)
            .map_err(|e| PortalError::InvalidUrl(format!("{}: {e}", options.portal_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(PortalError::InvalidUrl(options.portal_url));
        }

        Ok(Self {
            client,
            base_url,
            options,
            token: RwLock::new(None),
        })
    }

    pub fn options(&self) -> &PortalOptions {
        &self.options
    }

    pub fn has_credentials(&self) -> bool {
        self.options.credentials.is_some()
    }

    /// The token currently attached to requests.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Exchange the configured credentials for a token and keep it.
    ///
    /// Returns `false` without a request when no credentials are configured,
    /// or when the portal answered without a token.
    pub async fn authenticate(&self) -> Result<bool, PortalError> {
        let Some(credentials) = &self.options.credentials else {
            return Ok(false);
        };
        let token = self.generate_token(credentials).await?;
        let obtained = token.is_some();
        *self.token.write().await = token;
        if obtained {
            tracing::info!(username = %credentials.username, "Authenticated with portal");
        }
        Ok(obtained)
    }

    /// Request a token via `POST /sharing/rest/generateToken`.
    ///
    /// Does not store the token; see [`authenticate`](Self::authenticate).
    pub async fn generate_token(&self, credentials: &Credentials) -> Result<Option<String>, PortalError> {
        let url = self.endpoint(&["sharing", "rest", "generateToken"])?;
        let expiration = self.options.token_expiration_minutes.to_string();
        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
            ("expiration", expiration.as_str()),
            ("referer", self.options.portal_url.as_str()),
            ("f", "json"),
        ];

        let response = self
            .send_with_retry(OP_TOKEN, || self.client.post(url.clone()).form(&form))
            .await?;
        let body = Self::read_json(OP_TOKEN, response).await?;
        let parsed: TokenResponse = decode(OP_TOKEN, body)?;

        if let Some(error) = parsed.error {
            tracing::error!(code = error.code, message = %error.message, "Token request rejected");
            return Err(PortalError::Auth {
                message: error.message,
            });
        }
        match (&parsed.token, parsed.expires) {
            (None, _) => tracing::warn!("Token response did not contain a token"),
            (Some(_), Some(expires)) => tracing::debug!(expires_at_ms = expires, "Issued portal token"),
            (Some(_), None) => {}
        }
        Ok(parsed.token)
    }

    /// Fetch one 1-based page of the organization's web maps.
    pub async fn search_page(&self, page: u32) -> Result<SearchPage, PortalError> {
        let url = self.endpoint(&["sharing", "rest", "search"])?;
        let num = PAGE_SIZE.to_string();
        let start = page_start(page).to_string();
        let query = org_web_map_query(&self.options.org_id);
        let params = [
            ("num", num.as_str()),
            ("start", start.as_str()),
            ("sortField", ""),
            ("sortOrder", "desc"),
            ("q", query.as_str()),
            ("f", "json"),
        ];

        let body = self.get_authorized(OP_SEARCH, &url, &params).await?;
        decode(OP_SEARCH, body)
    }

    /// Page through the search until `nextStart` reports the last page.
    ///
    /// The returned summaries have no layers yet.
    pub async fn search_all_maps(&self) -> Result<Vec<MapSummary>, PortalError> {
        let mut maps = Vec::new();
        let mut page = 1;

        loop {
            if page > self.options.max_pages {
                return Err(PortalError::TooManyPages {
                    limit: self.options.max_pages,
                });
            }

            let result = self.search_page(page).await?;
            match result.results {
                Some(results) => {
                    tracing::debug!(page, count = results.len(), total = ?result.total, "Fetched search page");
                    maps.extend(results);
                }
                None => {
                    tracing::warn!(page, error = ?result.error, "Search page contained no results");
                }
            }

            if !has_next_page(result.next_start) {
                break;
            }
            page += 1;
        }

        tracing::info!(count = maps.len(), pages = page, "Enumerated web maps");
        Ok(maps)
    }

    /// Data layers of a web map, from its item data.
    ///
    /// Maps whose data is empty or unreadable to this user have no layers.
    pub async fn map_layers(&self, map_id: &str) -> Result<Vec<MapLayer>, PortalError> {
        let url = self.endpoint(&["sharing", "rest", "content", "items", map_id, "data"])?;
        let body = self.get_authorized(OP_ITEM_DATA, &url, &[("f", "json")]).await?;

        if let Some(error) = portal_error(&body) {
            tracing::warn!(map_id, code = error.code, message = %error.message, "Portal returned an error for web map data");
            return Ok(Vec::new());
        }
        if !body.is_object() {
            return Ok(Vec::new());
        }

        match serde_json::from_value::<ItemData>(body) {
            Ok(data) => Ok(data.into_map_layers()),
            Err(e) => {
                tracing::warn!(map_id, error = %e, "Unreadable web map data, skipping its layers");
                Ok(Vec::new())
            }
        }
    }

    /// Details of a layer item, or `None` if the portal reports it
    /// missing or inaccessible.
    pub async fn item_details(&self, item_id: &str) -> Result<Option<LayerDetails>, PortalError> {
        match self.fetch_item(item_id).await? {
            Ok(details) => Ok(Some(details)),
            Err(error) => {
                tracing::warn!(item_id, code = error.code, message = %error.message, "Error fetching layer with itemId: {item_id}");
                Ok(None)
            }
        }
    }

    /// Whether the item exists and is visible to the current token.
    pub async fn item_exists(&self, item_id: &str) -> Result<bool, PortalError> {
        Ok(self.fetch_item(item_id).await?.is_ok())
    }

    /// Fetch details for many items concurrently, preserving input order.
    ///
    /// Unavailable items are dropped. At most `concurrency` requests are in
    /// flight; the first hard error aborts the batch.
    pub async fn item_details_batch(
        &self,
        item_ids: &[String],
        concurrency: usize,
    ) -> Result<Vec<LayerDetails>, PortalError> {
        let fetched: Vec<Option<LayerDetails>> = stream::iter(item_ids)
            .map(|item_id| self.item_details(item_id))
            .buffered(concurrency.max(1))
            .try_collect()
            .await?;

        Ok(fetched.into_iter().flatten().collect())
    }

    // ---- private helpers ----

    async fn fetch_item(&self, item_id: &str) -> Result<Result<LayerDetails, PortalErrorBody>, PortalError> {
        let url = self.endpoint(&["sharing", "rest", "content", "items", item_id])?;
        let body = match self.get_authorized(OP_ITEM_DETAILS, &url, &[("f", "json")]).await {
            Ok(body) => body,
            // Without credentials a private item is just unavailable.
            Err(PortalError::TokenExpired { .. }) if !self.has_credentials() => {
                return Ok(Err(PortalErrorBody {
                    code: 499,
                    message: "Token required".to_string(),
                }));
            }
            Err(e) => return Err(e),
        };

        if let Some(error) = portal_error(&body) {
            return Ok(Err(error));
        }
        Ok(Ok(decode(OP_ITEM_DETAILS, body)?))
    }

    /// GET with the current token, refreshing it once if the portal
    /// reports it expired.
    async fn get_authorized(
        &self,
        operation: &'static str,
        url: &Url,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, PortalError> {
        let mut refreshed = false;

        loop {
            let token = self.token().await;
            match self.get_once(operation, url, params, token.as_deref()).await? {
                Reply::Body(body) => return Ok(body),
                Reply::TokenExpired => {
                    if refreshed || !self.has_credentials() {
                        return Err(PortalError::TokenExpired { operation });
                    }
                    tracing::info!(operation, "Token expired, attempting to refresh");
                    self.refresh_token(token.as_deref()).await?;
                    refreshed = true;
                }
            }
        }
    }

    async fn get_once(
        &self,
        operation: &'static str,
        url: &Url,
        params: &[(&str, &str)],
        token: Option<&str>,
    ) -> Result<Reply, PortalError> {
        let response = self
            .send_with_retry(operation, || {
                let request = self.client.get(url.clone()).query(params);
                match token {
                    Some(token) => request.query(&[("token", token)]),
                    None => request,
                }
            })
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(Reply::TokenExpired);
        }

        let body = Self::read_json(operation, response).await?;
        if portal_error(&body).is_some_and(|error| error.is_token_error()) {
            return Ok(Reply::TokenExpired);
        }
        Ok(Reply::Body(body))
    }

    /// Replace the token unless another request already replaced `stale`.
    async fn refresh_token(&self, stale: Option<&str>) -> Result<(), PortalError> {
        let Some(credentials) = &self.options.credentials else {
            return Ok(());
        };

        let mut slot = self.token.write().await;
        if slot.as_deref() != stale {
            tracing::debug!("Token already refreshed by a concurrent request");
            return Ok(());
        }
        *slot = self.generate_token(credentials).await?;
        Ok(())
    }

    /// Send a request, retrying transport failures and 5xx responses after
    /// each delay of the retry policy.
    async fn send_with_retry<F>(
        &self,
        operation: &'static str,
        build: F,
    ) -> Result<reqwest::Response, PortalError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut delays = self.options.retry.delays.iter();

        loop {
            let outcome = build().send().await;
            let failure = match &outcome {
                Ok(response) if response.status().is_server_error() => {
                    Some(format!("HTTP {}", response.status().as_u16()))
                }
                Err(e) if RetryPolicy::is_transient(e) => Some(e.to_string()),
                _ => None,
            };

            match (failure, delays.next()) {
                (Some(failure), Some(delay)) => {
                    tracing::warn!(
                        operation,
                        delay_ms = delay.as_millis() as u64,
                        error = %failure,
                        "Portal request failed, retrying"
                    );
                    tokio::time::sleep(*delay).await;
                }
                // Tokens travel in the query string; keep URLs out of errors.
                _ => return outcome.map_err(|e| PortalError::Request(e.without_url())),
            }
        }
    }

    /// Ensure a success status and parse the body as JSON. An empty body
    /// parses as `null`.
    async fn read_json(
        operation: &'static str,
        response: reqwest::Response,
    ) -> Result<serde_json::Value, PortalError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(PortalError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await.map_err(reqwest::Error::without_url)?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text).map_err(|source| PortalError::Decode { operation, source })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, PortalError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PortalError::InvalidUrl(self.options.portal_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn decode<T: DeserializeOwned>(operation: &'static str, body: serde_json::Value) -> Result<T, PortalError> {
    serde_json::from_value(body).map_err(|source| PortalError::Decode { operation, source })
}
