//! Supabase REST client.
//!
//! Thin client over the PostgREST (`/rest/v1`) and GoTrue (`/auth/v1`)
//! endpoints with:
//! - HTTP client tuning (pooling, timeouts)
//! - Observability (tracing spans, metrics)
//!
//! Calls are never retried; the caller decides what a failure means.

use std::time::{Duration, Instant};

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info_span, Instrument};

use crate::error::{SupabaseError, SupabaseResult};
use crate::metrics::record_request;

/// Table used for connectivity checks.
const PING_TABLE: &str = "videos";

// =============================================================================
// Configuration
// =============================================================================

/// Supabase client configuration.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Public anon key, sent as `apikey` on every call
    pub anon_key: String,
    /// Service role key used for table writes when present
    pub service_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl SupabaseConfig {
    /// Create config from environment variables.
    pub fn from_env() -> SupabaseResult<Self> {
        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| SupabaseError::config("SUPABASE_URL must be set"))?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .or_else(|_| std::env::var("SUPABASE_KEY"))
            .map_err(|_| SupabaseError::config("SUPABASE_ANON_KEY must be set"))?;

        if url.trim().is_empty() || anon_key.trim().is_empty() {
            return Err(SupabaseError::config(
                "SUPABASE_URL and SUPABASE_ANON_KEY cannot be empty",
            ));
        }

        let timeout_secs: u64 = std::env::var("SUPABASE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            url: url.trim().trim_end_matches('/').to_string(),
            anon_key: anon_key.trim().to_string(),
            service_key: std::env::var("SUPABASE_SERVICE_ROLE_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(5),
        })
    }

    /// Config pointing at an arbitrary base URL (local stacks, tests).
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            service_key: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

// =============================================================================
// Query
// =============================================================================

/// PostgREST query: horizontal filters, ordering, and a row limit.
#[derive(Debug, Clone, Default)]
pub struct Query {
    filters: Vec<(String, String)>,
    order: Option<String>,
    limit: Option<u32>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// `column = value`
    pub fn eq(mut self, column: &str, value: impl AsRef<str>) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value.as_ref())));
        self
    }

    /// `column <> value`
    pub fn neq(mut self, column: &str, value: impl AsRef<str>) -> Self {
        self.filters
            .push((column.to_string(), format!("neq.{}", value.as_ref())));
        self
    }

    /// Most recent first by `column`.
    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(format!("{}.desc", column));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn filter_pairs(&self) -> Vec<(String, String)> {
        self.filters.clone()
    }

    fn select_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), "*".to_string())];
        pairs.extend(self.filter_pairs());
        if let Some(order) = &self.order {
            pairs.push(("order".to_string(), order.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

// =============================================================================
// Client
// =============================================================================

/// Supabase REST client.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    config: SupabaseConfig,
}

impl SupabaseClient {
    /// Create a new Supabase client.
    pub fn new(config: SupabaseConfig) -> SupabaseResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("cstudio-supabase/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SupabaseError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> SupabaseResult<Self> {
        Self::new(SupabaseConfig::from_env()?)
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url, table)
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.url, path.trim_start_matches('/'))
    }

    /// Request carrying the project key and, when given, a user access token.
    pub(crate) fn auth_request(&self, method: Method, path: &str, user_token: Option<&str>) -> RequestBuilder {
        let builder = self
            .http
            .request(method, self.auth_url(path))
            .header("apikey", &self.config.anon_key);

        match user_token {
            Some(token) => builder.bearer_auth(token),
            None => builder.bearer_auth(&self.config.anon_key),
        }
    }

    fn rest_request(&self, method: Method, table: &str) -> RequestBuilder {
        let key = self
            .config
            .service_key
            .as_deref()
            .unwrap_or(&self.config.anon_key);

        self.http
            .request(method, self.rest_url(table))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(key)
    }

    // =========================================================================
    // Table Operations
    // =========================================================================

    /// Insert a row and return its stored representation.
    pub async fn insert<T, R>(&self, table: &str, row: &T) -> SupabaseResult<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute_request("insert", table, None, async {
            let response = self
                .rest_request(Method::POST, table)
                .header("Prefer", "return=representation")
                .json(row)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(Self::handle_error_response(status, table, response).await);
            }

            let mut rows: Vec<R> = response.json().await?;
            if rows.is_empty() {
                return Err(SupabaseError::invalid_response(format!(
                    "insert into {} returned no rows",
                    table
                )));
            }
            Ok(rows.swap_remove(0))
        })
        .await
    }

    /// Select rows matching a query.
    pub async fn select<R>(&self, table: &str, query: &Query) -> SupabaseResult<Vec<R>>
    where
        R: DeserializeOwned,
    {
        self.execute_request("select", table, None, async {
            let response = self
                .rest_request(Method::GET, table)
                .query(&query.select_pairs())
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(Self::handle_error_response(status, table, response).await);
            }

            Ok(response.json().await?)
        })
        .await
    }

    /// Select a single row by column value.
    pub async fn select_one<R>(&self, table: &str, column: &str, value: &str) -> SupabaseResult<Option<R>>
    where
        R: DeserializeOwned,
    {
        let query = Query::new().eq(column, value).limit(1);
        let rows: Vec<R> = self.select(table, &query).await?;
        Ok(rows.into_iter().next())
    }

    /// Update rows matching `column = value`; returns the updated rows.
    pub async fn update<P, R>(
        &self,
        table: &str,
        column: &str,
        value: &str,
        patch: &P,
    ) -> SupabaseResult<Vec<R>>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let query = Query::new().eq(column, value);

        self.execute_request("update", table, Some(value), async {
            let response = self
                .rest_request(Method::PATCH, table)
                .query(&query.filter_pairs())
                .header("Prefer", "return=representation")
                .json(patch)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(Self::handle_error_response(status, table, response).await);
            }

            Ok(response.json().await?)
        })
        .await
    }

    /// Delete rows matching `column = value`.
    ///
    /// Returns `false` when nothing matched; deleting a missing row is not an error.
    pub async fn delete(&self, table: &str, column: &str, value: &str) -> SupabaseResult<bool> {
        let query = Query::new().eq(column, value);

        self.execute_request("delete", table, Some(value), async {
            let response = self
                .rest_request(Method::DELETE, table)
                .query(&query.filter_pairs())
                .header("Prefer", "return=representation")
                .send()
                .await?;

            let status = response.status();
            match status {
                StatusCode::NOT_FOUND => {
                    debug!("Row {}/{} already deleted (idempotent)", table, value);
                    Ok(false)
                }
                s if s.is_success() => {
                    let rows: Vec<serde_json::Value> = response.json().await.unwrap_or_default();
                    if rows.is_empty() {
                        debug!("Row {}/{} already deleted (idempotent)", table, value);
                    }
                    Ok(!rows.is_empty())
                }
                _ => Err(Self::handle_error_response(status, table, response).await),
            }
        })
        .await
    }

    /// Cheap round trip proving the database answers.
    pub async fn ping(&self) -> SupabaseResult<()> {
        self.execute_request("ping", PING_TABLE, None, async {
            let response = self
                .rest_request(Method::GET, PING_TABLE)
                .query(&[("select", "id"), ("limit", "1")])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(Self::handle_error_response(status, PING_TABLE, response).await);
            }
            Ok(())
        })
        .await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    pub(crate) async fn execute_request<T, F>(
        &self,
        operation: &str,
        target: &str,
        row_id: Option<&str>,
        fut: F,
    ) -> SupabaseResult<T>
    where
        F: std::future::Future<Output = SupabaseResult<T>>,
    {
        let span = if let Some(id) = row_id {
            info_span!("supabase_request", operation = %operation, target = %target, row_id = %id)
        } else {
            info_span!("supabase_request", operation = %operation, target = %target)
        };

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }

    pub(crate) async fn handle_error_response(
        status: StatusCode,
        target: &str,
        response: reqwest::Response,
    ) -> SupabaseError {
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| format!("{} failed: {}", target, body));
        SupabaseError::from_http_status(status.as_u16(), message)
    }
}

/// Pull the human readable message out of a PostgREST or GoTrue error body.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

// =============================================================================
// Tests
// =============================================================================
