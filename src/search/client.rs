//! Search API HTTP client implementation.
//!
//! This module provides `SearchClient` for making synchronous HTTP requests to the
//! search endpoint, along with error types and the builder used to configure it.

use thiserror::Error;

use crate::config::{Config, DEFAULT_SEARCH_URL};
use crate::models::Query;

use super::SearchResponse;

/// Errors that can occur when calling the search API.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// Response body was not valid JSON
    #[error("Invalid response body: {0}")]
    Decode(#[source] reqwest::Error),

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl SearchError {
    fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            SearchError::Timeout(error)
        } else {
            SearchError::Network(error)
        }
    }
}

/// Builder for constructing `SearchClient` instances.
///
/// # Examples
///
/// ```
/// use sheetquery::SearchClientBuilder;
///
/// let client = SearchClientBuilder::new()
///     .base_url("http://localhost:8080/search")
///     .api_key("test-key")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.base_url(), "http://localhost:8080/search");
/// ```
#[derive(Debug, Default)]
pub struct SearchClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    http_client: Option<reqwest::blocking::Client>,
}

impl SearchClientBuilder {
    /// Creates a new `SearchClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder preloaded with the endpoint and key from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .base_url(config.search_url())
            .api_key(config.serpapi_key())
    }

    /// Sets the search endpoint URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The full endpoint (e.g., "https://serpapi.com/search")
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the API key sent as the `api_key` parameter.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Uses a preconfigured HTTP client instead of the default one.
    pub fn http_client(mut self, client: reqwest::blocking::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the `SearchClient` with the configured settings.
    ///
    /// If `base_url()` was not called the client targets [`DEFAULT_SEARCH_URL`].
    /// No request timeout is set beyond the HTTP client's default.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidUrl` if the endpoint does not parse.
    pub fn build(self) -> Result<SearchClient, SearchError> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string());

        reqwest::Url::parse(&base_url)
            .map_err(|e| SearchError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = match self.http_client {
            Some(client) => client,
            None => reqwest::blocking::Client::builder()
                .build()
                .map_err(SearchError::Network)?,
        };

        Ok(SearchClient {
            client,
            base_url,
            api_key: self.api_key.unwrap_or_default(),
        })
    }
}

/// Synchronous HTTP client for the search API.
///
/// Each call issues exactly one GET request; there is no retry.
pub struct SearchClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

/// Trait for search API operations.
///
/// This trait enables mocking in unit tests and lets the batch runner stay
/// independent of the HTTP transport.
pub trait SearchClientTrait: Send + Sync {
    /// Runs one search and returns the parsed response.
    fn search(&self, query: &Query) -> Result<SearchResponse, SearchError>;
}

impl SearchClient {
    /// Returns the endpoint this client calls.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_internal(&self, query: &Query) -> Result<SearchResponse, SearchError> {
        log::debug!("GET {} q={:?}", self.base_url, query.as_str());

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query.as_str()), ("api_key", self.api_key.as_str())])
            .send()
            .map_err(SearchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Http {
                status: status.as_u16(),
            });
        }

        let json: serde_json::Value = response.json().map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout(e)
            } else {
                SearchError::Decode(e)
            }
        })?;

        Ok(SearchResponse::new(json))
    }
}

impl SearchClientTrait for SearchClient {
    fn search(&self, query: &Query) -> Result<SearchResponse, SearchError> {
        self.search_internal(query)
    }
}
