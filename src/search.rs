/// Search API HTTP client.
///
/// This module provides a blocking client for the SerpAPI search endpoint, the
/// response wrapper that extracts organic results, and the error type shared
/// with the batch runner.
mod client;
mod response;

pub use client::{SearchClient, SearchClientBuilder, SearchClientTrait, SearchError};
pub use response::SearchResponse;
