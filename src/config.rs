//! Process configuration loaded once at startup.
//!
//! The binary loads `.env` and calls [`Config::from_env`]; everything downstream
//! receives the resulting `Config` by reference.

use thiserror::Error;

/// Default search endpoint.
pub const DEFAULT_SEARCH_URL: &str = "https://serpapi.com/search";

/// Default maximum number of queries issued per run.
pub const MAX_SEARCHES: usize = 10;

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("{name} is not set; add it to your environment or .env file")]
    Missing { name: &'static str },

    /// A variable is set but cannot be used
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Immutable run configuration.
#[derive(Clone)]
pub struct Config {
    serpapi_key: String,
    groq_api_key: String,
    search_url: String,
    max_searches: usize,
    sheets_token: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("serpapi_key", &"<redacted>")
            .field("groq_api_key", &"<redacted>")
            .field("search_url", &self.search_url)
            .field("max_searches", &self.max_searches)
            .field("sheets_token", &self.sheets_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    /// Creates a configuration from explicit keys, using defaults for everything else.
    pub fn new(serpapi_key: impl Into<String>, groq_api_key: impl Into<String>) -> Self {
        Self {
            serpapi_key: serpapi_key.into(),
            groq_api_key: groq_api_key.into(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            max_searches: MAX_SEARCHES,
            sheets_token: None,
        }
    }

    /// Reads configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `SERPAPI_KEY` (required)
    /// - `GROQ_API_KEY` (required, not used by the search pipeline)
    /// - `SERPAPI_URL` (optional, defaults to [`DEFAULT_SEARCH_URL`])
    /// - `MAX_SEARCHES` (optional positive integer, defaults to [`MAX_SEARCHES`])
    /// - `GOOGLE_SHEETS_TOKEN` (optional bearer token for private sheets)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if a required key is absent and
    /// `ConfigError::Invalid` if `SERPAPI_URL` or `MAX_SEARCHES` does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let serpapi_key = required_var("SERPAPI_KEY")?;
        let groq_api_key = required_var("GROQ_API_KEY")?;

        let mut config = Self::new(serpapi_key, groq_api_key);

        if let Some(url) = optional_var("SERPAPI_URL") {
            config.search_url = parse_search_url(&url)?;
        }

        if let Some(raw) = optional_var("MAX_SEARCHES") {
            config.max_searches = parse_max_searches(&raw)?;
        }

        config.sheets_token = optional_var("GOOGLE_SHEETS_TOKEN");

        Ok(config)
    }

    /// Overrides the search endpoint.
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    /// Overrides the per-run query cap.
    pub fn with_max_searches(mut self, max_searches: usize) -> Self {
        self.max_searches = max_searches;
        self
    }

    /// Sets the bearer token used for spreadsheet exports.
    pub fn with_sheets_token(mut self, token: impl Into<String>) -> Self {
        self.sheets_token = Some(token.into());
        self
    }

    pub fn serpapi_key(&self) -> &str {
        &self.serpapi_key
    }

    pub fn groq_api_key(&self) -> &str {
        &self.groq_api_key
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    pub fn max_searches(&self) -> usize {
        self.max_searches
    }

    pub fn sheets_token(&self) -> Option<&str> {
        self.sheets_token.as_deref()
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    optional_var(name).ok_or(ConfigError::Missing { name })
}

/// Returns the trimmed value of `name`, treating blank values as unset.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Checks that `raw` is an absolute http(s) URL.
fn parse_search_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: "SERPAPI_URL",
        value: raw.to_string(),
        reason,
    };

    let url = reqwest::Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(raw.to_string()),
        scheme => Err(invalid(format!("unsupported scheme '{}'", scheme))),
    }
}

/// Parses a query cap, which must be at least 1.
pub fn parse_max_searches(raw: &str) -> Result<usize, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        name: "MAX_SEARCHES",
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    match raw.trim().parse::<usize>() {
        Ok(0) => Err(invalid("must be at least 1")),
        Ok(n) => Ok(n),
        Err(e) => Err(invalid(&e.to_string())),
    }
}
