use std::time::Duration;

use reqwest::header::CONTENT_TYPE;

use super::{SourceError, Table, read_csv};

/// Base URL for spreadsheet CSV exports.
pub const DEFAULT_EXPORT_BASE: &str = "https://docs.google.com/spreadsheets/d";

/// Builder for [`GoogleSheetSource`].
#[derive(Debug, Default)]
pub struct GoogleSheetSourceBuilder {
    base_url: Option<String>,
    token: Option<String>,
    http_client: Option<reqwest::blocking::Client>,
}

impl GoogleSheetSourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the export base URL (defaults to [`DEFAULT_EXPORT_BASE`]).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sends `Authorization: Bearer <token>` with export requests.
    pub fn token(mut self, token: Option<impl Into<String>>) -> Self {
        self.token = token.map(Into::into);
        self
    }

    /// Uses a preconfigured HTTP client.
    pub fn http_client(mut self, client: reqwest::blocking::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build(self) -> Result<GoogleSheetSource, SourceError> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_EXPORT_BASE.to_string());

        reqwest::Url::parse(&base_url)
            .map_err(|e| SourceError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = match self.http_client {
            Some(client) => client,
            None => reqwest::blocking::Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .build()
                .map_err(SourceError::Network)?,
        };

        Ok(GoogleSheetSource {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: self.token,
        })
    }
}

/// Fetches a spreadsheet through its CSV export endpoint.
pub struct GoogleSheetSource {
    client: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

impl GoogleSheetSource {
    /// Returns the export URL for a sheet key and optional worksheet id.
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetquery::GoogleSheetSourceBuilder;
    ///
    /// let source = GoogleSheetSourceBuilder::new().build().unwrap();
    /// assert_eq!(
    ///     source.export_url("abc123", Some(7)),
    ///     "https://docs.google.com/spreadsheets/d/abc123/export?format=csv&gid=7"
    /// );
    /// ```
    pub fn export_url(&self, key: &str, gid: Option<u64>) -> String {
        let mut url = format!("{}/{}/export?format=csv", self.base_url, key);
        if let Some(gid) = gid {
            url.push_str(&format!("&gid={}", gid));
        }
        url
    }

    /// Downloads and parses one worksheet.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::InvalidSheetKey` for malformed keys, `Network`/`Http`
    /// on transport failures, and `SheetNotAccessible` when the export answers with a
    /// sign-in page instead of CSV.
    pub fn fetch(&self, key: &str, gid: Option<u64>) -> Result<Table, SourceError> {
        let key = key.trim();
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(SourceError::InvalidSheetKey(key.to_string()));
        }

        let url = self.export_url(key, gid);
        log::debug!("Fetching sheet export {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(SourceError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
            });
        }

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/html"));
        if is_html {
            return Err(SourceError::SheetNotAccessible);
        }

        let body = response.bytes().map_err(SourceError::Network)?;
        let table = read_csv(body.as_ref())?;

        log::info!("Loaded {} records from sheet {}", table.len(), key);
        Ok(table)
    }
}
