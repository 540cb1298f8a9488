use serde::Deserialize;

/// One search hit: the `(title, link, snippet)` triple written to the output CSV.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResultRow {
    title: String,
    link: String,
    snippet: String,
}

impl ResultRow {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    /// Returns the fields in output column order.
    pub fn as_record(&self) -> [&str; 3] {
        [&self.title, &self.link, &self.snippet]
    }
}
