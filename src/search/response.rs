use crate::models::ResultRow;

/// Field holding the ranked web results in a search response.
const ORGANIC_RESULTS: &str = "organic_results";

/// Raw JSON body returned by the search API.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    body: serde_json::Value,
}

impl SearchResponse {
    pub fn new(body: serde_json::Value) -> Self {
        Self { body }
    }

    /// Extracts organic results in response order.
    ///
    /// Returns `None` when the field is absent or not an array. Entries without a
    /// string `title`, `link` and `snippet` are skipped.
    pub fn organic_results(&self) -> Option<Vec<ResultRow>> {
        let entries = self.body.get(ORGANIC_RESULTS)?.as_array()?;

        let rows = entries
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                match serde_json::from_value::<ResultRow>(entry.clone()) {
                    Ok(row) => Some(row),
                    Err(e) => {
                        log::warn!("Skipping organic result #{}: {}", position + 1, e);
                        None
                    }
                }
            })
            .collect();

        Some(rows)
    }
}
