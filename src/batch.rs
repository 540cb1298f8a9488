//! Bounded, sequential batch search.
//!
//! [`BatchSearch`] walks a query sequence in order, issuing at most `limit`
//! searches one at a time. A failed search is recorded in its [`QueryOutcome`]
//! and the batch moves on; nothing aborts the run.

use std::sync::Arc;

use crate::config::Config;
use crate::models::{Query, ResultRow};
use crate::search::{SearchClientTrait, SearchError};

/// Progress notifications emitted while a batch runs.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// A search is about to be issued; `index` is zero-based.
    QueryStarted { index: usize, query: &'a Query },
    /// One result row was extracted.
    ResultFound { query: &'a Query, row: &'a ResultRow },
    /// The search succeeded but produced no rows.
    NoResults { query: &'a Query },
    /// The search failed; the batch continues.
    QueryFailed {
        query: &'a Query,
        error: &'a SearchError,
    },
    /// Input remained after `limit` searches were issued.
    CapReached { limit: usize },
}

/// Result of one issued query.
#[derive(Debug)]
pub struct QueryOutcome {
    query: Query,
    result: Result<Vec<ResultRow>, SearchError>,
}

impl QueryOutcome {
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn result(&self) -> &Result<Vec<ResultRow>, SearchError> {
        &self.result
    }

    /// Rows contributed by this query; empty on failure.
    pub fn rows(&self) -> &[ResultRow] {
        match &self.result {
            Ok(rows) => rows,
            Err(_) => &[],
        }
    }

    pub fn is_failure(&self) -> bool {
        self.result.is_err()
    }
}

/// Everything a batch run produced.
#[derive(Debug, Default)]
pub struct BatchReport {
    outcomes: Vec<QueryOutcome>,
    truncated: bool,
}

impl BatchReport {
    /// Per-query outcomes in issue order.
    pub fn outcomes(&self) -> &[QueryOutcome] {
        &self.outcomes
    }

    pub fn queries_issued(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &QueryOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// True when input remained after the cap was hit.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// All rows, in query-issue order and then response order.
    pub fn rows(&self) -> Vec<ResultRow> {
        self.outcomes
            .iter()
            .flat_map(|o| o.rows().iter().cloned())
            .collect()
    }

    pub fn into_rows(self) -> Vec<ResultRow> {
        self.outcomes
            .into_iter()
            .filter_map(|o| o.result.ok())
            .flatten()
            .collect()
    }
}

/// Issues searches for a sequence of queries, up to a fixed cap.
pub struct BatchSearch {
    client: Arc<dyn SearchClientTrait>,
    limit: usize,
}

impl BatchSearch {
    /// Creates a runner that issues at most `limit` searches per run.
    pub fn new(client: Arc<dyn SearchClientTrait>, limit: usize) -> Self {
        Self { client, limit }
    }

    /// Creates a runner capped at the configured maximum.
    pub fn from_config(client: Arc<dyn SearchClientTrait>, config: &Config) -> Self {
        Self::new(client, config.max_searches())
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Runs the batch without progress reporting.
    pub fn run<I>(&self, queries: I) -> BatchReport
    where
        I: IntoIterator<Item = Query>,
    {
        self.run_with_progress(queries, |_| {})
    }

    /// Runs the batch, calling `observer` for each progress event.
    ///
    /// Queries are pulled from `queries` lazily; at most one item past the cap is
    /// read, to decide whether to report `CapReached`.
    pub fn run_with_progress<I, F>(&self, queries: I, mut observer: F) -> BatchReport
    where
        I: IntoIterator<Item = Query>,
        F: FnMut(BatchEvent<'_>),
    {
        let mut queries = queries.into_iter();
        let mut outcomes = Vec::new();

        while outcomes.len() < self.limit {
            let Some(query) = queries.next() else {
                break;
            };

            let index = outcomes.len();
            observer(BatchEvent::QueryStarted {
                index,
                query: &query,
            });
            log::info!("Searching for: {}", query);

            let result = self.search_one(&query, &mut observer);
            outcomes.push(QueryOutcome { query, result });
        }

        let truncated = outcomes.len() == self.limit && queries.next().is_some();
        if truncated {
            log::info!("Reached the maximum of {} searches", self.limit);
            observer(BatchEvent::CapReached { limit: self.limit });
        }

        BatchReport {
            outcomes,
            truncated,
        }
    }

    fn search_one<F>(&self, query: &Query, observer: &mut F) -> Result<Vec<ResultRow>, SearchError>
    where
        F: FnMut(BatchEvent<'_>),
    {
        match self.client.search(query) {
            Ok(response) => {
                let rows = response.organic_results().unwrap_or_default();
                if rows.is_empty() {
                    log::info!("No results found for {}", query);
                    observer(BatchEvent::NoResults { query });
                }
                for row in &rows {
                    observer(BatchEvent::ResultFound { query, row });
                }
                Ok(rows)
            }
            Err(error) => {
                log::info!("Error searching for {}: {}", query, error);
                observer(BatchEvent::QueryFailed {
                    query,
                    error: &error,
                });
                Err(error)
            }
        }
    }
}
