//! Query formatting.
//!
//! A [`QueryTemplate`] holds text with a single `{entity}` placeholder. Formatting
//! substitutes one record's field value and cannot fail.

use thiserror::Error;

use crate::models::{Query, Record};
use crate::source::{SourceError, Table};

/// Placeholder replaced by the selected field's value.
pub const PLACEHOLDER: &str = "{entity}";

/// Errors for user-supplied templates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template must contain the {{entity}} placeholder")]
    MissingPlaceholder,

    #[error("template must contain {{entity}} exactly once, found {count}")]
    RepeatedPlaceholder { count: usize },

    #[error("attribute to search for cannot be empty")]
    EmptyAttribute,
}

/// A query template with exactly one `{entity}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    text: String,
}

impl QueryTemplate {
    /// Builds the default "Get me the {attribute} of {entity}" template.
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetquery::QueryTemplate;
    ///
    /// let template = QueryTemplate::for_attribute("email");
    /// assert_eq!(template.format("Acme").as_str(), "Get me the email of Acme");
    /// ```
    pub fn for_attribute(attribute: &str) -> Self {
        // Keep exactly one placeholder.
        let attribute = attribute.replace(PLACEHOLDER, "");
        Self {
            text: format!("Get me the {} of {}", attribute.trim(), PLACEHOLDER),
        }
    }

    /// Parses a custom template.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError` unless `{entity}` occurs exactly once.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        match text.matches(PLACEHOLDER).count() {
            0 => Err(TemplateError::MissingPlaceholder),
            1 => Ok(Self {
                text: text.to_string(),
            }),
            count => Err(TemplateError::RepeatedPlaceholder { count }),
        }
    }

    /// Returns the raw template text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Substitutes `value` into the template.
    pub fn format(&self, value: &str) -> Query {
        Query::new(self.text.replacen(PLACEHOLDER, value, 1))
    }

    /// Formats the query for one record's `column`; a missing field yields an empty substitution.
    pub fn format_record(&self, record: &Record, column: &str) -> Query {
        self.format(&record.text(column))
    }
}

/// Lazily yields one query per record, in table order.
///
/// Queries are only built as the iterator is advanced, so records past a batch cap
/// are never read.
///
/// # Errors
///
/// Returns `SourceError::UnknownColumn` if `column` is not in the table.
pub fn queries_for<'a>(
    table: &'a Table,
    column: &'a str,
    template: &'a QueryTemplate,
) -> Result<impl Iterator<Item = Query> + 'a, SourceError> {
    table.require_column(column)?;
    Ok(table
        .records()
        .iter()
        .map(move |record| template.format_record(record, column)))
}
