pub mod batch;
pub mod config;
pub mod models;
pub mod search;
pub mod sink;
pub mod source;
pub mod template;

pub use batch::{BatchEvent, BatchReport, BatchSearch, QueryOutcome};
pub use config::{Config, ConfigError};
pub use models::{FieldValue, Query, Record, ResultRow};
pub use search::{SearchClient, SearchClientBuilder, SearchClientTrait, SearchError, SearchResponse};
pub use sink::SinkError;
pub use source::{GoogleSheetSource, GoogleSheetSourceBuilder, SourceError, Table};
pub use template::{QueryTemplate, TemplateError, queries_for};
