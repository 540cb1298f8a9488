mod field_value;
mod query;
mod record;
mod result_row;

pub use field_value::FieldValue;
pub use query::Query;
pub use record::Record;
pub use result_row::ResultRow;
