use std::io::Read;

use crate::models::{FieldValue, Record};

use super::{SourceError, Table, column_name};

/// Parses CSV with a header row into a [`Table`].
///
/// Short rows are padded with `FieldValue::Empty`; fields past the header width are dropped.
pub fn read_csv<R: Read>(reader: R) -> Result<Table, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| column_name(i, h))
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let fields = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let value = row.get(i).map(FieldValue::text).unwrap_or(FieldValue::Empty);
                (column.clone(), value)
            })
            .collect();
        records.push(Record::new(fields));
    }

    Ok(Table::new(columns, records))
}
