use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use crate::models::{FieldValue, Record};

use super::{SourceError, Table, column_name};

/// Reads the first worksheet of a workbook; its first row is the header.
pub fn read_excel(path: &Path) -> Result<Table, SourceError> {
    let mut workbook = open_workbook_auto(path)?;
    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(SourceError::EmptyWorkbook)?;

    let range = workbook.worksheet_range(&first_sheet)?;
    log::debug!("Reading worksheet '{}' from {}", first_sheet, path.display());

    Ok(table_from_rows(range.rows()))
}

/// Builds a table from worksheet rows, treating the first row as the header.
pub fn table_from_rows<'a, I>(mut rows: I) -> Table
where
    I: Iterator<Item = &'a [Data]>,
{
    let Some(header) = rows.next() else {
        return Table::default();
    };

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| column_name(i, &cell.to_string()))
        .collect();

    let records = rows
        .map(|row| {
            let fields = columns
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let value = row.get(i).map(cell_value).unwrap_or(FieldValue::Empty);
                    (column.clone(), value)
                })
                .collect();
            Record::new(fields)
        })
        .collect();

    Table::new(columns, records)
}

fn cell_value(cell: &Data) -> FieldValue {
    match cell {
        Data::Empty => FieldValue::Empty,
        Data::String(s) => FieldValue::text(s.as_str()),
        Data::Int(n) => FieldValue::Integer(*n),
        Data::Float(x) => FieldValue::Float(*x),
        Data::Bool(b) => FieldValue::Bool(*b),
        other => FieldValue::text(other.to_string()),
    }
}
