use super::FieldValue;

/// One row of a source table: field names paired with values, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// Creates a record from ordered `(name, value)` pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetquery::{FieldValue, Record};
    ///
    /// let record = Record::new(vec![("company".to_string(), FieldValue::from("Acme"))]);
    /// assert_eq!(record.get("company"), Some(&FieldValue::from("Acme")));
    /// assert_eq!(record.get("missing"), None);
    /// ```
    pub fn new(fields: Vec<(String, FieldValue)>) -> Self {
        Self { fields }
    }

    /// Looks up a field by exact name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Returns the string form of a field, or an empty string when it is absent.
    pub fn text(&self, name: &str) -> String {
        self.get(name).map(ToString::to_string).unwrap_or_default()
    }

    /// Iterates over values in column order.
    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
