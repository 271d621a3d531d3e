//! The row store

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::row::Row;
use super::value::CellValue;
use crate::error::{Error, Result};

/// An ordered sequence of rows.
///
/// Columns are not declared: they are derived from the keys of the first row,
/// and a column's values are projected from the rows on demand. Every
/// derivation returns a new `Table`; [`Table::sort_in_place`] is the only
/// operation that reorders rows of an existing table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    /// Wrap a sequence of rows
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Wrap a sequence of rows, requiring every row to carry exactly the
    /// keys of the first row.
    pub fn with_strict_schema(rows: Vec<Row>) -> Result<Self> {
        if let Some(first) = rows.first() {
            for (idx, row) in rows.iter().enumerate().skip(1) {
                if !row.same_keys(first) {
                    return Err(Error::SchemaMismatch {
                        row: idx,
                        expected: first.keys().collect::<Vec<_>>().join(", "),
                        found: row.keys().collect::<Vec<_>>().join(", "),
                    });
                }
            }
        }
        Ok(Self::new(rows))
    }

    /// Build a table from a JSON array of objects
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(Error::NotARecordSequence(format!(
                    "got {}",
                    json_kind(&other)
                )))
            }
        };

        let rows = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::Object(obj) => Ok(obj.into_iter().collect::<Row>()),
                other => Err(Error::NotARecordSequence(format!(
                    "element {} is {}",
                    idx,
                    json_kind(&other)
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        trace!(rows = rows.len(), "table built from json");
        Ok(Self::new(rows))
    }

    /// Parse JSON text into a table
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Self::from_json(value)
    }

    /// Column names, taken from the first row only.
    ///
    /// Later rows with extra or missing keys do not change the result.
    pub fn columns(&self) -> Result<Vec<&str>> {
        self.rows
            .first()
            .map(|row| row.keys().collect())
            .ok_or(Error::EmptyTable)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Values of `key` across all rows, skipping rows where it is absent
    pub fn column(&self, key: &str) -> Vec<CellValue> {
        self.rows
            .iter()
            .filter_map(|row| row.get(key).cloned())
            .collect()
    }

    /// Distinct values of a column in first-seen order
    pub fn unique(&self, column: &str) -> Vec<CellValue> {
        self.column(column)
            .into_iter()
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    /// The raw rows, suitable for serialization
    pub fn to_json(&self) -> &[Row] {
        &self.rows
    }

    /// The raw rows as a JSON value
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(&self.rows)?)
    }

    /// Print the table as a text grid on stdout
    pub fn print(&self) {
        println!("{}", self);
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl From<Vec<Row>> for Table {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

impl FromIterator<Row> for Table {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl TryFrom<serde_json::Value> for Table {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        Self::from_json(value)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::output::render_grid(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;
    use serde_json::json;

    fn people() -> Table {
        Table::new(vec![
            row! { "name" => "ada", "age" => 36 },
            row! { "name" => "bob", "age" => 17, "city" => "oslo" },
            row! { "name" => "cy" },
        ])
    }

    #[test]
    fn test_length_and_columns_come_from_first_row() {
        let table = people();
        assert_eq!(table.len(), 3);
        assert_eq!(table.columns().unwrap(), vec!["name", "age"]);
    }

    #[test]
    fn test_columns_on_empty_table_fails() {
        let table = Table::default();
        assert!(matches!(table.columns(), Err(Error::EmptyTable)));
    }

    #[test]
    fn test_column_skips_absent_values() {
        let table = people();
        assert_eq!(table.column("age"), vec![CellValue::Int(36), CellValue::Int(17)]);
        assert_eq!(table.column("city"), vec![CellValue::from("oslo")]);
        assert!(table.column("missing").is_empty());
    }

    #[test]
    fn test_unique_keeps_first_seen_order() {
        let table = Table::new(vec![
            row! { "v" => 2 },
            row! { "v" => 1 },
            row! { "v" => 2.0 },
            row! { "v" => 3 },
        ]);
        assert_eq!(
            table.unique("v"),
            vec![CellValue::Int(2), CellValue::Int(1), CellValue::Int(3)]
        );
    }

    #[test]
    fn test_from_json_rejects_non_arrays() {
        let err = Table::from_json(json!({"a": 1})).unwrap_err();
        assert!(matches!(err, Error::NotARecordSequence(_)));

        let err = Table::from_json(json!([{"a": 1}, 2])).unwrap_err();
        assert!(err.to_string().contains("element 1"));
    }

    #[test]
    fn test_json_round_trip() {
        let value = json!([
            {"g": "a", "v": 1, "w": 2.5},
            {"g": "b", "v": null, "tags": ["x", "y"]},
            {"g": "c", "meta": {"source": "api", "ids": [1, 2]}},
            {}
        ]);
        let table = Table::try_from(value.clone()).unwrap();
        assert_eq!(table.to_json_value().unwrap(), value);
        assert_eq!(table.to_json().len(), 4);
    }

    #[test]
    fn test_from_json_preserves_key_order() {
        let table = Table::from_json_str(r#"[{"z": 1, "a": 2, "m": 3}]"#).unwrap();
        assert_eq!(table.columns().unwrap(), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_strict_schema() {
        let ok = Table::with_strict_schema(vec![
            row! { "a" => 1, "b" => 2 },
            row! { "b" => 3, "a" => 4 },
        ]);
        assert!(ok.is_ok());

        let err = Table::with_strict_schema(vec![
            row! { "a" => 1, "b" => 2 },
            row! { "a" => 1 },
        ])
        .unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { row: 1, .. }));
    }

    #[test]
    fn test_serialize_is_plain_rows() {
        let table = Table::new(vec![row! { "a" => 1 }]);
        assert_eq!(serde_json::to_string(&table).unwrap(), r#"[{"a":1}]"#);
    }
}
