//! Sorting, positional slicing and range slicing

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::query::Operator;
use crate::error::{Error, Result};
use crate::model::{CellValue, Row, Table};

/// Direction of a sort
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ascending" | "asc" => Ok(SortOrder::Ascending),
            "descending" | "desc" => Ok(SortOrder::Descending),
            _ => Err(Error::UnknownSortOrder(s.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "ascending"),
            SortOrder::Descending => write!(f, "descending"),
        }
    }
}

/// A column given by name or by position in [`Table::columns`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Name(String),
    Index(usize),
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::Name(name.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(name: String) -> Self {
        ColumnRef::Name(name)
    }
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        ColumnRef::Index(index)
    }
}

impl Table {
    /// Reorder this table's rows by one column.
    ///
    /// Each compared value goes through `coerce` first; rows lacking the
    /// column are compared as null. The sort is stable. This is the only
    /// operation that mutates an existing table.
    pub fn sort_in_place<F>(&mut self, key: &str, order: SortOrder, coerce: F)
    where
        F: Fn(&CellValue) -> CellValue,
    {
        self.rows_mut().sort_by(|a, b| {
            let x = coerce(a.get(key).unwrap_or(&CellValue::Null));
            let y = coerce(b.get(key).unwrap_or(&CellValue::Null));
            match order {
                SortOrder::Ascending => x.sort_cmp(&y),
                SortOrder::Descending => y.sort_cmp(&x),
            }
        });
        debug!(key, %order, rows = self.len(), "sort");
    }

    /// Sort by one column, reusing this table's storage
    pub fn sort(mut self, key: &str, order: SortOrder) -> Table {
        self.sort_in_place(key, order, CellValue::clone);
        self
    }

    /// Sort by one column after mapping each value through `coerce`
    pub fn sort_with<F>(mut self, key: &str, order: SortOrder, coerce: F) -> Table
    where
        F: Fn(&CellValue) -> CellValue,
    {
        self.sort_in_place(key, order, coerce);
        self
    }

    /// Rows in `start..end`; negative positions count back from the end and
    /// out-of-range positions are clamped. `None` runs to the last row.
    pub fn slice(&self, start: isize, end: Option<isize>) -> Table {
        let len = self.len();
        let from = clamp_position(start, len);
        let to = end.map_or(len, |e| clamp_position(e, len));

        if from >= to {
            return Table::default();
        }
        Table::new(self.rows()[from..to].to_vec())
    }

    /// The first `n` rows
    pub fn head(&self, n: usize) -> &[Row] {
        &self.rows()[..n.min(self.len())]
    }

    /// The last `n` rows
    pub fn tail(&self, n: usize) -> &[Row] {
        &self.rows()[self.len() - n.min(self.len())..]
    }

    /// Rows whose value in `column` lies within `[start, end]`.
    ///
    /// Date and datetime bounds are turned into epoch milliseconds. Row values
    /// are compared as stored: numbers and dates match, date strings never do.
    /// See [`Table::ts_slice_coerced`].
    pub fn ts_slice(
        &self,
        column: impl Into<ColumnRef>,
        start: impl Into<CellValue>,
        end: impl Into<CellValue>,
    ) -> Result<Table> {
        self.range_slice(column.into(), start.into(), end.into(), false)
    }

    /// Like [`Table::ts_slice`], but row strings that parse as dates are
    /// converted to epoch milliseconds before comparing.
    pub fn ts_slice_coerced(
        &self,
        column: impl Into<ColumnRef>,
        start: impl Into<CellValue>,
        end: impl Into<CellValue>,
    ) -> Result<Table> {
        self.range_slice(column.into(), start.into(), end.into(), true)
    }

    fn range_slice(
        &self,
        column: ColumnRef,
        start: CellValue,
        end: CellValue,
        coerce_rows: bool,
    ) -> Result<Table> {
        let name = self.column_name(column)?;
        let start = start.into_epoch_millis();
        let end = end.into_epoch_millis();

        let result = self.filter(|row| {
            let value = match row.get(&name) {
                Some(cell @ CellValue::String(s)) if coerce_rows => Some(
                    CellValue::parse_temporal(s)
                        .map_or_else(|| cell.clone(), CellValue::into_epoch_millis),
                ),
                other => other.cloned(),
            };
            Operator::Gte.apply(value.as_ref(), &start) && Operator::Lte.apply(value.as_ref(), &end)
        });

        debug!(
            column = %name,
            %start,
            %end,
            rows_in = self.len(),
            rows_out = result.len(),
            "ts_slice"
        );
        Ok(result)
    }

    /// Resolve a column reference to a column name
    pub fn column_name(&self, column: ColumnRef) -> Result<String> {
        match column {
            ColumnRef::Name(name) => Ok(name),
            ColumnRef::Index(index) => {
                let columns = self.columns()?;
                columns
                    .get(index)
                    .map(|name| name.to_string())
                    .ok_or(Error::ColumnIndexOutOfRange {
                        index,
                        len: columns.len(),
                    })
            }
        }
    }
}

fn clamp_position(pos: isize, len: usize) -> usize {
    if pos < 0 {
        len.saturating_sub(pos.unsigned_abs())
    } else {
        pos.unsigned_abs().min(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;
    use chrono::NaiveDate;

    fn values(table: &Table, key: &str) -> Vec<CellValue> {
        table.column(key)
    }

    fn numbered(n: i64) -> Table {
        (0..n).map(|i| row! { "i" => i }).collect()
    }

    #[test]
    fn test_sort_orders() {
        let table = Table::new(vec![row! { "v" => 3 }, row! { "v" => 1 }, row! { "v" => 2 }]);

        let desc = table.clone().sort("v", SortOrder::Descending);
        assert_eq!(
            desc.into_rows(),
            vec![row! { "v" => 3 }, row! { "v" => 2 }, row! { "v" => 1 }]
        );

        let asc = table.sort("v", SortOrder::default());
        assert_eq!(
            values(&asc, "v"),
            vec![CellValue::Int(1), CellValue::Int(2), CellValue::Int(3)]
        );
    }

    #[test]
    fn test_sort_in_place_mutates() {
        let mut table = Table::new(vec![row! { "v" => 2 }, row! { "v" => 1 }]);
        table.sort_in_place("v", SortOrder::Ascending, CellValue::clone);
        assert_eq!(values(&table, "v"), vec![CellValue::Int(1), CellValue::Int(2)]);
    }

    #[test]
    fn test_sort_with_coercion() {
        let table = Table::new(vec![
            row! { "v" => "10" },
            row! { "v" => "9" },
            row! { "v" => "100" },
        ]);

        let lexical = table.clone().sort("v", SortOrder::Ascending);
        assert_eq!(values(&lexical, "v"), vec![CellValue::from("10"), CellValue::from("100"), CellValue::from("9")]);

        let numeric = table.sort_with("v", SortOrder::Ascending, |v| CellValue::number(v.as_f64()));
        assert_eq!(values(&numeric, "v"), vec![CellValue::from("9"), CellValue::from("10"), CellValue::from("100")]);
    }

    #[test]
    fn test_sort_is_stable() {
        let table = Table::new(vec![
            row! { "k" => 1, "id" => "a" },
            row! { "k" => 0, "id" => "b" },
            row! { "k" => 1, "id" => "c" },
            row! { "id" => "d" },
        ]);
        let sorted = table.sort("k", SortOrder::Ascending);
        assert_eq!(
            values(&sorted, "id"),
            vec![
                CellValue::from("d"),
                CellValue::from("b"),
                CellValue::from("a"),
                CellValue::from("c"),
            ]
        );
    }

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!("descending".parse::<SortOrder>().unwrap(), SortOrder::Descending);
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Ascending);
        assert!(matches!(
            "sideways".parse::<SortOrder>(),
            Err(Error::UnknownSortOrder(_))
        ));
    }

    #[test]
    fn test_slice() {
        let table = numbered(5);
        assert_eq!(
            values(&table.slice(1, Some(3)), "i"),
            vec![CellValue::Int(1), CellValue::Int(2)]
        );
        assert_eq!(
            values(&table.slice(-2, None), "i"),
            vec![CellValue::Int(3), CellValue::Int(4)]
        );
        assert_eq!(table.slice(0, Some(-1)).len(), 4);
        assert_eq!(table.slice(3, Some(1)).len(), 0);
        assert_eq!(table.slice(-10, Some(10)).len(), 5);
    }

    #[test]
    fn test_head_and_tail() {
        let table = numbered(5);
        assert!(table.head(0).is_empty());
        assert!(table.tail(0).is_empty());
        assert_eq!(table.head(2), &[row! { "i" => 0 }, row! { "i" => 1 }]);
        assert_eq!(table.tail(2), &[row! { "i" => 3 }, row! { "i" => 4 }]);
        assert_eq!(table.head(10).len(), 5);
        assert_eq!(table.tail(10).len(), 5);
    }

    #[test]
    fn test_ts_slice_numeric_column() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let millis = |d| CellValue::Date(day(d)).epoch_millis().unwrap();

        let table: Table = (1..=4).map(|d| row! { "ts" => millis(d), "d" => d }).collect();

        let result = table.ts_slice("ts", day(2), day(3)).unwrap();
        assert_eq!(values(&result, "d"), vec![CellValue::Int(2), CellValue::Int(3)]);

        let result = table.ts_slice(0usize, millis(3), millis(10)).unwrap();
        assert_eq!(values(&result, "d"), vec![CellValue::Int(3), CellValue::Int(4)]);
    }

    #[test]
    fn test_ts_slice_matches_date_rows() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let table: Table = (1..=4).map(|d| row! { "ts" => day(d) }).collect();

        let result = table.ts_slice("ts", day(2), day(3)).unwrap();
        assert_eq!(values(&result, "ts"), vec![CellValue::Date(day(2)), CellValue::Date(day(3))]);
    }

    #[test]
    fn test_ts_slice_only_coerced_parses_date_strings() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let table: Table = (1..=4)
            .map(|d| row! { "ts" => format!("2024-01-0{}", d) })
            .collect();

        assert!(table.ts_slice("ts", day(2), day(3)).unwrap().is_empty());

        let result = table.ts_slice_coerced("ts", day(2), day(3)).unwrap();
        assert_eq!(
            values(&result, "ts"),
            vec![CellValue::from("2024-01-02"), CellValue::from("2024-01-03")]
        );
    }

    #[test]
    fn test_ts_slice_column_index_out_of_range() {
        let table = numbered(2);
        let err = table.ts_slice(3usize, 0, 1).unwrap_err();
        assert!(matches!(err, Error::ColumnIndexOutOfRange { index: 3, len: 1 }));
        assert!(matches!(
            Table::default().ts_slice(0usize, 0, 1),
            Err(Error::EmptyTable)
        ));
    }
}
