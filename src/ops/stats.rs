//! Column statistics and the reducer functions used by `aggregate_by`
//!
//! Table statistics work on the defined values of a column, coerced to
//! numbers. Values with no numeric reading turn into NaN instead of failing.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::group::FxIndexMap;
use crate::error::{Error, Result};
use crate::model::{CellValue, Table};

/// Summary of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Description {
    pub mean: f64,
    pub std: f64,
    pub median: f64,
    pub mode: Option<String>,
    pub min: f64,
    pub max: f64,
    /// Row count of the whole table, not the number of defined values
    pub count: usize,
}

impl Table {
    fn numbers(&self, column: &str) -> Vec<f64> {
        self.column(column).iter().map(CellValue::as_f64).collect()
    }

    /// Sum of the column's defined values
    pub fn sum(&self, column: &str) -> f64 {
        self.numbers(column).into_iter().sum()
    }

    /// Column sum divided by the table's row count (absent cells still count
    /// in the divisor)
    pub fn mean(&self, column: &str) -> f64 {
        self.sum(column) / self.len() as f64
    }

    /// Middle value, or the average of the two middle values for an even count
    pub fn median(&self, column: &str) -> f64 {
        let mut numbers = self.numbers(column);
        numbers.sort_by(f64::total_cmp);

        let mid = numbers.len() / 2;
        if numbers.is_empty() {
            f64::NAN
        } else if numbers.len() % 2 == 0 {
            (numbers[mid - 1] + numbers[mid]) / 2.0
        } else {
            numbers[mid]
        }
    }

    /// Population standard deviation around [`Table::mean`], divided by the row count
    pub fn std(&self, column: &str) -> f64 {
        let mean = self.mean(column);
        let squares: f64 = self
            .numbers(column)
            .into_iter()
            .map(|v| (v - mean).powi(2))
            .sum();
        (squares / self.len() as f64).sqrt()
    }

    /// Most frequent stringified value.
    ///
    /// Counting keys are visited in first-seen order and a later key replaces
    /// the current winner unless the winner's count is strictly greater, so
    /// among tied keys the one seen last wins. `None` for an empty column.
    pub fn mode(&self, column: &str) -> Option<String> {
        let mut counts: FxIndexMap<String, usize> = FxIndexMap::default();
        for value in self.column(column) {
            *counts.entry(value.display().into_owned()).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .reduce(|best, next| if best.1 > next.1 { best } else { next })
            .map(|(key, _)| key)
    }

    /// Smallest value; `+inf` for an empty column, NaN if any value is NaN
    pub fn min(&self, column: &str) -> f64 {
        self.numbers(column).into_iter().fold(f64::INFINITY, nan_min)
    }

    /// Largest value; `-inf` for an empty column, NaN if any value is NaN
    pub fn max(&self, column: &str) -> f64 {
        self.numbers(column).into_iter().fold(f64::NEG_INFINITY, nan_max)
    }

    pub fn describe(&self, column: &str) -> Description {
        Description {
            mean: self.mean(column),
            std: self.std(column),
            median: self.median(column),
            mode: self.mode(column),
            min: self.min(column),
            max: self.max(column),
            count: self.len(),
        }
    }
}

fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

// Reducers over raw value slices, usable with `Aggregations`.

/// Sum where null, false, zero, NaN and empty strings count as 0
pub fn sum(values: &[CellValue]) -> CellValue {
    let total: f64 = values
        .iter()
        .map(|v| if v.is_truthy() { v.as_f64() } else { 0.0 })
        .sum();
    CellValue::number(total)
}

/// Plain sum divided by the slice length, no null handling
pub fn mean(values: &[CellValue]) -> CellValue {
    let total: f64 = values.iter().map(CellValue::as_f64).sum();
    CellValue::number(total / values.len() as f64)
}

/// Middle element by numeric order; average of the middle pair for even lengths
pub fn median(values: &[CellValue]) -> CellValue {
    let mut sorted: Vec<&CellValue> = values.iter().collect();
    sorted.sort_by(|a, b| a.as_f64().total_cmp(&b.as_f64()));

    let mid = sorted.len() / 2;
    if sorted.is_empty() {
        CellValue::Float(f64::NAN)
    } else if sorted.len() % 2 != 0 {
        sorted[mid].clone()
    } else {
        CellValue::number((sorted[mid - 1].as_f64() + sorted[mid].as_f64()) / 2.0)
    }
}

pub fn min(values: &[CellValue]) -> CellValue {
    CellValue::number(values.iter().map(CellValue::as_f64).fold(f64::INFINITY, nan_min))
}

pub fn max(values: &[CellValue]) -> CellValue {
    CellValue::number(
        values
            .iter()
            .map(CellValue::as_f64)
            .fold(f64::NEG_INFINITY, nan_max),
    )
}

/// Number of values
pub fn count(values: &[CellValue]) -> CellValue {
    CellValue::from(values.len())
}

/// First value, or null for an empty slice
pub fn first(values: &[CellValue]) -> CellValue {
    values.first().cloned().unwrap_or(CellValue::Null)
}

/// Named reducers, for choosing an aggregation from text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Sum,
    Mean,
    Median,
    Min,
    Max,
    Count,
    First,
}

impl Reducer {
    pub const ALL: [Reducer; 7] = [
        Reducer::Sum,
        Reducer::Mean,
        Reducer::Median,
        Reducer::Min,
        Reducer::Max,
        Reducer::Count,
        Reducer::First,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Reducer::Sum => "sum",
            Reducer::Mean => "mean",
            Reducer::Median => "median",
            Reducer::Min => "min",
            Reducer::Max => "max",
            Reducer::Count => "count",
            Reducer::First => "first",
        }
    }

    /// The reducer function
    pub fn func(self) -> fn(&[CellValue]) -> CellValue {
        match self {
            Reducer::Sum => sum,
            Reducer::Mean => mean,
            Reducer::Median => median,
            Reducer::Min => min,
            Reducer::Max => max,
            Reducer::Count => count,
            Reducer::First => first,
        }
    }
}

impl FromStr for Reducer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_lowercase();
        Reducer::ALL
            .into_iter()
            .find(|r| r.name() == lower)
            .ok_or_else(|| Error::InvalidExpression(format!("unknown aggregation function: {}", s)))
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    fn column_of(values: &[i64]) -> Table {
        values.iter().map(|&v| row! { "v" => v }).collect()
    }

    #[test]
    fn test_sum_and_mean_divide_by_row_count() {
        let table = Table::new(vec![
            row! { "v" => 2 },
            row! { "v" => 4 },
            row! { "w" => 100 },
            row! { "v" => 6 },
        ]);
        assert_eq!(table.sum("v"), 12.0);
        assert_eq!(table.mean("v"), 3.0);
    }

    #[test]
    fn test_median() {
        assert_eq!(column_of(&[4, 1, 3, 2]).median("v"), 2.5);
        assert_eq!(column_of(&[3, 1, 2]).median("v"), 2.0);
        assert!(Table::default().median("v").is_nan());
    }

    #[test]
    fn test_population_std() {
        let table = column_of(&[2, 4, 4, 4, 5, 5, 7, 9]);
        assert!((table.std("v") - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_mode_tie_goes_to_last_seen_key() {
        assert_eq!(column_of(&[1, 2, 2, 3]).mode("v").as_deref(), Some("2"));
        assert_eq!(column_of(&[1, 2, 1, 2]).mode("v").as_deref(), Some("2"));
        assert_eq!(column_of(&[5, 1, 5, 3, 3]).mode("v").as_deref(), Some("3"));
        assert_eq!(Table::default().mode("v"), None);
    }

    #[test]
    fn test_mode_counts_stringified_values() {
        let table = Table::new(vec![
            row! { "v" => 1 },
            row! { "v" => "1" },
            row! { "v" => 2 },
        ]);
        assert_eq!(table.mode("v").as_deref(), Some("1"));
    }

    #[test]
    fn test_min_max() {
        let table = column_of(&[3, -1, 7]);
        assert_eq!(table.min("v"), -1.0);
        assert_eq!(table.max("v"), 7.0);
        assert_eq!(Table::default().min("v"), f64::INFINITY);
        assert_eq!(Table::default().max("v"), f64::NEG_INFINITY);

        let mixed = Table::new(vec![row! { "v" => 1 }, row! { "v" => "x" }]);
        assert!(mixed.max("v").is_nan());
    }

    #[test]
    fn test_describe() {
        let table = Table::new(vec![
            row! { "v" => 1 },
            row! { "v" => 2 },
            row! { "v" => 2 },
            row! { "v" => 3 },
        ]);
        let desc = table.describe("v");
        assert_eq!(desc.mean, 2.0);
        assert_eq!(desc.median, 2.0);
        assert_eq!(desc.mode.as_deref(), Some("2"));
        assert_eq!(desc.min, 1.0);
        assert_eq!(desc.max, 3.0);
        assert_eq!(desc.count, 4);
        assert!((desc.std - 0.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_reducer_sum_coalesces_but_mean_does_not() {
        let values = vec![
            CellValue::Int(2),
            CellValue::Null,
            CellValue::Bool(false),
            CellValue::Int(4),
        ];
        assert_eq!(sum(&values), CellValue::Int(6));
        assert_eq!(mean(&values), CellValue::Float(1.5));

        let with_nan = vec![CellValue::Int(1), CellValue::Float(f64::NAN)];
        assert_eq!(sum(&with_nan), CellValue::Int(1));
        assert!(matches!(mean(&with_nan), CellValue::Float(f) if f.is_nan()));
    }

    #[test]
    fn test_reducer_median_returns_middle_element() {
        let values = vec![CellValue::from("3"), CellValue::Int(1), CellValue::Int(2)];
        assert_eq!(median(&values), CellValue::Int(2));

        let values = vec![CellValue::Int(4), CellValue::Int(1), CellValue::Int(2), CellValue::Int(3)];
        assert_eq!(median(&values), CellValue::Float(2.5));
    }

    #[test]
    fn test_reducer_min_max_count_first() {
        let values = vec![CellValue::Int(4), CellValue::Float(-1.5), CellValue::Int(2)];
        assert_eq!(min(&values), CellValue::Float(-1.5));
        assert_eq!(max(&values), CellValue::Int(4));
        assert_eq!(count(&values), CellValue::Int(3));
        assert_eq!(first(&values), CellValue::Int(4));
        assert_eq!(first(&[]), CellValue::Null);
    }

    #[test]
    fn test_reducer_from_str() {
        assert_eq!("SUM".parse::<Reducer>().unwrap(), Reducer::Sum);
        assert_eq!("median".parse::<Reducer>().unwrap().func()(&[CellValue::Int(7)]), CellValue::Int(7));
        assert!("mode".parse::<Reducer>().is_err());
    }
}
