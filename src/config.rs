//! Configuration for the command-line pipeline

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;
use crate::model::CellValue;
use crate::ops::{Aggregations, Condition, Reducer, SortOrder};
use crate::parser::infer_cell_value;

/// Output format for results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(OutputFormat::Terminal),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// `output=column:function`, e.g. `total=price:sum`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSpec {
    pub output: String,
    pub source: String,
    pub reducer: Reducer,
}

impl FromStr for AggregateSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            Error::InvalidExpression(format!("expected `output=column:function`, got {:?}", s))
        };

        let (output, rest) = s.split_once('=').ok_or_else(invalid)?;
        let (source, func) = rest.rsplit_once(':').ok_or_else(invalid)?;
        if output.trim().is_empty() || source.trim().is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            output: output.trim().to_string(),
            source: source.trim().to_string(),
            reducer: func.trim().parse()?,
        })
    }
}

/// `column=start..end`, an inclusive range for `ts_slice_coerced`
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSpec {
    pub column: String,
    pub start: CellValue,
    pub end: CellValue,
}

impl FromStr for RangeSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            || Error::InvalidExpression(format!("expected `column=start..end`, got {:?}", s));

        let (column, bounds) = s.split_once('=').ok_or_else(invalid)?;
        let (start, end) = bounds.split_once("..").ok_or_else(invalid)?;

        Ok(Self {
            column: column.trim().to_string(),
            start: infer_cell_value(start),
            end: infer_cell_value(end),
        })
    }
}

/// `start[:end]` positions for `slice`; negative positions count from the end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceSpec {
    pub start: isize,
    pub end: Option<isize>,
}

impl FromStr for SliceSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidExpression(format!("expected `start[:end]`, got {:?}", s));
        let position = |p: &str| p.trim().parse::<isize>().map_err(|_| invalid());

        match s.split_once(':') {
            Some((start, end)) => Ok(Self {
                start: position(start)?,
                end: Some(position(end)?),
            }),
            None => Ok(Self {
                start: position(s)?,
                end: None,
            }),
        }
    }
}

/// Configuration for a load-transform-report run
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Path to the JSON or CSV input
    pub input: PathBuf,
    /// Conditions applied in order with `query`
    pub conditions: Vec<Condition>,
    /// Inclusive range filter applied after the conditions
    pub range: Option<RangeSpec>,
    /// Column to sort by
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
    /// Positional slice applied after sorting
    pub slice: Option<SliceSpec>,
    pub head: Option<usize>,
    pub tail: Option<usize>,
    /// Column to group by
    pub group_by: Option<String>,
    /// Aggregations computed per group; without any, groups are listed
    pub aggregations: Vec<AggregateSpec>,
    /// Describe a column instead of listing rows
    pub describe: Option<String>,
    /// List the distinct values of a column instead of rows
    pub unique: Option<String>,
    /// List the column names instead of rows
    pub show_columns: bool,
    /// Reject inputs whose rows do not all share the first row's keys
    pub strict_schema: bool,
    pub output_format: OutputFormat,
    /// Compact single-line JSON
    pub compact: bool,
}

impl Config {
    /// Create a new Config for an input file
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            ..Default::default()
        }
    }

    /// Add a row condition
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Set the inclusive range filter
    pub fn with_range(mut self, range: RangeSpec) -> Self {
        self.range = Some(range);
        self
    }

    /// Set the sort column and direction
    pub fn with_sort(mut self, column: String, order: SortOrder) -> Self {
        self.sort_by = Some(column);
        self.sort_order = order;
        self
    }

    pub fn with_slice(mut self, slice: SliceSpec) -> Self {
        self.slice = Some(slice);
        self
    }

    pub fn with_head(mut self, n: usize) -> Self {
        self.head = Some(n);
        self
    }

    pub fn with_tail(mut self, n: usize) -> Self {
        self.tail = Some(n);
        self
    }

    /// Group by a column, optionally aggregating each group
    pub fn with_group_by(mut self, column: String, aggregations: Vec<AggregateSpec>) -> Self {
        self.group_by = Some(column);
        self.aggregations = aggregations;
        self
    }

    pub fn with_describe(mut self, column: String) -> Self {
        self.describe = Some(column);
        self
    }

    pub fn with_unique(mut self, column: String) -> Self {
        self.unique = Some(column);
        self
    }

    pub fn with_show_columns(mut self, show: bool) -> Self {
        self.show_columns = show;
        self
    }

    /// Enable strict schema checking on load
    pub fn with_strict_schema(mut self, strict: bool) -> Self {
        self.strict_schema = strict;
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Build the aggregation table for `aggregate_by`
    pub fn aggregations(&self) -> Aggregations {
        self.aggregations
            .iter()
            .fold(Aggregations::new(), |aggs, spec| {
                aggs.with(spec.output.clone(), spec.source.clone(), spec.reducer.func())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_aggregate_spec() {
        let spec: AggregateSpec = "total=price:sum".parse().unwrap();
        assert_eq!(spec.output, "total");
        assert_eq!(spec.source, "price");
        assert_eq!(spec.reducer, Reducer::Sum);

        assert!("total".parse::<AggregateSpec>().is_err());
        assert!("total=price".parse::<AggregateSpec>().is_err());
        assert!("total=price:mode".parse::<AggregateSpec>().is_err());
    }

    #[test]
    fn test_range_spec() {
        let spec: RangeSpec = "day=2024-01-01..2024-01-31".parse().unwrap();
        assert_eq!(spec.column, "day");
        assert_eq!(
            spec.start,
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );

        let spec: RangeSpec = "ts=100..200".parse().unwrap();
        assert_eq!(spec.end, CellValue::Int(200));
        assert!("ts=100".parse::<RangeSpec>().is_err());
    }

    #[test]
    fn test_slice_spec() {
        assert_eq!(
            "-2".parse::<SliceSpec>().unwrap(),
            SliceSpec { start: -2, end: None }
        );
        assert_eq!(
            "1:-1".parse::<SliceSpec>().unwrap(),
            SliceSpec { start: 1, end: Some(-1) }
        );
        assert!("a:b".parse::<SliceSpec>().is_err());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("html".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_builders() {
        let config = Config::new(PathBuf::from("data.json"))
            .with_group_by(
                "g".to_string(),
                vec!["n=v:count".parse().unwrap(), "t=v:sum".parse().unwrap()],
            )
            .with_sort("v".to_string(), SortOrder::Descending)
            .with_strict_schema(true);

        assert_eq!(config.group_by.as_deref(), Some("g"));
        assert_eq!(config.aggregations().len(), 2);
        assert_eq!(config.sort_order, SortOrder::Descending);
        assert!(config.strict_schema);
    }
}
