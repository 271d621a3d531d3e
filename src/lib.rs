//! rowframe - In-memory row-oriented tables
//!
//! A [`Table`] is an ordered sequence of records whose columns are derived
//! from the first row. Tables support comparison queries, grouping and
//! aggregation, column statistics, sorting and positional or range slicing.
//! Every derivation returns a new table, except [`Table::sort_in_place`].

pub mod config;
pub mod error;
pub mod model;
pub mod ops;
pub mod output;
pub mod parser;
pub mod pipeline;

pub use config::Config;
pub use error::{Error, Result};
pub use model::{CellValue, Row, Table};
pub use ops::stats;
pub use ops::{Aggregations, Condition, Description, Groups, Operator, SortOrder};
pub use pipeline::{run_pipeline, Report};
