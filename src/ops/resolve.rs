//! Name resolution: table members first, column projection otherwise

use std::fmt;

use crate::error::Result;
use crate::model::{CellValue, Row, Table};

/// Public members of a table reachable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Member {
    Data,
    Columns,
    Length,
    Sum,
    Mean,
    Head,
    Tail,
    Median,
    Std,
    Describe,
    Mode,
    Min,
    Max,
    GroupBy,
    AggregateBy,
    Query,
    Filter,
    Unique,
    Print,
    TsSlice,
    Slice,
    Sort,
    ToJson,
}

impl Member {
    pub const ALL: [Member; 23] = [
        Member::Data,
        Member::Columns,
        Member::Length,
        Member::Sum,
        Member::Mean,
        Member::Head,
        Member::Tail,
        Member::Median,
        Member::Std,
        Member::Describe,
        Member::Mode,
        Member::Min,
        Member::Max,
        Member::GroupBy,
        Member::AggregateBy,
        Member::Query,
        Member::Filter,
        Member::Unique,
        Member::Print,
        Member::TsSlice,
        Member::Slice,
        Member::Sort,
        Member::ToJson,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Member::Data => "data",
            Member::Columns => "columns",
            Member::Length => "length",
            Member::Sum => "sum",
            Member::Mean => "mean",
            Member::Head => "head",
            Member::Tail => "tail",
            Member::Median => "median",
            Member::Std => "std",
            Member::Describe => "describe",
            Member::Mode => "mode",
            Member::Min => "min",
            Member::Max => "max",
            Member::GroupBy => "group_by",
            Member::AggregateBy => "aggregate_by",
            Member::Query => "query",
            Member::Filter => "filter",
            Member::Unique => "unique",
            Member::Print => "print",
            Member::TsSlice => "ts_slice",
            Member::Slice => "slice",
            Member::Sort => "sort",
            Member::ToJson => "to_json",
        }
    }

    /// Look up a member by its exact name
    pub fn from_name(name: &str) -> Option<Member> {
        Member::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Properties resolve to a value rather than to a method
    pub fn is_property(self) -> bool {
        matches!(self, Member::Data | Member::Columns | Member::Length)
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a name resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    /// The `data` property
    Rows(&'a [Row]),
    /// The `columns` property
    Columns(Vec<&'a str>),
    /// The `length` property
    Length(usize),
    Method(Member),
    /// Projection of the column with that name
    Column(Vec<CellValue>),
}

impl Resolved<'_> {
    /// The projected values, if the name fell through to a column
    pub fn into_column(self) -> Option<Vec<CellValue>> {
        match self {
            Resolved::Column(values) => Some(values),
            _ => None,
        }
    }
}

impl Table {
    /// Resolve `name` against the table.
    ///
    /// Member names win over column names: a column called `sum` can only be
    /// read through [`Table::column`]. Names starting with `_` always go to
    /// the column projection. Resolving `columns` on an empty table fails.
    pub fn resolve(&self, name: &str) -> Result<Resolved<'_>> {
        let member = if name.starts_with('_') {
            None
        } else {
            Member::from_name(name)
        };

        Ok(match member {
            Some(Member::Data) => Resolved::Rows(self.rows()),
            Some(Member::Columns) => Resolved::Columns(self.columns()?),
            Some(Member::Length) => Resolved::Length(self.len()),
            Some(method) => Resolved::Method(method),
            None => Resolved::Column(self.column(name)),
        })
    }
}
