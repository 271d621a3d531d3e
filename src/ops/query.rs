//! Query engine: a closed set of comparison operators plus free-form predicates

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{CellValue, Row, Table};
use crate::parser::infer_cell_value;

/// Comparison operators accepted by [`Table::query`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Left operand is an element of a list, or a substring of a string
    In,
}

impl Operator {
    pub const ALL: [Operator; 7] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::In,
    ];

    /// The operator's token
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Neq => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::In => "in",
        }
    }

    /// Evaluate `left <op> right`. `None` stands for an absent cell, which
    /// equals null and nothing else, and has no order.
    pub fn apply(self, left: Option<&CellValue>, right: &CellValue) -> bool {
        let Some(left) = left else {
            return match self {
                Operator::Eq => right.is_null(),
                Operator::Neq => !right.is_null(),
                _ => false,
            };
        };

        match self {
            Operator::Eq => left == right,
            Operator::Neq => left != right,
            Operator::Gt => left.compare(right) == Some(Ordering::Greater),
            Operator::Gte => matches!(
                left.compare(right),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::Lt => left.compare(right) == Some(Ordering::Less),
            Operator::Lte => matches!(left.compare(right), Some(Ordering::Less | Ordering::Equal)),
            Operator::In => right.contains(left),
        }
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Operator::ALL
            .into_iter()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| Error::UnknownOperator(s.to_string()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Operator tokens, usable as `table.query("age", Table::GTE, 18)`
impl Table {
    pub const GT: &'static str = ">";
    pub const LT: &'static str = "<";
    pub const GTE: &'static str = ">=";
    pub const LTE: &'static str = "<=";
    pub const EQ: &'static str = "==";
    pub const NEQ: &'static str = "!=";
    pub const IN: &'static str = "in";
}

impl Table {
    /// Rows where `row[key] <operator> value` holds, in their original order.
    ///
    /// Fails with [`Error::UnknownOperator`] when `operator` is not one of
    /// `==, !=, >, >=, <, <=, in`.
    pub fn query(&self, key: &str, operator: &str, value: impl Into<CellValue>) -> Result<Table> {
        let operator: Operator = operator.parse()?;
        Ok(self.query_op(key, operator, value))
    }

    /// [`Table::query`] with an already parsed operator
    pub fn query_op(&self, key: &str, operator: Operator, value: impl Into<CellValue>) -> Table {
        let value = value.into();
        let result = self.filter(|row| operator.apply(row.get(key), &value));
        debug!(
            key,
            op = %operator,
            value = %value,
            rows_in = self.len(),
            rows_out = result.len(),
            "query"
        );
        result
    }

    /// Rows satisfying an arbitrary predicate
    pub fn filter<F>(&self, predicate: F) -> Table
    where
        F: Fn(&Row) -> bool,
    {
        self.rows()
            .iter()
            .filter(|&row| predicate(row))
            .cloned()
            .collect()
    }
}

/// A `column operator value` condition, e.g. `age >= 18` or `city in oslo,rome`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub value: CellValue,
}

impl Condition {
    /// Apply the condition to a table
    pub fn apply(&self, table: &Table) -> Table {
        table.query_op(&self.column, self.operator, self.value.clone())
    }
}

impl FromStr for Condition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidExpression(format!("expected `column op value`, got {:?}", s));

        let (column, rest) = s.trim().split_once(char::is_whitespace).ok_or_else(invalid)?;
        let (op, value) = rest
            .trim_start()
            .split_once(char::is_whitespace)
            .ok_or_else(invalid)?;
        let operator: Operator = op.parse()?;
        let value = value.trim();

        let value = match operator {
            Operator::In => CellValue::List(value.split(',').map(infer_cell_value).collect()),
            _ => infer_cell_value(value),
        };

        Ok(Self {
            column: column.to_string(),
            operator,
            value,
        })
    }
}
