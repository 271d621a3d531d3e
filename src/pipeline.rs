//! Applies a [`Config`] to a loaded table

use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::model::{CellValue, Table};
use crate::ops::{Description, Groups};

/// The result of a pipeline run
#[derive(Debug)]
pub enum Report {
    Table(Table),
    Groups(Groups),
    Description {
        column: String,
        description: Description,
    },
    Values {
        column: String,
        values: Vec<CellValue>,
    },
    Columns(Vec<String>),
}

/// Filter, order and slice the table, then produce the requested report.
///
/// Steps run in a fixed order: conditions, range filter, sort, slice,
/// head, tail, and finally one of describe / unique / columns / group.
pub fn run_pipeline(table: Table, config: &Config) -> Result<Report> {
    let mut table = config
        .conditions
        .iter()
        .fold(table, |table, condition| condition.apply(&table));

    if let Some(range) = &config.range {
        table = table.ts_slice_coerced(
            range.column.as_str(),
            range.start.clone(),
            range.end.clone(),
        )?;
    }

    if let Some(column) = &config.sort_by {
        table = table.sort(column, config.sort_order);
    }

    if let Some(slice) = config.slice {
        table = table.slice(slice.start, slice.end);
    }
    if let Some(n) = config.head {
        table = Table::new(table.head(n).to_vec());
    }
    if let Some(n) = config.tail {
        table = Table::new(table.tail(n).to_vec());
    }

    debug!(rows = table.len(), "pipeline filtered");

    if let Some(column) = &config.describe {
        return Ok(Report::Description {
            column: column.clone(),
            description: table.describe(column),
        });
    }

    if let Some(column) = &config.unique {
        return Ok(Report::Values {
            column: column.clone(),
            values: table.unique(column),
        });
    }

    if config.show_columns {
        let columns = table.columns()?.into_iter().map(str::to_string).collect();
        return Ok(Report::Columns(columns));
    }

    if let Some(key) = &config.group_by {
        if config.aggregations.is_empty() {
            return Ok(Report::Groups(table.group_by(key)));
        }
        return Ok(Report::Table(table.aggregate_by(key, &config.aggregations())));
    }

    Ok(Report::Table(table))
}
