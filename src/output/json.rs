//! JSON output format

use std::io::Write;

use anyhow::Result;
use serde_json::{json, Map, Value};
use termcolor::WriteColor;

use crate::pipeline::Report;

use super::OutputFormatter;

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain-data form of a report. Tables become their row arrays.
pub fn report_to_json(report: &Report) -> Result<Value> {
    let value = match report {
        Report::Table(table) => table.to_json_value()?,
        Report::Groups(groups) => {
            let mut map = Map::new();
            for (name, table) in groups {
                map.insert(name.clone(), table.to_json_value()?);
            }
            Value::Object(map)
        }
        Report::Description {
            column,
            description,
        } => json!({ "column": column, "description": description }),
        Report::Values { column, values } => json!({ "column": column, "values": values }),
        Report::Columns(columns) => json!(columns),
    };
    Ok(value)
}

impl OutputFormatter for JsonOutput {
    fn render(&self, report: &Report, writer: &mut dyn WriteColor) -> Result<()> {
        let output = report_to_json(report)?;

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &output)?;
        } else {
            serde_json::to_writer(&mut *writer, &output)?;
        }
        writeln!(writer)?;

        Ok(())
    }
}
