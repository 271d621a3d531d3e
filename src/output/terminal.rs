//! Text grids for the terminal

use std::io::Write;

use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::model::{CellValue, Table};
use crate::ops::Description;
use crate::pipeline::Report;

use super::OutputFormatter;

/// Terminal output with colored headings
pub struct TerminalOutput {
    heading_color: Color,
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self {
            heading_color: Color::Cyan,
        }
    }

    fn write_heading(&self, writer: &mut dyn WriteColor, text: &str) -> Result<()> {
        writer.set_color(ColorSpec::new().set_fg(Some(self.heading_color)).set_bold(true))?;
        write!(writer, "{}", text)?;
        writer.reset()?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_table(&self, writer: &mut dyn WriteColor, table: &Table) -> Result<()> {
        writeln!(writer, "{}", render_grid(table))?;
        writeln!(writer, "({} rows)", table.len())?;
        Ok(())
    }

    fn write_description(
        &self,
        writer: &mut dyn WriteColor,
        column: &str,
        description: &Description,
    ) -> Result<()> {
        self.write_heading(writer, column)?;

        let number = |n: f64| CellValue::Float(n).display().into_owned();
        let mut builder = Builder::default();
        builder.push_record(["stat", "value"]);
        builder.push_record(["mean".to_string(), number(description.mean)]);
        builder.push_record(["std".to_string(), number(description.std)]);
        builder.push_record(["median".to_string(), number(description.median)]);
        builder.push_record([
            "mode".to_string(),
            description.mode.clone().unwrap_or_default(),
        ]);
        builder.push_record(["min".to_string(), number(description.min)]);
        builder.push_record(["max".to_string(), number(description.max)]);
        builder.push_record(["count".to_string(), description.count.to_string()]);

        let mut grid = builder.build();
        grid.with(Style::modern());
        writeln!(writer, "{}", grid)?;
        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(&self, report: &Report, writer: &mut dyn WriteColor) -> Result<()> {
        match report {
            Report::Table(table) => self.write_table(writer, table)?,
            Report::Groups(groups) => {
                for (name, table) in groups {
                    self.write_heading(writer, &format!("{} ({} rows)", name, table.len()))?;
                    writeln!(writer, "{}", render_grid(table))?;
                }
            }
            Report::Description {
                column,
                description,
            } => self.write_description(writer, column, description)?,
            Report::Values { column, values } => {
                self.write_heading(writer, column)?;
                for value in values {
                    writeln!(writer, "{}", value)?;
                }
            }
            Report::Columns(columns) => {
                for column in columns {
                    writeln!(writer, "{}", column)?;
                }
            }
        }
        Ok(())
    }
}

/// Render a table as a text grid. Headers come from the first row; cells a
/// row lacks are left blank.
pub(crate) fn render_grid(table: &Table) -> String {
    let Ok(columns) = table.columns() else {
        return "(empty table)".to_string();
    };

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.to_string()));
    for row in table.rows() {
        builder.push_record(
            columns
                .iter()
                .map(|c| row.get(c).map(|v| v.display().into_owned()).unwrap_or_default()),
        );
    }

    let mut grid = builder.build();
    grid.with(Style::modern());
    grid.to_string()
}
