//! CSV file loader

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::model::{Row, Table};

use super::{finish_table, infer_cell_value, Parser};

/// Parser for CSV and TSV files with a header row
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let is_tsv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));

        let mut csv_reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(if is_tsv { b'\t' } else { b',' })
            .from_reader(reader);

        // Read headers
        let headers = csv_reader
            .headers()
            .context("Failed to read CSV headers")?
            .clone();

        let mut rows = Vec::new();
        for (line_num, result) in csv_reader.records().enumerate() {
            // +2 for 1-indexing and header
            let record = result.with_context(|| format!("Failed to read CSV row {}", line_num + 2))?;

            // Empty cells are left absent so that column projections skip them
            let row: Row = headers
                .iter()
                .zip(record.iter())
                .filter(|(_, cell)| !cell.trim().is_empty())
                .map(|(name, cell)| (name, infer_cell_value(cell)))
                .collect();

            rows.push(row);
        }

        Ok(finish_table(Table::new(rows), config)?)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_typed_cells() {
        let file = write_temp(".csv", "name,age,member\nada,36,true\nbob,,false\n");
        let table = CsvParser.parse(file.path(), &Config::default()).unwrap();

        assert_eq!(table.columns().unwrap(), vec!["name", "age", "member"]);
        assert_eq!(table.column("age"), vec![CellValue::Int(36)]);
        assert!(!table.rows()[1].contains_key("age"));
        assert_eq!(
            table.column("member"),
            vec![CellValue::Bool(true), CellValue::Bool(false)]
        );
    }

    #[test]
    fn test_parse_tsv() {
        let file = write_temp(".tsv", "a\tb\n1\tx\n");
        let table = CsvParser.parse(file.path(), &Config::default()).unwrap();
        assert_eq!(table.column("b"), vec![CellValue::from("x")]);
    }

    #[test]
    fn test_short_rows_are_tolerated() {
        let file = write_temp(".csv", "a,b\n1,2\n3\n");
        let table = CsvParser.parse(file.path(), &Config::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("b"), vec![CellValue::Int(2)]);
    }
}
