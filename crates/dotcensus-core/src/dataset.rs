//! Record feed and the CSV reader behind it.
//!
//! The chart loads its rows once and keeps the outcome for the lifetime of
//! the page; sources here mirror that model. [`RecordSource::fetch`] is
//! called a single time by the session, which caches success and failure
//! alike.

use crate::error::{Error, Result};
use crate::record::Record;
use std::path::PathBuf;

pub trait RecordSource {
    fn fetch(&self) -> Result<Vec<Record>>;
}

/// Reads records from a CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for CsvFileSource {
    fn fetch(&self) -> Result<Vec<Record>> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| Error::DatasetRead {
            path: self.path.clone(),
            source,
        })?;
        parse_census_csv(&text)
    }
}

/// In-memory records, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<Record>,
}

impl StaticSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl RecordSource for StaticSource {
    fn fetch(&self) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }
}

/// Parses the census CSV: a header row naming at least `measure`,
/// `comparison`, `group`, and `value` columns (any order, extras ignored),
/// then one record per line. Fields may be double-quoted with `""` escapes;
/// blank lines and CRLF endings are tolerated.
pub fn parse_census_csv(text: &str) -> Result<Vec<Record>> {
    let mut rows = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = rows.next().ok_or(Error::EmptyDataset)?;
    let columns = split_csv_line(header);
    let column = |name: &str| -> Result<usize> {
        columns
            .iter()
            .position(|c| c.trim() == name)
            .ok_or_else(|| Error::MissingColumn {
                column: name.to_string(),
            })
    };
    let measure_col = column("measure")?;
    let comparison_col = column("comparison")?;
    let group_col = column("group")?;
    let value_col = column("value")?;
    let required = measure_col
        .max(comparison_col)
        .max(group_col)
        .max(value_col)
        + 1;

    let mut records = Vec::new();
    for (index, line) in rows {
        let line_number = index + 1;
        let mut fields = split_csv_line(line);
        if fields.len() < required {
            return Err(Error::ShortRow {
                line: line_number,
                expected: required,
                got: fields.len(),
            });
        }
        let raw_value = fields[value_col].trim();
        let value = raw_value.parse::<f64>().map_err(|_| Error::InvalidValue {
            line: line_number,
            value: raw_value.to_string(),
        })?;
        records.push(Record {
            measure: std::mem::take(&mut fields[measure_col]),
            comparison: std::mem::take(&mut fields[comparison_col]),
            group: std::mem::take(&mut fields[group_col]),
            value,
        });
    }
    Ok(records)
}

fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                // A doubled quote inside a quoted field is a literal quote.
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut field)),
                _ => field.push(c),
            }
        }
    }
    fields.push(field);
    fields
}
