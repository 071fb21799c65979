use anyhow::{Context, Result};
use regex::Regex;

use super::grid::{Cell, Grid};
use super::regions::Regions;
use crate::error::IngestError;

pub const ID_COLUMN: &str = "ID";

/// Column name as written in the workbook plus everything derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub raw: String,
    pub sanitized: String,
    /// Digits of the last `Q<n>` tag in the sanitized name, e.g. `"1"` for
    /// `Attributed Q1` and also for `Attributed (Q1)`, where the raw name's last
    /// character would be `)`.
    pub quarter_tag: Option<String>,
    /// Sanitized name with every `Q<n>` tag removed.
    pub base_name: String,
}

/// Strips every character that is not an ASCII letter or digit.
pub fn sanitize_header(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_alphanumeric).collect()
}

pub struct HeaderParser {
    quarter_tag: Regex,
}

impl HeaderParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            quarter_tag: Regex::new(r"Q(\d+)").context("failed to compile quarter tag regex")?,
        })
    }

    pub fn parse(&self, raw: &str) -> Header {
        let sanitized = sanitize_header(raw);
        let quarter_tag = self
            .quarter_tag
            .captures_iter(&sanitized)
            .last()
            .and_then(|captures| captures.get(1))
            .map(|digits| digits.as_str().to_string());
        let base_name = self.quarter_tag.replace_all(&sanitized, "").into_owned();

        Header {
            raw: raw.to_string(),
            sanitized,
            quarter_tag,
            base_name,
        }
    }

    fn parse_row(&self, cells: &[Cell]) -> Vec<Header> {
        cells
            .iter()
            .map(|cell| self.parse(&cell.to_string()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: &'static str,
    pub headers: Vec<Header>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, sanitized: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.sanitized == sanitized)
    }

    pub fn require_column(&self, sanitized: &str) -> Result<usize, IngestError> {
        self.column_index(sanitized)
            .ok_or_else(|| IngestError::MissingColumn {
                table: self.name,
                column: sanitized.to_string(),
            })
    }

    /// Values of one column in row order.
    pub fn column(&self, index: usize) -> Vec<Cell> {
        self.rows
            .iter()
            .map(|row| row.get(index).cloned().unwrap_or(Cell::Empty))
            .collect()
    }

    /// Overwrites the column whose sanitized name matches `header`, or appends
    /// it. `values` must have one entry per row.
    pub fn set_column(&mut self, header: Header, values: Vec<Cell>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(&header.sanitized) {
            Some(index) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    if index >= row.len() {
                        row.resize(index + 1, Cell::Empty);
                    }
                    row[index] = value;
                }
                self.headers[index] = header;
            }
            None => {
                self.headers.push(header);
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    pub fn set_constant_column(&mut self, parser: &HeaderParser, name: &str, value: &str) {
        let values = vec![Cell::text(value); self.rows.len()];
        self.set_column(parser.parse(name), values);
    }
}

/// Slices the demographic and risk tables out of `grid`.
///
/// The risk table borrows its `ID` column from the demographic table by row
/// position, so both tables must cover the same rows.
pub fn extract(
    grid: &Grid,
    regions: &Regions,
    parser: &HeaderParser,
) -> Result<(Table, Table), IngestError> {
    let Regions {
        demographics,
        quarters,
        data_end,
    } = *regions;

    let demo_columns = demographics.column..quarters.column;
    let demo_header = grid.slice(
        demographics.row + 1..demographics.row + 2,
        demo_columns.clone(),
    );
    let demographics_table = Table {
        name: "demographic",
        headers: parser.parse_row(demo_header.first().map(Vec::as_slice).unwrap_or(&[])),
        rows: grid.slice(demographics.row + 2..data_end.row, demo_columns),
    };

    let risk_columns = quarters.column..grid.num_cols();
    let risk_header = grid.slice(quarters.row + 1..quarters.row + 2, risk_columns.clone());
    let mut risk_table = Table {
        name: "risk",
        headers: parser.parse_row(risk_header.first().map(Vec::as_slice).unwrap_or(&[])),
        rows: grid.slice(quarters.row + 2..data_end.row, risk_columns),
    };

    if risk_table.len() != demographics_table.len() {
        return Err(IngestError::Misaligned {
            demographic_rows: demographics_table.len(),
            risk_rows: risk_table.len(),
        });
    }

    // The roster's IDs win over any ID column the risk block carries itself.
    let id_index = demographics_table.require_column(ID_COLUMN)?;
    risk_table.set_column(parser.parse(ID_COLUMN), demographics_table.column(id_index));

    Ok((demographics_table, risk_table))
}
