use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use rusqlite::ToSql;
use rusqlite::types::{Null, ToSqlOutput};

/// Whole floats below this magnitude fit an `i64` exactly enough to print as
/// integers.
const INTEGRAL_LIMIT: f64 = 9.2e18;

fn is_integral(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0 && value.abs() < INTEGRAL_LIMIT
}

/// A single worksheet value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Integer reading of the cell, accepting integral numbers and numeric text.
    pub fn as_integer(&self) -> Option<i64> {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
            Self::Empty => return None,
        };

        if is_integral(value) {
            Some(value as i64)
        } else {
            None
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(text) => f.write_str(text),
            Self::Number(value) if is_integral(*value) => write!(f, "{}", *value as i64),
            Self::Number(value) if value.is_finite() && value.fract() == 0.0 => {
                write!(f, "{value:.0}")
            }
            Self::Number(value) => write!(f, "{value}"),
        }
    }
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Empty => Ok(ToSqlOutput::from(Null)),
            Self::Text(text) => Ok(ToSqlOutput::from(text.as_str())),
            Self::Number(value) => Ok(ToSqlOutput::from(*value)),
        }
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty | Data::Error(_) => Self::Empty,
            Data::String(text) => Self::text(text.as_str()),
            Data::Int(value) => Self::Number(*value as f64),
            Data::Float(value) => Self::Number(*value),
            other => Self::text(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub row: usize,
    pub column: usize,
}

impl Anchor {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Rectangular, row-major worksheet snapshot. Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    num_cols: usize,
}

impl Grid {
    /// Builds a grid from ragged rows, padding short rows with `Cell::Empty`.
    pub fn from_rows(mut rows: Vec<Vec<Cell>>) -> Self {
        let num_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(num_cols, Cell::Empty);
        }
        Self { rows, num_cols }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&Cell::Empty)
    }

    /// Copies the rectangle `rows x columns`, clamped to the grid.
    pub fn slice(
        &self,
        rows: std::ops::Range<usize>,
        columns: std::ops::Range<usize>,
    ) -> Vec<Vec<Cell>> {
        let row_end = rows.end.min(self.num_rows());
        let column_end = columns.end.min(self.num_cols);
        if rows.start >= row_end || columns.start >= column_end {
            return Vec::new();
        }

        self.rows[rows.start..row_end]
            .iter()
            .map(|cells| cells[columns.start..column_end].to_vec())
            .collect()
    }
}

/// First cell satisfying `predicate`, scanning columns `0..=max_column` and,
/// within each column, rows from `start_row` down.
pub fn locate_by<F>(grid: &Grid, start_row: usize, max_column: usize, predicate: F) -> Option<Anchor>
where
    F: Fn(&Cell) -> bool,
{
    if grid.num_cols() == 0 {
        return None;
    }

    let last_column = max_column.min(grid.num_cols() - 1);
    for column in 0..=last_column {
        for row in start_row..grid.num_rows() {
            if predicate(grid.cell(row, column)) {
                return Some(Anchor::new(row, column));
            }
        }
    }

    None
}

pub fn locate(grid: &Grid, target: &str, start_row: usize, max_column: usize) -> Option<Anchor> {
    locate_by(grid, start_row, max_column, |cell| cell.to_string() == target)
}

pub fn locate_empty(grid: &Grid, start_row: usize, max_column: usize) -> Option<Anchor> {
    locate_by(grid, start_row, max_column, Cell::is_empty)
}

/// Reads the first worksheet of `path` into a grid anchored at A1.
pub fn load_first_sheet(path: &Path) -> Result<Grid> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open workbook: {}", path.display()))?;

    let range = workbook
        .worksheet_range_at(0)
        .with_context(|| format!("workbook has no worksheets: {}", path.display()))?
        .with_context(|| format!("failed to read first worksheet: {}", path.display()))?;

    let Some((start_row, start_column)) = range.start() else {
        return Ok(Grid::from_rows(Vec::new()));
    };
    let (start_row, start_column) = (start_row as usize, start_column as usize);

    let mut rows = vec![Vec::new(); start_row];
    for sheet_row in range.rows() {
        let mut cells = vec![Cell::Empty; start_column];
        cells.extend(sheet_row.iter().map(Cell::from));
        rows.push(cells);
    }

    Ok(Grid::from_rows(rows))
}
