use tracing::debug;

use super::grid::{Anchor, Grid, locate, locate_empty};
use crate::error::IngestError;

pub const DEMOGRAPHICS_MARKER: &str = "Demographics";
pub const QUARTERS_MARKER: &str = "Quarters";

/// Where the two tables start and where the roster stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regions {
    pub demographics: Anchor,
    pub quarters: Anchor,
    /// Row of the first empty identifier cell; rows from here on are not data.
    pub data_end: Anchor,
}

pub fn locate_regions(grid: &Grid) -> Result<Regions, IngestError> {
    let demographics = locate(grid, DEMOGRAPHICS_MARKER, 0, grid.num_cols()).ok_or(
        IngestError::MissingMarker {
            marker: DEMOGRAPHICS_MARKER,
        },
    )?;
    let quarters = locate(grid, QUARTERS_MARKER, 0, grid.num_cols()).ok_or(
        IngestError::MissingMarker {
            marker: QUARTERS_MARKER,
        },
    )?;

    if quarters.column <= demographics.column {
        return Err(IngestError::MarkerOrder {
            demographics_column: demographics.column,
            quarters_column: quarters.column,
        });
    }

    let data_end = locate_empty(grid, demographics.row, demographics.column)
        .unwrap_or_else(|| Anchor::new(grid.num_rows(), 0));

    debug!(
        demographics = %demographics,
        quarters = %quarters,
        data_end = %data_end,
        "located workbook regions"
    );

    Ok(Regions {
        demographics,
        quarters,
        data_end,
    })
}
