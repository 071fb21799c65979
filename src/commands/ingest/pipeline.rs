use tracing::{info, warn};

use super::demographics::{CleanedDemographics, FILE_DATE_COLUMN, PROVIDER_GROUP_COLUMN, clean};
use super::extract::{HeaderParser, extract};
use super::filename::{Provenance, decode};
use super::grid::Grid;
use super::regions::locate_regions;
use super::unpivot::{Unpivoted, unpivot};
use crate::error::IngestError;

/// Everything a run derives from one worksheet, ready to append.
#[derive(Debug)]
pub struct Transformed {
    pub provenance: Provenance,
    pub risk_rows: usize,
    pub demographics: CleanedDemographics,
    pub risk: Unpivoted,
}

pub fn transform(
    grid: &Grid,
    file_name: &str,
    parser: &HeaderParser,
) -> Result<Transformed, IngestError> {
    let provenance = decode(file_name)?;

    let regions = locate_regions(grid)?;
    let (mut demographic_table, mut risk_table) = extract(grid, &regions, parser)?;
    if demographic_table.is_empty() {
        warn!(
            demographics = %regions.demographics,
            data_end = %regions.data_end,
            "no data rows between the Demographics header and the end of data"
        );
    }

    demographic_table.set_constant_column(
        parser,
        PROVIDER_GROUP_COLUMN,
        &provenance.provider_group,
    );
    demographic_table.set_constant_column(parser, FILE_DATE_COLUMN, &provenance.file_date);
    risk_table.set_constant_column(parser, FILE_DATE_COLUMN, &provenance.file_date);

    let demographics = clean(&demographic_table)?;
    let risk = unpivot(&risk_table)?;

    info!(
        provider_group = %provenance.provider_group,
        file_date = %provenance.file_date,
        demographic_rows = demographics.records.len(),
        risk_increased_rows = risk.increased_rows,
        quarter_risk_rows = risk.records.len(),
        "reshaped workbook tables"
    );

    Ok(Transformed {
        provenance,
        risk_rows: risk_table.len(),
        demographics,
        risk,
    })
}
