use tracing::warn;

use super::extract::{ID_COLUMN, Table};
use super::grid::Cell;
use crate::error::IngestError;
use crate::model::DemographicRecord;

pub const PROVIDER_GROUP_COLUMN: &str = "ProviderGroup";
pub const FILE_DATE_COLUMN: &str = "FileDate";

#[derive(Debug, Default)]
pub struct CleanedDemographics {
    pub records: Vec<DemographicRecord>,
    pub warnings: Vec<String>,
}

pub fn clean(table: &Table) -> Result<CleanedDemographics, IngestError> {
    let id = table.require_column(ID_COLUMN)?;
    let first_name = table.require_column("FirstName")?;
    let middle_name = table.require_column("MiddleName")?;
    let last_name = table.require_column("LastName")?;
    let sex = table.require_column("Sex")?;
    let provider_group = table.require_column(PROVIDER_GROUP_COLUMN)?;
    let file_date = table.require_column(FILE_DATE_COLUMN)?;

    let mut cleaned = CleanedDemographics::default();
    for (row_index, row) in table.rows.iter().enumerate() {
        let value = |index: usize| row.get(index).map(Cell::to_string).unwrap_or_default();

        let record_id = value(id);
        if record_id.trim().is_empty() {
            return Err(IngestError::MissingIdentifier { row: row_index });
        }

        let sex_cell = row.get(sex).unwrap_or(&Cell::Empty);
        let sex_code = match normalize_sex(sex_cell) {
            Ok(code) => code,
            Err(unexpected) => {
                warn!(id = %record_id, sex = %unexpected, "unexpected sex code left unchanged");
                cleaned
                    .warnings
                    .push(format!("ID {record_id}: unexpected sex code {unexpected:?}"));
                unexpected
            }
        };

        cleaned.records.push(DemographicRecord {
            id: record_id,
            first_name: value(first_name),
            middle_name: middle_initial(&value(middle_name)),
            last_name: value(last_name),
            sex: sex_code,
            provider_group: value(provider_group),
            file_date: value(file_date),
        });
    }

    Ok(cleaned)
}

pub fn middle_initial(middle_name: &str) -> String {
    middle_name.chars().take(1).collect()
}

/// Maps code 0 to `M` and 1 to `F`. Anything else comes back as `Err` with
/// the value's text so the caller can keep and report it.
pub fn normalize_sex(cell: &Cell) -> Result<String, String> {
    let code = cell
        .as_integer()
        .map(|code| code.to_string())
        .unwrap_or_else(|| cell.to_string());

    match code.as_str() {
        "0" => Ok("M".to_string()),
        "1" => Ok("F".to_string()),
        _ => Err(code),
    }
}
