use serde::Serialize;

use crate::commands::ingest::Cell;

#[derive(Debug, Clone, PartialEq)]
pub struct DemographicRecord {
    pub id: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub sex: String,
    pub provider_group: String,
    pub file_date: String,
}

/// One (person, quarter) row of the unpivoted risk grid.
#[derive(Debug, Clone, PartialEq)]
pub struct TallRiskRecord {
    pub id: String,
    pub quarter: String,
    pub attributed: Cell,
    pub risk: Cell,
    pub file_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestPaths {
    pub input_path: String,
    pub db_path: String,
    pub manifest_path: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestCounts {
    pub grid_rows: usize,
    pub grid_columns: usize,
    pub demographic_rows: usize,
    pub risk_rows: usize,
    pub risk_increased_rows: usize,
    pub quarter_risk_rows: usize,
    pub demographic_rows_appended: usize,
    pub quarter_risk_rows_appended: usize,
    pub demographic_total: Option<i64>,
    pub quarter_risk_total: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub dry_run: bool,
    pub started_at: String,
    pub updated_at: String,
    pub source_sha256: String,
    pub provider_group: String,
    pub file_date: String,
    pub quarters: Vec<String>,
    pub demographic_table: String,
    pub risk_table: String,
    pub paths: IngestPaths,
    pub counts: IngestCounts,
    pub warnings: Vec<String>,
}
