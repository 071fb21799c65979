use thiserror::Error;

/// Problems with the shape of the workbook or its filename.
///
/// I/O and database failures are carried by `anyhow` with context instead.
#[derive(Debug, Error, PartialEq)]
pub enum IngestError {
    #[error("marker cell {marker:?} not found in the first worksheet")]
    MissingMarker { marker: &'static str },

    #[error(
        "\"Quarters\" marker at column {quarters_column} must sit right of \"Demographics\" at column {demographics_column}"
    )]
    MarkerOrder {
        demographics_column: usize,
        quarters_column: usize,
    },

    #[error("{table} table has no {column:?} column")]
    MissingColumn {
        table: &'static str,
        column: String,
    },

    #[error("risk table has {risk_rows} rows but demographic table has {demographic_rows}")]
    Misaligned {
        demographic_rows: usize,
        risk_rows: usize,
    },

    #[error("demographic row {row} has an empty ID")]
    MissingIdentifier { row: usize },

    #[error("unexpected risk columns: {0}")]
    RiskSchema(String),

    #[error("filename {file_name:?} does not follow <ProviderGroup><MMDDYY>.<ext>: {reason}")]
    FileName {
        file_name: String,
        reason: &'static str,
    },

    #[error("invalid table name {0:?}: use letters, digits and underscores")]
    TableName(String),
}
