use std::path::PathBuf;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use tracing::info;

use crate::error::IngestError;
use crate::model::{DemographicRecord, TallRiskRecord};

/// Destination database and table names.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub demographic_table: String,
    pub risk_table: String,
}

impl StoreConfig {
    pub fn new(
        db_path: PathBuf,
        demographic_table: &str,
        risk_table: &str,
    ) -> Result<Self, IngestError> {
        Ok(Self {
            db_path,
            demographic_table: validate_table_name(demographic_table)?,
            risk_table: validate_table_name(risk_table)?,
        })
    }
}

fn validate_table_name(name: &str) -> Result<String, IngestError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_');
    if valid_start && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        Ok(name.to_string())
    } else {
        Err(IngestError::TableName(name.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendCounts {
    pub demographic_rows: usize,
    pub risk_rows: usize,
}

pub fn open(config: &StoreConfig) -> Result<Connection> {
    let connection = Connection::open(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection, config)?;
    Ok(connection)
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

pub fn ensure_schema(connection: &Connection, config: &StoreConfig) -> Result<()> {
    connection
        .execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS \"{demographic}\" (
              ID TEXT NOT NULL,
              FirstName TEXT,
              MiddleName TEXT,
              LastName TEXT,
              Sex TEXT,
              ProviderGroup TEXT,
              FileDate TEXT
            );

            CREATE TABLE IF NOT EXISTS \"{risk}\" (
              ID TEXT NOT NULL,
              Quarter TEXT NOT NULL,
              Attributed REAL,
              Risk REAL,
              FileDate TEXT
            );
            ",
            demographic = config.demographic_table,
            risk = config.risk_table,
        ))
        .context("failed to initialize destination tables")?;

    Ok(())
}

/// Appends both record sets in a single transaction. Existing rows are never
/// touched.
pub fn append(
    connection: &mut Connection,
    config: &StoreConfig,
    demographics: &[DemographicRecord],
    risks: &[TallRiskRecord],
) -> Result<AppendCounts> {
    let tx = connection.transaction()?;

    {
        let mut statement = tx.prepare(&format!(
            "
            INSERT INTO \"{}\"(ID, FirstName, MiddleName, LastName, Sex, ProviderGroup, FileDate)
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            config.demographic_table
        ))?;

        for record in demographics {
            statement
                .execute(params![
                    &record.id,
                    &record.first_name,
                    &record.middle_name,
                    &record.last_name,
                    &record.sex,
                    &record.provider_group,
                    &record.file_date,
                ])
                .with_context(|| format!("failed to append demographic row for ID {}", record.id))?;
        }
    }

    {
        let mut statement = tx.prepare(&format!(
            "
            INSERT INTO \"{}\"(ID, Quarter, Attributed, Risk, FileDate)
            VALUES(?1, ?2, ?3, ?4, ?5)
            ",
            config.risk_table
        ))?;

        for record in risks {
            statement
                .execute(params![
                    &record.id,
                    &record.quarter,
                    &record.attributed,
                    &record.risk,
                    &record.file_date,
                ])
                .with_context(|| {
                    format!(
                        "failed to append quarter risk row for ID {} Q{}",
                        record.id, record.quarter
                    )
                })?;
        }
    }

    tx.commit().context("failed to commit appended rows")?;

    info!(
        demographic_table = %config.demographic_table,
        demographic_rows = demographics.len(),
        risk_table = %config.risk_table,
        risk_rows = risks.len(),
        "appended rows"
    );

    Ok(AppendCounts {
        demographic_rows: demographics.len(),
        risk_rows: risks.len(),
    })
}

pub fn count_rows(connection: &Connection, table: &str) -> Result<i64> {
    let count = connection
        .query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
            row.get(0)
        })
        .with_context(|| format!("failed to count rows in {table}"))?;
    Ok(count)
}
