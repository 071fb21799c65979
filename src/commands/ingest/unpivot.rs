use super::demographics::FILE_DATE_COLUMN;
use super::extract::{Header, ID_COLUMN, Table};
use super::grid::Cell;
use crate::error::IngestError;
use crate::model::TallRiskRecord;

pub const RISK_INCREASED_COLUMN: &str = "RiskIncreasedFlag";
pub const ATTRIBUTED_BASE: &str = "Attributed";
pub const RISK_BASE: &str = "Risk";
const INCREASED: &str = "Yes";

/// Column positions for one quarter of the wide risk grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarterColumns {
    pub label: String,
    pub attributed: usize,
    pub risk: usize,
}

/// Named-column layout of the wide risk table, checked before any row is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskLayout {
    pub quarters: [QuarterColumns; 2],
    pub increased: usize,
    pub id: usize,
    pub file_date: usize,
}

impl RiskLayout {
    pub fn resolve(table: &Table) -> Result<Self, IngestError> {
        let attributed = tagged_columns(&table.headers, ATTRIBUTED_BASE)?;
        let [(first_index, first_label), (second_index, second_label)] = attributed
            .try_into()
            .map_err(|found: Vec<(usize, String)>| {
                IngestError::RiskSchema(format!(
                    "expected two quarter-tagged {ATTRIBUTED_BASE} columns, found {} in [{}]",
                    found.len(),
                    describe(&table.headers)
                ))
            })?;

        if first_label == second_label {
            return Err(IngestError::RiskSchema(format!(
                "both {ATTRIBUTED_BASE} columns are tagged Q{first_label}"
            )));
        }

        let risk = tagged_columns(&table.headers, RISK_BASE)?;
        let risk_for = |label: &str| {
            let mut matches = risk.iter().filter(|(_, tag)| tag == label);
            match (matches.next(), matches.next()) {
                (Some((index, _)), None) => Ok(*index),
                (None, _) => Err(IngestError::RiskSchema(format!(
                    "no {RISK_BASE} column tagged Q{label}"
                ))),
                (Some(_), Some(_)) => Err(IngestError::RiskSchema(format!(
                    "more than one {RISK_BASE} column tagged Q{label}"
                ))),
            }
        };

        Ok(Self {
            quarters: [
                QuarterColumns {
                    risk: risk_for(&first_label)?,
                    label: first_label,
                    attributed: first_index,
                },
                QuarterColumns {
                    risk: risk_for(&second_label)?,
                    label: second_label,
                    attributed: second_index,
                },
            ],
            increased: table.require_column(RISK_INCREASED_COLUMN)?,
            id: table.require_column(ID_COLUMN)?,
            file_date: table.require_column(FILE_DATE_COLUMN)?,
        })
    }

    pub fn labels(&self) -> Vec<String> {
        self.quarters
            .iter()
            .map(|quarter| quarter.label.clone())
            .collect()
    }
}

fn tagged_columns(headers: &[Header], base_name: &str) -> Result<Vec<(usize, String)>, IngestError> {
    headers
        .iter()
        .enumerate()
        .filter(|(_, header)| header.base_name == base_name)
        .map(|(index, header)| match &header.quarter_tag {
            Some(tag) => Ok((index, tag.clone())),
            None => Err(IngestError::RiskSchema(format!(
                "column {:?} has no quarter tag",
                header.raw
            ))),
        })
        .collect()
}

fn describe(headers: &[Header]) -> String {
    headers
        .iter()
        .map(|header| format!("{:?}", header.raw))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unpivoted {
    pub quarters: Vec<String>,
    pub increased_rows: usize,
    pub records: Vec<TallRiskRecord>,
}

/// Reshapes rows flagged `Yes` into one record per (ID, quarter). All
/// first-quarter records come before the second-quarter ones.
pub fn unpivot(table: &Table) -> Result<Unpivoted, IngestError> {
    let layout = RiskLayout::resolve(table)?;
    let cell = |row: &[Cell], index: usize| row.get(index).cloned().unwrap_or(Cell::Empty);

    let increased = table
        .rows
        .iter()
        .filter(|row| cell(row, layout.increased).to_string() == INCREASED)
        .collect::<Vec<_>>();

    let (id, file_date) = (layout.id, layout.file_date);
    let records = layout
        .quarters
        .iter()
        .flat_map(|quarter| {
            increased.iter().map(move |row| TallRiskRecord {
                id: cell(row, id).to_string(),
                quarter: quarter.label.clone(),
                attributed: cell(row, quarter.attributed),
                risk: cell(row, quarter.risk),
                file_date: cell(row, file_date).to_string(),
            })
        })
        .collect();

    Ok(Unpivoted {
        quarters: layout.labels(),
        increased_rows: increased.len(),
        records,
    })
}
