use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use super::extract::HeaderParser;
use super::grid::load_first_sheet;
use super::pipeline::transform;
use super::store::{self, StoreConfig};
use crate::cli::IngestArgs;
use crate::model::{IngestCounts, IngestPaths, IngestRunManifest};
use crate::util::{RunStamp, rfc3339, workbook_sha256, write_manifest};

pub fn run(args: IngestArgs) -> Result<()> {
    let stamp = RunStamp::now();
    let run_id = stamp.run_id();

    let input = args.input.clone();
    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        args.manifest_dir
            .join(format!("ingest_run_{}.json", stamp.compact))
    });
    let config = StoreConfig::new(
        args.db_path.clone(),
        &args.demographic_table,
        &args.risk_table,
    )?;

    info!(input = %input.display(), run_id = %run_id, "starting ingest");

    let file_name = input
        .to_str()
        .with_context(|| format!("invalid UTF-8 path: {}", input.display()))?;

    let grid = load_first_sheet(&input)?;
    let source_sha256 = workbook_sha256(&input)?;
    info!(
        rows = grid.num_rows(),
        columns = grid.num_cols(),
        "loaded first worksheet"
    );

    let parser = HeaderParser::new()?;
    let transformed = transform(&grid, file_name, &parser)
        .with_context(|| format!("unexpected workbook layout: {}", input.display()))?;

    let mut counts = IngestCounts {
        grid_rows: grid.num_rows(),
        grid_columns: grid.num_cols(),
        demographic_rows: transformed.demographics.records.len(),
        risk_rows: transformed.risk_rows,
        risk_increased_rows: transformed.risk.increased_rows,
        quarter_risk_rows: transformed.risk.records.len(),
        ..IngestCounts::default()
    };

    if args.dry_run {
        info!(db_path = %config.db_path.display(), "dry run, database left untouched");
    } else {
        let mut connection = store::open(&config)?;
        let appended = store::append(
            &mut connection,
            &config,
            &transformed.demographics.records,
            &transformed.risk.records,
        )?;
        counts.demographic_rows_appended = appended.demographic_rows;
        counts.quarter_risk_rows_appended = appended.risk_rows;
        counts.demographic_total = Some(store::count_rows(&connection, &config.demographic_table)?);
        counts.quarter_risk_total = Some(store::count_rows(&connection, &config.risk_table)?);
    }

    let manifest = IngestRunManifest {
        manifest_version: 1,
        run_id,
        status: "completed".to_string(),
        dry_run: args.dry_run,
        started_at: stamp.started_at,
        updated_at: rfc3339(Utc::now()),
        source_sha256,
        provider_group: transformed.provenance.provider_group.clone(),
        file_date: transformed.provenance.file_date.clone(),
        quarters: transformed.risk.quarters.clone(),
        demographic_table: config.demographic_table.clone(),
        risk_table: config.risk_table.clone(),
        paths: IngestPaths {
            input_path: input.display().to_string(),
            db_path: config.db_path.display().to_string(),
            manifest_path: manifest_path.display().to_string(),
        },
        counts,
        warnings: transformed.demographics.warnings,
    };

    write_manifest(&manifest_path, &manifest)?;

    info!(path = %manifest_path.display(), "wrote ingest run manifest");
    info!(
        demographic_rows = manifest.counts.demographic_rows,
        quarter_risk_rows = manifest.counts.quarter_risk_rows,
        warnings = manifest.warnings.len(),
        "ingest completed"
    );

    Ok(())
}
