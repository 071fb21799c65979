use std::path::PathBuf;

use clap::{Args, Parser};

pub const DEFAULT_INPUT: &str = "Privia Family Medicine 113018.xlsx";

#[derive(Parser, Debug)]
#[command(
    name = "quarter-risk",
    version,
    about = "Load a provider demographic and quarter risk workbook into SQLite"
)]
pub struct Cli {
    #[command(flatten)]
    pub ingest: IngestArgs,
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// Workbook named `<ProviderGroup><MMDDYY>.<ext>`.
    #[arg(default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    #[arg(long, default_value = "quarter_risk.sqlite")]
    pub db_path: PathBuf,

    #[arg(long, default_value = "Demographic")]
    pub demographic_table: String,

    #[arg(long, default_value = "QuarterRisk")]
    pub risk_table: String,

    #[arg(long, default_value = ".cache/quarter-risk/manifests")]
    pub manifest_dir: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    /// Parse and reshape the workbook without touching the database.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
