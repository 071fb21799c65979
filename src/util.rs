use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// When a run started, in the two renderings the manifest needs.
#[derive(Debug, Clone)]
pub struct RunStamp {
    pub started_at: String,
    pub compact: String,
}

impl RunStamp {
    pub fn at(ts: DateTime<Utc>) -> Self {
        Self {
            started_at: rfc3339(ts),
            compact: ts.format("%Y%m%dT%H%M%SZ").to_string(),
        }
    }

    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn run_id(&self) -> String {
        format!("run-{}", self.compact)
    }
}

pub fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Hex SHA-256 of the workbook bytes, recorded so a manifest can be tied to
/// the exact file it describes.
pub fn workbook_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open workbook for hashing: {}", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("failed to hash workbook: {}", path.display()))?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Writes `manifest` as pretty JSON, creating missing parent directories.
pub fn write_manifest<T: Serialize>(path: &Path, manifest: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create manifest directory: {}", parent.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("failed to create manifest: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, manifest)
        .with_context(|| format!("failed to serialize manifest: {}", path.display()))?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .with_context(|| format!("failed to write manifest: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn run_stamp_renders_both_forms() {
        let ts = Utc.with_ymd_and_hms(2020, 1, 1, 8, 30, 5).unwrap();
        let stamp = RunStamp::at(ts);
        assert_eq!(stamp.started_at, "2020-01-01T08:30:05Z");
        assert_eq!(stamp.run_id(), "run-20200101T083005Z");
    }

    #[test]
    fn manifest_lands_in_created_directory_and_hash_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/run.json");

        write_manifest(&path, &serde_json::json!({ "status": "completed" })).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("}\n"));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["status"], "completed");

        let hash = workbook_sha256(&path).unwrap();
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, workbook_sha256(&path).unwrap());
    }
}
