use std::path::Path;

use crate::error::IngestError;

const DATE_CODE_LEN: usize = 6;

/// Fields taken from the workbook's filename and stamped onto every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub provider_group: String,
    pub file_date: String,
}

/// Splits `<ProviderGroup><MMDDYY>.<ext>` into its two parts.
pub fn decode(file_name: &str) -> Result<Provenance, IngestError> {
    let error = |reason| IngestError::FileName {
        file_name: file_name.to_string(),
        reason,
    };

    let base = Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file_name);
    let stem = base.split('.').next().unwrap_or_default();

    let char_count = stem.chars().count();
    if char_count < DATE_CODE_LEN {
        return Err(error("name is shorter than the six character date code"));
    }

    let split_at = stem
        .char_indices()
        .nth(char_count - DATE_CODE_LEN)
        .map(|(index, _)| index)
        .unwrap_or(0);
    let (provider_group, file_date) = stem.split_at(split_at);

    let provider_group = provider_group.trim();
    if provider_group.is_empty() {
        return Err(error("provider group is empty"));
    }

    Ok(Provenance {
        provider_group: provider_group.to_string(),
        file_date: file_date.trim().to_string(),
    })
}
