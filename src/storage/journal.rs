use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim, WriterBuilder};
use tracing::{error, warn};

use crate::models::{Record, StoreError};
use crate::types::RecordId;

/// Reads every well-formed record from the CSV journal at `path`.
///
/// A missing file is an empty journal. Malformed rows and repeated ids are
/// logged and skipped so one bad line does not lose the rest of the data.
pub fn read_journal(path: &Path) -> Result<Vec<Record>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)?;

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for result in reader.deserialize::<Record>() {
        match result {
            Ok(record) => {
                if !seen.insert(record.id) {
                    warn!("Journal [{}] repeats record [{}], keeping the first occurrence", path.display(), record.id);
                    continue;
                }

                records.push(record);
            }
            Err(error) => {
                error!("Journal deserialization error in [{}]: {error}", path.display());
            }
        }
    }

    Ok(records)
}

/// Reads the id high-water mark kept next to the journal at `path`.
///
/// Returns `None` when there is no sequence file or it cannot be parsed; the
/// caller then falls back to the largest id in the journal.
pub fn read_next_id(path: &Path) -> Result<Option<RecordId>, StoreError> {
    let sequence = sequence_path(path);

    if !sequence.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&sequence)?;

    match content.trim().parse::<RecordId>() {
        Ok(next_id) => Ok(Some(next_id)),
        Err(error) => {
            error!("Sequence file [{}] is unreadable: {error}", sequence.display());
            Ok(None)
        }
    }
}

/// Replaces the journal at `path` with `records` and records `next_id` as the
/// next id to hand out.
///
/// Both files are written to sibling temporary files first and renamed into
/// place, so a failed write leaves the previous journal intact. The sequence
/// file goes first; a mark that runs ahead of the journal only skips ids.
pub fn write_journal(path: &Path, records: &[Record], next_id: RecordId) -> Result<(), StoreError> {
    let sequence = sequence_path(path);
    let temporary = append_extension(&sequence, ".tmp");

    fs::write(&temporary, format!("{next_id}\n"))?;
    fs::rename(&temporary, &sequence)?;

    let temporary = append_extension(path, ".tmp");

    {
        let mut writer = WriterBuilder::new().from_path(&temporary)?;

        for record in records {
            writer.serialize(record)?;
        }

        writer.flush()?;
    }

    fs::rename(&temporary, path)?;

    Ok(())
}

/// `journal.csv` keeps its high-water mark in `journal.csv.seq`.
pub fn sequence_path(path: &Path) -> PathBuf {
    append_extension(path, ".seq")
}

fn append_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(extension);
    PathBuf::from(name)
}
