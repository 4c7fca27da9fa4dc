//! Full JSON backups and file exports.
//!
//! A backup is the ledger blob exactly as it is kept in the store, so a file
//! exported on one machine can be restored on another.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::ledger::{Ledger, LoadMode};

/// File name used for text summaries.
pub const TEXT_EXPORT_FILE_NAME: &str = "status_pagamento.txt";

/// File name for a backup taken on `date`.
#[must_use]
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("caronas_backup_{}.json", date.format("%Y-%m-%d"))
}

/// Serialize the whole ledger as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn export_json(ledger: &Ledger) -> Result<String> {
    ledger.to_json_pretty()
}

/// Restore a ledger from backup text.
///
/// # Errors
///
/// Returns [`Error::InvalidBackup`] if the text is not a JSON object or any
/// trip list in it is malformed.
pub fn import_json(text: &str) -> Result<Ledger> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| Error::invalid_backup(format!("not valid JSON: {e}")))?;
    let ledger = Ledger::from_value(value, LoadMode::Strict)?;
    info!(
        week = %ledger.current_week_name(),
        archives = ledger.archives().len(),
        "backup parsed"
    );
    Ok(ledger)
}

/// Read and parse a backup file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid backup.
pub fn import_file(path: impl AsRef<Path>) -> Result<Ledger> {
    let path = path.as_ref();
    debug!("Reading backup from {}", path.display());
    let text = std::fs::read_to_string(path)?;
    import_json(&text)
}

/// Write `contents` to `dir/file_name`, creating `dir` if needed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file written.
pub fn write_export(dir: impl AsRef<Path>, file_name: &str, contents: &str) -> Result<PathBuf> {
    let dir = dir.as_ref();
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let path = dir.join(file_name);
    std::fs::write(&path, contents)?;
    info!("Wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TripType;
    use chrono::{Local, TimeZone};

    fn sample_ledger() -> Ledger {
        let now = Local
            .with_ymd_and_hms(2025, 1, 12, 9, 0, 0)
            .single()
            .unwrap();
        let mut ledger = Ledger::new();
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        ledger.create_week(start, &now).unwrap();
        ledger
            .add_trip(start, TripType::Ida, ["Ana", "Bruno"], &now)
            .unwrap();
        ledger
    }

    #[test]
    fn test_backup_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert_eq!(backup_file_name(date), "caronas_backup_2025-01-09.json");
    }

    #[test]
    fn test_export_is_pretty_printed() {
        let text = export_json(&sample_ledger()).unwrap();
        assert!(text.starts_with("{\n  \"active_trips\""));
        assert!(text.contains("\"currentWeekName\": \"Semana 06/01/2025 - 10/01/2025\""));
    }

    #[test]
    fn test_export_then_import() {
        let ledger = sample_ledger();
        let restored = import_json(&export_json(&ledger).unwrap()).unwrap();
        assert_eq!(restored, ledger);
    }

    #[test]
    fn test_import_rejects_garbage() {
        let err = import_json("not json").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));

        let err = import_json("\"just a string\"").unwrap_err();
        assert!(matches!(err, Error::InvalidBackup { .. }));
    }

    #[test]
    fn test_import_browser_format() {
        let text = r#"{
            "active_trips": [
                {"day": "Terça-feira (07/01)", "time": null, "type": "Volta",
                 "participants": [{"id": "p-1736-ana", "name": "Ana", "paid": true}]}
            ],
            "currentWeekName": "Semana 06/01/2025 - 10/01/2025",
            "Semana 30/12/2024 - 03/01/2025": []
        }"#;
        let ledger = import_json(text).unwrap();
        assert_eq!(ledger.active_trips()[0].trip_type, TripType::Volta);
        assert!(ledger.active_trips()[0].participants[0].paid);
        assert!(ledger.archive("Semana 30/12/2024 - 03/01/2025").is_some());
    }

    #[test]
    fn test_write_export_creates_directory() {
        let dir = std::env::temp_dir().join(format!("carpool_export_test_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let path = write_export(&dir, TEXT_EXPORT_FILE_NAME, "hello").unwrap();
        assert_eq!(path, dir.join(TEXT_EXPORT_FILE_NAME));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");

        let restored = import_file(write_export(&dir, "b.json", "{}").unwrap()).unwrap();
        assert_eq!(restored, Ledger::new());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
