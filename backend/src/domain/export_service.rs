//! Export service domain logic for the bookkeeping tool.
//!
//! Backups are a single JSON document holding both collections plus the
//! export timestamp. Importing such a document replaces the collections it
//! carries; fields that are missing or not arrays are left alone. A CSV export
//! of each collection is offered for spreadsheets.

use chrono::SecondsFormat;
use log::{error, info, warn};
use serde_json::Value;
use shared::{Expense, ExportDocument, ImportSummary, Reservation};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::clock::Clock;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::record_service::RecordService;
use crate::domain::value::parse_amount;
use crate::storage::KeyValueStorage;

/// Collections found in an import file; `None` when the field was absent or
/// not an array
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportPayload {
    pub reservations: Option<Vec<Reservation>>,
    pub expenses: Option<Vec<Expense>>,
}

/// Export service that handles all export-related business logic
#[derive(Clone)]
pub struct ExportService {
    clock: Arc<dyn Clock>,
}

impl ExportService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Snapshot of both collections stamped with the current instant
    pub fn build_export(&self, reservations: &[Reservation], expenses: &[Expense]) -> ExportDocument {
        ExportDocument {
            reservations: reservations.to_vec(),
            expenses: expenses.to_vec(),
            export_date: self.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// "sitio-backup-2025-06-01.json"
    pub fn backup_filename(&self) -> String {
        format!("sitio-backup-{}.json", self.clock.now().format("%Y-%m-%d"))
    }

    /// Write a backup into `directory` (created if missing) and return its path
    pub fn export_to_path(
        &self,
        reservations: &[Reservation],
        expenses: &[Expense],
        directory: &Path,
    ) -> DomainResult<PathBuf> {
        info!("📁 EXPORT: Exporting backup to {:?}", directory);

        let document = self.build_export(reservations, expenses);
        let json = serde_json::to_string_pretty(&document)?;

        if let Err(e) = fs::create_dir_all(directory) {
            error!("❌ EXPORT: Failed to create export directory {:?}: {}", directory, e);
            return Err(e.into());
        }

        let file_path = directory.join(self.backup_filename());
        if let Err(e) = fs::write(&file_path, json) {
            error!("❌ EXPORT: Failed to write backup to {:?}: {}", file_path, e);
            return Err(e.into());
        }

        info!(
            "✅ EXPORT: Exported {} reservations and {} expenses to {:?}",
            document.reservations.len(),
            document.expenses.len(),
            file_path
        );
        Ok(file_path)
    }

    /// Parse an import file. Invalid JSON, an array field whose elements do
    /// not deserialize, or a document with neither collection is an error.
    /// So is a collection that repeats an id or holds a negative value.
    pub fn parse_import(&self, content: &str) -> DomainResult<ImportPayload> {
        let document: Value = serde_json::from_str(content)
            .map_err(|e| DomainError::Import(format!("invalid JSON: {}", e)))?;

        let reservations = match document.get("reservations") {
            Some(value @ Value::Array(_)) => Some(
                serde_json::from_value::<Vec<Reservation>>(value.clone())
                    .map_err(|e| DomainError::Import(format!("invalid reservations: {}", e)))?,
            ),
            Some(_) => {
                warn!("Import: 'reservations' is not an array, ignoring it");
                None
            }
            None => None,
        };

        let expenses = match document.get("expenses") {
            Some(value @ Value::Array(_)) => Some(
                serde_json::from_value::<Vec<Expense>>(value.clone())
                    .map_err(|e| DomainError::Import(format!("invalid expenses: {}", e)))?,
            ),
            Some(_) => {
                warn!("Import: 'expenses' is not an array, ignoring it");
                None
            }
            None => None,
        };

        if let Some(records) = &reservations {
            check_records("reservations", records.iter().map(|r| (r.id, r.value.as_str())))?;
        }
        if let Some(records) = &expenses {
            check_records("expenses", records.iter().map(|e| (e.id, e.value.as_str())))?;
        }

        if reservations.is_none() && expenses.is_none() {
            return Err(DomainError::Import(
                "file contains neither a reservations nor an expenses list".to_string(),
            ));
        }

        Ok(ImportPayload { reservations, expenses })
    }

    /// Parse `content` and replace the collections it carries. The store is
    /// untouched when parsing fails.
    pub fn import_into<S: KeyValueStorage>(
        &self,
        records: &mut RecordService<S>,
        content: &str,
    ) -> DomainResult<ImportSummary> {
        let payload = self.parse_import(content)?;
        let mut summary = ImportSummary::default();

        if let Some(reservations) = payload.reservations {
            summary.reservations = Some(reservations.len());
            records.replace_reservations(reservations);
        }
        if let Some(expenses) = payload.expenses {
            summary.expenses = Some(expenses.len());
            records.replace_expenses(expenses);
        }

        info!(
            "✅ IMPORT: Imported reservations: {:?}, expenses: {:?}",
            summary.reservations, summary.expenses
        );
        Ok(summary)
    }

    /// Read a backup file from disk and import it
    pub fn import_from_path<S: KeyValueStorage>(
        &self,
        records: &mut RecordService<S>,
        path: &Path,
    ) -> DomainResult<ImportSummary> {
        info!("📂 IMPORT: Reading backup from {:?}", path);
        let content = fs::read_to_string(path)?;
        self.import_into(records, &content)
    }

    /// Write one CSV file per collection into `directory`
    pub fn export_csv(
        &self,
        reservations: &[Reservation],
        expenses: &[Expense],
        directory: &Path,
    ) -> DomainResult<Vec<PathBuf>> {
        fs::create_dir_all(directory)?;
        let date = self.clock.now().format("%Y-%m-%d");

        let reservations_path = directory.join(format!("sitio-reservas-{}.csv", date));
        let mut writer = csv::Writer::from_path(&reservations_path)?;
        writer.write_record(["id", "name", "date", "end_date", "value", "paid"])?;
        for r in reservations {
            writer.write_record([
                r.id.to_string(),
                r.name.clone(),
                r.date.clone(),
                r.end_date.clone().unwrap_or_default(),
                r.value.clone(),
                r.paid.to_string(),
            ])?;
        }
        writer.flush()?;

        let expenses_path = directory.join(format!("sitio-despesas-{}.csv", date));
        let mut writer = csv::Writer::from_path(&expenses_path)?;
        writer.write_record(["id", "description", "date", "value", "category"])?;
        for e in expenses {
            writer.write_record([
                e.id.to_string(),
                e.description.clone(),
                e.date.clone(),
                e.value.clone(),
                e.category.label().to_string(),
            ])?;
        }
        writer.flush()?;

        info!(
            "✅ EXPORT: Wrote {} reservations to {:?} and {} expenses to {:?}",
            reservations.len(),
            reservations_path,
            expenses.len(),
            expenses_path
        );
        Ok(vec![reservations_path, expenses_path])
    }

    /// Basic path sanitization for user-typed directories: surrounding
    /// quotes, escaped spaces, trailing separators and a leading `~`
    pub fn sanitize_path(&self, path: &str) -> PathBuf {
        let mut cleaned = path.trim().to_string();

        if cleaned.len() >= 2
            && ((cleaned.starts_with('"') && cleaned.ends_with('"'))
                || (cleaned.starts_with('\'') && cleaned.ends_with('\'')))
        {
            cleaned = cleaned[1..cleaned.len() - 1].trim().to_string();
        }

        cleaned = cleaned.replace("\\ ", " ");

        while cleaned.len() > 1 && (cleaned.ends_with('/') || cleaned.ends_with('\\')) {
            cleaned.pop();
        }

        if cleaned == "~" || cleaned.starts_with("~/") || cleaned.starts_with("~\\") {
            if let Some(home) = dirs::home_dir() {
                return if cleaned == "~" { home } else { home.join(&cleaned[2..]) };
            }
        }

        PathBuf::from(cleaned)
    }
}

/// Ids must be unique within a collection and values must not be negative
fn check_records<'a>(collection: &str, records: impl Iterator<Item = (u64, &'a str)>) -> DomainResult<()> {
    let mut seen = HashSet::new();
    for (id, value) in records {
        if !seen.insert(id) {
            return Err(DomainError::Import(format!("{} contains id {} more than once", collection, id)));
        }
        if parse_amount(value).is_some_and(|amount| amount < 0.0) {
            return Err(DomainError::Import(format!(
                "{} entry {} has a negative value '{}'",
                collection, id, value
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::storage::InMemoryKeyValueRepository;
    use chrono::{TimeZone, Utc};
    use shared::{ExpenseCategory, ExpenseDraft, ReservationDraft};
    use tempfile::TempDir;

    fn test_clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 14, 30, 5).unwrap()))
    }

    fn create_test_service() -> ExportService {
        ExportService::new(test_clock())
    }

    fn populated_records() -> RecordService<InMemoryKeyValueRepository> {
        let mut records = RecordService::load(InMemoryKeyValueRepository::new(), test_clock());
        records
            .add_reservation(ReservationDraft {
                name: "Maria".to_string(),
                date: "2025-06-10".to_string(),
                end_date: Some("2025-06-12".to_string()),
                value: "800".to_string(),
                paid: true,
            })
            .unwrap();
        records
            .add_reservation(ReservationDraft {
                name: "João, \"JJ\"".to_string(),
                date: "2025-07-01".to_string(),
                end_date: None,
                value: "0450".to_string(),
                paid: false,
            })
            .unwrap();
        records
            .add_expense(ExpenseDraft {
                description: "Cloro".to_string(),
                date: "2025-06-02".to_string(),
                value: "120.5".to_string(),
                category: ExpenseCategory::Piscina,
            })
            .unwrap();
        records
    }

    #[test]
    fn test_build_export_stamps_iso_date() {
        let service = create_test_service();
        let document = service.build_export(&[], &[]);

        assert_eq!(document.export_date, "2025-06-01T14:30:05.000Z");
    }

    #[test]
    fn test_backup_filename() {
        let service = create_test_service();
        assert_eq!(service.backup_filename(), "sitio-backup-2025-06-01.json");
    }

    #[test]
    fn test_export_then_import_round_trip() {
        let service = create_test_service();
        let records = populated_records();
        let temp_dir = TempDir::new().unwrap();

        let path = service
            .export_to_path(records.reservations(), records.expenses(), temp_dir.path())
            .unwrap();
        assert_eq!(path, temp_dir.path().join("sitio-backup-2025-06-01.json"));

        let mut restored = RecordService::load(InMemoryKeyValueRepository::new(), test_clock());
        let summary = service.import_from_path(&mut restored, &path).unwrap();

        assert_eq!(summary.reservations, Some(2));
        assert_eq!(summary.expenses, Some(1));
        assert_eq!(restored.reservations(), records.reservations());
        assert_eq!(restored.expenses(), records.expenses());
    }

    #[test]
    fn test_import_replaces_and_persists() {
        let service = create_test_service();
        let storage = InMemoryKeyValueRepository::new();
        let mut records = RecordService::load(storage.clone(), test_clock());
        let content = r#"{
            "reservations": [{"id": 1, "name": "Ana", "date": "2025-01-03", "value": "300", "paid": true}],
            "expenses": [],
            "exportDate": "2025-01-04T10:00:00.000Z"
        }"#;

        service.import_into(&mut records, content).unwrap();

        let reloaded = RecordService::load(storage, test_clock());
        assert_eq!(reloaded.reservations().len(), 1);
        assert_eq!(reloaded.reservations()[0].name, "Ana");
        assert!(reloaded.expenses().is_empty());
    }

    #[test]
    fn test_import_ignores_non_array_fields() {
        let service = create_test_service();
        let mut records = populated_records();
        let content = r#"{"reservations": "oops", "expenses": []}"#;

        let summary = service.import_into(&mut records, content).unwrap();

        assert_eq!(summary.reservations, None);
        assert_eq!(summary.expenses, Some(0));
        assert_eq!(records.reservations().len(), 2);
        assert!(records.expenses().is_empty());
    }

    #[test]
    fn test_import_invalid_json_leaves_store_untouched() {
        let service = create_test_service();
        let mut records = populated_records();
        let before = (records.reservations().to_vec(), records.expenses().to_vec());

        let err = service.import_into(&mut records, "{ not json").unwrap_err();
        assert!(matches!(err, DomainError::Import(_)));

        let err = service
            .import_into(&mut records, r#"{"reservations": [{"id": "x"}], "expenses": []}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid reservations"));

        let err = service.import_into(&mut records, "[1, 2, 3]").unwrap_err();
        assert!(err.to_string().contains("neither"));

        assert_eq!(records.reservations(), before.0.as_slice());
        assert_eq!(records.expenses(), before.1.as_slice());
    }

    #[test]
    fn test_import_rejects_duplicate_ids() {
        let service = create_test_service();
        let mut records = populated_records();
        let before = records.reservations().to_vec();
        let content = r#"{"reservations": [
            {"id": 7, "name": "Ana", "date": "2025-01-03", "value": "300", "paid": true},
            {"id": 7, "name": "Bia", "date": "2025-01-09", "value": "200", "paid": false}
        ]}"#;

        let err = service.import_into(&mut records, content).unwrap_err();

        assert!(matches!(err, DomainError::Import(ref msg) if msg.contains("id 7")));
        assert_eq!(records.reservations(), before.as_slice());

        let shared_across_collections = r#"{
            "reservations": [{"id": 7, "name": "Ana", "date": "2025-01-03", "value": "300", "paid": true}],
            "expenses": [{"id": 7, "description": "Cloro", "date": "2025-01-04", "value": "50", "category": "Piscina"}]
        }"#;
        assert!(service.parse_import(shared_across_collections).is_ok());
    }

    #[test]
    fn test_import_rejects_negative_values() {
        let service = create_test_service();
        let mut records = populated_records();
        let before = records.expenses().to_vec();
        let content = r#"{"expenses": [
            {"id": 3, "description": "Estorno", "date": "2025-01-04", "value": "-50", "category": "Outros"}
        ]}"#;

        let err = service.import_into(&mut records, content).unwrap_err();

        assert!(matches!(err, DomainError::Import(ref msg) if msg.contains("negative")));
        assert_eq!(records.expenses(), before.as_slice());

        let reservation = r#"{"reservations": [
            {"id": 1, "name": "Ana", "date": "2025-01-03", "value": "-1,50", "paid": true}
        ]}"#;
        assert!(service.parse_import(reservation).is_err());
    }

    #[test]
    fn test_import_missing_file_is_io_error() {
        let service = create_test_service();
        let mut records = populated_records();
        let temp_dir = TempDir::new().unwrap();

        let err = service
            .import_from_path(&mut records, &temp_dir.path().join("missing.json"))
            .unwrap_err();
        assert!(matches!(err, DomainError::Io(_)));
    }

    #[test]
    fn test_export_csv() {
        let service = create_test_service();
        let records = populated_records();
        let temp_dir = TempDir::new().unwrap();

        let paths = service
            .export_csv(records.reservations(), records.expenses(), temp_dir.path())
            .unwrap();
        assert_eq!(paths.len(), 2);

        let reservations_csv = fs::read_to_string(&paths[0]).unwrap();
        let lines: Vec<&str> = reservations_csv.lines().collect();
        assert_eq!(lines[0], "id,name,date,end_date,value,paid");
        assert!(lines[1].ends_with(",Maria,2025-06-10,2025-06-12,800,true"));
        assert!(lines[2].contains("\"João, \"\"JJ\"\"\""));
        assert!(lines[2].ends_with(",2025-07-01,,450,false"));

        let expenses_csv = fs::read_to_string(&paths[1]).unwrap();
        assert!(expenses_csv.contains("Cloro,2025-06-02,120.5,Piscina"));
    }

    #[test]
    fn test_sanitize_path() {
        let service = create_test_service();

        assert_eq!(service.sanitize_path("  /path/to/dir  "), PathBuf::from("/path/to/dir"));
        assert_eq!(service.sanitize_path("\"/path/to/dir\""), PathBuf::from("/path/to/dir"));
        assert_eq!(service.sanitize_path("/path\\ to\\ dir"), PathBuf::from("/path to dir"));
        assert_eq!(service.sanitize_path("/path/to/dir/"), PathBuf::from("/path/to/dir"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(service.sanitize_path("'~/Backups'"), home.join("Backups"));
        }
    }
}
