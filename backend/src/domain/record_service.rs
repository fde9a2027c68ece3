//! Record store for reservations and expenses.
//!
//! `RecordService` is the single owner of both collections and of the
//! dark-mode preference. Every mutation re-serializes the affected collection
//! into the key-value slot. Persistence is best-effort: a failed read falls
//! back to defaults and a failed write is logged, never returned, so the
//! in-memory state stays authoritative for the running session.

use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{Expense, ExpenseDraft, Reservation, ReservationDraft};
use std::sync::Arc;

use crate::domain::clock::Clock;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value::{normalize_value, parse_amount, parse_date};
use crate::storage::{KeyValueStorage, DARK_MODE_KEY, EXPENSES_KEY, RESERVATIONS_KEY};

pub struct RecordService<S: KeyValueStorage> {
    storage: S,
    clock: Arc<dyn Clock>,
    reservations: Vec<Reservation>,
    expenses: Vec<Expense>,
    dark_mode: bool,
    last_issued_id: u64,
}

impl<S: KeyValueStorage> RecordService<S> {
    /// Load the store from `storage`. Missing or corrupt entries fall back to
    /// empty collections and dark mode on.
    pub fn load(storage: S, clock: Arc<dyn Clock>) -> Self {
        let reservations: Vec<Reservation> = load_entry(&storage, RESERVATIONS_KEY).unwrap_or_default();
        let expenses: Vec<Expense> = load_entry(&storage, EXPENSES_KEY).unwrap_or_default();
        let dark_mode: bool = load_entry(&storage, DARK_MODE_KEY).unwrap_or(true);

        info!(
            "Loaded record store: {} reservations, {} expenses, dark mode {}",
            reservations.len(),
            expenses.len(),
            if dark_mode { "on" } else { "off" }
        );

        let mut service = Self {
            storage,
            clock,
            reservations,
            expenses,
            dark_mode,
            last_issued_id: 0,
        };
        service.refresh_last_issued_id();
        service
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn find_reservation(&self, id: u64) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id == id)
    }

    pub fn find_expense(&self, id: u64) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    /// Validate a draft, assign a fresh id and append it
    pub fn add_reservation(&mut self, draft: ReservationDraft) -> DomainResult<Reservation> {
        let mut reservation = reservation_from_draft(0, &draft)?;
        reservation.id = self.next_id()?;

        info!("Adding reservation {} for '{}' on {}", reservation.id, reservation.name, reservation.date);
        self.reservations.push(reservation.clone());
        self.persist_reservations();
        Ok(reservation)
    }

    /// Replace the reservation with `id` by the draft's values, keeping the id
    pub fn update_reservation(&mut self, id: u64, draft: ReservationDraft) -> DomainResult<Reservation> {
        let position = self
            .reservations
            .iter()
            .position(|r| r.id == id)
            .ok_or(DomainError::ReservationNotFound(id))?;

        let updated = reservation_from_draft(id, &draft)?;
        info!("Updating reservation {} ('{}')", id, updated.name);
        self.reservations[position] = updated.clone();
        self.persist_reservations();
        Ok(updated)
    }

    /// Remove a reservation. Returns true if it existed
    pub fn delete_reservation(&mut self, id: u64) -> bool {
        let before = self.reservations.len();
        self.reservations.retain(|r| r.id != id);
        let deleted = self.reservations.len() != before;

        if deleted {
            info!("Deleted reservation {}", id);
            self.persist_reservations();
        } else {
            debug!("Reservation {} not found, nothing deleted", id);
        }
        deleted
    }

    pub fn add_expense(&mut self, draft: ExpenseDraft) -> DomainResult<Expense> {
        let mut expense = expense_from_draft(0, &draft)?;
        expense.id = self.next_id()?;

        info!(
            "Adding expense {} '{}' ({}) on {}",
            expense.id, expense.description, expense.category, expense.date
        );
        self.expenses.push(expense.clone());
        self.persist_expenses();
        Ok(expense)
    }

    /// Remove an expense. Returns true if it existed
    pub fn delete_expense(&mut self, id: u64) -> bool {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != id);
        let deleted = self.expenses.len() != before;

        if deleted {
            info!("Deleted expense {}", id);
            self.persist_expenses();
        } else {
            debug!("Expense {} not found, nothing deleted", id);
        }
        deleted
    }

    /// Wholesale replacement of the reservation list (used by import)
    pub fn replace_reservations(&mut self, reservations: Vec<Reservation>) {
        info!("Replacing {} reservations with {}", self.reservations.len(), reservations.len());
        self.reservations = reservations;
        self.refresh_last_issued_id();
        self.persist_reservations();
    }

    /// Wholesale replacement of the expense list (used by import)
    pub fn replace_expenses(&mut self, expenses: Vec<Expense>) {
        info!("Replacing {} expenses with {}", self.expenses.len(), expenses.len());
        self.expenses = expenses;
        self.refresh_last_issued_id();
        self.persist_expenses();
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.dark_mode = enabled;
        self.persist_entry(DARK_MODE_KEY, &self.dark_mode);
    }

    /// Flip the preference and return the new value
    pub fn toggle_dark_mode(&mut self) -> bool {
        self.set_dark_mode(!self.dark_mode);
        self.dark_mode
    }

    /// Creation timestamp, bumped past the last issued id so ids stay unique
    /// and increasing even when two records are created in the same millisecond.
    fn next_id(&mut self) -> DomainResult<u64> {
        let after_last = self.last_issued_id.checked_add(1).ok_or_else(|| {
            DomainError::Validation(format!(
                "cannot assign a new id: stored records already use the largest id {}",
                self.last_issued_id
            ))
        })?;
        let id = self.clock.epoch_millis().max(after_last);
        self.last_issued_id = id;
        Ok(id)
    }

    fn refresh_last_issued_id(&mut self) {
        let max_reservation = self.reservations.iter().map(|r| r.id).max().unwrap_or(0);
        let max_expense = self.expenses.iter().map(|e| e.id).max().unwrap_or(0);
        self.last_issued_id = self.last_issued_id.max(max_reservation).max(max_expense);
    }

    fn persist_reservations(&self) {
        self.persist_entry(RESERVATIONS_KEY, &self.reservations);
    }

    fn persist_expenses(&self) {
        self.persist_entry(EXPENSES_KEY, &self.expenses);
    }

    fn persist_entry<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize '{}' for storage: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.storage.put_value(key, &json) {
            warn!("Failed to persist '{}': {}", key, e);
        }
    }
}

fn load_entry<T: DeserializeOwned, S: KeyValueStorage + ?Sized>(storage: &S, key: &str) -> Option<T> {
    let raw = match storage.get_value(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("No stored '{}', using default", key);
            return None;
        }
        Err(e) => {
            warn!("Failed to read '{}' from storage: {}. Using default", key, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Stored '{}' is corrupt ({}). Using default", key, e);
            None
        }
    }
}

/// Validate a reservation draft and build the normalized record
pub fn reservation_from_draft(id: u64, draft: &ReservationDraft) -> DomainResult<Reservation> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation("guest name must not be empty".to_string()));
    }

    let date = parse_date(&draft.date)
        .ok_or_else(|| DomainError::Validation(format!("invalid check-in date '{}'", draft.date)))?;

    let end_date = match draft.end_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let end = parse_date(raw)
                .ok_or_else(|| DomainError::Validation(format!("invalid check-out date '{}'", raw)))?;
            if end < date {
                warn!(
                    "Reservation for '{}' checks out ({}) before it checks in ({}); it will not occupy any day",
                    name, end, date
                );
            }
            Some(end.format("%Y-%m-%d").to_string())
        }
    };

    Ok(Reservation {
        id,
        name: name.to_string(),
        date: date.format("%Y-%m-%d").to_string(),
        end_date,
        value: validated_value(&draft.value)?,
        paid: draft.paid,
    })
}

/// Validate an expense draft and build the normalized record
pub fn expense_from_draft(id: u64, draft: &ExpenseDraft) -> DomainResult<Expense> {
    let description = draft.description.trim();
    if description.is_empty() {
        return Err(DomainError::Validation("description must not be empty".to_string()));
    }

    let date = parse_date(&draft.date)
        .ok_or_else(|| DomainError::Validation(format!("invalid date '{}'", draft.date)))?;

    Ok(Expense {
        id,
        description: description.to_string(),
        date: date.format("%Y-%m-%d").to_string(),
        value: validated_value(&draft.value)?,
        category: draft.category,
    })
}

fn validated_value(raw: &str) -> DomainResult<String> {
    let normalized = normalize_value(raw);
    match parse_amount(&normalized) {
        Some(amount) if amount < 0.0 => Err(DomainError::Validation(format!(
            "value must not be negative (got '{}')",
            raw.trim()
        ))),
        Some(_) => Ok(normalized),
        None => Err(DomainError::Validation(format!("invalid value '{}'", raw.trim()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::storage::InMemoryKeyValueRepository;
    use shared::ExpenseCategory;

    fn test_clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::at_date(2025, 6, 1).unwrap())
    }

    fn create_test_service() -> RecordService<InMemoryKeyValueRepository> {
        RecordService::load(InMemoryKeyValueRepository::new(), test_clock())
    }

    fn reservation_draft(name: &str, date: &str, value: &str, paid: bool) -> ReservationDraft {
        ReservationDraft {
            name: name.to_string(),
            date: date.to_string(),
            end_date: None,
            value: value.to_string(),
            paid,
        }
    }

    fn expense_draft(description: &str, date: &str, value: &str) -> ExpenseDraft {
        ExpenseDraft {
            description: description.to_string(),
            date: date.to_string(),
            value: value.to_string(),
            category: ExpenseCategory::Piscina,
        }
    }

    #[test]
    fn test_load_from_empty_storage_uses_defaults() {
        let service = create_test_service();

        assert!(service.reservations().is_empty());
        assert!(service.expenses().is_empty());
        assert!(service.dark_mode());
    }

    #[test]
    fn test_add_reservation_assigns_id_and_normalizes_value() {
        let mut service = create_test_service();

        let reservation = service
            .add_reservation(reservation_draft("  Maria ", "2025-06-10", "007", true))
            .unwrap();

        assert_eq!(reservation.id, 1748779200000);
        assert_eq!(reservation.name, "Maria");
        assert_eq!(reservation.value, "7");
        assert_eq!(service.reservations(), &[reservation]);
    }

    #[test]
    fn test_ids_stay_unique_within_the_same_millisecond() {
        let mut service = create_test_service();

        let first = service.add_reservation(reservation_draft("A", "2025-06-10", "1", true)).unwrap();
        let second = service.add_expense(expense_draft("Cloro", "2025-06-02", "50")).unwrap();
        let third = service.add_reservation(reservation_draft("B", "2025-06-11", "1", true)).unwrap();

        assert!(first.id < second.id);
        assert!(second.id < third.id);
    }

    #[test]
    fn test_empty_value_normalizes_to_zero() {
        let mut service = create_test_service();

        let reservation = service.add_reservation(reservation_draft("Ana", "2025-06-10", "", false)).unwrap();
        assert_eq!(reservation.value, "0");

        let expense = service.add_expense(expense_draft("Vassoura", "2025-06-02", "000")).unwrap();
        assert_eq!(expense.value, "0");
    }

    #[test]
    fn test_add_reservation_validation() {
        let mut service = create_test_service();

        let err = service.add_reservation(reservation_draft("  ", "2025-06-10", "10", true)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = service.add_reservation(reservation_draft("Ana", "10/06/2025", "10", true)).unwrap_err();
        assert!(err.to_string().contains("check-in date"));

        let err = service.add_reservation(reservation_draft("Ana", "2025-06-10", "abc", true)).unwrap_err();
        assert!(err.to_string().contains("invalid value"));

        let err = service.add_reservation(reservation_draft("Ana", "2025-06-10", "-5", true)).unwrap_err();
        assert!(err.to_string().contains("negative"));

        let mut draft = reservation_draft("Ana", "2025-06-10", "10", true);
        draft.end_date = Some("soon".to_string());
        assert!(service.add_reservation(draft).is_err());

        assert!(service.reservations().is_empty());
    }

    #[test]
    fn test_inverted_stay_is_accepted() {
        let mut service = create_test_service();
        let mut draft = reservation_draft("Ana", "2025-06-10", "10", true);
        draft.end_date = Some("2025-06-08".to_string());

        let reservation = service.add_reservation(draft).unwrap();
        assert_eq!(reservation.end_date.as_deref(), Some("2025-06-08"));
    }

    #[test]
    fn test_blank_end_date_is_dropped() {
        let mut service = create_test_service();
        let mut draft = reservation_draft("Ana", "2025-06-10", "10", true);
        draft.end_date = Some("  ".to_string());

        let reservation = service.add_reservation(draft).unwrap();
        assert_eq!(reservation.end_date, None);
    }

    #[test]
    fn test_update_reservation_replaces_record() {
        let mut service = create_test_service();
        let original = service.add_reservation(reservation_draft("Ana", "2025-06-10", "100", false)).unwrap();

        let mut draft = ReservationDraft::from(&original);
        draft.paid = true;
        draft.value = "0150".to_string();
        let updated = service.update_reservation(original.id, draft).unwrap();

        assert_eq!(updated.id, original.id);
        assert!(updated.paid);
        assert_eq!(updated.value, "150");
        assert_eq!(service.find_reservation(original.id), Some(&updated));
        assert_eq!(service.reservations().len(), 1);
    }

    #[test]
    fn test_update_missing_reservation_is_not_found() {
        let mut service = create_test_service();

        let err = service
            .update_reservation(42, reservation_draft("Ana", "2025-06-10", "100", false))
            .unwrap_err();
        assert!(matches!(err, DomainError::ReservationNotFound(42)));
    }

    #[test]
    fn test_delete_records() {
        let mut service = create_test_service();
        let reservation = service.add_reservation(reservation_draft("Ana", "2025-06-10", "100", false)).unwrap();
        let expense = service.add_expense(expense_draft("Cloro", "2025-06-02", "50")).unwrap();

        assert!(service.delete_reservation(reservation.id));
        assert!(!service.delete_reservation(reservation.id));
        assert!(service.delete_expense(expense.id));
        assert!(!service.delete_expense(expense.id));

        assert!(service.reservations().is_empty());
        assert!(service.expenses().is_empty());
    }

    #[test]
    fn test_mutations_are_persisted_and_reloaded() {
        let storage = InMemoryKeyValueRepository::new();
        let mut service = RecordService::load(storage.clone(), test_clock());

        service.add_reservation(reservation_draft("Ana", "2025-06-10", "100", true)).unwrap();
        service.add_expense(expense_draft("Cloro", "2025-06-02", "50")).unwrap();
        service.set_dark_mode(false);

        let reloaded = RecordService::load(storage, test_clock());
        assert_eq!(reloaded.reservations(), service.reservations());
        assert_eq!(reloaded.expenses(), service.expenses());
        assert!(!reloaded.dark_mode());
    }

    #[test]
    fn test_corrupt_entries_fall_back_to_defaults() {
        let storage = InMemoryKeyValueRepository::new()
            .with_value(RESERVATIONS_KEY, "{not json")
            .with_value(EXPENSES_KEY, "42")
            .with_value(DARK_MODE_KEY, "\"maybe\"");

        let service = RecordService::load(storage, test_clock());

        assert!(service.reservations().is_empty());
        assert!(service.expenses().is_empty());
        assert!(service.dark_mode());
    }

    #[test]
    fn test_storage_failures_do_not_surface() {
        let storage = InMemoryKeyValueRepository::new();
        storage.set_failing(true);

        let mut service = RecordService::load(storage.clone(), test_clock());
        let reservation = service.add_reservation(reservation_draft("Ana", "2025-06-10", "100", true));

        assert!(reservation.is_ok());
        assert_eq!(service.reservations().len(), 1);

        storage.set_failing(false);
        assert_eq!(storage.get_value(RESERVATIONS_KEY).unwrap(), None);
    }

    #[test]
    fn test_toggle_dark_mode() {
        let mut service = create_test_service();

        assert!(!service.toggle_dark_mode());
        assert!(service.toggle_dark_mode());
        assert_eq!(service.storage().get_value(DARK_MODE_KEY).unwrap(), Some("true".to_string()));
    }

    #[test]
    fn test_ids_continue_after_loaded_records() {
        let existing = r#"[{"id": 9999999999999, "name": "Futuro", "date": "2025-07-01", "value": "1", "paid": false}]"#;
        let storage = InMemoryKeyValueRepository::new().with_value(RESERVATIONS_KEY, existing);
        let mut service = RecordService::load(storage, test_clock());

        let expense = service.add_expense(expense_draft("Cloro", "2025-06-02", "50")).unwrap();
        assert_eq!(expense.id, 10000000000000);
    }

    #[test]
    fn test_id_space_exhausted_is_an_error() {
        let existing = format!(
            r#"[{{"id": {}, "name": "Max", "date": "2025-07-01", "value": "1", "paid": false}}]"#,
            u64::MAX
        );
        let storage = InMemoryKeyValueRepository::new().with_value(RESERVATIONS_KEY, &existing);
        let mut service = RecordService::load(storage, test_clock());

        let err = service.add_expense(expense_draft("Cloro", "2025-06-02", "50")).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(service.expenses().is_empty());

        service.replace_reservations(Vec::new());
        assert!(service.add_reservation(reservation_draft("Ana", "2025-06-10", "100", true)).is_err());
    }

    #[test]
    fn test_replace_collections() {
        let mut service = create_test_service();
        service.add_reservation(reservation_draft("Ana", "2025-06-10", "100", true)).unwrap();

        let replacement = vec![Reservation {
            id: 1,
            name: "Bia".to_string(),
            date: "2025-08-01".to_string(),
            end_date: None,
            value: "300".to_string(),
            paid: false,
        }];
        service.replace_reservations(replacement.clone());
        service.replace_expenses(Vec::new());

        assert_eq!(service.reservations(), replacement.as_slice());
        assert!(service.expenses().is_empty());
    }
}
