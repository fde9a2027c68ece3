//! In-memory key-value slot. Nothing survives the process; a failing mode can
//! be switched on to exercise the best-effort persistence paths.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::traits::KeyValueStorage;

#[derive(Clone, Debug, Default)]
pub struct InMemoryKeyValueRepository {
    values: Arc<Mutex<HashMap<String, String>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryKeyValueRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the slot, e.g. with a corrupt entry
    pub fn with_value(self, key: &str, value: &str) -> Self {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        self
    }

    /// Make every subsequent operation return an error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("storage unavailable"));
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("in-memory storage lock poisoned"))
    }
}

impl KeyValueStorage for InMemoryKeyValueRepository {
    fn get_value(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self.lock()?.get(key).cloned())
    }

    fn put_value(&self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get() {
        let repo = InMemoryKeyValueRepository::new();

        assert_eq!(repo.get_value("expenses").unwrap(), None);
        repo.put_value("expenses", "[]").unwrap();
        assert_eq!(repo.get_value("expenses").unwrap(), Some("[]".to_string()));
        repo.put_value("expenses", "[{\"id\":1}]").unwrap();
        assert_eq!(repo.get_value("expenses").unwrap(), Some("[{\"id\":1}]".to_string()));
    }

    #[test]
    fn test_clones_share_state() {
        let repo = InMemoryKeyValueRepository::new().with_value("darkMode", "true");
        let clone = repo.clone();

        clone.put_value("darkMode", "false").unwrap();
        assert_eq!(repo.get_value("darkMode").unwrap(), Some("false".to_string()));
    }

    #[test]
    fn test_failing_mode() {
        let repo = InMemoryKeyValueRepository::new();
        repo.set_failing(true);

        assert!(repo.get_value("expenses").is_err());
        assert!(repo.put_value("expenses", "[]").is_err());

        repo.set_failing(false);
        assert!(repo.put_value("expenses", "[]").is_ok());
    }
}
