//! # JSON Key-Value Repository
//!
//! File-based implementation of the durable key-value slot. Each key maps to
//! one file in the data directory:
//!
//! ```text
//! data/
//! ├── config.yaml
//! ├── reservations.json
//! ├── expenses.json
//! └── darkMode.json
//! ```
//!
//! Writes go to a temp file first and are then renamed over the target, so a
//! crash never leaves a half-written collection behind.

use anyhow::Result;
use log::debug;
use std::fs;

use super::connection::JsonConnection;
use crate::storage::traits::KeyValueStorage;

#[derive(Clone, Debug)]
pub struct JsonKeyValueRepository {
    connection: JsonConnection,
}

impl JsonKeyValueRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

impl KeyValueStorage for JsonKeyValueRepository {
    fn get_value(&self, key: &str) -> Result<Option<String>> {
        let path = self.connection.key_file_path(key)?;
        if !path.exists() {
            debug!("No stored value for '{}' at {:?}", key, path);
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        debug!("Loaded '{}' ({} bytes) from {:?}", key, content.len(), path);
        Ok(Some(content))
    }

    fn put_value(&self, key: &str, value: &str) -> Result<()> {
        self.connection.ensure_base_directory()?;
        let path = self.connection.key_file_path(key)?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value)?;
        fs::rename(&temp_path, &path)?;

        debug!("Saved '{}' ({} bytes) to {:?}", key, value.len(), path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_repo() -> (JsonKeyValueRepository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection = JsonConnection::new(temp_dir.path()).expect("Failed to create connection");
        (JsonKeyValueRepository::new(connection), temp_dir)
    }

    #[test]
    fn test_get_missing_key_returns_none() {
        let (repo, _temp_dir) = setup_test_repo();
        assert_eq!(repo.get_value("reservations").unwrap(), None);
    }

    #[test]
    fn test_put_then_get() {
        let (repo, temp_dir) = setup_test_repo();

        repo.put_value("darkMode", "false").unwrap();

        assert_eq!(repo.get_value("darkMode").unwrap(), Some("false".to_string()));
        assert!(temp_dir.path().join("darkMode.json").exists());
        assert!(!temp_dir.path().join("darkMode.json.tmp").exists());
    }

    #[test]
    fn test_put_overwrites_previous_value() {
        let (repo, _temp_dir) = setup_test_repo();

        repo.put_value("expenses", "[]").unwrap();
        repo.put_value("expenses", "[{\"id\":1}]").unwrap();

        assert_eq!(repo.get_value("expenses").unwrap(), Some("[{\"id\":1}]".to_string()));
    }

    #[test]
    fn test_values_persist_across_instances() {
        let (repo, temp_dir) = setup_test_repo();
        repo.put_value("reservations", "[]").unwrap();

        // Simulate an application restart
        let connection = JsonConnection::new(temp_dir.path()).unwrap();
        let repo2 = JsonKeyValueRepository::new(connection);

        assert_eq!(repo2.get_value("reservations").unwrap(), Some("[]".to_string()));
    }

    #[test]
    fn test_put_recreates_removed_directory() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("data");
        let repo = JsonKeyValueRepository::new(JsonConnection::new(&data_dir).unwrap());

        fs::remove_dir_all(&data_dir).unwrap();
        repo.put_value("darkMode", "true").unwrap();

        assert_eq!(repo.get_value("darkMode").unwrap(), Some("true".to_string()));
    }
}
