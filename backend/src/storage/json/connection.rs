use anyhow::Result;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Environment variable overriding the default data directory
pub const DATA_DIR_ENV: &str = "SITIO_DATA_DIR";

/// JsonConnection manages the data directory holding one JSON file per key
#[derive(Clone, Debug)]
pub struct JsonConnection {
    base_directory: Arc<Mutex<PathBuf>>,
}

impl JsonConnection {
    /// Create a new connection rooted at `base_directory`, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: Arc::new(Mutex::new(base_path)),
        })
    }

    /// Create a connection in the default data directory.
    ///
    /// Resolution order: `SITIO_DATA_DIR`, the platform data directory
    /// (`~/.local/share/sitio` on Linux), then `./sitio-data`.
    pub fn new_default() -> Result<Self> {
        Self::new(Self::default_data_directory())
    }

    pub fn default_data_directory() -> PathBuf {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            let dir = dir.trim();
            if !dir.is_empty() {
                info!("Using data directory from {}: {}", DATA_DIR_ENV, dir);
                return PathBuf::from(dir);
            }
        }

        match dirs::data_dir() {
            Some(data_dir) => data_dir.join("sitio"),
            None => {
                warn!("Could not determine platform data directory, using ./sitio-data");
                PathBuf::from("sitio-data")
            }
        }
    }

    /// Get the base directory path
    pub fn base_directory(&self) -> PathBuf {
        match self.base_directory.lock() {
            Ok(base_dir) => base_dir.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Path of the file backing `key`
    pub fn key_file_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return Err(anyhow::anyhow!("Invalid storage key: '{}'", key));
        }
        Ok(self.base_directory().join(format!("{}.json", key)))
    }

    /// Ensure the base directory exists (it may have been removed while running)
    pub fn ensure_base_directory(&self) -> Result<PathBuf> {
        let base_dir = self.base_directory();
        if !base_dir.exists() {
            fs::create_dir_all(&base_dir)?;
            info!("Re-created data directory: {}", base_dir.display());
        }
        Ok(base_dir)
    }
}
