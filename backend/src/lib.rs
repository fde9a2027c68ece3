//! # Sítio backend
//!
//! Domain services and storage for the vacation-rental bookkeeping tool.
//! The presentation layer (the `sitio` CLI) only talks to [`Backend`]:
//!
//! - `domain` holds the record store, the dashboard aggregator, the calendar
//!   builder and backup export/import
//! - `storage` holds the key-value slot the record store persists into
//! - `config` holds the YAML application settings

use anyhow::Result;
use log::info;
use std::path::Path;
use std::sync::Arc;

pub mod config;
pub mod domain;
pub mod storage;

pub use config::{AppConfig, ConfigRepository};
pub use storage::{InMemoryKeyValueRepository, JsonConnection, JsonKeyValueRepository, KeyValueStorage};

use domain::{CalendarService, Clock, DashboardService, ExportService, RecordService, SystemClock};

/// Main backend struct that orchestrates all services
pub struct Backend<S: KeyValueStorage> {
    pub records: RecordService<S>,
    pub dashboard_service: DashboardService,
    pub calendar_service: CalendarService,
    pub export_service: ExportService,
    pub config: AppConfig,
}

impl Backend<JsonKeyValueRepository> {
    /// Open the file-backed store in `data_dir`, creating it and its config
    /// file on first use
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        Self::open_connection(JsonConnection::new(data_dir)?)
    }

    /// Open the store in the default data directory
    pub fn open_default() -> Result<Self> {
        Self::open_connection(JsonConnection::new_default()?)
    }

    fn open_connection(connection: JsonConnection) -> Result<Self> {
        info!("Opening data directory {}", connection.base_directory().display());
        let config = ConfigRepository::new(connection.clone()).load_or_create()?;
        let storage = JsonKeyValueRepository::new(connection);
        Ok(Self::with_storage(storage, Arc::new(SystemClock), config))
    }
}

impl Backend<InMemoryKeyValueRepository> {
    /// Volatile backend with default settings
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::with_storage(InMemoryKeyValueRepository::new(), clock, AppConfig::default())
    }
}

impl<S: KeyValueStorage> Backend<S> {
    pub fn with_storage(storage: S, clock: Arc<dyn Clock>, config: AppConfig) -> Self {
        let records = RecordService::load(storage, clock.clone());
        let dashboard_service = DashboardService::new(clock.clone()).with_upcoming_limit(config.upcoming_limit);
        let calendar_service = CalendarService::new(clock.clone());
        let export_service = ExportService::new(clock);

        Backend {
            records,
            dashboard_service,
            calendar_service,
            export_service,
            config,
        }
    }
}
