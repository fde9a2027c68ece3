//! Domain layer for the bookkeeping tool.
//!
//! Services own the business rules and are storage-agnostic: the record
//! service talks to a `KeyValueStorage`, everything else derives views from
//! the slices it is handed.

pub mod calendar;
pub mod clock;
pub mod dashboard;
pub mod errors;
pub mod export_service;
pub mod record_service;
pub mod value;

pub use calendar::CalendarService;
pub use clock::{Clock, FixedClock, SystemClock};
pub use dashboard::DashboardService;
pub use errors::{DomainError, DomainResult};
pub use export_service::{ExportService, ImportPayload};
pub use record_service::RecordService;
