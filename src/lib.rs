//! Linesight: factory-floor line telemetry backend.
//!
//! Generates per-line sensor readings and fault events, classifies readings
//! against per-line thresholds, and aggregates both into line overviews and
//! shift summaries behind a REST API.
//!
//! ## Architecture
//!
//! - **detection**: pure threshold classification for sensor readings
//! - **shifts**: the fixed-zone shift calendar and query windows
//! - **store**: the in-memory telemetry dataset and its mutations
//! - **aggregate**: derived overview and shift-summary views
//! - **generator**: seeded synthetic dataset builder
//! - **api**: axum transport with the dashboard envelope
//! - **config**: TOML runtime settings with validation

pub mod aggregate;
pub mod api;
pub mod config;
pub mod detection;
pub mod generator;
pub mod shifts;
pub mod store;
pub mod types;

// Re-export the transport entry points
pub use api::{create_app, DashboardState};

// Re-export commonly used core pieces
pub use config::AppConfig;
pub use detection::{classify, detect_anomalies};
pub use generator::{build_dataset, GeneratorSettings};
pub use shifts::{ShiftCalendar, ShiftWindow};
pub use store::{Dataset, FaultFilter, TelemetryError, TelemetryStore};
pub use types::{
    FaultCategory, FaultEvent, FaultSeverity, LineOverview, LineStatus, LineThresholds,
    MetricAnomaly, MetricKey, MetricThreshold, SensorPoint, Severity, ShiftName, ShiftSummary,
    ThresholdConfig, TimeWindow,
};
