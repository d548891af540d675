//! Ingestion progress tracking.
//!
//! Provides an [`IngestionTracker`] that follows the backend's stage
//! notifications for the current upload and closes itself once the pipeline
//! finishes.

pub mod tracker;

pub use tracker::{DEFAULT_COMPLETION_GRACE, IngestionTracker, TrackerConfig};
