pub mod duplicate_detection;
pub mod ignored_filter;
pub mod scan_service;
pub mod sync_controller;

pub use duplicate_detection::{detect_duplicates, detect_duplicates_until};
pub use ignored_filter::apply_ignored;
pub use scan_service::{ScanReport, ScanService};
pub use sync_controller::{CancelToken, SyncController, SyncHandle};
