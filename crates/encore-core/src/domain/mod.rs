pub mod duplicate_group;
pub mod group_key;
pub mod ids;
pub mod sync_job;
pub mod track;

pub use duplicate_group::DuplicateGroup;
pub use group_key::GroupKey;
pub use ids::{JobId, ScanId, TrackId};
pub use sync_job::{SyncJob, SyncMode, SyncPlan, SyncSnapshot, SyncState, SyncSummary};
pub use track::{CatalogSnapshot, TrackRecord};
