pub mod catalog;
pub mod ignored;
pub mod playback;
pub mod progress;

pub use catalog::{CatalogError, CatalogProvider};
pub use ignored::{IgnoredItems, NothingIgnored};
pub use playback::{PlaybackDevice, PlaybackError};
pub use progress::{ProgressReporter, SilentReporter};
