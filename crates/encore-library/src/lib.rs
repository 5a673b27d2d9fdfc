pub mod adapter;
pub mod config;
pub mod export;
pub mod player;

pub use adapter::MediaLibrary;
pub use config::LibraryConfig;
pub use export::{ExportEntry, LibraryError, LibraryExport, read_export};
pub use player::CommandPlayer;
