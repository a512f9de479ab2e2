//! Schematic Viewer Library
//!
//! This library provides the state engine behind the schematic viewer: board
//! data loading, component filtering by category and region, pan/zoom view
//! transforms, and highlight composition for the live view and thumbnails.

pub mod compose;
pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod index;
pub mod loader;
pub mod metadata;
pub mod settings;
pub mod sync;
pub mod thumbnail;
pub mod view;

// Re-export commonly used types
pub use config::ViewerConfig;
pub use data::{reader::CsvBoardSource, BoardData, BoardKey, BoardSource, Catalog};
pub use error::{Result, ViewerError};
pub use geometry::{Affine, Point, Rect, Size};
pub use index::HighlightIndex;
pub use settings::{JsonFileStore, MemoryStore, SettingsStore};
pub use sync::{HoverHit, SelectionSync, SyncEvent};
pub use view::{ViewTransform, ZoomDirection, ZoomOutcome};
