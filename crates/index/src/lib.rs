//! The asset index.
//!
//! [`assemble`] turns the catalog, the cache listing, the decode and frame
//! step outputs, and the existence listing into five final tables. The tables
//! are written as CSV and can additionally be bulk loaded into SQLite.

mod assemble;
mod db;
pub mod error;
pub mod models;
mod repo;
mod write;

pub use crate::assemble::{AssemblyInput, Tables, assemble, thumbnail_frame};
pub use crate::db::Database;
pub use crate::repo::Repository;
pub use crate::write::{
    ANIMATION_FRAMES_TABLE, ASSET_TAGS_TABLE, ASSETS_TABLE, CACHE_LOCATIONS_TABLE, TAGS_TABLE, TableCounts,
};
