//! Final tables as CSV files.

use crate::assemble::Tables;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use ruidex_catalog::{Row, write_table};
use std::path::Path;
use tracing::instrument;

pub const TAGS_TABLE: &str = "tags.csv";
pub const ASSET_TAGS_TABLE: &str = "asset_tags.csv";
pub const ASSETS_TABLE: &str = "assets.csv";
pub const ANIMATION_FRAMES_TABLE: &str = "animation_frames.csv";
pub const CACHE_LOCATIONS_TABLE: &str = "cache_locations.csv";

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub tags: usize,
    pub asset_tags: usize,
    pub assets: usize,
    pub animation_frames: usize,
    pub cache_locations: usize,
}

impl Tables {
    pub fn counts(&self) -> TableCounts {
        TableCounts {
            tags: self.tags.len(),
            asset_tags: self.asset_tags.len(),
            assets: self.assets.len(),
            animation_frames: self.animation_frames.len(),
            cache_locations: self.cache_locations.len(),
        }
    }

    /// Write every table into `dir`, replacing previous versions.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn write_csv(&self, dir: impl AsRef<Path>) -> Result<TableCounts> {
        let dir = dir.as_ref();
        Ok(TableCounts {
            tags: write(dir, TAGS_TABLE, &self.tags)?,
            asset_tags: write(dir, ASSET_TAGS_TABLE, &self.asset_tags)?,
            assets: write(dir, ASSETS_TABLE, &self.assets)?,
            animation_frames: write(dir, ANIMATION_FRAMES_TABLE, &self.animation_frames)?,
            cache_locations: write(dir, CACHE_LOCATIONS_TABLE, &self.cache_locations)?,
        })
    }
}

fn write<T: Row>(dir: &Path, name: &'static str, rows: &[T]) -> Result<usize> {
    let count = write_table(dir.join(name), rows).or_raise(|| ErrorKind::Table(name))?;
    tracing::debug!(table = name, rows = count, "wrote table");
    Ok(count)
}
