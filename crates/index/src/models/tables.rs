//! Rows of the final tables. Column order is fixed; `id` is a 1-based
//! sequence in each table's sort order.

use ruidex_catalog::Row;
use ruidex_catalog::models::{ObservedType, SourceKind};
use ruidex_container::models::Ruid;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRow {
    pub id: i64,
    pub name: String,
}
impl Row for TagRow {
    const HEADERS: &'static [&'static str] = &["id", "name"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTagRow {
    pub id: i64,
    pub identifier: Ruid,
    pub tag: String,
}
impl Row for AssetTagRow {
    const HEADERS: &'static [&'static str] = &["id", "identifier", "tag"];
}

/// The terminal per-identifier record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRow {
    pub id: i64,
    pub identifier: Ruid,
    pub name: String,
    pub asset_type: String,
    pub category: String,
    pub subcategory: String,
    /// Output path relative to the output root; empty for animation clips
    /// and identifiers the cache doesn't hold.
    pub path: Option<String>,
    /// Representative frame, animation clips only.
    pub thumbnail_identifier: Option<Ruid>,
    pub has_data: bool,
    pub offset_x: Option<i32>,
    pub offset_y: Option<i32>,
    pub output_subdir: String,
    pub filename: Option<String>,
    pub published_at: Option<String>,
}
impl Row for AssetRow {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "identifier",
        "name",
        "asset_type",
        "category",
        "subcategory",
        "path",
        "thumbnail_identifier",
        "has_data",
        "offset_x",
        "offset_y",
        "output_subdir",
        "filename",
        "published_at",
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationFrameRow {
    pub id: i64,
    pub clip_identifier: Ruid,
    pub frame_index: u32,
    pub frame_identifier: Ruid,
    pub duration_ms: u32,
}
impl Row for AnimationFrameRow {
    const HEADERS: &'static [&'static str] = &["id", "clip_identifier", "frame_index", "frame_identifier", "duration_ms"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheLocationRow {
    pub id: i64,
    pub identifier: Ruid,
    pub relative_path: String,
    pub format_suffix: String,
    pub observed_type: ObservedType,
    pub source_kind: SourceKind,
}
impl Row for CacheLocationRow {
    const HEADERS: &'static [&'static str] =
        &["id", "identifier", "relative_path", "format_suffix", "observed_type", "source_kind"];
}
