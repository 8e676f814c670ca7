//! Joins every per-identifier fact into the final tables.
//!
//! Pure and deterministic: identical inputs always give identical tables,
//! whatever order the inputs arrive in.

use crate::models::{
    AnimationFrameRow, AssetRow, AssetTagRow, CacheLocationRow, FrameRecord, PlacementRecord, TagRow,
};
use ruidex_catalog::ExistingFile;
use ruidex_catalog::models::{CacheLocation, CatalogEntry, DeclaredType, EnrichedEntry, dedup, join};
use ruidex_container::models::{Placement, Ruid};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::instrument;

/// Everything the assembler reads.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyInput<'a> {
    pub catalog: &'a [CatalogEntry],
    pub cache: &'a [CacheLocation],
    pub placements: &'a [PlacementRecord],
    pub frames: &'a [FrameRecord],
    pub existing: &'a [ExistingFile],
}

/// The final tables, each sorted and numbered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tables {
    pub tags: Vec<TagRow>,
    pub asset_tags: Vec<AssetTagRow>,
    pub assets: Vec<AssetRow>,
    pub animation_frames: Vec<AnimationFrameRow>,
    pub cache_locations: Vec<CacheLocationRow>,
}

/// Which output files exist, by full relative path and by file name.
struct Existence<'a> {
    paths: HashSet<&'a str>,
    names: HashSet<&'a str>,
}

impl<'a> Existence<'a> {
    fn new(existing: &'a [ExistingFile]) -> Self {
        let paths: HashSet<&str> = existing.iter().map(|f| f.path.as_str()).collect();
        let names = paths.iter().copied().map(|p| p.rsplit('/').next().unwrap_or(p)).collect();
        Self { paths, names }
    }

    fn has_path(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// A frame counts as extracted when its image exists in any directory.
    fn has_frame(&self, frame: &Ruid) -> bool {
        self.names.contains(format!("{frame}.png").as_str())
    }
}

/// Frames of each clip, in frame order.
fn clips(frames: &[FrameRecord]) -> BTreeMap<&Ruid, Vec<&FrameRecord>> {
    let mut clips: BTreeMap<&Ruid, Vec<&FrameRecord>> = BTreeMap::new();
    for frame in frames {
        clips.entry(&frame.clip_identifier).or_default().push(frame);
    }
    for frames in clips.values_mut() {
        frames.sort_by_key(|f| f.frame_index);
    }
    clips
}

fn is_animation(row: &EnrichedEntry) -> bool {
    row.entry.declared_type == DeclaredType::AnimationClip
        || row.location.as_ref().is_some_and(|l| l.observed_type.is_animation())
}

/// Representative frame of a clip: the middle one by position.
pub fn thumbnail_frame<'a>(frames: &[&'a FrameRecord]) -> Option<&'a FrameRecord> {
    frames.get(frames.len() / 2).copied()
}

#[instrument(skip_all, fields(catalog = input.catalog.len(), cache = input.cache.len()))]
pub fn assemble(input: AssemblyInput<'_>) -> Tables {
    let existence = Existence::new(input.existing);
    let clips = clips(input.frames);
    let placements: HashMap<&Ruid, Placement> =
        input.placements.iter().map(|p| (&p.identifier, p.placement())).collect();
    let rows = dedup(join(input.catalog, input.cache));

    let mut assets = Vec::with_capacity(rows.len());
    for (row, id) in rows.iter().zip(1..) {
        let entry = &row.entry;
        let (path, filename, thumbnail, has_data, placement) = if is_animation(row) {
            let frames = clips.get(&entry.identifier).map(Vec::as_slice).unwrap_or_default();
            let thumbnail = thumbnail_frame(frames).map(|f| f.frame_identifier.clone());
            let has_data = !frames.is_empty() && frames.iter().all(|f| existence.has_frame(&f.frame_identifier));
            let placement = thumbnail.as_ref().and_then(|t| placements.get(t)).copied();
            (None, None, thumbnail, has_data, placement)
        } else {
            let path = row.output_path();
            let has_data = path.as_deref().is_some_and(|p| existence.has_path(p));
            let filename = row.location.as_ref().map(CacheLocation::output_filename);
            (path, filename, None, has_data, placements.get(&entry.identifier).copied())
        };
        assets.push(AssetRow {
            id,
            identifier: entry.identifier.clone(),
            name: entry.identifier.to_string(),
            asset_type: entry.declared_type.as_str().to_string(),
            category: entry.category.clone(),
            subcategory: entry.subcategory.clone(),
            path,
            thumbnail_identifier: thumbnail,
            has_data,
            offset_x: placement.map(|p| p.offset_x),
            offset_y: placement.map(|p| p.offset_y),
            output_subdir: entry.output_subdir.clone(),
            filename,
            published_at: entry.published_at.clone(),
        });
    }

    let memberships: BTreeSet<(&Ruid, &str)> = rows
        .iter()
        .flat_map(|row| row.entry.tags.iter().map(move |tag| (&row.entry.identifier, tag.as_str())))
        .collect();
    let names: BTreeSet<&str> = memberships.iter().map(|(_, tag)| *tag).collect();
    let tags = names.into_iter().zip(1..).map(|(name, id)| TagRow { id, name: name.to_string() }).collect();
    let asset_tags = memberships
        .into_iter()
        .zip(1..)
        .map(|((identifier, tag), id)| AssetTagRow { id, identifier: identifier.clone(), tag: tag.to_string() })
        .collect();

    let cataloged: HashSet<&Ruid> = input.catalog.iter().map(|e| &e.identifier).collect();
    let animation_frames = clips
        .iter()
        .filter(|(clip, _)| cataloged.contains(*clip))
        .flat_map(|(_, frames)| frames.iter())
        .zip(1..)
        .map(|(frame, id)| AnimationFrameRow {
            id,
            clip_identifier: frame.clip_identifier.clone(),
            frame_index: frame.frame_index,
            frame_identifier: frame.frame_identifier.clone(),
            duration_ms: frame.duration_ms,
        })
        .collect();

    let mut locations: Vec<&CacheLocation> =
        input.cache.iter().filter(|l| cataloged.contains(&l.identifier)).collect();
    locations.sort_by(|a, b| (&a.identifier, &a.relative_path).cmp(&(&b.identifier, &b.relative_path)));
    let cache_locations = locations
        .into_iter()
        .zip(1..)
        .map(|(location, id)| CacheLocationRow {
            id,
            identifier: location.identifier.clone(),
            relative_path: location.relative_path.clone(),
            format_suffix: location.format_suffix.clone(),
            observed_type: location.observed_type,
            source_kind: location.source_kind,
        })
        .collect();

    let tables = Tables { tags, asset_tags, assets, animation_frames, cache_locations };
    tracing::info!(
        assets = tables.assets.len(),
        complete = tables.assets.iter().filter(|a| a.has_data).count(),
        frames = tables.animation_frames.len(),
        tags = tables.tags.len(),
        "assembled asset index"
    );
    tables
}
