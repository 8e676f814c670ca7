use super::{CacheLocation, CatalogEntry, ObservedType, SourceKind};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Preference between cache variants of the same identifier; lower wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SuffixPriority {
    CompressedTexture,
    RasterContainer,
    PlainRaster,
    Other,
    /// Containers without a single image (clips, models, audio). They only
    /// win when the cache holds nothing else for the identifier.
    OpaqueContainer,
}

impl SuffixPriority {
    pub fn of(location: &CacheLocation) -> Self {
        match (location.source_kind, location.observed_type) {
            (SourceKind::Container, ObservedType::Sprite | ObservedType::AvatarItem) => Self::CompressedTexture,
            (SourceKind::Container, ObservedType::Thumbnail) => Self::RasterContainer,
            (SourceKind::Container, _) => Self::OpaqueContainer,
            (SourceKind::Raw, ObservedType::Raster) => Self::PlainRaster,
            (SourceKind::Raw, _) => Self::Other,
        }
    }
}

/// A catalog entry paired with one of its cache variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedEntry {
    pub entry: CatalogEntry,
    /// `None` when the cache holds nothing for the identifier.
    pub location: Option<CacheLocation>,
}

impl EnrichedEntry {
    /// Output path relative to the output root, when there is something to output.
    pub fn output_path(&self) -> Option<String> {
        let location = self.location.as_ref()?;
        Some(format!("{}/{}", self.entry.output_subdir, location.output_filename()))
    }

    fn rank(&self) -> (Option<SuffixPriority>, Option<&str>) {
        let location = self.location.as_ref();
        (location.map(SuffixPriority::of), location.map(|l| l.relative_path.as_str()))
    }

    /// Orders variants best first; rows without a location sort last.
    fn preference(&self, other: &Self) -> Ordering {
        match (self.rank(), other.rank()) {
            ((None, _), (None, _)) => Ordering::Equal,
            ((None, _), _) => Ordering::Greater,
            (_, (None, _)) => Ordering::Less,
            (a, b) => a.cmp(&b),
        }
    }
}

/// Left join the catalog against the cache listing, keeping every variant.
///
/// Rows follow catalog order, then cache path order within an identifier.
pub fn join(catalog: &[CatalogEntry], cache: &[CacheLocation]) -> Vec<EnrichedEntry> {
    let mut by_identifier: HashMap<_, Vec<&CacheLocation>> = HashMap::new();
    for location in cache {
        by_identifier.entry(&location.identifier).or_default().push(location);
    }
    let mut rows = Vec::new();
    for entry in catalog {
        match by_identifier.get_mut(&entry.identifier) {
            Some(locations) => {
                locations.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
                rows.extend(locations.iter().map(|location| EnrichedEntry {
                    entry: entry.clone(),
                    location: Some((*location).clone()),
                }));
            },
            None => rows.push(EnrichedEntry { entry: entry.clone(), location: None }),
        }
    }
    rows
}

/// Keep the preferred variant per `(identifier, output_subdir)`.
///
/// The result is sorted by identifier, then output directory.
pub fn dedup(rows: impl IntoIterator<Item = EnrichedEntry>) -> Vec<EnrichedEntry> {
    let mut best: BTreeMap<(String, String), EnrichedEntry> = BTreeMap::new();
    for row in rows {
        let key = (row.entry.identifier.to_string(), row.entry.output_subdir.clone());
        match best.get(&key) {
            Some(current) if current.preference(&row) != Ordering::Greater => {},
            _ => {
                best.insert(key, row);
            },
        }
    }
    best.into_values().collect()
}
