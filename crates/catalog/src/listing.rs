//! The three input tables: catalog, cache listing and existence listing.

use crate::error::Result;
use crate::models::{CacheLocation, CatalogEntry, RawCatalogRow};
use crate::table::{Row, read_csv};
use crate::walk::walk_files;
use futures::StreamExt;
use ruidex_container::models::Ruid;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::instrument;

/// Catalog entries after validation and dedup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
    /// Rows dropped for an invalid identifier.
    pub invalid: usize,
    /// Rows dropped because the identifier appeared earlier.
    pub duplicates: usize,
}

/// Read the collector's catalog CSV.
///
/// Rows with a malformed identifier are discarded; for repeated identifiers
/// the first row wins.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    let rows: Vec<RawCatalogRow> = read_csv(path.as_ref())?;
    let mut catalog = Catalog::default();
    let mut seen: HashSet<Ruid> = HashSet::new();
    for row in rows {
        let Some(entry) = CatalogEntry::from_raw(row) else {
            catalog.invalid += 1;
            continue;
        };
        if !seen.insert(entry.identifier.clone()) {
            catalog.duplicates += 1;
            continue;
        }
        catalog.entries.push(entry);
    }
    if catalog.invalid > 0 {
        tracing::debug!(invalid = catalog.invalid, "discarded catalog rows with malformed identifiers");
    }
    tracing::info!(
        entries = catalog.entries.len(),
        duplicates = catalog.duplicates,
        "loaded catalog"
    );
    Ok(catalog)
}

/// Outcome of walking a tree: rows found plus directories that couldn't be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    pub rows: Vec<T>,
    pub unreadable: usize,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self { rows: Vec::new(), unreadable: 0 }
    }
}

/// Walk the cache tree and classify every file that belongs to an identifier.
///
/// Rows are sorted by relative path.
#[instrument(skip_all, fields(root = %root.as_ref().display()))]
pub async fn cache_listing(root: impl AsRef<Path>) -> Listing<CacheLocation> {
    let mut listing = Listing::default();
    let mut files = std::pin::pin!(walk_files(root.as_ref()));
    while let Some(file) = files.next().await {
        match file {
            Ok(path) => listing.rows.extend(CacheLocation::from_relative_path(path)),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable part of the cache tree");
                listing.unreadable += 1;
            },
        }
    }
    listing.rows.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    listing
}

/// A file already present in the output tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExistingFile {
    /// Path relative to the output root, forward slashes.
    pub path: String,
}

impl Row for ExistingFile {
    const HEADERS: &'static [&'static str] = &["path"];
}

/// Walk the output tree and list every file in it, sorted.
#[instrument(skip_all, fields(root = %root.as_ref().display()))]
pub async fn existence_listing(root: impl AsRef<Path>) -> Listing<ExistingFile> {
    let mut listing = Listing::default();
    let mut files = std::pin::pin!(walk_files(root.as_ref()));
    while let Some(file) = files.next().await {
        match file {
            Ok(path) => listing.rows.push(ExistingFile { path }),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable part of the output tree");
                listing.unreadable += 1;
            },
        }
    }
    listing.rows.sort();
    listing
}
