use crate::error::{ErrorKind, Result};
use crate::pool::{Finished, Task, run_blocking};
use crate::{BatchReport, CACHE_LISTING_TABLE, FINGERPRINTS_TABLE, Outcome, Pipeline, Step};
use exn::ResultExt;
use futures::StreamExt;
use ruidex_catalog::Row;
use ruidex_catalog::models::{CacheLocation, ObservedType, SourceKind};
use ruidex_container::models::{Fingerprint, Ruid};
use ruidex_container::{FingerprintMap, read_fingerprint};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::instrument;

/// Format suffixes of containers that get fingerprinted.
const FINGERPRINTED_SUFFIXES: [&str; 2] = ["mod", "sprite"];

/// One entry of the persisted fingerprint map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintRow {
    pub fingerprint: Fingerprint,
    pub identifier: Ruid,
}

impl Row for FingerprintRow {
    const HEADERS: &'static [&'static str] = &["fingerprint", "identifier"];
}

fn is_fingerprinted(location: &CacheLocation) -> bool {
    location.source_kind == SourceKind::Container
        && location.observed_type == ObservedType::Sprite
        && FINGERPRINTED_SUFFIXES.contains(&location.format_suffix.as_str())
}

impl Pipeline {
    /// Fingerprint every sprite container in the cache, cataloged or not.
    ///
    /// Containers too short to fingerprint are skipped.
    #[instrument(skip(self))]
    pub async fn fingerprint(&self) -> Result<BatchReport> {
        let cache: Vec<CacheLocation> = self.read_work_table(CACHE_LISTING_TABLE)?;
        let tasks: Vec<_> = cache
            .into_iter()
            .filter(is_fingerprinted)
            .map(|location| Task {
                input: (self.cache_path(&location.relative_path), location.identifier),
                label: location.relative_path,
            })
            .collect();

        let mut report = BatchReport::new(Step::Fingerprint);
        let mut entries = Vec::with_capacity(tasks.len());
        let mut finished = std::pin::pin!(run_blocking(tasks, self.config.workers, fingerprint_one));
        while let Some(Finished { label, result }) = finished.next().await {
            match result {
                Ok(Some((fingerprint, identifier))) => {
                    report.record_outcome(Outcome::Done);
                    entries.push((label, fingerprint, identifier));
                },
                Ok(None) => report.record_outcome(Outcome::Skipped),
                Err(err) => report.record_failure(label, format!("{err:?}")),
            }
        }

        // Completion order is arbitrary; `build` sorts by path first.
        let fingerprinted = entries.len();
        let map = FingerprintMap::build(entries);
        if map.len() < fingerprinted {
            tracing::debug!(collisions = fingerprinted - map.len(), "fingerprint collisions, first path wins");
        }
        let rows: Vec<_> = map
            .iter()
            .map(|(fingerprint, identifier)| FingerprintRow { fingerprint: *fingerprint, identifier: identifier.clone() })
            .collect();
        self.write_work_table(FINGERPRINTS_TABLE, &rows)?;
        Ok(report)
    }

    /// Load the complete fingerprint map written by [`fingerprint`](Self::fingerprint).
    pub(crate) fn fingerprint_map(&self) -> Result<FingerprintMap> {
        let rows: Vec<FingerprintRow> = self.read_work_table(FINGERPRINTS_TABLE)?;
        Ok(rows.into_iter().map(|row| (row.fingerprint, row.identifier)).collect())
    }
}

fn fingerprint_one((path, identifier): (PathBuf, Ruid)) -> Result<Option<(Fingerprint, Ruid)>> {
    let fingerprint = read_fingerprint(&path).or_raise(|| ErrorKind::Read(path.clone()))?;
    Ok(fingerprint.map(|fingerprint| (fingerprint, identifier)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{BROKEN, SPRITE, config, sprite_container, write};

    const TWIN: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
    const SHORT: &str = "ffffffffffffffffffffffffffffffff";

    #[tokio::test]
    async fn builds_map_from_sprite_containers() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(&tmp);
        write(config.cache_root.join(format!("b/{SPRITE}.sprite.mod")), &sprite_container(1));
        // Same fingerprint under a later path: loses.
        write(config.cache_root.join(format!("c/{TWIN}.mod")), &sprite_container(1));
        write(config.cache_root.join(format!("a/{BROKEN}.mod")), &sprite_container(2));
        write(config.cache_root.join(format!("a/{SHORT}.mod")), &[7u8; 10]);
        // Not a sprite container.
        write(config.cache_root.join(format!("a/{SPRITE}.animationclip.mod")), &sprite_container(3));

        let pipeline = Pipeline::new(config);
        pipeline.list().await.unwrap();
        let report = pipeline.fingerprint().await.unwrap();
        assert_eq!((report.succeeded, report.skipped, report.failed), (3, 1, 0));

        let map = pipeline.fingerprint_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&Fingerprint::new([1; 16])).map(Ruid::as_str), Some(SPRITE));
        assert_eq!(map.get(&Fingerprint::new([2; 16])).map(Ruid::as_str), Some(BROKEN));
        assert_eq!(map.get(&Fingerprint::new([3; 16])), None);
    }

    #[tokio::test]
    async fn unreadable_container_is_counted() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(&tmp);
        write(config.cache_root.join(format!("{SPRITE}.mod")), &sprite_container(1));
        let pipeline = Pipeline::new(config.clone());
        pipeline.list().await.unwrap();
        std::fs::remove_file(config.cache_root.join(format!("{SPRITE}.mod"))).unwrap();

        let report = pipeline.fingerprint().await.unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.first_failure.unwrap().path, format!("{SPRITE}.mod"));
        assert!(pipeline.fingerprint_map().unwrap().is_empty());
    }
}
