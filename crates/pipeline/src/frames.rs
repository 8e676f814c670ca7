use crate::error::{ErrorKind, Result};
use crate::pool::{Finished, Task, run_blocking};
use crate::{BatchReport, CACHE_LISTING_TABLE, FRAMES_TABLE, Outcome, Pipeline, Step};
use exn::ResultExt;
use futures::StreamExt;
use ruidex_catalog::models::{CacheLocation, dedup, join};
use ruidex_container::models::Ruid;
use ruidex_container::{AnimationLayout, FingerprintMap, resolve};
use ruidex_index::models::FrameRecord;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::instrument;

struct Clip {
    identifier: Ruid,
    layout: AnimationLayout,
    path: PathBuf,
}

impl Pipeline {
    /// Resolve the frames of every cataloged animation clip.
    ///
    /// Reads the complete fingerprint map first; clips that resolve to no
    /// frame at all are skipped.
    #[instrument(skip(self))]
    pub async fn frames(&self) -> Result<BatchReport> {
        let fingerprints = Arc::new(self.fingerprint_map()?);
        let catalog = self.read_catalog()?;
        let cache: Vec<CacheLocation> = self.read_work_table(CACHE_LISTING_TABLE)?;
        let tasks: Vec<_> = dedup(join(&catalog.entries, &cache))
            .into_iter()
            .filter_map(|row| {
                let location = row.location.filter(|l| l.observed_type.is_animation())?;
                let clip = Clip {
                    identifier: row.entry.identifier,
                    layout: AnimationLayout::for_suffix(&location.format_suffix),
                    path: self.cache_path(&location.relative_path),
                };
                Some(Task { label: location.relative_path, input: clip })
            })
            .collect();
        tracing::info!(clips = tasks.len(), fingerprints = fingerprints.len(), "resolving animation frames");

        let mut report = BatchReport::new(Step::Frames);
        let mut frames = Vec::new();
        let work = move |clip: Clip| resolve_one(clip, &fingerprints);
        let mut finished = std::pin::pin!(run_blocking(tasks, self.config.workers, work));
        while let Some(Finished { label, result }) = finished.next().await {
            match result {
                Ok(resolved) if resolved.is_empty() => {
                    tracing::debug!(path = %label, "no frame resolved, dropping clip");
                    report.record_outcome(Outcome::Skipped);
                },
                Ok(resolved) => {
                    report.record_outcome(Outcome::Done);
                    frames.extend(resolved);
                },
                Err(err) => report.record_failure(label, format!("{err:?}")),
            }
        }
        frames.sort();
        self.write_work_table(FRAMES_TABLE, &frames)?;
        Ok(report)
    }
}

fn resolve_one(clip: Clip, fingerprints: &FingerprintMap) -> Result<Vec<FrameRecord>> {
    let blob = fs::read(&clip.path).or_raise(|| ErrorKind::Read(clip.path.clone()))?;
    Ok(resolve(&clip.identifier, &blob, clip.layout, fingerprints).into_iter().map(FrameRecord::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{CLIP, SPRITE, catalog_csv, clip_container, config, sprite_container, write};
    use ruidex_catalog::read_table;
    use ruidex_container::encode_identifier;

    const EMPTY_CLIP: &str = "abababababababababababababababab";
    const MODEL: &str = "cdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcd";
    const SECOND: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    /// A model clip naming its frames explicitly.
    fn model_container(frames: &[&str]) -> Vec<u8> {
        let mut blob = vec![0u8; 24];
        blob.extend(b"[[");
        for frame in frames {
            blob.extend([0x0a, 0x79, 0x08, 0, 0]);
            blob.extend(0.1f32.to_le_bytes());
            blob.extend([0u8; 4]);
            blob.extend(encode_identifier(&frame.parse().unwrap()));
        }
        blob
    }

    #[tokio::test]
    async fn resolves_both_layouts() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(&tmp);
        let catalog = [(CLIP, "AnimationClip"), (EMPTY_CLIP, "AnimationClip"), (MODEL, "AnimationClip")];
        write(&config.catalog, catalog_csv(&catalog).as_bytes());
        write(config.cache_root.join(format!("s/{SPRITE}.mod")), &sprite_container(1));
        write(config.cache_root.join(format!("s/{SECOND}.mod")), &sprite_container(2));
        write(config.cache_root.join(format!("c/{CLIP}.animationclip.mod")), &clip_container(&[2, 1, 2]));
        write(config.cache_root.join(format!("c/{EMPTY_CLIP}.animationclip.mod")), &clip_container(&[9]));
        write(config.cache_root.join(format!("c/{MODEL}.model.mod")), &model_container(&[SECOND, SPRITE]));

        let pipeline = Pipeline::new(config);
        pipeline.list().await.unwrap();
        pipeline.fingerprint().await.unwrap();
        let report = pipeline.frames().await.unwrap();
        assert_eq!((report.succeeded, report.skipped, report.failed), (2, 1, 0));

        let frames: Vec<FrameRecord> = read_table(pipeline.work_table(FRAMES_TABLE)).unwrap();
        let summary: Vec<_> = frames
            .iter()
            .map(|f| (f.clip_identifier.as_str(), f.frame_index, f.frame_identifier.as_str(), f.duration_ms))
            .collect();
        assert_eq!(
            summary,
            vec![
                (CLIP, 0, SECOND, 40),
                (CLIP, 1, SPRITE, 40),
                (MODEL, 0, SECOND, 100),
                (MODEL, 1, SPRITE, 100),
            ]
        );
    }

    #[tokio::test]
    async fn requires_fingerprint_map() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(&tmp);
        write(&config.catalog, catalog_csv(&[(CLIP, "AnimationClip")]).as_bytes());
        let pipeline = Pipeline::new(config);
        pipeline.list().await.unwrap();
        let err = pipeline.frames().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ReadTable(path) if path.ends_with(crate::FINGERPRINTS_TABLE)));
    }
}
