use crate::error::{ErrorKind, Result};
use crate::pool::{Finished, Task, run_blocking};
use crate::{BatchReport, CACHE_LISTING_TABLE, Outcome, PLACEMENTS_TABLE, Pipeline, Step, THUMBS_DIR};
use exn::ResultExt;
use futures::StreamExt;
use ruidex_catalog::models::{CacheLocation, EnrichedEntry, ObservedType, SourceKind, dedup, join};
use ruidex_config::OutputMode;
use ruidex_container::models::Ruid;
use ruidex_container::{ContainerImage, ImageHeader, PayloadLayout, decode, inspect};
use ruidex_index::models::PlacementRecord;
use std::fs;
use std::path::PathBuf;
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Container(PayloadLayout),
    Raster,
    Audio,
}

impl Source {
    fn of(location: &CacheLocation) -> Option<Self> {
        match (location.source_kind, location.observed_type) {
            (SourceKind::Container, ObservedType::AvatarItem) => Some(Self::Container(PayloadLayout::AvatarItem)),
            (SourceKind::Container, ObservedType::Thumbnail) => Some(Self::Container(PayloadLayout::Thumbnail)),
            (SourceKind::Container, observed) if observed.is_image() => Some(Self::Container(PayloadLayout::Sprite)),
            (SourceKind::Raw, ObservedType::Raster) => Some(Self::Raster),
            (SourceKind::Raw, ObservedType::Audio) => Some(Self::Audio),
            _ => None,
        }
    }
}

struct Job {
    identifier: Ruid,
    source: Source,
    input: PathBuf,
    output: PathBuf,
    thumbnail: PathBuf,
    mode: OutputMode,
    thumbnail_size: u32,
}

struct Decoded {
    outcome: Outcome,
    placement: Option<PlacementRecord>,
}

impl Pipeline {
    /// Decode every cataloged single-image identifier to PNG and copy raw
    /// audio across, then record each image's placement.
    #[instrument(skip(self))]
    pub async fn decode(&self) -> Result<BatchReport> {
        let catalog = self.read_catalog()?;
        let cache: Vec<CacheLocation> = self.read_work_table(CACHE_LISTING_TABLE)?;
        let tasks: Vec<_> =
            dedup(join(&catalog.entries, &cache)).into_iter().filter_map(|row| self.decode_task(row)).collect();
        tracing::info!(items = tasks.len(), workers = self.config.workers, "decoding");

        let mut report = BatchReport::new(Step::Decode);
        let mut placements = Vec::new();
        let mut finished = std::pin::pin!(run_blocking(tasks, self.config.workers, decode_one));
        while let Some(Finished { label, result }) = finished.next().await {
            match result {
                Ok(decoded) => {
                    report.record_outcome(decoded.outcome);
                    placements.extend(decoded.placement);
                },
                Err(err) => {
                    tracing::debug!(path = %label, error = ?err, "failed to decode");
                    report.record_failure(label, format!("{err:?}"));
                },
            }
        }
        placements.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        self.write_work_table(PLACEMENTS_TABLE, &placements)?;
        Ok(report)
    }

    fn decode_task(&self, row: EnrichedEntry) -> Option<Task<Job>> {
        let output = self.output_path(row.output_path()?);
        let location = row.location?;
        let source = Source::of(&location)?;
        let identifier = row.entry.identifier;
        let job = Job {
            source,
            input: self.cache_path(&location.relative_path),
            output,
            thumbnail: self.output_path(format!("{THUMBS_DIR}/{identifier}.png")),
            identifier,
            mode: self.config.mode,
            thumbnail_size: self.config.thumbnail_size,
        };
        Some(Task { label: location.relative_path, input: job })
    }
}

fn decode_one(job: Job) -> Result<Decoded> {
    let skip = job.mode == OutputMode::Skip;
    if job.source == Source::Audio {
        if skip && job.output.is_file() {
            return Ok(Decoded { outcome: Outcome::Skipped, placement: None });
        }
        if let Some(parent) = job.output.parent() {
            fs::create_dir_all(parent).or_raise(|| ErrorKind::Write(job.output.clone()))?;
        }
        fs::copy(&job.input, &job.output).or_raise(|| ErrorKind::Write(job.output.clone()))?;
        return Ok(Decoded { outcome: Outcome::Done, placement: None });
    }

    let blob = fs::read(&job.input).or_raise(|| ErrorKind::Read(job.input.clone()))?;
    if skip && job.output.is_file() && job.thumbnail.is_file() {
        // Still read the header so the placement table stays complete.
        let header: ImageHeader = match job.source {
            Source::Container(layout) => inspect(&blob, layout),
            _ => ContainerImage::from_raster(blob).map(|image| *image.header()),
        }
        .or_raise(|| ErrorKind::Container)?;
        let placement = PlacementRecord::new(job.identifier, &header);
        return Ok(Decoded { outcome: Outcome::Skipped, placement: Some(placement) });
    }

    let image = match job.source {
        Source::Container(layout) => decode(&blob, layout),
        _ => ContainerImage::from_raster(blob),
    }
    .or_raise(|| ErrorKind::Container)?;
    image.write_png(&job.output).or_raise(|| ErrorKind::Write(job.output.clone()))?;
    image
        .write_thumbnail(&job.thumbnail, job.thumbnail_size)
        .or_raise(|| ErrorKind::Write(job.thumbnail.clone()))?;
    let placement = PlacementRecord::new(job.identifier, image.header());
    Ok(Decoded { outcome: Outcome::Done, placement: Some(placement) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{BROKEN, SPRITE, catalog_csv, config, sprite_container, write};
    use ruidex_catalog::read_table;
    use tempfile::TempDir;

    const AUDIO: &str = "eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";

    async fn fixture(tmp: &TempDir) -> Pipeline {
        let config = config(tmp);
        write(&config.catalog, catalog_csv(&[(SPRITE, "Sprite"), (BROKEN, "Sprite"), (AUDIO, "AudioClip")]).as_bytes());
        write(config.cache_root.join(format!("s/{SPRITE}.sprite.mod")), &sprite_container(1));
        write(config.cache_root.join(format!("s/{BROKEN}.sprite.mod")), &[0u8; 64]);
        write(config.cache_root.join(format!("a/{AUDIO}.ogg")), b"OggS");
        write(config.cache_root.join(format!("a/{AUDIO}.audioclip.mod")), &[0u8; 32]);
        let pipeline = Pipeline::new(config);
        pipeline.list().await.unwrap();
        pipeline
    }

    fn placements(pipeline: &Pipeline) -> Vec<PlacementRecord> {
        read_table(pipeline.work_table(PLACEMENTS_TABLE)).unwrap()
    }

    #[tokio::test]
    async fn decodes_and_counts_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let pipeline = fixture(&tmp).await;
        let report = pipeline.decode().await.unwrap();
        assert_eq!((report.succeeded, report.skipped, report.failed), (2, 0, 1));
        assert_eq!(report.first_failure.unwrap().path, format!("s/{BROKEN}.sprite.mod"));

        let output = &pipeline.config().output_root;
        assert!(output.join(format!("Sprite/{SPRITE}.png")).is_file());
        assert!(output.join(format!("{THUMBS_DIR}/{SPRITE}.png")).is_file());
        assert_eq!(fs::read(output.join(format!("AudioClip/{AUDIO}.ogg"))).unwrap(), b"OggS");

        let placements = placements(&pipeline);
        assert_eq!(placements.len(), 1);
        assert_eq!((placements[0].width, placements[0].height), (8, 8));
        assert_eq!((placements[0].offset_x, placements[0].offset_y), (-4, -4));
        assert_eq!(placements[0].pivot_x, None);
    }

    #[tokio::test]
    async fn skip_mode_keeps_outputs_and_placements() {
        let tmp = tempfile::tempdir().unwrap();
        let pipeline = fixture(&tmp).await;
        pipeline.decode().await.unwrap();
        let first = placements(&pipeline);

        let report = pipeline.decode().await.unwrap();
        assert_eq!((report.succeeded, report.skipped, report.failed), (0, 2, 1));
        assert_eq!(placements(&pipeline), first);
    }

    #[tokio::test]
    async fn overwrite_mode_rewrites_outputs() {
        let tmp = tempfile::tempdir().unwrap();
        let pipeline = fixture(&tmp).await;
        pipeline.decode().await.unwrap();

        let mut config = pipeline.config().clone();
        config.mode = OutputMode::Overwrite;
        let report = Pipeline::new(config).decode().await.unwrap();
        assert_eq!((report.succeeded, report.skipped, report.failed), (2, 0, 1));
    }

    #[tokio::test]
    async fn requires_cache_listing() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(&tmp);
        write(&config.catalog, catalog_csv(&[(SPRITE, "Sprite")]).as_bytes());
        let err = Pipeline::new(config).decode().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ReadTable(_)));
    }
}
