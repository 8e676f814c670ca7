use crate::error::{ErrorKind, Result};
use crate::{BatchReport, CACHE_LISTING_TABLE, FRAMES_TABLE, Outcome, PLACEMENTS_TABLE, Pipeline, Step};
use exn::ResultExt;
use ruidex_catalog::models::CacheLocation;
use ruidex_index::models::{FrameRecord, PlacementRecord};
use ruidex_index::{AssemblyInput, Database, Tables, assemble};
use tracing::instrument;

impl Pipeline {
    /// Build the final tables from the catalog, every intermediate table and
    /// a fresh existence listing, then write them out.
    ///
    /// Complete assets count as succeeded, incomplete ones as skipped.
    #[instrument(skip(self))]
    pub async fn assemble(&self) -> Result<BatchReport> {
        let catalog = self.read_catalog()?;
        let cache: Vec<CacheLocation> = self.read_work_table(CACHE_LISTING_TABLE)?;
        let placements: Vec<PlacementRecord> = self.read_work_table(PLACEMENTS_TABLE)?;
        let frames: Vec<FrameRecord> = self.read_work_table(FRAMES_TABLE)?;
        let existing = self.existence().await?;

        let tables = assemble(AssemblyInput {
            catalog: &catalog.entries,
            cache: &cache,
            placements: &placements,
            frames: &frames,
            existing: &existing.rows,
        });
        let tables_dir = self.config.tables_dir();
        let counts = tables.write_csv(&tables_dir).or_raise(|| ErrorKind::Index)?;
        tracing::info!(
            dir = %tables_dir.display(),
            assets = counts.assets,
            tags = counts.tags,
            frames = counts.animation_frames,
            "wrote final tables"
        );
        self.load_database(&tables).await?;

        let mut report = BatchReport::new(Step::Assemble);
        for asset in &tables.assets {
            report.record_outcome(if asset.has_data { Outcome::Done } else { Outcome::Skipped });
        }
        Ok(report)
    }

    /// Replace the database contents with `tables`, if a database is configured.
    async fn load_database(&self, tables: &Tables) -> Result<()> {
        let Some(path) = &self.config.database else {
            return Ok(());
        };
        let db = Database::open(path).await.or_raise(|| ErrorKind::Database)?;
        let loaded = async {
            db.load(tables).await?;
            db.repository().incomplete_assets().await
        }
        .await;
        let closed = db.close().await;
        let incomplete = loaded.or_raise(|| ErrorKind::Database)?;
        closed.or_raise(|| ErrorKind::Database)?;
        tracing::info!(path = %path.display(), incomplete = incomplete.len(), "loaded final tables into database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{CLIP, SPRITE, catalog_csv, clip_container, config, sprite_container, write};
    use ruidex_index::{ASSETS_TABLE, TAGS_TABLE};
    use std::fs;

    const SECOND: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn fixture(tmp: &tempfile::TempDir) -> ruidex_config::Config {
        let config = config(tmp);
        write(&config.catalog, catalog_csv(&[(SPRITE, "Sprite"), (SECOND, "Sprite"), (CLIP, "AnimationClip")]).as_bytes());
        write(config.cache_root.join(format!("s/{SPRITE}.mod")), &sprite_container(1));
        write(config.cache_root.join(format!("s/{SECOND}.mod")), &sprite_container(2));
        write(config.cache_root.join(format!("c/{CLIP}.animationclip.mod")), &clip_container(&[1, 2]));
        config
    }

    #[tokio::test]
    async fn full_run_marks_complete_assets() {
        let tmp = tempfile::tempdir().unwrap();
        let config = fixture(&tmp);
        let pipeline = Pipeline::new(config.clone());
        let reports = pipeline.run().await.unwrap();
        let steps: Vec<_> = reports.iter().map(|r| r.step).collect();
        assert_eq!(steps, Step::ALL);
        assert!(reports.iter().all(|r| !r.has_failures()));

        let assemble = reports.last().unwrap();
        assert_eq!((assemble.succeeded, assemble.skipped), (3, 0));
        let tags = fs::read_to_string(config.tables_dir().join(TAGS_TABLE)).unwrap();
        assert_eq!(tags, "id,name\n1,hero\n");

        // Remove one frame's output: the clip becomes incomplete.
        fs::remove_file(config.output_root.join(format!("Sprite/{SECOND}.png"))).unwrap();
        let report = pipeline.assemble().await.unwrap();
        assert_eq!((report.succeeded, report.skipped), (1, 2));
    }

    #[tokio::test]
    async fn reassembly_is_byte_identical() {
        let tmp = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(fixture(&tmp));
        pipeline.run().await.unwrap();
        let assets = pipeline.config().tables_dir().join(ASSETS_TABLE);
        let first = fs::read(&assets).unwrap();
        pipeline.assemble().await.unwrap();
        assert_eq!(fs::read(&assets).unwrap(), first);
    }

    #[tokio::test]
    async fn loads_database_when_configured() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = fixture(&tmp);
        config.database = Some(tmp.path().join("index.sqlite"));
        let pipeline = Pipeline::new(config.clone());
        pipeline.run().await.unwrap();

        let db = Database::open(config.database.as_ref().unwrap()).await.unwrap();
        let counts = db.repository().counts().await.unwrap();
        assert_eq!((counts.assets, counts.animation_frames, counts.tags), (3, 2, 1));
        db.close().await.unwrap();
    }
}
