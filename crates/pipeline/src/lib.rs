//! Batch driver for a ruidex run.
//!
//! A run is five steps, each of which can also be run on its own:
//!
//! 1. [`list`](Pipeline::list) walks the cache and output trees.
//! 2. [`decode`](Pipeline::decode) writes one PNG (plus thumbnail) per
//!    single-image identifier and records its placement.
//! 3. [`fingerprint`](Pipeline::fingerprint) builds the fingerprint map from
//!    the whole cache.
//! 4. [`frames`](Pipeline::frames) resolves animation clips against that map.
//! 5. [`assemble`](Pipeline::assemble) joins everything into the final tables.
//!
//! Steps hand over through CSV tables in the work directory. Per-item
//! failures are counted in a [`BatchReport`]; only step-level failures are
//! returned as errors.

mod assemble;
mod decode;
pub mod error;
mod fingerprint;
mod frames;
mod list;
mod pool;
mod report;

pub use crate::fingerprint::FingerprintRow;
pub use crate::report::{BatchReport, Failure, Outcome, Step};

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use ruidex_catalog::{Catalog, Row, read_catalog, read_table, write_table};
use ruidex_config::Config;
use std::path::{Path, PathBuf};

pub const CACHE_LISTING_TABLE: &str = "cache_listing.csv";
pub const EXISTENCE_TABLE: &str = "existence.csv";
pub const PLACEMENTS_TABLE: &str = "placements.csv";
pub const FINGERPRINTS_TABLE: &str = "fingerprints.csv";
pub const FRAMES_TABLE: &str = "frames.csv";
/// Thumbnail directory under the output root.
pub const THUMBS_DIR: &str = "thumbs";

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one step.
    pub async fn step(&self, step: Step) -> Result<BatchReport> {
        let report = match step {
            Step::List => self.list().await?,
            Step::Decode => self.decode().await?,
            Step::Fingerprint => self.fingerprint().await?,
            Step::Frames => self.frames().await?,
            Step::Assemble => self.assemble().await?,
        };
        report.log();
        Ok(report)
    }

    /// Run every step in order, stopping at the first step-level failure.
    pub async fn run(&self) -> Result<Vec<BatchReport>> {
        let mut reports = Vec::with_capacity(Step::ALL.len());
        for step in Step::ALL {
            reports.push(self.step(step).await?);
        }
        Ok(reports)
    }

    fn work_table(&self, name: &str) -> PathBuf {
        self.config.work_dir.join(name)
    }

    fn read_work_table<T: Row>(&self, name: &str) -> Result<Vec<T>> {
        let path = self.work_table(name);
        read_table(&path).or_raise(|| ErrorKind::ReadTable(path.clone()))
    }

    fn write_work_table<'a, T: Row + 'a>(&self, name: &str, rows: impl IntoIterator<Item = &'a T>) -> Result<usize> {
        let path = self.work_table(name);
        let count = write_table(&path, rows).or_raise(|| ErrorKind::WriteTable(path.clone()))?;
        tracing::debug!(path = %path.display(), rows = count, "wrote intermediate table");
        Ok(count)
    }

    fn read_catalog(&self) -> Result<Catalog> {
        let path = &self.config.catalog;
        read_catalog(path).or_raise(|| ErrorKind::Catalog(path.clone()))
    }

    fn cache_path(&self, relative: &str) -> PathBuf {
        self.config.cache_root.join(relative)
    }

    fn output_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.config.output_root.join(relative)
    }
}
