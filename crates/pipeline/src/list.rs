use crate::error::Result;
use crate::{BatchReport, CACHE_LISTING_TABLE, EXISTENCE_TABLE, Pipeline, Step, THUMBS_DIR};
use ruidex_catalog::{ExistingFile, Listing, cache_listing, existence_listing};
use std::path::Path;
use tracing::instrument;

impl Pipeline {
    /// Walk the cache tree and the output tree into the two listing tables.
    ///
    /// Every listed file counts as a success; every unreadable directory as
    /// a failure.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<BatchReport> {
        let cache = cache_listing(&self.config.cache_root).await;
        self.write_work_table(CACHE_LISTING_TABLE, &cache.rows)?;
        let mut report = listing_report(&self.config.cache_root, cache.rows.len(), cache.unreadable);
        let existing = self.existence().await?;
        report.merge(listing_report(&self.config.output_root, existing.rows.len(), existing.unreadable));
        Ok(report)
    }

    /// List the output tree, without thumbnails, and persist it.
    pub(crate) async fn existence(&self) -> Result<Listing<ExistingFile>> {
        let mut listing = existence_listing(&self.config.output_root).await;
        let thumbs = format!("{THUMBS_DIR}/");
        listing.rows.retain(|file| !file.path.starts_with(&thumbs));
        self.write_work_table(EXISTENCE_TABLE, &listing.rows)?;
        Ok(listing)
    }
}

fn listing_report(root: &Path, listed: usize, unreadable: usize) -> BatchReport {
    let mut report = BatchReport::new(Step::List);
    report.succeeded = listed;
    if unreadable > 0 {
        report.record_failure(root.display().to_string(), format!("{unreadable} unreadable directories"));
        report.failed = unreadable;
    }
    report
}
