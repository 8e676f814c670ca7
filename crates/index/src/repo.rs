//! Bulk loading of the final tables.

use crate::assemble::Tables;
use crate::error::{ErrorKind, Result};
use crate::write::TableCounts;
use exn::ResultExt;
use sqlx::SqlitePool;
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct CountRow {
    tags: i64,
    asset_tags: i64,
    assets: i64,
    animation_frames: i64,
    cache_locations: i64,
}

/// Repository over the final tables.
///
/// Loads are all-or-nothing: the previous contents are replaced inside a
/// single transaction, so readers never see a half-loaded index.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Replace every table's contents with `tables`.
    #[instrument(skip_all, fields(assets = tables.assets.len()))]
    pub async fn replace_all(&self, tables: &Tables) -> Result<()> {
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        sqlx::query(include_str!("../queries/clear_tables.sql"))
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        for tag in &tables.tags {
            sqlx::query(include_str!("../queries/insert_tag.sql"))
                .bind(tag.id)
                .bind(&tag.name)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        for asset in &tables.assets {
            sqlx::query(include_str!("../queries/insert_asset.sql"))
                .bind(asset.id)
                .bind(asset.identifier.as_str())
                .bind(&asset.name)
                .bind(&asset.asset_type)
                .bind(&asset.category)
                .bind(&asset.subcategory)
                .bind(asset.path.as_deref())
                .bind(asset.thumbnail_identifier.as_ref().map(|t| t.as_str()))
                .bind(asset.has_data)
                .bind(asset.offset_x)
                .bind(asset.offset_y)
                .bind(&asset.output_subdir)
                .bind(asset.filename.as_deref())
                .bind(asset.published_at.as_deref())
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        for membership in &tables.asset_tags {
            sqlx::query(include_str!("../queries/insert_asset_tag.sql"))
                .bind(membership.id)
                .bind(membership.identifier.as_str())
                .bind(&membership.tag)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        for frame in &tables.animation_frames {
            sqlx::query(include_str!("../queries/insert_animation_frame.sql"))
                .bind(frame.id)
                .bind(frame.clip_identifier.as_str())
                .bind(i64::from(frame.frame_index))
                .bind(frame.frame_identifier.as_str())
                .bind(i64::from(frame.duration_ms))
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        for location in &tables.cache_locations {
            sqlx::query(include_str!("../queries/insert_cache_location.sql"))
                .bind(location.id)
                .bind(location.identifier.as_str())
                .bind(&location.relative_path)
                .bind(&location.format_suffix)
                .bind(location.observed_type.as_str())
                .bind(location.source_kind.as_str())
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    /// Number of rows currently stored per table.
    pub async fn counts(&self) -> Result<TableCounts> {
        let row: CountRow = sqlx::query_as(include_str!("../queries/count_tables.sql"))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let count = |n: i64| usize::try_from(n).or_raise(|| ErrorKind::InvalidData("row count"));
        Ok(TableCounts {
            tags: count(row.tags)?,
            asset_tags: count(row.asset_tags)?,
            assets: count(row.assets)?,
            animation_frames: count(row.animation_frames)?,
            cache_locations: count(row.cache_locations)?,
        })
    }

    /// Identifiers whose outputs are not all on disk yet.
    pub async fn incomplete_assets(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(include_str!("../queries/incomplete_assets.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(rows.into_iter().map(|(identifier,)| identifier).collect())
    }
}
