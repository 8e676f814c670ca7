mod intermediate;
mod tables;

pub use self::intermediate::{FrameRecord, PlacementRecord};
pub use self::tables::{AnimationFrameRow, AssetRow, AssetTagRow, CacheLocationRow, TagRow};
