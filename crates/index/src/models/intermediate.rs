//! Per-identifier facts produced by the decode and frame steps.

use ruidex_catalog::Row;
use ruidex_container::ImageHeader;
use ruidex_container::models::{AnimationFrame, Placement, Ruid};
use serde::{Deserialize, Serialize};

/// Dimensions, pivot and placement of one decoded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub identifier: Ruid,
    pub width: u32,
    pub height: u32,
    /// Empty when the header carried no pivot (the centre was used).
    pub pivot_x: Option<f32>,
    pub pivot_y: Option<f32>,
    pub offset_x: i32,
    pub offset_y: i32,
    /// `raster` or `texture`.
    pub payload: String,
}

impl Row for PlacementRecord {
    const HEADERS: &'static [&'static str] =
        &["identifier", "width", "height", "pivot_x", "pivot_y", "offset_x", "offset_y", "payload"];
}

impl PlacementRecord {
    pub fn new(identifier: Ruid, header: &ImageHeader) -> Self {
        let Placement { offset_x, offset_y } = header.placement();
        Self {
            identifier,
            width: header.width,
            height: header.height,
            pivot_x: header.pivot.map(|p| p.x),
            pivot_y: header.pivot.map(|p| p.y),
            offset_x,
            offset_y,
            payload: header.payload.kind.to_string(),
        }
    }

    pub fn placement(&self) -> Placement {
        Placement { offset_x: self.offset_x, offset_y: self.offset_y }
    }
}

/// One resolved animation frame.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameRecord {
    pub clip_identifier: Ruid,
    pub frame_index: u32,
    pub frame_identifier: Ruid,
    pub duration_ms: u32,
}

impl Row for FrameRecord {
    const HEADERS: &'static [&'static str] = &["clip_identifier", "frame_index", "frame_identifier", "duration_ms"];
}

impl From<AnimationFrame> for FrameRecord {
    fn from(frame: AnimationFrame) -> Self {
        Self {
            clip_identifier: frame.clip,
            frame_index: frame.index,
            frame_identifier: frame.frame,
            duration_ms: frame.duration_ms,
        }
    }
}
