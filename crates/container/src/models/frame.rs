use super::Ruid;

/// One frame of an animation clip.
///
/// Frames of a clip are numbered from zero in playback order; every frame of a
/// clip shares the clip-wide duration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationFrame {
    pub clip: Ruid,
    pub index: u32,
    pub frame: Ruid,
    pub duration_ms: u32,
}
