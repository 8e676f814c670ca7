//! Animation clip frame resolution.
//!
//! A clip container lists its frames in one of two ways: explicit identifier
//! records, or embedded copies of each frame's content fingerprint. Both share
//! the payload anchor and the clip-wide duration records.

mod anchor;
mod duration;
mod explicit;
mod fingerprinted;

pub use self::explicit::{decode_identifier, encode_identifier};
use crate::fingerprint::FingerprintMap;
use crate::models::{AnimationFrame, Ruid};
use tracing::instrument;

/// How an animation container refers to its frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationLayout {
    /// Frame records carrying identifiers (`model` containers).
    ExplicitIdentifiers,
    /// Frame fingerprints embedded in the payload.
    Fingerprinted,
}

impl AnimationLayout {
    /// Layout used by containers with the given format suffix.
    pub fn for_suffix(suffix: &str) -> Self {
        if suffix.eq_ignore_ascii_case("model") { Self::ExplicitIdentifiers } else { Self::Fingerprinted }
    }
}

/// Resolve the ordered frames of one clip.
///
/// An empty result means the clip has no resolvable frames and should be
/// dropped; it is not an error.
#[instrument(level = "debug", skip(clip, blob, fingerprints), fields(blob_size = blob.len(), clip = %clip))]
pub fn resolve(clip: &Ruid, blob: &[u8], layout: AnimationLayout, fingerprints: &FingerprintMap) -> Vec<AnimationFrame> {
    let start = anchor::payload_start(blob);
    let identifiers = match layout {
        AnimationLayout::ExplicitIdentifiers => explicit::identifiers(blob, start),
        AnimationLayout::Fingerprinted => fingerprinted::identifiers(blob, start, fingerprints),
    };
    if identifiers.is_empty() {
        return Vec::new();
    }
    let duration_ms = duration::clip_duration_ms(blob, start);
    identifiers
        .into_iter()
        .zip(0u32..)
        .map(|(frame, index)| AnimationFrame { clip: clip.clone(), index, frame, duration_ms })
        .collect()
}
