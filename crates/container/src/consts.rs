//! Byte-level constants observed in cached resource containers.

/// PNG stream signature (first four bytes).
pub(crate) const RASTER_SIGNATURE: [u8; 4] = [0x89, b'P', b'N', b'G'];
/// DirectDraw Surface signature.
pub(crate) const TEXTURE_SIGNATURE: [u8; 4] = *b"DDS ";

/// Default search window for single-image containers.
pub const DEFAULT_SEARCH_WINDOW: usize = 2048;
/// Search window for avatar item and thumbnail containers.
pub(crate) const WIDE_SEARCH_WINDOW: usize = 4096;
/// Raster-only fallback window for thumbnail containers.
pub(crate) const RASTER_FALLBACK_WINDOW: usize = 8192;
/// Avatar item containers usually carry their texture at this exact offset.
pub(crate) const AVATAR_ITEM_TEXTURE_OFFSET: usize = 3488;
/// Thumbnail containers usually carry their texture at this exact offset.
pub(crate) const THUMBNAIL_TEXTURE_OFFSET: usize = 847;

/// Trailer following the pivot floats in the long header: a fixed32 tag and
/// a scale of exactly `1.0`.
pub(crate) const PIVOT_MARKER: [u8; 5] = [0x1D, 0x00, 0x00, 0x80, 0x3F];
pub(crate) const PIVOT_SCAN_START: usize = 12;
pub(crate) const PIVOT_SCAN_LIMIT: usize = 2048;
/// Distance back from the marker to the pivot X float.
pub(crate) const PIVOT_X_BACK: usize = 9;
/// Distance back from the marker to the pivot Y float.
pub(crate) const PIVOT_Y_BACK: usize = 4;
/// Payload offsets that indicate the short header layout.
pub(crate) const SHORT_HEADER_PAYLOADS: std::ops::RangeInclusive<usize> = 51..=60;
/// Short header: pivot X stored as a whole pixel column in one byte.
pub(crate) const SHORT_HEADER_PIVOT_X: usize = 30;
/// Anything smaller than this in the long header slot is an empty read.
pub(crate) const PIVOT_EPSILON: f32 = 0.001;

/// Textual markers that open the frame section of animation containers.
pub(crate) const ANIMATION_TEXT_MARKERS: [&[u8]; 3] = [b"[[", b"\"frames\"", b"\"Frames\""];
pub(crate) const ANIMATION_TEXT_WINDOW: usize = 128;
pub(crate) const ANIMATION_DEFAULT_START: usize = 24;

/// Opens every frame record of an animation container.
pub(crate) const FRAME_MARKER: [u8; 3] = [0x0A, 0x79, 0x08];
/// Offset from a frame marker to its duration (f32 seconds).
pub(crate) const FRAME_DURATION_OFFSET: usize = 5;
/// Offset from a frame marker to its embedded identifier.
pub(crate) const FRAME_IDENTIFIER_OFFSET: usize = 13;
pub(crate) const MIN_FRAME_SECONDS: f32 = 0.01;
pub(crate) const MAX_FRAME_SECONDS: f32 = 2.0;
pub const DEFAULT_FRAME_DURATION_MS: u32 = 80;

/// Fingerprints are bytes `3..19` of a single-image container.
pub(crate) const FINGERPRINT_START: usize = 3;
pub const FINGERPRINT_HEAD_LEN: usize = 19;
