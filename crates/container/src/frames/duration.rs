use crate::consts::{DEFAULT_FRAME_DURATION_MS, FRAME_DURATION_OFFSET, FRAME_MARKER, MAX_FRAME_SECONDS, MIN_FRAME_SECONDS};
use byteorder::{ByteOrder, LittleEndian};
use memchr::memmem;

/// Positions of every frame record marker at or after `start`.
pub(crate) fn frame_markers(blob: &[u8], start: usize) -> impl Iterator<Item = usize> + '_ {
    let region = blob.get(start..).unwrap_or_default();
    memmem::find_iter(region, &FRAME_MARKER).map(move |at| start + at)
}

/// Clip-wide frame duration in milliseconds.
///
/// The median of every plausible per-record duration, so a few stray floats
/// don't skew the result.
pub(crate) fn clip_duration_ms(blob: &[u8], start: usize) -> u32 {
    let mut seconds: Vec<f32> = frame_markers(blob, start)
        .filter_map(|marker| blob.get(marker + FRAME_DURATION_OFFSET..)?.get(..4))
        .map(LittleEndian::read_f32)
        .filter(|s| (MIN_FRAME_SECONDS..=MAX_FRAME_SECONDS).contains(s))
        .collect();
    if seconds.is_empty() {
        return DEFAULT_FRAME_DURATION_MS;
    }
    seconds.sort_by(f32::total_cmp);
    let mid = seconds.len() / 2;
    let median = if seconds.len() % 2 == 0 {
        (f64::from(seconds[mid - 1]) + f64::from(seconds[mid])) / 2.0
    } else {
        f64::from(seconds[mid])
    };
    ((median * 1000.0).round() as u32).max(1)
}
