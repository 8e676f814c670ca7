//! Pivot extraction from the header region preceding a payload.
//!
//! Two header layouts have been observed. The long header stores both pivot
//! coordinates as little-endian floats right before a fixed marker; the
//! short header (payload at offsets 51..=60) stores a single pixel column and
//! no vertical component at all. The short layout is only trusted when the
//! long read came back empty.

use crate::consts::{
    PIVOT_EPSILON, PIVOT_MARKER, PIVOT_SCAN_LIMIT, PIVOT_SCAN_START, PIVOT_X_BACK, PIVOT_Y_BACK, SHORT_HEADER_PAYLOADS,
    SHORT_HEADER_PIVOT_X,
};
use crate::models::Pivot;
use byteorder::{ByteOrder, LittleEndian};
use memchr::memmem;

/// Find the marker that trails the long header, returning its absolute offset.
fn find_marker(blob: &[u8], payload_offset: usize) -> Option<usize> {
    let last = payload_offset.saturating_sub(PIVOT_MARKER.len()).min(PIVOT_SCAN_LIMIT);
    if last < PIVOT_SCAN_START {
        return None;
    }
    let end = blob.len().min(last + PIVOT_MARKER.len());
    let region = blob.get(PIVOT_SCAN_START..end)?;
    memmem::find(region, &PIVOT_MARKER).map(|k| k + PIVOT_SCAN_START)
}

fn long_header(blob: &[u8], marker: usize) -> Option<Pivot> {
    let x = blob.get(marker.checked_sub(PIVOT_X_BACK)?..)?.get(..4)?;
    let y = blob.get(marker.checked_sub(PIVOT_Y_BACK)?..)?.get(..4)?;
    Some(Pivot::new(LittleEndian::read_f32(x), LittleEndian::read_f32(y)))
}

fn short_header(blob: &[u8], payload_offset: usize, width: u32, long: Pivot) -> Option<Pivot> {
    if !SHORT_HEADER_PAYLOADS.contains(&payload_offset) || long.x.abs() >= PIVOT_EPSILON || width == 0 {
        return None;
    }
    let column = *blob.get(SHORT_HEADER_PIVOT_X)?;
    Some(Pivot::new(f32::from(column) / width as f32, 0.0))
}

/// Extract the pivot stored in front of the payload.
///
/// Returns `None` when the header carries no pivot marker; callers use
/// [`Pivot::default`] in that case.
pub fn extract_pivot(blob: &[u8], payload_offset: usize, width: u32) -> Option<Pivot> {
    let marker = find_marker(blob, payload_offset)?;
    let long = long_header(blob, marker)?;
    Some(short_header(blob, payload_offset, width, long).unwrap_or(long))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn long_header_blob(marker_at: usize, x: f32, y: f32, len: usize) -> Vec<u8> {
        let mut blob = vec![0u8; len];
        blob[marker_at - 10] = 0x0D;
        blob[marker_at - 9..marker_at - 5].copy_from_slice(&x.to_le_bytes());
        blob[marker_at - 5] = 0x15;
        blob[marker_at - 4..marker_at].copy_from_slice(&y.to_le_bytes());
        blob[marker_at..marker_at + 5].copy_from_slice(&PIVOT_MARKER);
        blob
    }

    #[rstest]
    #[case(0.25, 0.75)]
    #[case(0.0, 1.0)]
    #[case(1.0, 0.0)]
    fn reads_long_header(#[case] x: f32, #[case] y: f32) {
        let blob = long_header_blob(40, x, y, 256);
        assert_eq!(extract_pivot(&blob, 200, 64), Some(Pivot::new(x, y)));
    }

    #[test]
    fn no_marker_means_no_pivot() {
        let blob = vec![0u8; 256];
        assert_eq!(extract_pivot(&blob, 200, 64), None);
    }

    #[test]
    fn marker_must_precede_payload() {
        let blob = long_header_blob(100, 0.25, 0.75, 256);
        // The marker would overlap the payload itself.
        assert_eq!(extract_pivot(&blob, 102, 64), None);
        assert!(extract_pivot(&blob, 105, 64).is_some());
    }

    #[test]
    fn marker_before_scan_start_is_ignored() {
        let mut blob = vec![0u8; 64];
        blob[4..9].copy_from_slice(&PIVOT_MARKER);
        assert_eq!(extract_pivot(&blob, 60, 64), None);
    }

    #[test]
    fn scan_is_capped() {
        let blob = long_header_blob(3000, 0.25, 0.75, 4096);
        assert_eq!(extract_pivot(&blob, 4000, 64), None);
    }

    // Marker at 12 so the long read lands on the zeroed prefix; outside
    // 51..=60 that empty long read is returned as-is.
    #[rstest]
    #[case(50, Pivot::new(0.0, 0.0))]
    #[case(51, Pivot::new(0.25, 0.0))]
    #[case(55, Pivot::new(0.25, 0.0))]
    #[case(60, Pivot::new(0.25, 0.0))]
    #[case(61, Pivot::new(0.0, 0.0))]
    #[case(70, Pivot::new(0.0, 0.0))]
    fn short_header_only_at_its_payload_offsets(#[case] payload_offset: usize, #[case] expected: Pivot) {
        let mut blob = vec![0u8; 128];
        blob[12..17].copy_from_slice(&PIVOT_MARKER);
        blob[SHORT_HEADER_PIVOT_X] = 16;
        assert_eq!(extract_pivot(&blob, payload_offset, 64), Some(expected));
    }

    #[test]
    fn plausible_long_header_wins_over_short() {
        let mut blob = long_header_blob(20, 0.5, 0.5, 128);
        blob[SHORT_HEADER_PIVOT_X] = 16;
        assert_eq!(extract_pivot(&blob, 55, 64), Some(Pivot::new(0.5, 0.5)));
    }
}
