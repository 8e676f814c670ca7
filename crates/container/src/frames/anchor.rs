use crate::consts::{ANIMATION_DEFAULT_START, ANIMATION_TEXT_MARKERS, ANIMATION_TEXT_WINDOW};
use memchr::memmem;

/// Where the frame payload of an animation container begins.
///
/// The earliest textual marker inside the first bytes of the container,
/// otherwise a fixed default (clamped to the container length).
pub(crate) fn payload_start(blob: &[u8]) -> usize {
    let head = &blob[..blob.len().min(ANIMATION_TEXT_WINDOW)];
    ANIMATION_TEXT_MARKERS
        .iter()
        .filter_map(|marker| memmem::find(head, marker))
        .min()
        .unwrap_or(ANIMATION_DEFAULT_START.min(blob.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn with_marker(at: usize, marker: &[u8]) -> Vec<u8> {
        let mut blob = vec![0u8; 256];
        blob[at..at + marker.len()].copy_from_slice(marker);
        blob
    }

    #[rstest]
    #[case(24, b"[[")]
    #[case(40, b"\"frames\"")]
    #[case(3, b"\"Frames\"")]
    fn finds_text_markers(#[case] at: usize, #[case] marker: &[u8]) {
        assert_eq!(payload_start(&with_marker(at, marker)), at);
    }

    #[test]
    fn earliest_marker_wins() {
        let mut blob = with_marker(60, b"[[");
        blob[30..38].copy_from_slice(b"\"frames\"");
        assert_eq!(payload_start(&blob), 30);
    }

    #[rstest]
    #[case(256, 24)]
    #[case(10, 10)]
    #[case(0, 0)]
    fn falls_back_to_default(#[case] len: usize, #[case] expected: usize) {
        assert_eq!(payload_start(&vec![0u8; len]), expected);
    }

    #[test]
    fn ignores_markers_past_the_window() {
        assert_eq!(payload_start(&with_marker(200, b"[[")), 24);
    }
}
