use super::duration::frame_markers;
use crate::consts::FRAME_IDENTIFIER_OFFSET;
use crate::models::{RUID_BYTES, Ruid};

/// Reorder the identifier bytes stored in a frame record into canonical order.
///
/// Bytes 0..4 are reversed and bytes 4 and 5 are swapped; the rest are kept.
/// The permutation is its own inverse.
pub fn decode_identifier(stored: &[u8; RUID_BYTES]) -> [u8; RUID_BYTES] {
    let mut out = *stored;
    out[..4].reverse();
    out.swap(4, 5);
    out
}

/// Inverse of [`decode_identifier`]: the bytes a frame record stores for `ruid`.
pub fn encode_identifier(ruid: &Ruid) -> [u8; RUID_BYTES] {
    decode_identifier(&ruid.to_bytes())
}

/// Frame identifiers in record order. Repeated identifiers are kept.
pub(crate) fn identifiers(blob: &[u8], start: usize) -> Vec<Ruid> {
    frame_markers(blob, start)
        .filter_map(|marker| {
            let at = marker + FRAME_IDENTIFIER_OFFSET;
            let stored = <&[u8; RUID_BYTES]>::try_from(blob.get(at..at + RUID_BYTES)?).ok()?;
            let ruid = Ruid::from_bytes(&decode_identifier(stored));
            Ruid::is_valid(ruid.as_str()).then_some(ruid)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MARKER;

    const STORED: [u8; 16] = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF,
    ];

    fn record(ruid: &Ruid) -> [u8; 32] {
        let mut record = [0u8; 32];
        record[..3].copy_from_slice(&FRAME_MARKER);
        record[FRAME_IDENTIFIER_OFFSET..FRAME_IDENTIFIER_OFFSET + 16].copy_from_slice(&encode_identifier(ruid));
        record
    }

    #[test]
    fn reorders_bytes() {
        let ruid = Ruid::from_bytes(&decode_identifier(&STORED));
        assert_eq!(ruid.as_str(), "33221100554466778899aabbccddeeff");
    }

    #[test]
    fn round_trips_identifiers() {
        for ruid in [
            "33221100554466778899aabbccddeeff",
            "00000000000000000000000000000000",
            "0123456789abcdef0123456789abcdef",
            "ffeeddccbbaa99887766554433221100",
        ] {
            let ruid: Ruid = ruid.parse().unwrap();
            assert_eq!(Ruid::from_bytes(&decode_identifier(&encode_identifier(&ruid))), ruid);
        }
        assert_eq!(decode_identifier(&decode_identifier(&STORED)), STORED);
    }

    #[test]
    fn reads_records_in_order_with_repeats() {
        let a: Ruid = "aa".repeat(16).parse().unwrap();
        let b: Ruid = "0123456789abcdef0123456789abcdef".parse().unwrap();
        let mut blob = vec![0u8; 24];
        for ruid in [&a, &b, &a] {
            blob.extend_from_slice(&record(ruid));
        }
        assert_eq!(identifiers(&blob, 24), vec![a.clone(), b, a]);
    }

    #[test]
    fn truncated_record_is_skipped() {
        let a: Ruid = "aa".repeat(16).parse().unwrap();
        let mut blob = vec![0u8; 24];
        blob.extend_from_slice(&record(&a));
        blob.extend_from_slice(&record(&a)[..20]);
        assert_eq!(identifiers(&blob, 0), vec![a]);
    }
}
