use crate::fingerprint::FingerprintMap;
use crate::models::{FINGERPRINT_LEN, Fingerprint, Ruid};
use std::collections::HashSet;

/// Identifiers whose fingerprint appears anywhere after `start`, in order of
/// first appearance.
///
/// Windows that match nothing are skipped silently, and so are later
/// appearances of an identifier that was already found.
pub(crate) fn identifiers(blob: &[u8], start: usize, fingerprints: &FingerprintMap) -> Vec<Ruid> {
    if fingerprints.is_empty() {
        return Vec::new();
    }
    let region = blob.get(start..).unwrap_or_default();
    let mut seen = HashSet::new();
    region
        .windows(FINGERPRINT_LEN)
        .filter_map(Fingerprint::from_window)
        .filter_map(|fingerprint| fingerprints.get(&fingerprint))
        .filter(|ruid| seen.insert(*ruid))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[([u8; 16], &str)]) -> FingerprintMap {
        entries
            .iter()
            .map(|(bytes, ruid)| (Fingerprint::new(*bytes), ruid.parse::<Ruid>().unwrap()))
            .collect()
    }

    #[test]
    fn first_appearance_order() {
        let a = "a".repeat(32);
        let b = "b".repeat(32);
        let fingerprints = map(&[([1; 16], &a), ([2; 16], &b)]);
        let mut blob = vec![0u8; 8];
        blob.extend_from_slice(&[2; 16]);
        blob.extend_from_slice(&[0; 3]);
        blob.extend_from_slice(&[1; 16]);
        blob.extend_from_slice(&[2; 16]);
        let found = identifiers(&blob, 0, &fingerprints);
        assert_eq!(found, vec![b.parse().unwrap(), a.parse().unwrap()]);
    }

    #[test]
    fn region_before_start_is_ignored() {
        let a = "a".repeat(32);
        let fingerprints = map(&[([1; 16], &a)]);
        let mut blob = vec![1u8; 16];
        blob.extend_from_slice(&[0; 16]);
        assert!(identifiers(&blob, 1, &fingerprints).is_empty());
        assert_eq!(identifiers(&blob, 0, &fingerprints).len(), 1);
    }

    #[test]
    fn short_region_yields_nothing() {
        let fingerprints = map(&[([1; 16], &"a".repeat(32))]);
        assert!(identifiers(&[1u8; 15], 0, &fingerprints).is_empty());
        assert!(identifiers(&[1u8; 20], 40, &fingerprints).is_empty());
    }
}
