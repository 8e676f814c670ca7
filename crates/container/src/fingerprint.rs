//! Content fingerprints of single-image containers.

use crate::consts::{FINGERPRINT_HEAD_LEN, FINGERPRINT_START};
use crate::error::{ErrorKind, Result};
use crate::models::{Fingerprint, Ruid};
use exn::ResultExt;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Fingerprint of a container whose first bytes are `head`.
///
/// `None` when fewer than [`FINGERPRINT_HEAD_LEN`] bytes are available.
pub fn fingerprint_of(head: &[u8]) -> Option<Fingerprint> {
    head.get(FINGERPRINT_START..FINGERPRINT_HEAD_LEN).and_then(Fingerprint::from_window)
}

/// Read only the head of a container file and fingerprint it.
pub fn read_fingerprint(path: impl AsRef<Path>) -> Result<Option<Fingerprint>> {
    let file = File::open(path.as_ref()).or_raise(|| ErrorKind::Io)?;
    let mut head = Vec::with_capacity(FINGERPRINT_HEAD_LEN);
    file.take(FINGERPRINT_HEAD_LEN as u64).read_to_end(&mut head).or_raise(|| ErrorKind::Io)?;
    Ok(fingerprint_of(&head))
}

/// Read-only lookup from fingerprint to the identifier that produced it.
///
/// The first identifier inserted for a fingerprint keeps it. Use
/// [`FingerprintMap::build`] to make that choice independent of input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerprintMap {
    entries: BTreeMap<Fingerprint, Ruid>,
}

impl FingerprintMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort `entries` by their key before inserting, so any permutation of the
    /// same input yields the same map.
    pub fn build<K: Ord>(entries: impl IntoIterator<Item = (K, Fingerprint, Ruid)>) -> Self {
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let mut map = Self::new();
        for (_, fingerprint, ruid) in entries {
            map.insert(fingerprint, ruid);
        }
        map
    }

    /// Returns `false` (and keeps the existing identifier) on a collision.
    pub fn insert(&mut self, fingerprint: Fingerprint, ruid: Ruid) -> bool {
        match self.entries.entry(fingerprint) {
            Entry::Vacant(slot) => {
                slot.insert(ruid);
                true
            },
            Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&Ruid> {
        self.entries.get(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in fingerprint order.
    pub fn iter(&self) -> impl Iterator<Item = (&Fingerprint, &Ruid)> {
        self.entries.iter()
    }
}

impl FromIterator<(Fingerprint, Ruid)> for FingerprintMap {
    fn from_iter<T: IntoIterator<Item = (Fingerprint, Ruid)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (fingerprint, ruid) in iter {
            map.insert(fingerprint, ruid);
        }
        map
    }
}
