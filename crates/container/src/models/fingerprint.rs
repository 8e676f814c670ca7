use crate::error::{Error, ErrorKind, Result};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

pub const FINGERPRINT_LEN: usize = 16;

/// Fixed-length content key taken from the head of a single-image container.
///
/// Displayed (and persisted) as 32 lowercase hex characters. Lookups compare
/// the raw bytes, which is equivalent to comparing the hex form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    pub fn new(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(bytes)
    }

    /// Borrow a window of exactly [`FINGERPRINT_LEN`] bytes.
    pub fn from_window(window: &[u8]) -> Option<Self> {
        <[u8; FINGERPRINT_LEN]>::try_from(window).ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Fingerprint {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Ok(Self::try_from(s.to_string())?)
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = ErrorKind;
    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        let mut out = [0u8; FINGERPRINT_LEN];
        match hex::decode_to_slice(value.trim(), &mut out) {
            Ok(()) => Ok(Self(out)),
            Err(_) => Err(ErrorKind::ParseError { field: "fingerprint", value }),
        }
    }
}

impl From<Fingerprint> for String {
    fn from(value: Fingerprint) -> Self {
        value.to_string()
    }
}
