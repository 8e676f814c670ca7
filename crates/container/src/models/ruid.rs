use crate::error::{Error, ErrorKind, Result};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Number of raw bytes behind a [`Ruid`].
pub const RUID_BYTES: usize = 16;
const RUID_HEX_LEN: usize = RUID_BYTES * 2;

/// Resource identifier: 32 lowercase hexadecimal characters.
///
/// Parsing is case-insensitive and the stored form is always lowercase, so
/// derived equality and ordering are case-insensitive too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Ruid(String);

impl Ruid {
    /// Encode 16 raw bytes as an identifier, in the order given.
    pub fn from_bytes(bytes: &[u8; RUID_BYTES]) -> Self {
        Self(hex::encode(bytes))
    }

    /// The raw bytes behind the identifier.
    pub fn to_bytes(&self) -> [u8; RUID_BYTES] {
        let mut out = [0u8; RUID_BYTES];
        // Every constructor checks for exactly 32 hex characters, so the
        // zeroed fallback is unreachable.
        hex::decode_to_slice(&self.0, &mut out).map(|()| out).unwrap_or([0u8; RUID_BYTES])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if `s` would parse as an identifier.
    pub fn is_valid(s: &str) -> bool {
        let s = s.trim();
        s.len() == RUID_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl FromStr for Ruid {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        if !Self::is_valid(s) {
            exn::bail!(ErrorKind::ParseError { field: "ruid", value: s.to_string() });
        }
        Ok(Self(s.trim().to_ascii_lowercase()))
    }
}

impl TryFrom<String> for Ruid {
    type Error = ErrorKind;
    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        if !Self::is_valid(&value) {
            return Err(ErrorKind::ParseError { field: "ruid", value });
        }
        Ok(Self(value.trim().to_ascii_lowercase()))
    }
}

impl From<Ruid> for String {
    fn from(value: Ruid) -> Self {
        value.0
    }
}

impl AsRef<str> for Ruid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Ruid {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0123456789abcdef0123456789abcdef")]
    #[case("0123456789ABCDEF0123456789ABCDEF")]
    #[case("  0123456789abcdef0123456789abcdef\n")]
    fn parses_valid(#[case] input: &str) {
        let ruid: Ruid = input.parse().unwrap();
        assert_eq!(ruid.as_str(), "0123456789abcdef0123456789abcdef");
    }

    #[rstest]
    #[case("")]
    #[case("0123456789abcdef")]
    #[case("0123456789abcdef0123456789abcdef0")]
    #[case("0123456789abcdef0123456789abcdeg")]
    #[case("01234567-89ab-cdef-0123-456789abcdef")]
    fn rejects_invalid(#[case] input: &str) {
        assert!(input.parse::<Ruid>().is_err());
        assert!(!Ruid::is_valid(input));
    }

    #[test]
    fn equality_ignores_case() {
        let lower: Ruid = "aabbccddeeff00112233445566778899".parse().unwrap();
        let upper: Ruid = "AABBCCDDEEFF00112233445566778899".parse().unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn bytes_follow_hex_order() {
        let ruid: Ruid = "00112233445566778899aabbccddeeff".parse().unwrap();
        let bytes = ruid.to_bytes();
        assert_eq!(bytes[0], 0x00);
        assert_eq!(bytes[15], 0xff);
        assert_eq!(Ruid::from_bytes(&bytes), ruid);
    }

    #[rstest]
    #[case("  AABBCCDDEEFF00112233445566778899\n")]
    #[case("AABBCCDDEEFF00112233445566778899")]
    fn bytes_of_normalized_input(#[case] input: &str) {
        let ruid = Ruid::try_from(input.to_string()).unwrap();
        let bytes = ruid.to_bytes();
        assert_eq!(&bytes[..2], &[0xaa, 0xbb]);
        assert_eq!(Ruid::from_bytes(&bytes).as_str(), "aabbccddeeff00112233445566778899");
    }
}
