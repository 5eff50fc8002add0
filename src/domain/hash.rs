use std::fmt::Display;

use blake3::Hash;

/// Checksum of a stored payload.
///
/// Written next to every binary record and checked on every read, so a
/// payload that changed after it was stored is reported instead of served.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(pub Hash);

impl ContentHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes))
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }

    pub fn from_hex(hex: &str) -> anyhow::Result<Self> {
        Ok(Self(Hash::from_hex(hex)?))
    }

    pub fn matches(&self, bytes: &[u8]) -> bool {
        *self == Self::from_bytes(bytes)
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::ContentHash;

    #[test]
    fn hex_round_trip_and_match() -> anyhow::Result<()> {
        let hash = ContentHash::from_bytes(b"payload");
        assert_eq!(ContentHash::from_hex(&hash.to_hex())?, hash);
        assert!(hash.matches(b"payload"));
        assert!(!hash.matches(b"payload!"));
        Ok(())
    }

    #[test]
    fn invalid_hex_is_rejected() {
        assert!(ContentHash::from_hex("not-a-hash").is_err());
    }
}
