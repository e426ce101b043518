//! Data models for the FlightSurety oracle server

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

pub mod oracle;
pub use oracle::*;

/// Static acknowledgment returned by the `/api` liveness endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

/// A 20-byte Ethereum account or contract address.
///
/// Parses from and displays as 0x-prefixed hex; serialized as a string so it
/// can be embedded directly in JSON-RPC payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address([u8; 20]);

impl Address {
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid address {0:?}: expected 20 bytes of 0x-prefixed hex")]
pub struct AddressParseError(String);

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(hex_part).map_err(|_| AddressParseError(s.to_string()))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| AddressParseError(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_roundtrips_through_hex() {
        let addr: Address = "0x627306090abab3a6e1400e9345bc60c78a8bef57"
            .parse()
            .unwrap();
        assert_eq!(
            addr.to_string(),
            "0x627306090abab3a6e1400e9345bc60c78a8bef57"
        );
    }

    #[test]
    fn address_accepts_unprefixed_hex() {
        let addr: Address = "627306090abab3a6e1400e9345bc60c78a8bef57".parse().unwrap();
        assert_eq!(addr.as_bytes()[0], 0x62);
    }

    #[test]
    fn address_rejects_wrong_length_and_bad_hex() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzz7306090abab3a6e1400e9345bc60c78a8bef57"
            .parse::<Address>()
            .is_err());
    }
}
