//! Network-agnostic 32-byte identifiers

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// A 32-byte network-agnostic identifier
///
/// EVM addresses (20 bytes) are stored left-padded with zeroes, which is how
/// the messaging contracts encode them on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NomadIdentifier([u8; 32]);

impl NomadIdentifier {
    /// The all-zero identifier
    pub const ZERO: Self = Self([0u8; 32]);

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Left-pad a 20-byte address
    pub fn from_address(address: [u8; 20]) -> Self {
        let mut buf = [0u8; 32];
        buf[12..].copy_from_slice(&address);
        Self(buf)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to a 20-byte address. `None` if that would drop non-zero bytes
    pub fn as_address(&self) -> Option<[u8; 20]> {
        if self.0[..12].iter().all(|b| *b == 0) {
            let mut addr = [0u8; 20];
            addr.copy_from_slice(&self.0[12..]);
            Some(addr)
        } else {
            None
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl From<[u8; 32]> for NomadIdentifier {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<[u8; 20]> for NomadIdentifier {
    fn from(address: [u8; 20]) -> Self {
        Self::from_address(address)
    }
}

impl FromStr for NomadIdentifier {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| TypesError::MissingHexPrefix(s.to_string()))?;

        let bytes = hex::decode(stripped).map_err(|e| TypesError::InvalidHex(e.to_string()))?;

        match bytes.len() {
            32 => {
                let mut buf = [0u8; 32];
                buf.copy_from_slice(&bytes);
                Ok(Self(buf))
            }
            20 => {
                let mut addr = [0u8; 20];
                addr.copy_from_slice(&bytes);
                Ok(Self::from_address(addr))
            }
            len => Err(TypesError::InvalidLength(len)),
        }
    }
}

impl fmt::Display for NomadIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for NomadIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NomadIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdentifierVisitor;

        impl<'de> de::Visitor<'de> for IdentifierVisitor {
            type Value = NomadIdentifier;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a 20- or 32-byte 0x-prepended hexadecimal string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(IdentifierVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_address_and_h256_forms_are_equal() {
        let addr = json!("0x0000000000000000000000000000000000000001");
        let full = json!("0x0000000000000000000000000000000000000000000000000000000000000001");

        let a: NomadIdentifier = serde_json::from_value(addr).unwrap();
        let b: NomadIdentifier = serde_json::from_value(full.clone()).unwrap();
        assert_eq!(a, b);

        // Always serialized in the 32-byte form
        assert_eq!(serde_json::to_value(a).unwrap(), full);
    }

    #[test]
    fn test_as_address() {
        let id: NomadIdentifier = "0x00000000000000000000000000000000000000ff".parse().unwrap();
        let addr = id.as_address().unwrap();
        assert_eq!(addr[19], 0xff);

        let wide: NomadIdentifier =
            "0x0100000000000000000000000000000000000000000000000000000000000000"
                .parse()
                .unwrap();
        assert!(wide.as_address().is_none());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(
            "1234".parse::<NomadIdentifier>(),
            Err(TypesError::MissingHexPrefix("1234".to_string()))
        );
        assert_eq!(
            "0x1234".parse::<NomadIdentifier>(),
            Err(TypesError::InvalidLength(2))
        );
        assert!(matches!(
            "0xzz".parse::<NomadIdentifier>(),
            Err(TypesError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_zero() {
        assert!(NomadIdentifier::default().is_zero());
        assert_eq!(NomadIdentifier::default(), NomadIdentifier::ZERO);
    }
}
