//! Fixed-width identifiers shared by every artifact: selectors and addresses.
//!
//! Both serialize as lowercase `0x`-prefixed hex strings. Parsing is tolerant:
//! the prefix is optional and letter case is ignored (EIP-55 checksums are not
//! validated).

use alloy_primitives::{FixedBytes, hex};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Errors emitted while parsing hex-encoded identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HexParseError {
    InvalidHex { input: String },
    WrongLength { expected: usize, actual: usize },
}

impl fmt::Display for HexParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HexParseError::InvalidHex { input } => write!(f, "invalid hex string '{}'", input),
            HexParseError::WrongLength { expected, actual } => {
                write!(f, "expected {} bytes, got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for HexParseError {}

fn parse_fixed<const N: usize>(s: &str) -> Result<FixedBytes<N>, HexParseError> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|_| HexParseError::InvalidHex {
        input: s.to_string(),
    })?;
    if bytes.len() != N {
        return Err(HexParseError::WrongLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    Ok(FixedBytes::from_slice(&bytes))
}

/// A 4-byte function selector.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Selector(pub FixedBytes<4>);

impl Selector {
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(FixedBytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0.0
    }
}

impl From<[u8; 4]> for Selector {
    fn from(bytes: [u8; 4]) -> Self {
        Self::new(bytes)
    }
}

impl From<FixedBytes<4>> for Selector {
    fn from(bytes: FixedBytes<4>) -> Self {
        Self(bytes)
    }
}

impl From<Selector> for FixedBytes<4> {
    fn from(selector: Selector) -> Self {
        selector.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_prefixed(self.0))
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({})", self)
    }
}

impl FromStr for Selector {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed::<4>(s).map(Self)
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A 20-byte account address.
///
/// Displays as lowercase hex; the wrapped [`alloy_primitives::Address`]
/// would print its EIP-55 checksum form.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub alloy_primitives::Address);

impl Address {
    /// The null address. Remove cuts target it.
    pub const ZERO: Address = Address(alloy_primitives::Address::ZERO);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(alloy_primitives::Address::new(bytes))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `None` for the null address, so "never registered" has one spelling.
    pub fn non_zero(self) -> Option<Address> {
        if self.is_zero() { None } else { Some(self) }
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0.0.0
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self::new(bytes)
    }
}

impl From<alloy_primitives::Address> for Address {
    fn from(address: alloy_primitives::Address) -> Self {
        Self(address)
    }
}

impl From<Address> for alloy_primitives::Address {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_prefixed(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed::<20>(s).map(|bytes| Self(alloy_primitives::Address::new(*bytes)))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Deserialize an optional address, folding the null address into `None`.
pub fn deserialize_optional_address<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Address>::deserialize(deserializer)?;
    Ok(raw.and_then(Address::non_zero))
}

/// Serde adapter for byte payloads written as `0x`-prefixed hex.
pub mod hex_bytes {
    use alloy_primitives::hex;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&hex::encode_prefixed(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(digits).map_err(serde::de::Error::custom)
    }
}
