use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors you can get while trying to parse a ledger address.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum AddressError {
    /// The address did not start with the `0x` prefix.
    #[error("missing 0x prefix")]
    MissingPrefix,

    /// The data was not 20 bytes in length.
    #[error("wrong length, expected 20 bytes but found {0}")]
    WrongLength(usize),

    /// An error occurred while decoding the hex payload.
    #[error("error when decoding address: {0}")]
    Decode(#[from] hex::FromHexError),
}

/// A 20 byte account or contract address on the ledger.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub const fn to_bytes(self) -> [u8; 20] {
        self.0
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s.strip_prefix("0x").ok_or(AddressError::MissingPrefix)?;
        let data = hex::decode(hex_part)?;
        let length = data.len();
        let bytes = data
            .try_into()
            .map_err(|_| AddressError::WrongLength(length))?;
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
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}
