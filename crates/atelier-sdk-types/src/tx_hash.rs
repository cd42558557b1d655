use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors you can get while trying to parse a transaction hash.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TxHashError {
    /// The hash did not start with the `0x` prefix.
    #[error("missing 0x prefix")]
    MissingPrefix,

    /// The data was not 32 bytes in length.
    #[error("wrong length, expected 32 bytes but found {0}")]
    WrongLength(usize),

    /// An error occurred while decoding the hex payload.
    #[error("error when decoding transaction hash: {0}")]
    Decode(#[from] hex::FromHexError),
}

/// A 32 byte ledger transaction hash.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn to_bytes(self) -> [u8; 32] {
        self.0
    }
}

impl FromStr for TxHash {
    type Err = TxHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s.strip_prefix("0x").ok_or(TxHashError::MissingPrefix)?;
        let data = hex::decode(hex_part)?;
        let length = data.len();
        let bytes = data
            .try_into()
            .map_err(|_| TxHashError::WrongLength(length))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}
