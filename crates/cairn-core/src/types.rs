//! Core value types shared by the checkpoint guard and its collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HashParseError;

/// A 32-byte block hash.
///
/// Bytes are kept in display order: the first byte is the first pair of hex
/// digits printed by [`Display`](fmt::Display), and the hex text form parsed
/// by [`FromStr`] round-trips exactly.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The zero hash (32 zero bytes).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a Hash256 from a byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Parse 64 hex digits, with or without a leading `0x`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cairn_core::types::Hash256;
    /// let h = Hash256::from_hex(
    ///     "0x0000ae7791654eb9236eb62fe48f8796f7f8021561646783ec4e172a68a36af7",
    /// ).unwrap();
    /// assert_eq!(h.as_bytes()[2], 0xae);
    /// ```
    pub fn from_hex(s: &str) -> Result<Self, HashParseError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != 64 {
            return Err(HashParseError::InvalidLength(digits.len()));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| HashParseError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for Hash256 {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
