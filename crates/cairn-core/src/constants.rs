//! Protocol constants and network selection.

use std::fmt;
use std::str::FromStr;

/// Minimum depth, in blocks, of the sync checkpoint below the best tip.
///
/// Blocks at or below the sync checkpoint may not be replaced by a reorg.
pub const CHECKPOINT_SPAN: u64 = 5000;

/// Network type: Mainnet, Testnet, or Regtest.
///
/// Selects the hard-coded checkpoint table. Only mainnet carries
/// checkpoints; both test networks resolve to an empty table.
///
/// # Examples
///
/// ```
/// use cairn_core::constants::NetworkType;
/// let net = NetworkType::default();
/// assert_eq!(net, NetworkType::Mainnet);
/// assert!(!net.is_test_network());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NetworkType {
    /// Production network.
    #[default]
    Mainnet,
    /// Public test network.
    Testnet,
    /// Local regression-test network.
    Regtest,
}

impl NetworkType {
    /// Whether this is one of the alternate (non-production) networks.
    pub fn is_test_network(&self) -> bool {
        !matches!(self, Self::Mainnet)
    }

    /// Lowercase network name, as accepted by [`FromStr`].
    ///
    /// # Examples
    ///
    /// ```
    /// use cairn_core::constants::NetworkType;
    /// assert_eq!(NetworkType::Testnet.as_str(), "testnet");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Regtest => "regtest",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Ok(Self::Mainnet),
            "testnet" | "test" => Ok(Self::Testnet),
            "regtest" => Ok(Self::Regtest),
            other => Err(format!("unknown network: {other}")),
        }
    }
}
