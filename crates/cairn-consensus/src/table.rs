//! Hard-coded checkpoint tables.
//!
//! A checkpoint pins the block hash the canonical chain must have at a given
//! height. A good checkpoint block is surrounded by blocks with reasonable
//! timestamps (none before it stamped later, none after it stamped earlier)
//! and contains no unusual transactions.
//!
//! The tables are compiled into the binary and never change at runtime.
//! Only mainnet has checkpoints; testnet and regtest resolve to an empty
//! table.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use cairn_core::constants::NetworkType;
use cairn_core::error::CheckpointError;
use cairn_core::types::Hash256;

/// Mainnet checkpoints as `(height, block_hash)` literals, ascending.
///
/// Dense over the first few hundred blocks, then every few hundred.
pub const MAINNET_CHECKPOINTS: &[(u64, &str)] = &[
    (0, "0x0000ae7791654eb9236eb62fe48f8796f7f8021561646783ec4e172a68a36af7"),
    (1, "0x09acce2d58beaf668e21e0872f96a83af906fec8e4747a5a2f665825d668b2a1"),
    (2, "0x16984499b3e37037630bc574f5c57457f7d850ef0aef0ab71cde07f83f3c82f6"),
    (3, "0x6a27f0d80b3ceb0958cd11c079258c32c9782ffb9ca2364200472678e42a2b35"),
    (5, "0x1ac424014092cb32c1ac71e0319a5243b1592466f7a482b1e7a774147cdef07b"),
    (10, "0x75469c9f207d79019d8e87f11cf8060186029acb8f60f2bac545c66d8675679a"),
    (20, "0x6d70c186b0829630902b1b71f181dcea3959f57267a8bceba42eb48491525a55"),
    (30, "0xc52c19b20b962046861ba473f181083c022aeb93ec00562254d887317669953e"),
    (50, "0xb14a2fa78830557a083cf6c19d21e3deb7e1face525702f2a250df1edda316d9"),
    (100, "0xd4c04d81bd528646ca6ff9302dc047bb86cda4b9f8d7982e33970af9f09c837f"),
    (150, "0x89e86eb29657c05d9c1f274e0500ce58b7ecb68a4131f6a8241f9b148012663c"),
    (200, "0x27e17b78edcffbc1a6ca6b53c8189d30f5332978e490ad0c86bcb604c572a05e"),
    (201, "0x38c5ca3d74d4e429809183e2c8048aa1cd5259b2a74f34083fc8ed205e72404c"),
    (205, "0x38cefe52cf24936e6b1c995978d78d646d1f093308abb51c5c681132fbdf09e3"),
    (210, "0xf760fdf1d1f4b29cabc0892bbce1d3c112730aa07f35672f9d17fb1f96382309"),
    (220, "0x10786bfc3ce92847b182a154e1bc70cf7b84a36d3a76eacc4d907b8fa9afa1c4"),
    (230, "0xce2791e89e68cd0eb70362498bb9ae595fdb2673b066626575fe6828b41b3365"),
    (300, "0x815ca5bd2e875d24cb5ecdf37736b8e18ddf086faf070b89435511bcb5027873"),
    (600, "0x98de6daf1ecb0caec0731a72bed6058b941d929055793f2c563a338cb053dc03"),
    (1200, "0x5fcfb3ec33db042421a8e99416e9dde7724815aa5307028803871b340eb51e8f"),
    (1800, "0x6f8794bcf80d2c6a3876c888e1f47ba5dd7419504d208cb41e0e55eefac6daa2"),
    (2400, "0xa7bad7e5986f74cfbc16b1f63b17b5baf27df555d764559aaf0fe9786ea4bd35"),
    (3000, "0xf1a6f34e5ce06b8080fb1e4f095344f9b4ab51772032fb2539c1507dd1a1f490"),
    (3600, "0xaff6aec357d620b615a3135dd310d897e519c267826e5afa158e03a00403279c"),
    (4000, "0x1eaeaea2b7fac4e0cf7312079b25dd8c3b2980f2f95137e871d30816099484df"),
    (4600, "0x9eb663c4c54740ece83f29b199cbed14d2d5bd837d262287386ba6065d5c3e91"),
    (5000, "0xba136935c2667fbf88f8b9b03765f4f602babcad917acd71c46c84ba58ba2081"),
    (5600, "0x41868a23fec52ffcd29dcc941def9413305f37a2da323a704011fecd99650a4d"),
    (6000, "0x688a4fad022ab255d540ca883d9308f8a7b7e5583fabb2392cde6b7daafa4251"),
];

static MAINNET: LazyLock<CheckpointTable> = LazyLock::new(|| {
    CheckpointTable::from_literals(MAINNET_CHECKPOINTS)
        .expect("hard-coded mainnet checkpoint table parses and validates")
});

static EMPTY: CheckpointTable = CheckpointTable(BTreeMap::new());

/// An immutable, height-ordered map of checkpoint heights to block hashes.
///
/// Heights are unique. Iteration is ascending; [`iter_rev`](Self::iter_rev)
/// walks from the highest checkpoint down.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckpointTable(BTreeMap<u64, Hash256>);

impl CheckpointTable {
    /// Returns the hard-coded table for `network`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cairn_consensus::CheckpointTable;
    /// use cairn_core::constants::NetworkType;
    ///
    /// assert_eq!(CheckpointTable::for_network(NetworkType::Mainnet).max_height(), Some(6000));
    /// assert!(CheckpointTable::for_network(NetworkType::Testnet).is_empty());
    /// ```
    pub fn for_network(network: NetworkType) -> &'static CheckpointTable {
        if network.is_test_network() {
            &EMPTY
        } else {
            LazyLock::force(&MAINNET)
        }
    }

    /// Build a table from `(height, hash)` pairs in any order.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::DuplicateHeight`] if a height repeats.
    pub fn from_list(
        list: impl IntoIterator<Item = (u64, Hash256)>,
    ) -> Result<Self, CheckpointError> {
        let mut map = BTreeMap::new();
        for (height, hash) in list {
            if map.insert(height, hash).is_some() {
                return Err(CheckpointError::DuplicateHeight(height));
            }
        }
        Ok(Self(map))
    }

    /// Build a table from `(height, "hex")` literals.
    pub fn from_literals(literals: &[(u64, &str)]) -> Result<Self, CheckpointError> {
        let parsed = literals
            .iter()
            .map(|&(height, hex)| Hash256::from_hex(hex).map(|hash| (height, hash)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_list(parsed)
    }

    /// The expected hash at `height`, if it is checkpointed.
    pub fn get(&self, height: u64) -> Option<&Hash256> {
        self.0.get(&height)
    }

    /// Whether `height` is checkpointed.
    pub fn contains(&self, height: u64) -> bool {
        self.0.contains_key(&height)
    }

    /// Highest checkpointed height, or `None` for an empty table.
    pub fn max_height(&self) -> Option<u64> {
        self.0.last_key_value().map(|(h, _)| *h)
    }

    /// Checkpoints in ascending height order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (u64, &Hash256)> + '_ {
        self.0.iter().map(|(h, hash)| (*h, hash))
    }

    /// Checkpoints in descending height order.
    pub fn iter_rev(&self) -> impl Iterator<Item = (u64, &Hash256)> + '_ {
        self.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
