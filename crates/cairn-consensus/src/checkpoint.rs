//! Hardened and sync checkpoint verification.
//!
//! Two independent guards protect the chain against alternate histories:
//!
//! - **Hardened checkpoints** pin the block hash at selected heights. Any
//!   block at a checkpointed height whose hash disagrees is rejected outright.
//! - **The sync checkpoint** is a reorg floor derived from the current best
//!   tip: the first ancestor at least [`CHECKPOINT_SPAN`] blocks deep (or
//!   genesis on a shorter chain). Competing blocks at or below it may not
//!   take part in chain reselection.
//!
//! # Attack vectors
//!
//! - **Long-range rewrite:** an attacker with enough hash power could
//!   otherwise rebuild arbitrarily deep history. The sync checkpoint bounds
//!   how far back a reorg may reach; hardened checkpoints pin the early chain
//!   absolutely.
//! - **Checkpoint spoofing:** the tables are compiled into the binary. An
//!   attacker would need to distribute a modified binary, which is outside
//!   our threat model.
//!
//! # Locking
//!
//! The sync-checkpoint walk reads the tip height once and then follows parent
//! links, so it needs a consistent view of the block index for the whole
//! call. Functions taking `&impl BlockIndexView` rely on the caller holding
//! the chain-state lock across the call; the `*_locked` variants take a
//! [`SharedBlockIndex`] and hold one read guard for the duration.
//!
//! # Usage
//!
//! The block acceptance pipeline calls [`check_hardened`] (or
//! [`verify_hardened`]) for every incoming header before indexing it, and
//! [`check_sync`] (or [`verify_sync`]) before letting a competing block
//! participate in reorg. The `_with` variants take an explicit table and are
//! what tests drive.

use cairn_core::block_index::{BlockId, BlockIndexNode, BlockIndexView, SharedBlockIndex};
use cairn_core::constants::{CHECKPOINT_SPAN, NetworkType};
use cairn_core::error::CheckpointError;
use cairn_core::types::Hash256;
use tracing::{debug, warn};

use crate::table::CheckpointTable;

/// Returns `true` unless `height` is checkpointed on `network` with a
/// different hash.
pub fn check_hardened(network: NetworkType, height: u64, hash: &Hash256) -> bool {
    check_hardened_with(CheckpointTable::for_network(network), height, hash)
}

/// Like [`check_hardened`] but takes an explicit checkpoint table.
pub fn check_hardened_with(table: &CheckpointTable, height: u64, hash: &Hash256) -> bool {
    match table.get(height) {
        Some(expected) => expected == hash,
        None => true,
    }
}

/// Verify that a block at `height` agrees with the hardened checkpoints.
///
/// # Errors
///
/// Returns [`CheckpointError::Mismatch`] when `height` is checkpointed and
/// `hash` differs. The block must be rejected.
pub fn verify_hardened(
    network: NetworkType,
    height: u64,
    hash: &Hash256,
) -> Result<(), CheckpointError> {
    verify_hardened_with(CheckpointTable::for_network(network), height, hash)
}

/// Like [`verify_hardened`] but takes an explicit checkpoint table.
pub fn verify_hardened_with(
    table: &CheckpointTable,
    height: u64,
    hash: &Hash256,
) -> Result<(), CheckpointError> {
    match table.get(height) {
        Some(expected) if expected != hash => {
            warn!(height, %expected, got = %hash, "block hash disagrees with checkpoint");
            Err(CheckpointError::Mismatch {
                height,
                expected: *expected,
                got: *hash,
            })
        }
        _ => Ok(()),
    }
}

/// Height of the highest checkpoint on `network`, or 0 if there are none.
///
/// A rough progress estimate for sync reporting. Never use it for consensus
/// decisions.
pub fn total_blocks_estimate(network: NetworkType) -> u64 {
    total_blocks_estimate_with(CheckpointTable::for_network(network))
}

/// Like [`total_blocks_estimate`] but with an explicit checkpoint table.
pub fn total_blocks_estimate_with(table: &CheckpointTable) -> u64 {
    table.max_height().unwrap_or(0)
}

/// The highest checkpoint on `network` that `index` has already indexed.
///
/// Returns `None` when no checkpointed hash is present, e.g. early in
/// initial sync or on a network without checkpoints.
pub fn last_checkpoint<I>(network: NetworkType, index: &I) -> Option<BlockId>
where
    I: BlockIndexView + ?Sized,
{
    last_checkpoint_with(CheckpointTable::for_network(network), index)
}

/// Like [`last_checkpoint`] but with an explicit checkpoint table.
///
/// Scans strictly from the highest checkpoint down, so a lower checkpoint is
/// never returned while a higher one resolves.
pub fn last_checkpoint_with<I>(table: &CheckpointTable, index: &I) -> Option<BlockId>
where
    I: BlockIndexView + ?Sized,
{
    table.iter_rev().find_map(|(_, hash)| index.lookup(hash))
}

/// Walk back from `tip` to the sync checkpoint.
///
/// Follows parent links while a parent exists and the current block is less
/// than [`CHECKPOINT_SPAN`] blocks below `tip`. The result is the first
/// ancestor at least `CHECKPOINT_SPAN` deep, or genesis when the chain is
/// shorter than that.
///
/// The tip height is read once before the walk. The caller must hold the
/// chain-state lock across the call.
pub fn auto_select_sync_checkpoint<I>(index: &I, tip: BlockId) -> BlockId
where
    I: BlockIndexView + ?Sized,
{
    let tip_height = index.height(tip);
    let mut current = tip;
    while let Some(parent) = index.parent(current) {
        if index.height(current).saturating_add(CHECKPOINT_SPAN) <= tip_height {
            break;
        }
        current = parent;
    }
    current
}

/// The sync checkpoint for the current best tip of `index`.
///
/// Returns `None` only when nothing is indexed.
pub fn sync_checkpoint<I>(index: &I) -> Option<BlockId>
where
    I: BlockIndexView + ?Sized,
{
    let tip = index.best_tip()?;
    let sync = auto_select_sync_checkpoint(index, tip);
    debug!(
        tip_height = index.height(tip),
        sync_height = index.height(sync),
        "selected sync checkpoint"
    );
    Some(sync)
}

/// Whether a block at `height` may still take part in a reorg.
///
/// `false` when `height` is at or below the sync checkpoint of the current
/// best tip. Recomputed on every call. An empty index has no floor.
pub fn check_sync<I>(index: &I, height: u64) -> bool
where
    I: BlockIndexView + ?Sized,
{
    match sync_checkpoint(index) {
        Some(sync) => height > index.height(sync),
        None => true,
    }
}

/// Verify that a block at `height` is above the sync checkpoint.
///
/// # Errors
///
/// Returns [`CheckpointError::BelowSyncCheckpoint`] when `height` is at or
/// below the floor.
pub fn verify_sync<I>(index: &I, height: u64) -> Result<(), CheckpointError>
where
    I: BlockIndexView + ?Sized,
{
    let Some(sync) = sync_checkpoint(index) else {
        return Ok(());
    };
    let sync_height = index.height(sync);
    if height <= sync_height {
        debug!(height, sync_height, "rejected block below sync checkpoint");
        return Err(CheckpointError::BelowSyncCheckpoint {
            height,
            sync_height,
        });
    }
    Ok(())
}

/// [`check_sync`] under a single read lock of `shared`.
pub fn check_sync_locked(shared: &SharedBlockIndex, height: u64) -> bool {
    let index = shared.read();
    check_sync(&*index, height)
}

/// The sync checkpoint node under a single read lock of `shared`.
pub fn sync_checkpoint_locked(shared: &SharedBlockIndex) -> Option<BlockIndexNode> {
    let index = shared.read();
    sync_checkpoint(&*index).map(|id| index.node(id).clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::block_index::MemoryBlockIndex;

    /// A test-only table with entries at heights {0, 1, 2, 3, 5}.
    fn test_table() -> CheckpointTable {
        CheckpointTable::from_list([
            (0, Hash256([0xA0; 32])),
            (1, Hash256([0xB1; 32])),
            (2, Hash256([0xC2; 32])),
            (3, Hash256([0xD3; 32])),
            (5, Hash256([0xE5; 32])),
        ])
        .unwrap()
    }

    /// Hash of the block at `height` in a synthetic linear chain.
    fn block_hash(height: u64) -> Hash256 {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&height.to_le_bytes());
        bytes[31] = 0xC0;
        Hash256(bytes)
    }

    /// Linear chain of heights `0..=tip`, tip set as best.
    fn linear_chain(tip: u64) -> MemoryBlockIndex {
        let mut index = MemoryBlockIndex::with_genesis(block_hash(0));
        for height in 1..=tip {
            index.insert(&block_hash(height - 1), block_hash(height)).unwrap();
        }
        index.set_best_tip(&block_hash(tip)).unwrap();
        index
    }

    // ------------------------------------------------------------------
    // check_hardened
    // ------------------------------------------------------------------

    #[test]
    fn hardened_passes_for_matching_hash() {
        let table = test_table();
        assert!(check_hardened_with(&table, 3, &Hash256([0xD3; 32])));
        assert!(check_hardened_with(&table, 0, &Hash256([0xA0; 32])));
        assert!(verify_hardened_with(&table, 5, &Hash256([0xE5; 32])).is_ok());
    }

    #[test]
    fn hardened_fails_for_wrong_hash() {
        let table = test_table();
        let wrong = Hash256([0xFF; 32]);
        assert!(!check_hardened_with(&table, 3, &wrong));

        let err = verify_hardened_with(&table, 3, &wrong).unwrap_err();
        assert_eq!(
            err,
            CheckpointError::Mismatch {
                height: 3,
                expected: Hash256([0xD3; 32]),
                got: wrong,
            }
        );
    }

    #[test]
    fn no_checkpoint_at_height_passes() {
        let table = test_table();
        let arbitrary = Hash256([0xDE; 32]);
        for height in [4, 6, 100, u64::MAX] {
            assert!(
                check_hardened_with(&table, height, &arbitrary),
                "height {height} should pass with no checkpoint"
            );
        }
    }

    #[test]
    fn mainnet_hardened_checkpoints() {
        let genesis = Hash256::from_hex(
            "0x0000ae7791654eb9236eb62fe48f8796f7f8021561646783ec4e172a68a36af7",
        )
        .unwrap();
        assert!(check_hardened(NetworkType::Mainnet, 0, &genesis));
        assert!(!check_hardened(NetworkType::Mainnet, 0, &Hash256::ZERO));
        assert!(check_hardened(NetworkType::Mainnet, 4, &Hash256::ZERO));
        assert!(verify_hardened(NetworkType::Mainnet, 6000, &Hash256::ZERO).is_err());
    }

    #[test]
    fn test_networks_never_reject() {
        for net in [NetworkType::Testnet, NetworkType::Regtest] {
            assert!(check_hardened(net, 0, &Hash256::ZERO));
            assert!(verify_hardened(net, 6000, &Hash256::ZERO).is_ok());
        }
    }

    // ------------------------------------------------------------------
    // total_blocks_estimate
    // ------------------------------------------------------------------

    #[test]
    fn estimate_is_highest_checkpoint() {
        assert_eq!(total_blocks_estimate_with(&test_table()), 5);
        assert_eq!(total_blocks_estimate(NetworkType::Mainnet), 6000);
    }

    #[test]
    fn estimate_is_zero_without_checkpoints() {
        assert_eq!(total_blocks_estimate_with(&CheckpointTable::default()), 0);
        assert_eq!(total_blocks_estimate(NetworkType::Testnet), 0);
        assert_eq!(total_blocks_estimate(NetworkType::Regtest), 0);
    }

    // ------------------------------------------------------------------
    // last_checkpoint
    // ------------------------------------------------------------------

    #[test]
    fn last_checkpoint_prefers_highest_resolvable() {
        let index = linear_chain(20);
        let table = CheckpointTable::from_list([
            (2, block_hash(2)),
            (10, block_hash(10)),
            (15, block_hash(15)),
            (30, block_hash(30)),
        ])
        .unwrap();
        let found = last_checkpoint_with(&table, &index).unwrap();
        assert_eq!(index.height(found), 15);
    }

    #[test]
    fn last_checkpoint_none_when_nothing_resolves() {
        let index = linear_chain(5);
        assert_eq!(last_checkpoint_with(&test_table(), &index), None);
        assert_eq!(last_checkpoint_with(&CheckpointTable::default(), &index), None);
        assert_eq!(last_checkpoint(NetworkType::Testnet, &index), None);
    }

    #[test]
    fn last_checkpoint_uses_directory_not_height() {
        // The checkpoint hash is indexed on a side branch at a different
        // height; the scan resolves by hash alone.
        let mut index = linear_chain(3);
        index.insert(&block_hash(1), Hash256([0x77; 32])).unwrap();
        let table = CheckpointTable::from_list([(9, Hash256([0x77; 32]))]).unwrap();
        let found = last_checkpoint_with(&table, &index).unwrap();
        assert_eq!(index.node(found).hash, Hash256([0x77; 32]));
        assert_eq!(index.height(found), 2);
    }

    // ------------------------------------------------------------------
    // auto_select_sync_checkpoint / check_sync
    // ------------------------------------------------------------------

    #[test]
    fn sync_checkpoint_is_span_below_tip() {
        let index = linear_chain(12_000);
        let tip = index.best_tip().unwrap();
        let sync = auto_select_sync_checkpoint(&index, tip);
        assert_eq!(index.height(sync), 7000);

        assert!(!check_sync(&index, 6999));
        assert!(!check_sync(&index, 7000));
        assert!(check_sync(&index, 7001));
        assert!(check_sync(&index, 7002));
        assert!(check_sync(&index, 12_001));
    }

    #[test]
    fn short_chain_floor_is_genesis() {
        let index = linear_chain(100);
        let sync = sync_checkpoint(&index).unwrap();
        assert_eq!(index.height(sync), 0);
        assert_eq!(index.parent(sync), None);
        assert!(!check_sync(&index, 0));
        assert!(check_sync(&index, 1));
    }

    #[test]
    fn chain_exactly_span_long() {
        let index = linear_chain(CHECKPOINT_SPAN);
        let sync = sync_checkpoint(&index).unwrap();
        assert_eq!(index.height(sync), 0);

        let index = linear_chain(CHECKPOINT_SPAN - 1);
        let sync = sync_checkpoint(&index).unwrap();
        assert_eq!(index.height(sync), 0);

        let index = linear_chain(CHECKPOINT_SPAN + 1);
        let sync = sync_checkpoint(&index).unwrap();
        assert_eq!(index.height(sync), 1);
    }

    #[test]
    fn genesis_only_index() {
        let index = MemoryBlockIndex::with_genesis(block_hash(0));
        let sync = sync_checkpoint(&index).unwrap();
        assert_eq!(sync, index.genesis().unwrap());
        assert!(!check_sync(&index, 0));
        assert!(check_sync(&index, 1));
    }

    #[test]
    fn empty_index_has_no_floor() {
        let index = MemoryBlockIndex::new();
        assert_eq!(sync_checkpoint(&index), None);
        assert!(check_sync(&index, 0));
        assert!(verify_sync(&index, 0).is_ok());
    }

    #[test]
    fn verify_sync_reports_floor() {
        let index = linear_chain(12_000);
        let err = verify_sync(&index, 6500).unwrap_err();
        assert_eq!(
            err,
            CheckpointError::BelowSyncCheckpoint {
                height: 6500,
                sync_height: 7000,
            }
        );
        assert!(verify_sync(&index, 7001).is_ok());
    }

    #[test]
    fn floor_follows_best_tip_not_longest_branch() {
        let mut index = linear_chain(6000);
        // Side branch forking at height 10, best tip moved onto it.
        let mut parent = block_hash(10);
        for n in 0..20u8 {
            let hash = Hash256([n; 32]);
            index.insert(&parent, hash).unwrap();
            parent = hash;
        }
        index.set_best_tip(&parent).unwrap();
        // Side tip is at height 30, far shorter than the span.
        assert_eq!(index.height(sync_checkpoint(&index).unwrap()), 0);

        index.set_best_tip(&block_hash(6000)).unwrap();
        assert_eq!(index.height(sync_checkpoint(&index).unwrap()), 1000);
    }

    #[test]
    fn locked_variants_match_unlocked() {
        let shared = linear_chain(12_000).into_shared();
        let node = sync_checkpoint_locked(&shared).unwrap();
        assert_eq!(node.height, 7000);
        assert_eq!(node.hash, block_hash(7000));
        assert!(!check_sync_locked(&shared, 7000));
        assert!(check_sync_locked(&shared, 7001));

        // The floor moves as soon as the tip advances.
        {
            let mut index = shared.write();
            index.insert(&block_hash(12_000), block_hash(12_001)).unwrap();
            index.set_best_tip(&block_hash(12_001)).unwrap();
        }
        assert!(!check_sync_locked(&shared, 7001));
        assert!(check_sync_locked(&shared, 7002));
    }
}
