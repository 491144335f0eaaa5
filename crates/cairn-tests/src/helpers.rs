//! Shared chain-building helpers for integration tests.

use cairn_core::block_index::MemoryBlockIndex;
use cairn_core::types::Hash256;
use cairn_consensus::CheckpointTable;

/// Deterministic hash for the main-chain block at `height`.
pub fn block_hash(height: u64) -> Hash256 {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&height.to_le_bytes());
    bytes[31] = 0x01;
    Hash256::from_bytes(bytes)
}

/// Deterministic hash for block `n` of side branch `branch`.
///
/// Never collides with [`block_hash`].
pub fn fork_hash(branch: u8, n: u64) -> Hash256 {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&n.to_le_bytes());
    bytes[30] = branch;
    bytes[31] = 0x02;
    Hash256::from_bytes(bytes)
}

/// Linear chain of heights `0..=tip` with the tip set as best.
pub fn linear_chain(tip: u64) -> MemoryBlockIndex {
    let mut index = MemoryBlockIndex::with_genesis(block_hash(0));
    extend_main_chain(&mut index, 0, tip);
    index
}

/// Append main-chain blocks `from + 1..=to` and move the best tip to `to`.
pub fn extend_main_chain(index: &mut MemoryBlockIndex, from: u64, to: u64) {
    for height in from + 1..=to {
        index
            .insert(&block_hash(height - 1), block_hash(height))
            .expect("main chain extends cleanly");
    }
    index
        .set_best_tip(&block_hash(to))
        .expect("main chain tip is indexed");
}

/// Grow side branch `branch` off the main-chain block at `fork_height`.
///
/// Does not move the best tip. Returns the hash of the branch tip, which
/// sits at height `fork_height + len`.
pub fn add_fork(index: &mut MemoryBlockIndex, branch: u8, fork_height: u64, len: u64) -> Hash256 {
    let mut parent = block_hash(fork_height);
    for n in 0..len {
        let hash = fork_hash(branch, n);
        index.insert(&parent, hash).expect("fork extends cleanly");
        parent = hash;
    }
    parent
}

/// Linear chain of heights `0..=tip` whose blocks carry the hard-coded
/// checkpoint hashes of `table` wherever one exists.
pub fn checkpointed_chain(table: &CheckpointTable, tip: u64) -> MemoryBlockIndex {
    let hash_at = |height: u64| table.get(height).copied().unwrap_or_else(|| block_hash(height));
    let mut index = MemoryBlockIndex::with_genesis(hash_at(0));
    for height in 1..=tip {
        index
            .insert(&hash_at(height - 1), hash_at(height))
            .expect("checkpointed chain extends cleanly");
    }
    index
        .set_best_tip(&hash_at(tip))
        .expect("checkpointed chain tip is indexed");
    index
}
