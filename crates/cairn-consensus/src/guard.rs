//! Network-bound checkpoint guard.
//!
//! [`CheckpointGuard`] fixes the network once, at node startup, and exposes
//! the checkpoint queries the validation pipeline needs without threading
//! [`NetworkType`] through every call site.

use cairn_core::block_index::{BlockId, BlockIndexView};
use cairn_core::constants::NetworkType;
use cairn_core::error::CheckpointError;
use cairn_core::types::Hash256;

use crate::checkpoint;
use crate::table::CheckpointTable;

/// Checkpoint queries for one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckpointGuard {
    network: NetworkType,
}

impl CheckpointGuard {
    pub fn new(network: NetworkType) -> Self {
        Self { network }
    }

    pub fn network(&self) -> NetworkType {
        self.network
    }

    /// The hard-coded table for this guard's network.
    pub fn table(&self) -> &'static CheckpointTable {
        CheckpointTable::for_network(self.network)
    }

    /// See [`checkpoint::check_hardened`].
    pub fn check_hardened(&self, height: u64, hash: &Hash256) -> bool {
        checkpoint::check_hardened(self.network, height, hash)
    }

    /// See [`checkpoint::total_blocks_estimate`].
    pub fn total_blocks_estimate(&self) -> u64 {
        checkpoint::total_blocks_estimate(self.network)
    }

    /// See [`checkpoint::last_checkpoint`].
    pub fn last_checkpoint<I>(&self, index: &I) -> Option<BlockId>
    where
        I: BlockIndexView + ?Sized,
    {
        checkpoint::last_checkpoint(self.network, index)
    }

    /// See [`checkpoint::check_sync`].
    pub fn check_sync<I>(&self, index: &I, height: u64) -> bool
    where
        I: BlockIndexView + ?Sized,
    {
        checkpoint::check_sync(index, height)
    }

    /// Run every checkpoint rule against a block at `height` with `hash`.
    ///
    /// Hardened checkpoints are checked first, then the sync checkpoint.
    ///
    /// # Errors
    ///
    /// - [`CheckpointError::Mismatch`] if the hash contradicts a checkpoint
    /// - [`CheckpointError::BelowSyncCheckpoint`] if `height` is at or below
    ///   the reorg floor of the current best tip
    pub fn verify_block<I>(
        &self,
        index: &I,
        height: u64,
        hash: &Hash256,
    ) -> Result<(), CheckpointError>
    where
        I: BlockIndexView + ?Sized,
    {
        checkpoint::verify_hardened(self.network, height, hash)?;
        checkpoint::verify_sync(index, height)
    }
}
