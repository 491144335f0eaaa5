//! # cairn-consensus: checkpoint-based chain integrity.
//!
//! Hard-coded checkpoint tables, hardened-checkpoint verification, and the
//! sync checkpoint that bounds how deep a reorg may reach. The block index
//! itself is owned by the caller and read through
//! [`BlockIndexView`](cairn_core::block_index::BlockIndexView).

pub mod checkpoint;
pub mod guard;
pub mod table;

pub use checkpoint::{
    auto_select_sync_checkpoint, check_hardened, check_sync, last_checkpoint, sync_checkpoint,
    total_blocks_estimate, verify_hardened, verify_sync,
};
pub use guard::CheckpointGuard;
pub use table::CheckpointTable;
