//! # cairn-core
//! Foundation types for the Cairn checkpoint guard: block hashes, network
//! selection, protocol constants, errors, and the block index arena.

pub mod block_index;
pub mod constants;
pub mod error;
pub mod types;
