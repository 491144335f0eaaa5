//! Error types for the Cairn checkpoint guard.
use thiserror::Error;

use crate::types::Hash256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashParseError {
    #[error("expected 64 hex digits, got {0}")] InvalidLength(usize),
    #[error("invalid hex: {0}")] InvalidHex(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckpointError {
    #[error("checkpoint mismatch at height {height}: expected {expected}, got {got}")]
    Mismatch { height: u64, expected: Hash256, got: Hash256 },
    #[error("height {height} is at or below sync checkpoint {sync_height}")]
    BelowSyncCheckpoint { height: u64, sync_height: u64 },
    #[error("duplicate checkpoint height: {0}")] DuplicateHeight(u64),
    #[error("invalid checkpoint hash: {0}")] InvalidHash(#[from] HashParseError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockIndexError {
    #[error("duplicate block: {0}")] DuplicateBlock(Hash256),
    #[error("unknown parent: {0}")] UnknownParent(Hash256),
    #[error("genesis already indexed")] GenesisExists,
    #[error("unknown tip: {0}")] UnknownTip(Hash256),
    #[error("block index full")] Full,
}
