//! Block index: the node's tree of known block headers.
//!
//! Provides the read-only [`BlockIndexView`] trait consumed by checkpoint
//! verification, and [`MemoryBlockIndex`], an arena implementation where
//! every node is addressed by a stable [`BlockId`] and parent links are
//! stored as ids rather than references.
//!
//! The index is owned by the validation pipeline. Checkpoint queries only
//! read it; callers that share it across threads wrap it in
//! [`SharedBlockIndex`] and hold the read lock for the duration of each
//! multi-step query.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::BlockIndexError;
use crate::types::Hash256;

/// Stable handle to a node in a block index arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u32);

impl BlockId {
    /// Position of the node in its arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single indexed block header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockIndexNode {
    /// Distance from genesis. Genesis is height 0.
    pub height: u64,
    /// Block header hash.
    pub hash: Hash256,
    /// Previous block, or `None` for genesis.
    pub parent: Option<BlockId>,
}

/// Read-only view of the block index.
///
/// Consumers must see a consistent snapshot for the duration of one logical
/// query: holding `&impl BlockIndexView` (or the read guard of a
/// [`SharedBlockIndex`]) across the whole call provides that.
pub trait BlockIndexView {
    /// Resolve a handle to its node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this index. A dangling id means the
    /// index itself is corrupt.
    fn node(&self, id: BlockId) -> &BlockIndexNode;

    /// Resolve a block hash to its handle. Returns `None` if not indexed.
    fn lookup(&self, hash: &Hash256) -> Option<BlockId>;

    /// Tip of the current best chain. Returns `None` if nothing is indexed.
    fn best_tip(&self) -> Option<BlockId>;

    /// Parent of `id`, or `None` at genesis.
    fn parent(&self, id: BlockId) -> Option<BlockId> {
        self.node(id).parent
    }

    /// Height of `id`.
    fn height(&self, id: BlockId) -> u64 {
        self.node(id).height
    }
}

/// Block index shared between the validation pipeline and its readers.
pub type SharedBlockIndex = Arc<RwLock<MemoryBlockIndex>>;

/// Largest number of nodes a [`MemoryBlockIndex`] can address.
pub const MAX_BLOCKS: usize = u32::MAX as usize;

/// In-memory arena of block index nodes.
///
/// Nodes are append-only; a [`BlockId`] stays valid for the lifetime of the
/// index. Side branches are kept alongside the best chain, and the best tip
/// is whatever the caller last passed to
/// [`set_best_tip`](MemoryBlockIndex::set_best_tip).
#[derive(Clone, Debug)]
pub struct MemoryBlockIndex {
    /// Arena storage, addressed by `BlockId`.
    nodes: Vec<BlockIndexNode>,
    /// Hash → handle directory.
    by_hash: HashMap<Hash256, BlockId>,
    /// Current best-chain tip.
    best: Option<BlockId>,
    /// Node count at which `insert` starts failing with `Full`.
    max_blocks: usize,
}

impl Default for MemoryBlockIndex {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            by_hash: HashMap::new(),
            best: None,
            max_blocks: MAX_BLOCKS,
        }
    }
}

impl MemoryBlockIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index holding only a genesis block, which is also the tip.
    pub fn with_genesis(hash: Hash256) -> Self {
        let mut index = Self::new();
        index.push_genesis(hash);
        index
    }

    /// Limit the arena to `max_blocks` nodes, capped at [`MAX_BLOCKS`].
    pub fn with_max_blocks(mut self, max_blocks: usize) -> Self {
        self.max_blocks = max_blocks.min(MAX_BLOCKS);
        self
    }

    /// Index the genesis block. Becomes the best tip.
    ///
    /// # Errors
    ///
    /// - [`BlockIndexError::GenesisExists`] if the index is not empty
    pub fn insert_genesis(&mut self, hash: Hash256) -> Result<BlockId, BlockIndexError> {
        if !self.nodes.is_empty() {
            return Err(BlockIndexError::GenesisExists);
        }
        Ok(self.push_genesis(hash))
    }

    fn push_genesis(&mut self, hash: Hash256) -> BlockId {
        let id = BlockId(0);
        self.nodes.push(BlockIndexNode {
            height: 0,
            hash,
            parent: None,
        });
        self.by_hash.insert(hash, id);
        self.best = Some(id);
        id
    }

    /// Index a block extending `parent_hash`. Height is the parent's plus one.
    ///
    /// Does not move the best tip.
    ///
    /// # Errors
    ///
    /// - [`BlockIndexError::DuplicateBlock`] if `hash` is already indexed
    /// - [`BlockIndexError::UnknownParent`] if `parent_hash` is not indexed
    /// - [`BlockIndexError::Full`] if the arena already holds its block limit
    pub fn insert(
        &mut self,
        parent_hash: &Hash256,
        hash: Hash256,
    ) -> Result<BlockId, BlockIndexError> {
        if self.by_hash.contains_key(&hash) {
            return Err(BlockIndexError::DuplicateBlock(hash));
        }
        let parent = self
            .lookup(parent_hash)
            .ok_or(BlockIndexError::UnknownParent(*parent_hash))?;
        if self.nodes.len() >= self.max_blocks {
            return Err(BlockIndexError::Full);
        }
        let id = u32::try_from(self.nodes.len())
            .map(BlockId)
            .map_err(|_| BlockIndexError::Full)?;
        let height = self.height(parent) + 1;
        self.nodes.push(BlockIndexNode {
            height,
            hash,
            parent: Some(parent),
        });
        self.by_hash.insert(hash, id);
        Ok(id)
    }

    /// Move the best-chain tip to an indexed block.
    ///
    /// # Errors
    ///
    /// - [`BlockIndexError::UnknownTip`] if `hash` is not indexed
    pub fn set_best_tip(&mut self, hash: &Hash256) -> Result<BlockId, BlockIndexError> {
        let id = self
            .lookup(hash)
            .ok_or(BlockIndexError::UnknownTip(*hash))?;
        self.best = Some(id);
        Ok(id)
    }

    /// Genesis handle, if indexed.
    pub fn genesis(&self) -> Option<BlockId> {
        (!self.nodes.is_empty()).then_some(BlockId(0))
    }

    /// Number of indexed blocks, across all branches.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no blocks are indexed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Wrap the index for sharing across threads.
    pub fn into_shared(self) -> SharedBlockIndex {
        Arc::new(RwLock::new(self))
    }
}

impl BlockIndexView for MemoryBlockIndex {
    fn node(&self, id: BlockId) -> &BlockIndexNode {
        &self.nodes[id.index()]
    }

    fn lookup(&self, hash: &Hash256) -> Option<BlockId> {
        self.by_hash.get(hash).copied()
    }

    fn best_tip(&self) -> Option<BlockId> {
        self.best
    }
}
