//! Allocation of opaque parent identifiers.
//!
//! Every projected parent in a [`SelectionProxyModel`](super::SelectionProxyModel)
//! is addressed by a [`ParentId`] that its children carry in their
//! `ModelIndex::internal_id`. The allocator hands out ids in growing blocks
//! and keeps numbering monotonic across [`clear`](IdentityAllocator::clear),
//! so an id issued before a clear can never alias one issued after it.

use std::fmt;
use std::num::NonZeroU64;

use horizon_itemviews_core::logging::targets;

/// Opaque identifier of a projected parent. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParentId(NonZeroU64);

impl ParentId {
    /// Rebuilds an id from its raw value; `0` yields `None`.
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Returns the raw value, as stored in a model index.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for ParentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

const INITIAL_BLOCK_SIZE: u64 = 16;

/// Hands out [`ParentId`]s in growing blocks.
///
/// The first block holds 16 ids and each further block doubles in size. A
/// block is only a reservation of a numeric range; no memory is spent per id.
#[derive(Debug)]
pub struct IdentityAllocator {
    /// First id of the current generation; ids below it are stale.
    generation_start: u64,
    /// Next id to hand out.
    next: u64,
    /// One past the last id of the current block.
    block_end: u64,
    /// Size of the block that will be reserved next.
    next_block_size: u64,
    /// Blocks reserved since the last clear.
    blocks: usize,
}

impl Default for IdentityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityAllocator {
    /// Creates an allocator that has issued nothing yet.
    pub fn new() -> Self {
        Self {
            generation_start: 1,
            next: 1,
            block_end: 1,
            next_block_size: INITIAL_BLOCK_SIZE,
            blocks: 0,
        }
    }

    /// Returns an id that has not been issued before.
    pub fn create_id(&mut self) -> ParentId {
        if self.next == self.block_end {
            self.grow();
        }
        let raw = self.next;
        self.next += 1;
        // `next` starts at 1 and only grows.
        ParentId(NonZeroU64::MIN.saturating_add(raw - 1))
    }

    fn grow(&mut self) {
        self.block_end = self.next.saturating_add(self.next_block_size);
        self.blocks += 1;
        tracing::trace!(
            target: targets::PROXY,
            block = self.blocks,
            size = self.next_block_size,
            "parent id block reserved"
        );
        self.next_block_size = self.next_block_size.saturating_mul(2);
    }

    /// Invalidates every id issued so far.
    pub fn clear(&mut self) {
        self.generation_start = self.next;
        self.block_end = self.next;
        self.next_block_size = INITIAL_BLOCK_SIZE;
        self.blocks = 0;
    }

    /// Returns `true` if `id` was issued since the last clear.
    pub fn is_live(&self, id: ParentId) -> bool {
        (self.generation_start..self.next).contains(&id.get())
    }

    /// Number of ids issued since the last clear.
    pub fn issued(&self) -> u64 {
        self.next - self.generation_start
    }

    /// Number of blocks reserved since the last clear.
    pub fn block_count(&self) -> usize {
        self.blocks
    }
}
