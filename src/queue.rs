use crate::tile::TileIndex;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Min-key priority queue over tile indices.
///
/// Backed by `std::collections::BinaryHeap`, which is a max-heap, wrapped in
/// `Reverse` to get "lowest key first". `insert` and `replace` both simply
/// push: a tile may have several physical entries in the heap at once after
/// an improvement. Duplicate keys and stale entries are both fine — every
/// finder's pop loop already discards an entry whose tile is no longer
/// `Open`/`Waiting` in the lattice, so there is no need for this queue to
/// maintain its own index for true decrease-key.
pub struct PriorityQueue {
    heap: BinaryHeap<Reverse<(i64, u32)>>,
}

impl PriorityQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn insert(&mut self, tile: TileIndex, key: i64) {
        self.heap.push(Reverse((key, tile.0)));
    }

    /// Lowers (or raises) the key at which `tile` is considered. A no-op in
    /// effect when `key` is not an improvement over the physical entry
    /// already queued for `tile`, since pop-time status checks ignore the
    /// worse entry regardless of which one the heap surfaces first.
    pub fn replace(&mut self, tile: TileIndex, key: i64) {
        self.insert(tile, key);
    }

    pub fn pop_min(&mut self) -> Option<(TileIndex, i64)> {
        self.heap.pop().map(|Reverse((key, idx))| (TileIndex(idx), key))
    }

    pub fn peek_min_key(&self) -> Option<i64> {
        self.heap.peek().map(|Reverse((key, _))| *key)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

impl Default for PriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}
