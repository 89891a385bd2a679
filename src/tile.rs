use serde::{Deserialize, Serialize};
use std::fmt;

/// Base move cost / priority-key arithmetic unit. Signed so the start-tile
/// bias (see `lattice::turn_of`/`moves_left_of`) can be negative.
pub type Cost = i64;

/// Sentinel a callback returns to forbid a move or entry outright.
pub const IMPOSSIBLE: Cost = i64::MAX;

/// Index of a tile in the host's map, in `[0, N)`. A thin newtype rather than
/// a bare integer so a tile index can never be silently added to a cost or a
/// turn number at a call site.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileIndex(pub u32);

impl TileIndex {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tile({})", self.0)
    }
}

impl From<u32> for TileIndex {
    fn from(v: u32) -> Self {
        TileIndex(v)
    }
}
