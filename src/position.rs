use crate::direction::Direction;
use crate::tile::{Cost, TileIndex};
use serde::{Deserialize, Serialize};

/// A single reached tile along a path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub tile: TileIndex,
    pub total_mc: Cost,
    pub total_ec: i64,
    pub turn: i64,
    pub moves_left: i64,
    pub fuel_left: i64,
    /// Direction used to arrive; `None` at the start position.
    pub dir_to_here: Option<Direction>,
    /// Direction leaving toward the next position; `None` for the last
    /// position and for a synthesized "wait here" entry.
    pub dir_to_next_pos: Option<Direction>,
}
