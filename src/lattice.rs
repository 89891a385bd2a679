use crate::action::Action;
use crate::behavior::TileBehavior;
use crate::direction::Direction;
use crate::knowledge::Knowledge;
use crate::scope::MoveScope;
use crate::tile::{Cost, TileIndex};
use crate::zoc::ZocClass;

/// Chosen large enough that `TURN_FACTOR * cost` dominates any plausible
/// extra-cost accumulation, so `key(c, e) = c * TURN_FACTOR + e` orders
/// lexicographically on `(c, e)` without needing a move-rate-derived scale
/// factor on `e`: adding it in unscaled already satisfies that ordering as
/// long as `e` never approaches `TURN_FACTOR`.
pub const TURN_FACTOR: i64 = 1 << 24;

/// Priority key combining base cost and extra cost into one orderable
/// integer.
pub fn priority_key(cost: Cost, extra_cost: i64) -> i64 {
    cost.saturating_mul(TURN_FACTOR).saturating_add(extra_cost)
}

/// The zero-based turn on which a node with internal cost `c` is reached.
/// `move_rate == 0` collapses every cost to turn `0`, matching the boundary
/// rule that every non-start tile is unreachable once nothing can ever be
/// spent.
pub fn turn_of(cost: Cost, move_rate: i64) -> i64 {
    if move_rate <= 0 || cost <= 0 {
        0
    } else {
        cost / move_rate
    }
}

/// `move_rate - (c mod move_rate)`: moves remaining this turn after
/// spending cost `c`.
///
/// `move_rate <= 0` has no multiple of anything to take a modulus against;
/// in that case the only moves an actor can ever spend are the bonus
/// encoded by a negative start bias, so remaining moves are simply "how far
/// `cost` still is from zero", floored at zero once that one-time budget is
/// exhausted.
pub fn moves_left_of(cost: Cost, move_rate: i64) -> i64 {
    if move_rate <= 0 {
        return (-cost).max(0);
    }
    move_rate - cost.rem_euclid(move_rate)
}

/// Applies the within-turn cost clamp: a step never costs more than the
/// mover has left to spend this turn. When nothing at all is left to spend
/// (only reachable when `move_rate <= 0` has exhausted its one-time bonus
/// budget, since `moves_left_of` otherwise never returns zero) the edge is
/// rejected outright rather than treated as free.
pub fn clamp_to_turn(raw_cost: Cost, u_cost: Cost, move_rate: i64) -> Option<Cost> {
    let remaining = moves_left_of(u_cost, move_rate);
    if remaining <= 0 {
        return None;
    }
    Some(raw_cost.min(remaining))
}

/// The per-tile search status.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum NodeStatus {
    #[default]
    Uninit,
    Init,
    Open,
    Waiting,
    Closed,
}

/// Attributes cached from callbacks the first time a tile is visited.
/// Shared by all three finders; each finder additionally carries its own
/// extra payload `E`.
#[derive(Clone, Debug, Default)]
pub struct Node<E> {
    pub status: NodeStatus,
    pub cost: Cost,
    pub extra_cost: i64,
    pub dir_to_here: Option<Direction>,
    pub move_scope: MoveScope,
    pub can_disembark: bool,
    pub action: Action,
    pub behavior: TileBehavior,
    pub zoc_class: ZocClass,
    pub knowledge: Knowledge,
    /// This tile's own contribution to extra cost (`get_EC`); added once
    /// when a path settles on it.
    pub extra_tile: i64,
    pub extra: E,
}

/// Per-tile lattice storage.
///
/// The engine is never given an explicit map size `N` — the host only ever
/// hands it a `start_tile` and a `step` callback to discover neighbors on
/// demand. A dense `Vec<Node<E>>` would need `N` up front, so this stores
/// nodes in a `HashMap` keyed by `TileIndex` and default-initializes an
/// entry (status `Uninit`) the first time it is touched, growing on demand
/// the same way the priority queue does. Density is still `O(1)` per lookup
/// and the map never holds more entries than tiles actually visited.
pub struct Lattice<E> {
    nodes: std::collections::HashMap<TileIndex, Node<E>>,
}

impl<E: Default + Clone> Lattice<E> {
    pub fn new() -> Self {
        Self {
            nodes: std::collections::HashMap::new(),
        }
    }

    pub fn visited(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, tile: TileIndex) -> Node<E> {
        self.nodes.get(&tile).cloned().unwrap_or_default()
    }

    pub fn status_of(&self, tile: TileIndex) -> NodeStatus {
        self.nodes.get(&tile).map(|n| n.status).unwrap_or_default()
    }

    pub fn get_mut(&mut self, tile: TileIndex) -> &mut Node<E> {
        self.nodes.entry(tile).or_default()
    }

    pub fn try_get(&self, tile: TileIndex) -> Option<&Node<E>> {
        self.nodes.get(&tile)
    }
}

impl<E: Default + Clone> Default for Lattice<E> {
    fn default() -> Self {
        Self::new()
    }
}
