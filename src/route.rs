//! Reference-counted path-segment chains, shared by the danger and fuel
//! finders wherever a node's settled route can't simply be reread off
//! `dir_to_here` — because a later expansion reopens an already-closed tile
//! (fuel) or re-expands a closed tile from a synthetic waited cost without
//! touching its own settled fields (danger, fuel). Each arrival builds a new
//! `RouteNode` that clones its predecessor's chain (an `Rc` clone, not a deep
//! copy), so a downstream tile that already captured a reference to an
//! ancestor's route keeps a valid, frozen view of it even after the ancestor
//! itself is later reassigned a different route.
use crate::direction::Direction;
use crate::tile::{Cost, TileIndex};
use std::rc::Rc;

#[derive(Debug)]
pub struct RouteNode {
    pub tile: TileIndex,
    pub cost: Cost,
    pub extra_cost: i64,
    pub moves_left: i64,
    /// Direction used to arrive at `tile`; `None` at the start of a route or
    /// for a synthesized wait-in-place step.
    pub dir_to_here: Option<Direction>,
    pub prev: Route,
}

/// `None` is the empty route (nothing settled yet); `Some` is the most
/// recent arrival, chained back through `prev` to the start.
pub type Route = Option<Rc<RouteNode>>;

/// Appends one arrival onto `prev`, returning the new route head.
pub fn push(
    prev: &Route,
    tile: TileIndex,
    cost: Cost,
    extra_cost: i64,
    moves_left: i64,
    dir_to_here: Option<Direction>,
) -> Route {
    Some(Rc::new(RouteNode {
        tile,
        cost,
        extra_cost,
        moves_left,
        dir_to_here,
        prev: prev.clone(),
    }))
}

/// Collects a route into `(tile, cost, extra_cost, moves_left, dir_to_here)`
/// tuples in start-to-end order.
pub fn collect(route: &Route) -> Vec<(TileIndex, Cost, i64, i64, Option<Direction>)> {
    let mut out = Vec::new();
    let mut cur = route.clone();
    while let Some(node) = cur {
        out.push((node.tile, node.cost, node.extra_cost, node.moves_left, node.dir_to_here));
        cur = node.prev.clone();
    }
    out.reverse();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwriting_a_node_does_not_disturb_a_previously_cloned_downstream_route() {
        let start: Route = push(&None, TileIndex(0), 0, 0, 3, None);
        let mid = push(&start, TileIndex(1), 1, 0, 2, Some(Direction::East));
        let downstream = push(&mid, TileIndex(2), 2, 0, 1, Some(Direction::East));

        // Re-route tile 1 onto a different, worse chain after `downstream`
        // has already captured a clone of the original.
        let _replaced = push(&start, TileIndex(1), 5, 0, 0, Some(Direction::West));

        let collected = collect(&downstream);
        assert_eq!(collected.len(), 3);
        assert_eq!(collected[1].1, 1);
    }

    #[test]
    fn collect_starts_at_the_route_root() {
        let start: Route = push(&None, TileIndex(7), -2, 0, 5, None);
        let collected = collect(&start);
        assert_eq!(collected, vec![(TileIndex(7), -2, 0, 5, None)]);
    }
}
