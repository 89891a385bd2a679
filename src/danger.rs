use crate::action::Action;
use crate::behavior::TileBehavior;
use crate::callbacks::HostTypes;
use crate::direction::Direction;
use crate::error::PfError;
use crate::init::{init_common_attrs, zoc_blocks, CommonAttrs};
use crate::lattice::{clamp_to_turn, moves_left_of, priority_key, turn_of, Lattice, NodeStatus};
use crate::parameters::Parameters;
use crate::path::Path;
use crate::position::Position;
use crate::queue::PriorityQueue;
use crate::route::{self, Route};
use crate::scope::MoveScope;
use crate::tile::{Cost, TileIndex};
use std::cell::Cell;
use std::collections::HashMap;

/// Per-node payload the danger finder carries on top of the common
/// attributes: whether the tile is dangerous, whether a forced wait has
/// already been queued for it, and the reference-counted route chain that
/// reconstructs the path to this node independent of any later expansion
/// that re-derives neighbors from it at a different (waited) cost.
#[derive(Clone, Debug, Default)]
pub struct DangerExtra {
    pub dangerous: bool,
    pub waited: bool,
    pub route: Route,
}

/// A mover may never end its turn standing on a dangerous tile. This finder
/// keeps two queues, drained in a fixed priority order, plus an out-of-band
/// wait mechanism:
///
/// - `danger_queue` (keyed by raw cost alone) always drains first: once any
///   dangerous tile is reachable it is processed before any safe tile, so a
///   multi-tile dangerous run settles start-to-end before the search
///   wanders off elsewhere.
/// - `safe_queue` (keyed by the usual `(cost, extra_cost)` key) holds every
///   non-dangerous tile.
/// - When a safe tile closes with less than a full turn of moves left,
///   `wait_pending`/`wait_queue` record a *virtual* re-expansion of that
///   tile from a turn-boundary cost — without ever mutating the tile's own
///   settled `cost`/`extra_cost`, so `cost_to` stays stable regardless of
///   how many times a caller queries it. Entering a dangerous tile is
///   rejected outright if doing so would leave the mover with nothing left
///   to spend (it would then be stuck ending its turn there); the wait
///   re-expansion is what allows a later attempt at the same edge to
///   succeed with a full turn of moves restored.
pub struct DangerFinder<H: HostTypes> {
    params: Parameters<H>,
    lattice: Lattice<DangerExtra>,
    safe_queue: PriorityQueue,
    danger_queue: PriorityQueue,
    wait_queue: PriorityQueue,
    wait_pending: HashMap<TileIndex, (Cost, i64)>,
    bias: Cost,
    cursor: Option<TileIndex>,
    exhausted: bool,
    busy: Cell<bool>,
}

impl<H: HostTypes> DangerFinder<H> {
    pub fn new(params: Parameters<H>) -> Result<Self, PfError> {
        if params.callbacks.get_mc.is_none() {
            return Err(PfError::BadParameters(
                "danger finder requires get_mc".into(),
            ));
        }
        if params.callbacks.is_pos_dangerous.is_none() {
            return Err(PfError::BadParameters(
                "danger finder requires is_pos_dangerous".into(),
            ));
        }

        let bias = params.move_rate - params.moves_left_initially;
        let mut finder = Self {
            params,
            lattice: Lattice::new(),
            safe_queue: PriorityQueue::new(),
            danger_queue: PriorityQueue::new(),
            wait_queue: PriorityQueue::new(),
            wait_pending: HashMap::new(),
            bias,
            cursor: None,
            exhausted: false,
            busy: Cell::new(false),
        };
        finder.seed_start();
        Ok(finder)
    }

    fn is_dangerous(&self, tile: TileIndex, knowledge: crate::knowledge::Knowledge) -> bool {
        self.params
            .callbacks
            .is_pos_dangerous
            .as_ref()
            .map(|f| f(tile, knowledge, &self.params))
            .unwrap_or(false)
    }

    fn seed_start(&mut self) {
        let start = self.params.start_tile;
        let attrs = init_common_attrs(start, true, MoveScope::NONE, &self.params).unwrap_or(
            CommonAttrs {
                knowledge: Default::default(),
                behavior: TileBehavior::Normal,
                move_scope: MoveScope::NATIVE,
                can_disembark: true,
                action: Action::None,
                zoc_class: Default::default(),
                extra_tile: 0,
            },
        );
        let dangerous = self.is_dangerous(start, attrs.knowledge);
        let bias = self.bias;
        let route = route::push(
            &None,
            start,
            bias,
            attrs.extra_tile,
            moves_left_of(bias, self.params.move_rate),
            None,
        );

        let node = self.lattice.get_mut(start);
        node.status = NodeStatus::Closed;
        node.cost = bias;
        node.extra_cost = attrs.extra_tile;
        node.dir_to_here = None;
        node.move_scope = attrs.move_scope;
        node.can_disembark = attrs.can_disembark;
        node.action = attrs.action;
        node.behavior = attrs.behavior;
        node.zoc_class = attrs.zoc_class;
        node.knowledge = attrs.knowledge;
        node.extra_tile = attrs.extra_tile;
        node.extra = DangerExtra {
            dangerous,
            waited: false,
            route,
        };

        self.cursor = Some(start);
        let (cost, extra, route) = {
            let node = self.lattice.get(start);
            (node.cost, node.extra_cost, node.extra.route.clone())
        };
        self.expand_from(start, cost, extra, &route);
        if !dangerous {
            self.maybe_queue_wait(start);
        }
    }

    /// Edge relaxation away from `u_tile`, using `base_cost`/`base_extra`/
    /// `base_route` rather than `u`'s own settled fields — this is what lets
    /// a waited re-expansion run without ever touching `u`'s stored cost.
    fn expand_from(&mut self, u_tile: TileIndex, base_cost: Cost, base_extra: i64, base_route: &Route) {
        let u = self.lattice.get(u_tile);
        if u.behavior == TileBehavior::DontLeave {
            return;
        }
        let move_rate = self.params.move_rate;
        let remaining_before = moves_left_of(base_cost, move_rate);

        for dir in Direction::ALL {
            let Some(v_tile) = (self.params.callbacks.step)(u_tile, dir, &self.params.map_handle)
            else {
                continue;
            };
            if self.lattice.status_of(v_tile) == NodeStatus::Closed {
                continue;
            }

            if self.lattice.status_of(v_tile) == NodeStatus::Uninit {
                match init_common_attrs(v_tile, false, u.move_scope, &self.params) {
                    None => {
                        let node = self.lattice.get_mut(v_tile);
                        node.status = NodeStatus::Init;
                        node.behavior = TileBehavior::Ignore;
                        continue;
                    }
                    Some(attrs) => {
                        let dangerous = self.is_dangerous(v_tile, attrs.knowledge);
                        let node = self.lattice.get_mut(v_tile);
                        node.status = NodeStatus::Init;
                        node.knowledge = attrs.knowledge;
                        node.behavior = attrs.behavior;
                        node.move_scope = attrs.move_scope;
                        node.can_disembark = attrs.can_disembark;
                        node.action = attrs.action;
                        node.zoc_class = attrs.zoc_class;
                        node.extra_tile = attrs.extra_tile;
                        node.extra.dangerous = dangerous;
                    }
                }
            }

            let v = self.lattice.get(v_tile);
            if v.behavior == TileBehavior::Ignore {
                continue;
            }
            if zoc_blocks(u.zoc_class, v.zoc_class) {
                continue;
            }
            if !v.action.is_none() {
                if let Some(possible) = self.params.callbacks.is_action_possible.as_ref() {
                    if !possible(u_tile, u.move_scope, v_tile, v.action, &self.params) {
                        continue;
                    }
                }
            }

            let raw_cost = if v.action == Action::Attack {
                Some(move_rate)
            } else if !v.action.is_none() {
                Some(1)
            } else if v.knowledge.is_unknown() {
                Some(self.params.unknown_move_cost)
            } else {
                self.params
                    .callbacks
                    .get_mc
                    .as_ref()
                    .and_then(|f| f(u_tile, u.move_scope, v_tile, v.move_scope, &self.params))
            };
            let Some(raw_cost) = raw_cost else {
                continue;
            };
            let Some(step_cost) = clamp_to_turn(raw_cost, base_cost, move_rate) else {
                continue;
            };

            // A step onto a dangerous tile that would leave nothing to spend
            // this turn is impossible outright: the mover would be forced to
            // end its turn standing on it. This is what a forced wait on the
            // safe predecessor (see `maybe_queue_wait`) exists to fix, by
            // giving the next attempt a full turn of moves to work with.
            if v.extra.dangerous && step_cost >= remaining_before {
                continue;
            }

            let candidate_cost = base_cost + step_cost;
            let candidate_extra = base_extra + v.extra_tile;
            let candidate_key = priority_key(candidate_cost, candidate_extra);

            let improves = v.status == NodeStatus::Init
                || candidate_key < priority_key(v.cost, v.extra_cost);
            if improves {
                let new_route = route::push(
                    base_route,
                    v_tile,
                    candidate_cost,
                    candidate_extra,
                    moves_left_of(candidate_cost, move_rate),
                    Some(dir),
                );
                let dangerous = v.extra.dangerous;
                let node = self.lattice.get_mut(v_tile);
                node.cost = candidate_cost;
                node.extra_cost = candidate_extra;
                node.dir_to_here = Some(dir);
                node.status = NodeStatus::Open;
                node.extra.route = new_route;
                if dangerous {
                    self.danger_queue.insert(v_tile, candidate_cost);
                } else {
                    self.safe_queue.insert(v_tile, candidate_key);
                }
            }
        }
    }

    /// Queues a one-shot forced wait for a just-closed safe tile that has
    /// less than a full turn of moves remaining. The wait is represented
    /// purely out-of-band (`wait_pending`): it never rewrites the tile's own
    /// `cost`/`extra_cost`/`route`, only schedules a later re-expansion from
    /// a turn-boundary-refreshed cost. Most such re-expansions end up being
    /// no-ops (every neighbor already has a cheaper route), which is fine —
    /// they only matter for a neighbor that was rejected earlier for lack of
    /// moves, e.g. a dangerous tile right across the threshold.
    fn maybe_queue_wait(&mut self, tile: TileIndex) {
        let move_rate = self.params.move_rate;
        if move_rate <= 0 {
            return;
        }
        let node = self.lattice.get(tile);
        if node.extra.dangerous || node.extra.waited {
            return;
        }
        let remaining = moves_left_of(node.cost, move_rate);
        if remaining >= move_rate {
            return;
        }
        let waited_cost = node.cost + remaining;
        let key = priority_key(waited_cost, node.extra_cost);
        self.lattice.get_mut(tile).extra.waited = true;
        self.wait_pending.insert(tile, (waited_cost, node.extra_cost));
        self.wait_queue.insert(tile, key);
    }

    fn close_and_expand(&mut self, tile: TileIndex) {
        self.lattice.get_mut(tile).status = NodeStatus::Closed;
        self.cursor = Some(tile);
        let (cost, extra, route) = {
            let node = self.lattice.get(tile);
            (node.cost, node.extra_cost, node.extra.route.clone())
        };
        self.expand_from(tile, cost, extra, &route);
    }

    /// Re-expands a closed safe tile from its waited (turn-boundary) cost,
    /// without disturbing the tile's own settled `cost`/route.
    fn reexpand_after_wait(&mut self, tile: TileIndex, waited_cost: Cost, waited_extra: i64) {
        let (prev_route, dir_to_here, old_cost) = {
            let node = self.lattice.get(tile);
            let prev = node.extra.route.as_ref().and_then(|r| r.prev.clone());
            let dir = node.extra.route.as_ref().and_then(|r| r.dir_to_here);
            (prev, dir, node.cost)
        };
        let moves_left = moves_left_of(waited_cost, self.params.move_rate);
        let wait_route = route::push(&prev_route, tile, waited_cost, waited_extra, moves_left, dir_to_here);
        tracing::debug!(
            "waiting out a turn at safe tile {} ({} -> {})",
            tile.0,
            old_cost,
            waited_cost
        );
        self.expand_from(tile, waited_cost, waited_extra, &wait_route);
    }

    pub fn settle_next(&mut self) -> Option<TileIndex> {
        debug_assert!(!self.busy.get(), "DangerFinder is not re-entrant");
        self.busy.set(true);
        let result = loop {
            if let Some((tile, _key)) = self.danger_queue.pop_min() {
                if self.lattice.status_of(tile) != NodeStatus::Open {
                    continue;
                }
                self.close_and_expand(tile);
                break Some(tile);
            }

            let safe_key = self.safe_queue.peek_min_key();
            let wait_key = self.wait_queue.peek_min_key();
            let take_wait = match (safe_key, wait_key) {
                (_, None) => false,
                (None, Some(_)) => true,
                (Some(sk), Some(wk)) => wk < sk,
            };

            if take_wait {
                let (tile, _key) = self.wait_queue.pop_min().unwrap();
                let Some((waited_cost, waited_extra)) = self.wait_pending.remove(&tile) else {
                    continue;
                };
                if self.lattice.status_of(tile) != NodeStatus::Closed {
                    continue;
                }
                self.reexpand_after_wait(tile, waited_cost, waited_extra);
                continue;
            }

            let Some((tile, _key)) = self.safe_queue.pop_min() else {
                self.exhausted = true;
                break None;
            };
            if self.lattice.status_of(tile) != NodeStatus::Open {
                continue;
            }
            self.close_and_expand(tile);
            self.maybe_queue_wait(tile);
            break Some(tile);
        };
        self.busy.set(false);
        result
    }

    fn ensure_settled(&mut self, tile: TileIndex) {
        while self.lattice.status_of(tile) != NodeStatus::Closed && !self.exhausted {
            if self.settle_next().is_none() {
                break;
            }
        }
    }

    pub fn cost_to(&mut self, tile: TileIndex) -> Option<Cost> {
        self.ensure_settled(tile);
        if self.lattice.status_of(tile) == NodeStatus::Closed {
            let node = self.lattice.get(tile);
            if node.extra.dangerous {
                // A dangerous tile is never a valid place to end a turn, so
                // it can never be reported as reachable even though the
                // search may pass through it.
                return None;
            }
            Some(node.cost - self.bias)
        } else {
            None
        }
    }

    pub fn path_to(&mut self, tile: TileIndex) -> Path {
        self.ensure_settled(tile);
        if self.lattice.status_of(tile) != NodeStatus::Closed {
            return Path::unreachable();
        }
        if self.lattice.get(tile).extra.dangerous {
            return Path::unreachable();
        }
        let route = self.lattice.get(tile).extra.route.clone();
        let mut positions = Vec::new();
        let mut cur = route;
        while let Some(node) = cur {
            positions.push(Position {
                tile: node.tile,
                total_mc: node.cost - self.bias,
                total_ec: node.extra_cost,
                turn: turn_of(node.cost, self.params.move_rate),
                moves_left: node.moves_left,
                fuel_left: self.params.fuel_left_initially,
                dir_to_here: node.dir_to_here,
                dir_to_next_pos: None,
            });
            cur = node.prev.clone();
        }
        positions.reverse();
        for i in 0..positions.len().saturating_sub(1) {
            positions[i].dir_to_next_pos = positions[i + 1].dir_to_here;
        }
        Path::from_positions(positions)
    }

    pub fn cursor_tile(&self) -> Option<TileIndex> {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::Callbacks;
    use crate::knowledge::Knowledge;

    struct TestHost;
    impl HostTypes for TestHost {
        type MapHandle = ();
        type ActorKind = ();
        type ActorOwner = ();
        type TransportTag = ();
    }

    /// A 1-D line 0..len where tile `dangerous_tile` is dangerous; every
    /// other tile is safe.
    fn line_with_danger(
        len: u32,
        move_rate: i64,
        moves_left_initially: i64,
        dangerous_tile: u32,
    ) -> Parameters<TestHost> {
        let callbacks = Callbacks::<TestHost> {
            step: Box::new(move |tile, dir, _map| match dir {
                Direction::East if tile.0 + 1 < len => Some(TileIndex(tile.0 + 1)),
                Direction::West if tile.0 > 0 => Some(TileIndex(tile.0 - 1)),
                _ => None,
            }),
            get_mc: Some(Box::new(|_from, _fs, _to, _ts, _p| Some(1))),
            get_move_scope: Box::new(|_tile, _prev, _p| (MoveScope::NATIVE, true)),
            get_tb: None,
            get_ec: None,
            get_zoc: None,
            get_action: None,
            is_action_possible: None,
            is_pos_dangerous: Some(Box::new(move |tile, _k, _p| tile.0 == dangerous_tile)),
            get_moves_left_req: None,
            get_costs: None,
            knowledge_at: Box::new(|_tile, _p| Knowledge::Known),
        };
        Parameters::builder()
            .start_tile(TileIndex(0))
            .map_handle(())
            .actor_kind(())
            .actor_owner(())
            .move_rate(move_rate)
            .moves_left_initially(moves_left_initially)
            .callbacks(callbacks)
            .build()
            .unwrap()
    }

    #[test]
    fn passing_through_a_dangerous_tile_mid_turn_costs_nothing_extra() {
        // move_rate 3: tile 1 is reached with 2 moves still left this turn,
        // so no wait is needed to carry on past it. A dangerous tile is
        // still never reported as a valid destination.
        let params = line_with_danger(4, 3, 3, 1);
        let mut finder = DangerFinder::new(params).unwrap();
        assert_eq!(finder.cost_to(TileIndex(1)), None);
        assert_eq!(finder.cost_to(TileIndex(2)), Some(2));
        assert_eq!(finder.cost_to(TileIndex(3)), Some(3));
    }

    #[test]
    fn landing_on_danger_with_nothing_left_forces_a_wait_on_the_safe_predecessor() {
        // move_rate 2, starting with only 1 move left this turn (bias 1):
        // entering dangerous tile 1 from tile 0 would spend the last move
        // this turn, so it's rejected outright until tile 0 waits out the
        // rest of its turn and tries again with a full 2 moves.
        let params = line_with_danger(3, 2, 1, 1);
        let mut finder = DangerFinder::new(params).unwrap();
        assert_eq!(finder.cost_to(TileIndex(0)), Some(0));
        assert_eq!(finder.cost_to(TileIndex(1)), None);
        assert_eq!(finder.cost_to(TileIndex(2)), Some(3));
    }

    #[test]
    fn unreachable_tile_yields_empty_path() {
        let params = line_with_danger(3, 2, 2, 1);
        let mut finder = DangerFinder::new(params).unwrap();
        let path = finder.path_to(TileIndex(50));
        assert!(path.is_empty());
    }

    #[test]
    fn path_to_reconstructs_through_a_dangerous_waypoint() {
        let params = line_with_danger(3, 2, 1, 1);
        let mut finder = DangerFinder::new(params).unwrap();
        let path = finder.path_to(TileIndex(2));
        assert_eq!(path.first().unwrap().tile, TileIndex(0));
        assert_eq!(path.last().unwrap().tile, TileIndex(2));
        // the dangerous tile is still crossed in transit, just never
        // reported as a place the mover can stop.
        assert!(path.positions().iter().any(|p| p.tile == TileIndex(1)));
    }
}
