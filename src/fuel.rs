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

/// Per-node fuel bookkeeping.
///
/// `mlr` caches this tile's `get_moves_left_req` result the first time it's
/// visited: `0` marks a refuel point (arriving here always tops the tank back
/// up to `move_rate * fuel`), a positive value demands at least that many
/// moves still be available this turn to use the tile at all, and `-1`
/// (never actually compared against once cached) marks a tile the callback
/// forbade outright. `fuel_left` is the actual range remaining before the
/// tank runs dry, spent one unit per move-cost unit of travel rather than
/// once per turn crossed. `waited` bounds the one forced "top off the clock,
/// not just the tank" wait a refuel point can queue to one shot.
#[derive(Clone, Debug, Default)]
pub struct FuelExtra {
    pub mlr: i64,
    pub fuel_left: i64,
    pub waited: bool,
    pub route: Route,
}

const FORBIDDEN_MLR: i64 = -1;

/// Bounded-range pathfinding between refuel points. Beyond the ordinary
/// settle/expand loop this finder needs two extra behaviors the plain and
/// danger finders don't:
///
/// - A refuel point that closes with less than a full turn of moves left
///   queues a forced wait (`wait_queue`/`wait_pending`), exactly like the
///   danger finder's wait, except the tank itself is already full on
///   arrival — what the wait buys back is the *turn's* moves, not fuel.
/// - Re-expanding from that wait is allowed to reopen an already-`Closed`
///   non-refuel neighbor one hop out (`allow_reopen`): a neighbor reached
///   before the wait might have settled with fewer moves left than a
///   post-wait arrival would offer, so it can be worth revisiting once
///   (but the reopened tile's own future expansions go through the normal,
///   non-reopening path — this never cascades more than one hop from a
///   wait).
pub struct FuelFinder<H: HostTypes> {
    params: Parameters<H>,
    lattice: Lattice<FuelExtra>,
    queue: PriorityQueue,
    wait_queue: PriorityQueue,
    wait_pending: HashMap<TileIndex, (Cost, i64, i64)>,
    bias: Cost,
    cursor: Option<TileIndex>,
    exhausted: bool,
    busy: Cell<bool>,
}

impl<H: HostTypes> FuelFinder<H> {
    pub fn new(params: Parameters<H>) -> Result<Self, PfError> {
        if params.callbacks.get_mc.is_none() {
            return Err(PfError::BadParameters("fuel finder requires get_mc".into()));
        }
        if params.callbacks.get_moves_left_req.is_none() {
            return Err(PfError::BadParameters(
                "fuel finder requires get_moves_left_req".into(),
            ));
        }

        let bias = params.move_rate - params.moves_left_initially;
        let mut finder = Self {
            params,
            lattice: Lattice::new(),
            queue: PriorityQueue::new(),
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
        node.extra = FuelExtra {
            mlr: 1,
            fuel_left: self.params.move_rate.max(1) * self.params.fuel_left_initially,
            waited: false,
            route,
        };

        self.cursor = Some(start);
        let (cost, extra, fuel_left, route) = {
            let node = self.lattice.get(start);
            (node.cost, node.extra_cost, node.extra.fuel_left, node.extra.route.clone())
        };
        self.expand_from(start, cost, extra, fuel_left, &route, false);
    }

    #[allow(clippy::too_many_arguments)]
    fn expand_from(
        &mut self,
        u_tile: TileIndex,
        base_cost: Cost,
        base_extra: i64,
        base_fuel: i64,
        base_route: &Route,
        allow_reopen: bool,
    ) {
        let u = self.lattice.get(u_tile);
        if u.behavior == TileBehavior::DontLeave {
            return;
        }
        let move_rate = self.params.move_rate;

        for dir in Direction::ALL {
            let Some(v_tile) = (self.params.callbacks.step)(u_tile, dir, &self.params.map_handle)
            else {
                continue;
            };
            let v_status_before = self.lattice.status_of(v_tile);
            if v_status_before == NodeStatus::Closed && !allow_reopen {
                continue;
            }

            if v_status_before == NodeStatus::Uninit {
                match init_common_attrs(v_tile, false, u.move_scope, &self.params) {
                    None => {
                        let node = self.lattice.get_mut(v_tile);
                        node.status = NodeStatus::Init;
                        node.behavior = TileBehavior::Ignore;
                        continue;
                    }
                    Some(attrs) => {
                        let mlr = self
                            .params
                            .callbacks
                            .get_moves_left_req
                            .as_ref()
                            .and_then(|f| f(v_tile, attrs.knowledge, &self.params))
                            .map(|v| v.max(0))
                            .unwrap_or(FORBIDDEN_MLR);
                        let node = self.lattice.get_mut(v_tile);
                        node.status = NodeStatus::Init;
                        node.knowledge = attrs.knowledge;
                        node.behavior = attrs.behavior;
                        node.move_scope = attrs.move_scope;
                        node.can_disembark = attrs.can_disembark;
                        node.action = attrs.action;
                        node.zoc_class = attrs.zoc_class;
                        node.extra_tile = attrs.extra_tile;
                        node.extra.mlr = mlr;
                    }
                }
            }

            let v = self.lattice.get(v_tile);
            if v.behavior == TileBehavior::Ignore || v.extra.mlr == FORBIDDEN_MLR {
                continue;
            }
            if v.status == NodeStatus::Closed && !allow_reopen {
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

            let candidate_cost = base_cost + step_cost;
            let is_refuel = v.extra.mlr == 0;
            let candidate_fuel = if is_refuel {
                self.params.move_rate.max(1) * self.params.fuel
            } else {
                let remaining = base_fuel - step_cost;
                if remaining < 0 {
                    continue;
                }
                remaining
            };
            if !is_refuel && v.extra.mlr > 0 && moves_left_of(candidate_cost, move_rate) < v.extra.mlr {
                continue;
            }

            let candidate_extra = base_extra + v.extra_tile;
            let candidate_key = priority_key(candidate_cost, candidate_extra);

            let improves_open = v.status != NodeStatus::Closed
                && (v.status == NodeStatus::Init
                    || candidate_key < priority_key(v.cost, v.extra_cost)
                    || candidate_fuel > v.extra.fuel_left);
            let improves_reopen = !improves_open
                && allow_reopen
                && v.status == NodeStatus::Closed
                && !is_refuel
                && (candidate_fuel > v.extra.fuel_left
                    || (candidate_fuel == v.extra.fuel_left && candidate_extra < v.extra_cost));

            if improves_open || improves_reopen {
                let new_route = route::push(
                    base_route,
                    v_tile,
                    candidate_cost,
                    candidate_extra,
                    moves_left_of(candidate_cost, move_rate),
                    Some(dir),
                );
                let node = self.lattice.get_mut(v_tile);
                node.cost = candidate_cost;
                node.extra_cost = candidate_extra;
                node.dir_to_here = Some(dir);
                node.status = NodeStatus::Open;
                node.extra.fuel_left = candidate_fuel;
                node.extra.route = new_route;
                if is_refuel {
                    tracing::debug!("refueling at tile {}", v_tile.0);
                }
                if improves_reopen {
                    tracing::debug!("reopening settled tile {} after a wait", v_tile.0);
                }
                self.queue.insert(v_tile, candidate_key);
            }
        }
    }

    /// Queues a one-shot forced wait for a just-closed refuel tile that has
    /// less than a full turn of moves remaining — the tank is already full,
    /// but the *turn's* moves aren't, so a neighbor just past the reach of
    /// this turn's remaining moves would otherwise be stranded one move too
    /// far away until the next turn starts naturally.
    fn maybe_queue_wait(&mut self, tile: TileIndex) {
        let move_rate = self.params.move_rate;
        if move_rate <= 0 {
            return;
        }
        let node = self.lattice.get(tile);
        if node.extra.mlr != 0 || node.extra.waited {
            return;
        }
        let remaining = moves_left_of(node.cost, move_rate);
        if remaining >= move_rate {
            return;
        }
        let waited_cost = node.cost + remaining;
        let key = priority_key(waited_cost, node.extra_cost);
        self.lattice.get_mut(tile).extra.waited = true;
        self.wait_pending
            .insert(tile, (waited_cost, node.extra_cost, node.extra.fuel_left));
        self.wait_queue.insert(tile, key);
    }

    fn close_and_expand(&mut self, tile: TileIndex) {
        self.lattice.get_mut(tile).status = NodeStatus::Closed;
        self.cursor = Some(tile);
        let (cost, extra, fuel_left, route) = {
            let node = self.lattice.get(tile);
            (node.cost, node.extra_cost, node.extra.fuel_left, node.extra.route.clone())
        };
        self.expand_from(tile, cost, extra, fuel_left, &route, false);
    }

    fn reexpand_after_wait(&mut self, tile: TileIndex, waited_cost: Cost, waited_extra: i64, fuel_left: i64) {
        let (prev_route, dir_to_here, old_cost) = {
            let node = self.lattice.get(tile);
            let prev = node.extra.route.as_ref().and_then(|r| r.prev.clone());
            let dir = node.extra.route.as_ref().and_then(|r| r.dir_to_here);
            (prev, dir, node.cost)
        };
        let moves_left = moves_left_of(waited_cost, self.params.move_rate);
        let wait_route = route::push(&prev_route, tile, waited_cost, waited_extra, moves_left, dir_to_here);
        tracing::debug!(
            "waiting out a turn at refuel tile {} ({} -> {})",
            tile.0,
            old_cost,
            waited_cost
        );
        self.expand_from(tile, waited_cost, waited_extra, fuel_left, &wait_route, true);
    }

    pub fn settle_next(&mut self) -> Option<TileIndex> {
        debug_assert!(!self.busy.get(), "FuelFinder is not re-entrant");
        self.busy.set(true);
        let result = loop {
            let main_key = self.queue.peek_min_key();
            let wait_key = self.wait_queue.peek_min_key();
            let take_wait = match (main_key, wait_key) {
                (_, None) => false,
                (None, Some(_)) => true,
                (Some(mk), Some(wk)) => wk < mk,
            };

            if take_wait {
                let (tile, _key) = self.wait_queue.pop_min().unwrap();
                let Some((waited_cost, waited_extra, fuel_left)) = self.wait_pending.remove(&tile) else {
                    continue;
                };
                if self.lattice.status_of(tile) != NodeStatus::Closed {
                    continue;
                }
                self.reexpand_after_wait(tile, waited_cost, waited_extra, fuel_left);
                continue;
            }

            let Some((tile, _key)) = self.queue.pop_min() else {
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
            Some(self.lattice.get(tile).cost - self.bias)
        } else {
            None
        }
    }

    pub fn path_to(&mut self, tile: TileIndex) -> Path {
        self.ensure_settled(tile);
        if self.lattice.status_of(tile) != NodeStatus::Closed {
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
                fuel_left: self.lattice.get(node.tile).extra.fuel_left,
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

    /// A 1-D line 0..len, one refuel point at index `refuel`. Every other
    /// tile costs 1 move-point/tile and requires at least 1 move left to
    /// enter (so, together with `move_rate`, the finder has to think about
    /// turn boundaries the same way the danger finder does).
    fn line_with_refuel(len: u32, move_rate: i64, fuel: i64, refuel: u32) -> Parameters<TestHost> {
        line_with_refuel_biased(len, move_rate, move_rate, fuel, refuel)
    }

    fn line_with_refuel_biased(
        len: u32,
        move_rate: i64,
        moves_left_initially: i64,
        fuel: i64,
        refuel: u32,
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
            is_pos_dangerous: None,
            get_moves_left_req: Some(Box::new(move |tile, _k, _p| {
                Some(if tile.0 == refuel { 0 } else { 1 })
            })),
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
            .fuel(fuel)
            .callbacks(callbacks)
            .build()
            .unwrap()
    }

    #[test]
    fn runs_out_of_fuel_before_a_refuel_point() {
        // move_rate 1, 3 move-points of range, refuel point far out of reach.
        let params = line_with_refuel(12, 1, 3, 10);
        let mut finder = FuelFinder::new(params).unwrap();
        assert_eq!(finder.cost_to(TileIndex(3)), Some(3));
        assert_eq!(finder.cost_to(TileIndex(4)), None);
    }

    #[test]
    fn refuel_point_resets_the_tank() {
        let params = line_with_refuel(10, 1, 2, 2);
        let mut finder = FuelFinder::new(params).unwrap();
        assert_eq!(finder.cost_to(TileIndex(2)), Some(2));
        assert_eq!(finder.cost_to(TileIndex(4)), Some(4));
        assert_eq!(finder.cost_to(TileIndex(5)), None);
    }

    #[test]
    fn a_refuel_point_reached_mid_turn_waits_before_the_next_leg() {
        // move_rate 3, refuel point at tile 2, reached with only 1 move left
        // this turn (two single-point moves into a fresh 3-move turn). Tile 3
        // demands at least 1 move left to enter, which the tile-2 arrival
        // can't offer — it lands with exactly 0 moves left. Waiting out the
        // rest of the turn at the refuel point is the only way past it.
        let params = line_with_refuel_biased(4, 3, 3, 5, 2);
        let mut finder = FuelFinder::new(params).unwrap();
        assert_eq!(finder.cost_to(TileIndex(0)), Some(0));
        assert_eq!(finder.cost_to(TileIndex(2)), Some(2));
        // Without the forced wait, tile 3 would be unreachable.
        assert_eq!(finder.cost_to(TileIndex(3)), Some(4));
    }

    #[test]
    fn unreachable_tile_yields_empty_path() {
        let params = line_with_refuel(3, 1, 2, 2);
        let mut finder = FuelFinder::new(params).unwrap();
        let path = finder.path_to(TileIndex(50));
        assert!(path.is_empty());
    }
}
