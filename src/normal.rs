use crate::action::Action;
use crate::behavior::TileBehavior;
use crate::callbacks::HostTypes;
use crate::error::PfError;
use crate::init::{init_common_attrs, zoc_blocks, CommonAttrs};
use crate::lattice::{priority_key, turn_of, moves_left_of, clamp_to_turn, Lattice, NodeStatus};
use crate::parameters::Parameters;
use crate::path::Path;
use crate::position::Position;
use crate::queue::PriorityQueue;
use crate::scope::MoveScope;
use crate::tile::{Cost, TileIndex};
use std::cell::Cell;

/// Plain shortest-path finder: no danger awareness, no fuel bookkeeping.
/// Drives a single priority queue over a lazily-populated node lattice,
/// settling tiles in non-decreasing key order exactly once each.
pub struct NormalFinder<H: HostTypes> {
    params: Parameters<H>,
    lattice: Lattice<()>,
    queue: PriorityQueue,
    /// Set when `get_costs` was supplied: bypasses per-field cost/ZOC/action
    /// bookkeeping and lets the host compute everything in one call.
    jumbo: bool,
    /// `move_rate - moves_left_initially`, folded into every node's internal
    /// `cost` at the start tile so turn-boundary arithmetic (`turn_of`,
    /// `moves_left_of`) stays correct when the actor starts a search
    /// mid-turn. Subtracted back out of every cost reported to callers, so
    /// `cost_to(start) == 0` always holds regardless of how much of the
    /// first turn was already spent.
    bias: Cost,
    cursor: Option<TileIndex>,
    exhausted: bool,
    /// Guards against a callback re-entering the finder it was invoked from;
    /// only ever checked in debug builds.
    busy: Cell<bool>,
}

impl<H: HostTypes> NormalFinder<H> {
    pub fn new(params: Parameters<H>) -> Result<Self, PfError> {
        let jumbo = params.callbacks.get_costs.is_some();
        if !jumbo && params.callbacks.get_mc.is_none() {
            return Err(PfError::BadParameters(
                "either get_mc or get_costs must be supplied".into(),
            ));
        }

        let bias = params.move_rate - params.moves_left_initially;
        let mut finder = Self {
            params,
            lattice: Lattice::new(),
            queue: PriorityQueue::new(),
            jumbo,
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
        let attrs = init_common_attrs(start, true, MoveScope::NONE, &self.params)
            .unwrap_or(CommonAttrs {
                knowledge: Default::default(),
                behavior: TileBehavior::Normal,
                move_scope: MoveScope::NATIVE,
                can_disembark: true,
                action: Action::None,
                zoc_class: Default::default(),
                extra_tile: 0,
            });

        let bias = self.bias;
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

        self.cursor = Some(start);
        self.expand_from(start);
    }

    /// Edge relaxation for every direction leaving an already-closed tile
    /// (steps 1-8 of the per-direction cost rule).
    fn expand_from(&mut self, u_tile: TileIndex) {
        let u = self.lattice.get(u_tile);
        if u.behavior == TileBehavior::DontLeave {
            return;
        }

        for dir in crate::direction::Direction::ALL {
            let Some(v_tile) = (self.params.callbacks.step)(u_tile, dir, &self.params.map_handle)
            else {
                continue;
            };

            if self.lattice.status_of(v_tile) == NodeStatus::Closed {
                continue;
            }

            if self.jumbo {
                self.relax_jumbo(u_tile, dir, v_tile, &u);
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
                        let node = self.lattice.get_mut(v_tile);
                        node.status = NodeStatus::Init;
                        node.knowledge = attrs.knowledge;
                        node.behavior = attrs.behavior;
                        node.move_scope = attrs.move_scope;
                        node.can_disembark = attrs.can_disembark;
                        node.action = attrs.action;
                        node.zoc_class = attrs.zoc_class;
                        node.extra_tile = attrs.extra_tile;
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
                Some(self.params.move_rate)
            } else if !v.action.is_none() {
                Some(1)
            } else if v.knowledge.is_unknown() {
                Some(self.params.unknown_move_cost)
            } else {
                self.params.callbacks.get_mc.as_ref().and_then(|f| {
                    f(u_tile, u.move_scope, v_tile, v.move_scope, &self.params)
                })
            };
            let Some(raw_cost) = raw_cost else {
                continue;
            };

            let Some(step_cost) = clamp_to_turn(raw_cost, u.cost, self.params.move_rate) else {
                continue;
            };

            let candidate_cost = u.cost + step_cost;
            let candidate_extra = u.extra_cost + v.extra_tile;
            let candidate_key = priority_key(candidate_cost, candidate_extra);

            let improves = v.status == NodeStatus::Init
                || candidate_key < priority_key(v.cost, v.extra_cost);
            if improves {
                let node = self.lattice.get_mut(v_tile);
                node.cost = candidate_cost;
                node.extra_cost = candidate_extra;
                node.dir_to_here = Some(dir);
                node.status = NodeStatus::Open;
                self.queue.replace(v_tile, candidate_key);
            }
        }
    }

    /// Edge relaxation when the host supplied `get_costs`: the callback does
    /// its own cost, ZOC and action bookkeeping internally, so this bypasses
    /// the cached-attribute path entirely and just honors whatever `(cost,
    /// extra_cost, key)` or rejection it returns.
    fn relax_jumbo(
        &mut self,
        u_tile: TileIndex,
        dir: crate::direction::Direction,
        v_tile: TileIndex,
        u: &crate::lattice::Node<()>,
    ) {
        let get_costs = self
            .params
            .callbacks
            .get_costs
            .as_ref()
            .expect("jumbo mode requires get_costs");

        let v_status = self.lattice.status_of(v_tile);
        let v = self.lattice.get(v_tile);
        let mut to_cost = v.cost;
        let mut to_ec = v.extra_cost;
        let Some(candidate_key) = get_costs(
            u_tile,
            dir,
            v_tile,
            u.cost,
            u.extra_cost,
            &mut to_cost,
            &mut to_ec,
            &self.params,
        ) else {
            return;
        };

        let improves =
            v_status == NodeStatus::Uninit || candidate_key < priority_key(v.cost, v.extra_cost);
        if improves {
            let node = self.lattice.get_mut(v_tile);
            node.cost = to_cost;
            node.extra_cost = to_ec;
            node.dir_to_here = Some(dir);
            node.status = NodeStatus::Open;
            self.queue.replace(v_tile, candidate_key);
        }
    }

    /// Pops and settles the next-cheapest open tile, expanding its neighbors.
    /// Returns `None` once the reachable region has been fully explored.
    pub fn settle_next(&mut self) -> Option<TileIndex> {
        debug_assert!(!self.busy.get(), "NormalFinder is not re-entrant");
        self.busy.set(true);
        let result = loop {
            let Some((tile, _key)) = self.queue.pop_min() else {
                tracing::trace!("search exhausted after visiting {} tiles", self.lattice.visited());
                self.exhausted = true;
                break None;
            };
            if self.lattice.status_of(tile) != NodeStatus::Open {
                continue;
            }
            self.lattice.get_mut(tile).status = NodeStatus::Closed;
            self.cursor = Some(tile);
            self.expand_from(tile);
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

    pub fn position_at(&mut self, tile: TileIndex) -> Option<Position> {
        self.ensure_settled(tile);
        if self.lattice.status_of(tile) != NodeStatus::Closed {
            return None;
        }
        let node = self.lattice.get(tile);
        Some(Position {
            tile,
            total_mc: node.cost - self.bias,
            total_ec: node.extra_cost,
            turn: turn_of(node.cost, self.params.move_rate),
            moves_left: moves_left_of(node.cost, self.params.move_rate),
            fuel_left: self.params.fuel_left_initially,
            dir_to_here: node.dir_to_here,
            dir_to_next_pos: None,
        })
    }

    pub fn path_to(&mut self, tile: TileIndex) -> Path {
        self.ensure_settled(tile);
        if self.lattice.status_of(tile) != NodeStatus::Closed {
            return Path::unreachable();
        }

        let mut positions = Vec::new();
        let mut cur = tile;
        loop {
            let node = self.lattice.get(cur);
            positions.push(Position {
                tile: cur,
                total_mc: node.cost - self.bias,
                total_ec: node.extra_cost,
                turn: turn_of(node.cost, self.params.move_rate),
                moves_left: moves_left_of(node.cost, self.params.move_rate),
                fuel_left: self.params.fuel_left_initially,
                dir_to_here: node.dir_to_here,
                dir_to_next_pos: None,
            });
            match node.dir_to_here {
                Some(dir) => {
                    let Some(prev) =
                        (self.params.callbacks.step)(cur, dir.reverse(), &self.params.map_handle)
                    else {
                        break;
                    };
                    cur = prev;
                }
                None => break,
            }
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

    /// The cost already settled for `tile`, without driving the search any
    /// further. `None` until `tile` has actually been closed.
    pub fn try_cost(&self, tile: TileIndex) -> Option<Cost> {
        if self.lattice.status_of(tile) == NodeStatus::Closed {
            Some(self.lattice.get(tile).cost - self.bias)
        } else {
            None
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn is_jumbo(&self) -> bool {
        self.jumbo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::Callbacks;
    use crate::knowledge::Knowledge;
    use std::collections::HashMap;

    struct TestHost;
    impl HostTypes for TestHost {
        type MapHandle = ();
        type ActorKind = ();
        type ActorOwner = ();
        type TransportTag = ();
    }

    /// A 1-D line of tiles 0..len, stepping East/West only.
    fn line_params(len: u32, move_rate: i64) -> Parameters<TestHost> {
        let len = len;
        let callbacks = Callbacks::<TestHost> {
            step: Box::new(move |tile, dir, _map| match dir {
                crate::direction::Direction::East if tile.0 + 1 < len => Some(TileIndex(tile.0 + 1)),
                crate::direction::Direction::West if tile.0 > 0 => Some(TileIndex(tile.0 - 1)),
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
            .callbacks(callbacks)
            .build()
            .unwrap()
    }

    #[test]
    fn straight_line_costs_increase_by_one_per_tile() {
        let params = line_params(5, 3);
        let mut finder = NormalFinder::new(params).unwrap();
        assert_eq!(finder.cost_to(TileIndex(0)), Some(0));
        assert_eq!(finder.cost_to(TileIndex(1)), Some(1));
        assert_eq!(finder.cost_to(TileIndex(4)), Some(4));
    }

    #[test]
    fn path_to_reconstructs_the_full_chain() {
        let params = line_params(4, 3);
        let mut finder = NormalFinder::new(params).unwrap();
        let path = finder.path_to(TileIndex(3));
        assert_eq!(path.len(), 4);
        assert_eq!(path.first().unwrap().tile, TileIndex(0));
        assert_eq!(path.last().unwrap().tile, TileIndex(3));
        assert!(path.first().unwrap().dir_to_here.is_none());
    }

    #[test]
    fn unreachable_tile_yields_empty_path() {
        let params = line_params(3, 3);
        let mut finder = NormalFinder::new(params).unwrap();
        let path = finder.path_to(TileIndex(50));
        assert!(path.is_empty());
        assert_eq!(finder.cost_to(TileIndex(50)), None);
    }

    #[test]
    fn starting_mid_turn_still_reports_zero_cost_at_the_start_tile() {
        // move_rate 3 but only 1 move left in the turn already under way: the
        // internal bias folded into the start node's cost must never leak
        // into what callers see.
        let params = Parameters::builder()
            .start_tile(TileIndex(0))
            .map_handle(())
            .actor_kind(())
            .actor_owner(())
            .move_rate(3)
            .moves_left_initially(1)
            .callbacks(Callbacks::<TestHost> {
                step: Box::new(move |tile, dir, _map| match dir {
                    crate::direction::Direction::East if tile.0 + 1 < 5 => Some(TileIndex(tile.0 + 1)),
                    crate::direction::Direction::West if tile.0 > 0 => Some(TileIndex(tile.0 - 1)),
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
                get_moves_left_req: None,
                get_costs: None,
                knowledge_at: Box::new(|_tile, _p| Knowledge::Known),
            })
            .build()
            .unwrap();
        let mut finder = NormalFinder::new(params).unwrap();
        assert_eq!(finder.cost_to(TileIndex(0)), Some(0));
        assert_eq!(finder.try_cost(TileIndex(0)), Some(0));
        // First move spends the 1 move left in the turn already under way;
        // the next 2 moves spend the second turn in full.
        assert_eq!(finder.cost_to(TileIndex(1)), Some(1));
        assert_eq!(finder.cost_to(TileIndex(3)), Some(3));
        let pos = finder.position_at(TileIndex(0)).unwrap();
        assert_eq!(pos.total_mc, 0);
    }

    #[test]
    fn zoc_blocks_entry_from_non_mine_tile() {
        let mut map: HashMap<u32, crate::zoc::ZocClass> = HashMap::new();
        map.insert(1, crate::zoc::ZocClass::Allied);
        map.insert(2, crate::zoc::ZocClass::No);
        let callbacks = Callbacks::<TestHost> {
            step: Box::new(|tile, dir, _map| match dir {
                crate::direction::Direction::East if tile.0 + 1 < 3 => Some(TileIndex(tile.0 + 1)),
                crate::direction::Direction::West if tile.0 > 0 => Some(TileIndex(tile.0 - 1)),
                _ => None,
            }),
            get_mc: Some(Box::new(|_from, _fs, _to, _ts, _p| Some(1))),
            get_move_scope: Box::new(|_tile, _prev, _p| (MoveScope::NATIVE, true)),
            get_tb: None,
            get_ec: None,
            get_zoc: Some(Box::new(move |_owner, tile, _map| {
                map.get(&tile.0).copied().unwrap_or_default()
            })),
            get_action: None,
            is_action_possible: None,
            is_pos_dangerous: None,
            get_moves_left_req: None,
            get_costs: None,
            knowledge_at: Box::new(|_tile, _p| Knowledge::Known),
        };
        let params = Parameters::builder()
            .start_tile(TileIndex(0))
            .map_handle(())
            .actor_kind(())
            .actor_owner(())
            .move_rate(3)
            .callbacks(callbacks)
            .build()
            .unwrap();
        let mut finder = NormalFinder::new(params).unwrap();
        // Tile 0 is Mine by default, so 0 -> 1 (Allied) is allowed; but
        // leaving the non-Mine tile 1 into the contested tile 2 is blocked.
        assert_eq!(finder.cost_to(TileIndex(1)), Some(1));
        assert_eq!(finder.cost_to(TileIndex(2)), None);
    }
}
