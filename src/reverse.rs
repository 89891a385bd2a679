use crate::callbacks::HostTypes;
use crate::error::PfError;
use crate::normal::NormalFinder;
use crate::parameters::Parameters;
use crate::path::Path;
use crate::position::Position;
use crate::tile::{Cost, TileIndex};
use std::collections::HashMap;
use std::hash::Hash;

/// Caches "cost/path/position to reach a fixed tile" across many actor
/// parameter sets that all share the same destination. Useful when a host
/// wants, say, every city's distance to one contested tile: building one
/// `NormalFinder` per actor and throwing it away after a single query would
/// redo the whole search every time two actors happen to share a start tile,
/// move rate and move-scope-affecting class.
///
/// Callers supply a `signature` function mapping their own per-actor key
/// `K` to a `Parameters<H>`; the cache itself only ever needs `K` to be
/// hashable, since building a `Parameters<H>` from scratch for every actor is
/// already the natural way `Callbacks<H>` closures capture host state.
pub struct ReverseMap<H: HostTypes, K> {
    target: TileIndex,
    max_turns: i64,
    build: Box<dyn Fn(&K) -> Result<Parameters<H>, PfError>>,
    cache: HashMap<K, Option<Position>>,
}

impl<H: HostTypes, K: Eq + Hash + Clone> ReverseMap<H, K> {
    pub fn new(
        target: TileIndex,
        max_turns: i64,
        build: impl Fn(&K) -> Result<Parameters<H>, PfError> + 'static,
    ) -> Self {
        Self {
            target,
            max_turns,
            build: Box::new(build),
            cache: HashMap::new(),
        }
    }

    /// Builds (or reuses) the finder run for `key` up to the point the
    /// target is settled or known to fall outside `max_turns`, then returns
    /// the settled position, if any. Only the position is cached; path
    /// reconstruction (`path_to_target`) re-derives the finder on every call
    /// since a `Path` is cheap to rebuild once the lattice has settled the
    /// target and isn't worth keeping a whole finder alive for.
    fn resolve(&mut self, key: &K) -> Result<Option<Position>, PfError> {
        if let Some(cached) = self.cache.get(key) {
            return Ok(cached.clone());
        }

        let params = (self.build)(key)?;
        let move_rate = params.move_rate.max(1);
        let max_cost = move_rate.saturating_mul(self.max_turns + 1);
        let mut finder = NormalFinder::new(params)?;

        let result = loop {
            if let Some(cost) = finder.try_cost(self.target) {
                let _ = cost;
                break finder.position_at(self.target);
            }
            match finder.settle_next() {
                None => break None,
                Some(tile) => {
                    if let Some(cost) = finder.try_cost(tile) {
                        if cost > max_cost {
                            break None;
                        }
                    }
                }
            }
        };

        self.cache.insert(key.clone(), result.clone());
        Ok(result)
    }

    /// Cost from `key`'s actor to the fixed target tile, or `None` if
    /// unreachable within `max_turns`. Subsequent calls with the same key
    /// return the cached answer without re-running the search.
    pub fn cost_to_target(&mut self, key: K) -> Result<Option<Cost>, PfError> {
        Ok(self.resolve(&key)?.map(|p| p.total_mc))
    }

    /// Position reached at the target tile for `key`'s actor, or `None` if
    /// unreachable within `max_turns`. Cached the same way `cost_to_target`
    /// is.
    pub fn position_to_target(&mut self, key: K) -> Result<Option<Position>, PfError> {
        self.resolve(&key)
    }

    /// Full best path from `key`'s actor's start tile to the fixed target,
    /// or the empty `Path` if unreachable within `max_turns`. Not cached: a
    /// cache hit on `cost_to_target`/`position_to_target` tells us the
    /// target is reachable but not by which route, so a reachable miss here
    /// rebuilds one finder and reconstructs the path from it directly.
    pub fn path_to_target(&mut self, key: K) -> Result<Path, PfError> {
        if self.resolve(&key)?.is_none() {
            return Ok(Path::unreachable());
        }
        let params = (self.build)(&key)?;
        let mut finder = NormalFinder::new(params)?;
        Ok(finder.path_to(self.target))
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::Callbacks;
    use crate::direction::Direction;
    use crate::knowledge::Knowledge;
    use crate::scope::MoveScope;

    struct TestHost;
    impl HostTypes for TestHost {
        type MapHandle = ();
        type ActorKind = ();
        type ActorOwner = ();
        type TransportTag = ();
    }

    fn params_for(start: u32) -> Result<Parameters<TestHost>, PfError> {
        let callbacks = Callbacks::<TestHost> {
            step: Box::new(|tile, dir, _map| match dir {
                Direction::East => Some(TileIndex(tile.0 + 1)),
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
            get_moves_left_req: None,
            get_costs: None,
            knowledge_at: Box::new(|_tile, _p| Knowledge::Known),
        };
        Parameters::builder()
            .start_tile(TileIndex(start))
            .map_handle(())
            .actor_kind(())
            .actor_owner(())
            .move_rate(1)
            .callbacks(callbacks)
            .build()
    }

    #[test]
    fn caches_repeated_queries_for_the_same_actor_key() {
        let mut rm: ReverseMap<TestHost, u32> = ReverseMap::new(TileIndex(5), 10, |k: &u32| params_for(*k));
        assert_eq!(rm.cost_to_target(0).unwrap(), Some(5));
        assert_eq!(rm.cached_len(), 1);
        assert_eq!(rm.cost_to_target(0).unwrap(), Some(5));
        assert_eq!(rm.cached_len(), 1);
    }

    #[test]
    fn distinct_keys_compute_independently() {
        let mut rm: ReverseMap<TestHost, u32> = ReverseMap::new(TileIndex(5), 10, |k: &u32| params_for(*k));
        assert_eq!(rm.cost_to_target(2).unwrap(), Some(3));
        assert_eq!(rm.cost_to_target(5).unwrap(), Some(0));
    }

    #[test]
    fn target_beyond_max_turns_is_reported_unreachable() {
        let mut rm: ReverseMap<TestHost, u32> = ReverseMap::new(TileIndex(100), 2, |k: &u32| params_for(*k));
        assert_eq!(rm.cost_to_target(0).unwrap(), None);
    }

    #[test]
    fn position_to_target_matches_cost_to_target() {
        let mut rm: ReverseMap<TestHost, u32> = ReverseMap::new(TileIndex(5), 10, |k: &u32| params_for(*k));
        let pos = rm.position_to_target(2).unwrap().unwrap();
        assert_eq!(pos.tile, TileIndex(5));
        assert_eq!(pos.total_mc, 3);
    }

    #[test]
    fn path_to_target_reconstructs_the_full_chain() {
        let mut rm: ReverseMap<TestHost, u32> = ReverseMap::new(TileIndex(5), 10, |k: &u32| params_for(*k));
        let path = rm.path_to_target(2).unwrap();
        assert_eq!(path.first().unwrap().tile, TileIndex(2));
        assert_eq!(path.last().unwrap().tile, TileIndex(5));
    }

    #[test]
    fn path_to_target_is_empty_when_unreachable() {
        let mut rm: ReverseMap<TestHost, u32> = ReverseMap::new(TileIndex(100), 2, |k: &u32| params_for(*k));
        assert!(rm.path_to_target(0).unwrap().is_empty());
    }
}
