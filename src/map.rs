use crate::callbacks::HostTypes;
use crate::danger::DangerFinder;
use crate::error::PfError;
use crate::fuel::FuelFinder;
use crate::normal::NormalFinder;
use crate::parameters::Parameters;
use crate::path::Path;
use crate::position::Position;
use crate::tile::{Cost, TileIndex};

/// The three finder variants, picked by `create_map` from what `Parameters`
/// and its callbacks actually supply. Tagged enum rather than a trait object
/// over a shared base: there are exactly three modes, each wants a somewhat
/// different extra payload on its lattice nodes, and callers virtually
/// always know statically which one they asked for.
pub enum Map<H: HostTypes> {
    Normal(NormalFinder<H>),
    Danger(DangerFinder<H>),
    Fuel(FuelFinder<H>),
}

impl<H: HostTypes> Map<H> {
    pub fn cost_to(&mut self, tile: TileIndex) -> Option<Cost> {
        match self {
            Map::Normal(f) => f.cost_to(tile),
            Map::Danger(f) => f.cost_to(tile),
            Map::Fuel(f) => f.cost_to(tile),
        }
    }

    pub fn path_to(&mut self, tile: TileIndex) -> Path {
        match self {
            Map::Normal(f) => f.path_to(tile),
            Map::Danger(f) => f.path_to(tile),
            Map::Fuel(f) => f.path_to(tile),
        }
    }

    pub fn position_at(&mut self, tile: TileIndex) -> Option<Position> {
        if let Map::Normal(f) = self {
            return f.position_at(tile);
        }
        // The danger and fuel finders don't cache a dedicated end position;
        // the last entry of the reconstructed path already carries it.
        let path = self.path_to(tile);
        path.positions().last().cloned()
    }

    pub fn cursor_tile(&self) -> Option<TileIndex> {
        match self {
            Map::Normal(f) => f.cursor_tile(),
            Map::Danger(f) => f.cursor_tile(),
            Map::Fuel(f) => f.cursor_tile(),
        }
    }

    /// Advances the search by exactly one settled tile; mirrors the
    /// source's `iterator`-style incremental path-finding. Returns `None`
    /// once the whole reachable region has been explored.
    pub fn iterate(&mut self) -> Option<TileIndex> {
        match self {
            Map::Normal(f) => f.settle_next(),
            Map::Danger(f) => f.settle_next(),
            Map::Fuel(f) => f.settle_next(),
        }
    }
}

/// Picks a finder variant from `Parameters` and wires it up. A supplied
/// `get_moves_left_req` callback requests the fuel finder (`fuel` alone says
/// nothing about whether the host tracks range at all — a host with no such
/// callback has no refuel points or forbidden tiles to report, and the fuel
/// finder has no way to drive its bookkeeping without one), a supplied
/// `is_pos_dangerous` callback requests the danger finder, and anything else
/// falls back to the plain finder. The two special modes are mutually
/// exclusive, and neither is compatible with the jumbo `get_costs` callback,
/// which only the plain finder understands.
pub fn create_map<H: HostTypes>(params: Parameters<H>) -> Result<Map<H>, PfError> {
    let jumbo = params.callbacks.get_costs.is_some();
    let wants_fuel = params.callbacks.get_moves_left_req.is_some();
    let wants_danger = params.callbacks.is_pos_dangerous.is_some();

    if wants_fuel && wants_danger {
        return Err(PfError::BadParameters(
            "fuel awareness and danger awareness cannot be combined".into(),
        ));
    }
    if jumbo && (wants_fuel || wants_danger) {
        return Err(PfError::BadParameters(
            "get_costs is only usable with the plain finder".into(),
        ));
    }

    if wants_fuel {
        tracing::debug!("creating fuel-aware map from tile {}", params.start_tile.0);
        Ok(Map::Fuel(FuelFinder::new(params)?))
    } else if wants_danger {
        tracing::debug!("creating danger-aware map from tile {}", params.start_tile.0);
        Ok(Map::Danger(DangerFinder::new(params)?))
    } else {
        tracing::debug!("creating plain map from tile {}", params.start_tile.0);
        Ok(Map::Normal(NormalFinder::new(params)?))
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

    fn base_callbacks() -> Callbacks<TestHost> {
        Callbacks::<TestHost> {
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
        }
    }

    #[test]
    fn plain_parameters_select_the_normal_finder() {
        let params = Parameters::builder()
            .start_tile(TileIndex(0))
            .map_handle(())
            .actor_kind(())
            .actor_owner(())
            .move_rate(2)
            .callbacks(base_callbacks())
            .build()
            .unwrap();
        let map = create_map(params).unwrap();
        assert!(matches!(map, Map::Normal(_)));
    }

    #[test]
    fn a_moves_left_req_callback_selects_the_fuel_finder() {
        let mut callbacks = base_callbacks();
        callbacks.get_moves_left_req = Some(Box::new(|_tile, _k, _p| Some(1)));
        let params = Parameters::builder()
            .start_tile(TileIndex(0))
            .map_handle(())
            .actor_kind(())
            .actor_owner(())
            .move_rate(2)
            .fuel(3)
            .callbacks(callbacks)
            .build()
            .unwrap();
        let map = create_map(params).unwrap();
        assert!(matches!(map, Map::Fuel(_)));
    }

    #[test]
    fn fuel_over_one_alone_does_not_select_the_fuel_finder() {
        // Without a get_moves_left_req callback there's no way to ask the
        // host about refuel points or forbidden tiles, so `fuel` by itself
        // must not be enough to pick the fuel finder.
        let params = Parameters::builder()
            .start_tile(TileIndex(0))
            .map_handle(())
            .actor_kind(())
            .actor_owner(())
            .move_rate(2)
            .fuel(3)
            .callbacks(base_callbacks())
            .build()
            .unwrap();
        let map = create_map(params).unwrap();
        assert!(matches!(map, Map::Normal(_)));
    }

    #[test]
    fn danger_and_fuel_together_are_rejected() {
        let mut callbacks = base_callbacks();
        callbacks.get_moves_left_req = Some(Box::new(|_tile, _k, _p| Some(1)));
        callbacks.is_pos_dangerous = Some(Box::new(|_tile, _k, _p| false));
        let params = Parameters::builder()
            .start_tile(TileIndex(0))
            .map_handle(())
            .actor_kind(())
            .actor_owner(())
            .move_rate(2)
            .fuel(3)
            .callbacks(callbacks)
            .build()
            .unwrap();
        assert!(create_map(params).is_err());
    }
}
