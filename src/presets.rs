//! Ready-made `is_action_possible` policies for the common ways a host wants
//! to restrict what an actor may fight while moving. Grounded in the three
//! `pft_fill_*_parameter` policy knobs a tile-graph path finder traditionally
//! exposes: forbid combat and unknown-tile entry outright, forbid combat
//! only, or forbid combat everywhere except at the final destination.

use crate::action::Action;
use crate::callbacks::HostTypes;
use crate::knowledge::Knowledge;
use crate::parameters::Parameters;
use crate::scope::MoveScope;
use crate::tile::TileIndex;

/// Forbids any `Attack` action and refuses to enter unknown tiles at all.
/// The most conservative policy: an actor using it never fights and never
/// walks blind.
pub fn no_fights_or_unknown<H: HostTypes>(
    from: TileIndex,
    from_scope: MoveScope,
    to: TileIndex,
    action: Action,
    params: &Parameters<H>,
) -> bool {
    let _ = (from, from_scope, to);
    if action == Action::Attack {
        return false;
    }
    let knowledge = (params.callbacks.knowledge_at)(to, params);
    knowledge != Knowledge::Unknown
}

/// Forbids any `Attack` action but otherwise allows entering unknown tiles.
pub fn no_fights<H: HostTypes>(
    from: TileIndex,
    from_scope: MoveScope,
    to: TileIndex,
    action: Action,
    params: &Parameters<H>,
) -> bool {
    let _ = (from, from_scope, to, params);
    action != Action::Attack
}

/// Forbids `Attack` everywhere except when `to` is the path's own
/// destination tile — useful for "move adjacent, then let the caller decide
/// whether to attack" callers that still want the search itself to route
/// around incidental fights.
pub fn no_intermediate_fights<H: HostTypes>(
    destination: TileIndex,
) -> impl Fn(TileIndex, MoveScope, TileIndex, Action, &Parameters<H>) -> bool {
    move |from, from_scope, to, action, params| {
        let _ = (from, from_scope, params);
        action != Action::Attack || to == destination
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::Callbacks;

    struct TestHost;
    impl HostTypes for TestHost {
        type MapHandle = ();
        type ActorKind = ();
        type ActorOwner = ();
        type TransportTag = ();
    }

    fn dummy_params(unknown_tile: TileIndex) -> Parameters<TestHost> {
        let callbacks = Callbacks::<TestHost> {
            step: Box::new(|_tile, _dir, _map| None),
            get_mc: Some(Box::new(|_f, _fs, _t, _ts, _p| Some(1))),
            get_move_scope: Box::new(|_tile, _prev, _p| (MoveScope::NATIVE, true)),
            get_tb: None,
            get_ec: None,
            get_zoc: None,
            get_action: None,
            is_action_possible: None,
            is_pos_dangerous: None,
            get_moves_left_req: None,
            get_costs: None,
            knowledge_at: Box::new(move |tile, _p| {
                if tile == unknown_tile {
                    Knowledge::Unknown
                } else {
                    Knowledge::Known
                }
            }),
        };
        Parameters::builder()
            .start_tile(TileIndex(0))
            .map_handle(())
            .actor_kind(())
            .actor_owner(())
            .move_rate(1)
            .callbacks(callbacks)
            .build()
            .unwrap()
    }

    #[test]
    fn no_fights_or_unknown_rejects_attacks_and_fog() {
        let params = dummy_params(TileIndex(9));
        assert!(!no_fights_or_unknown(
            TileIndex(0),
            MoveScope::NATIVE,
            TileIndex(1),
            Action::Attack,
            &params
        ));
        assert!(!no_fights_or_unknown(
            TileIndex(0),
            MoveScope::NATIVE,
            TileIndex(9),
            Action::None,
            &params
        ));
        assert!(no_fights_or_unknown(
            TileIndex(0),
            MoveScope::NATIVE,
            TileIndex(1),
            Action::None,
            &params
        ));
    }

    #[test]
    fn no_fights_allows_unknown_tiles() {
        let params = dummy_params(TileIndex(9));
        assert!(no_fights(
            TileIndex(0),
            MoveScope::NATIVE,
            TileIndex(9),
            Action::None,
            &params
        ));
        assert!(!no_fights(
            TileIndex(0),
            MoveScope::NATIVE,
            TileIndex(9),
            Action::Attack,
            &params
        ));
    }

    #[test]
    fn no_intermediate_fights_allows_the_final_attack_only() {
        let params = dummy_params(TileIndex(9));
        let policy = no_intermediate_fights::<TestHost>(TileIndex(4));
        assert!(!policy(TileIndex(3), MoveScope::NATIVE, TileIndex(2), Action::Attack, &params));
        assert!(policy(TileIndex(3), MoveScope::NATIVE, TileIndex(4), Action::Attack, &params));
    }
}
