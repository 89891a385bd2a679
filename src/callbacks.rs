use crate::action::Action;
use crate::behavior::TileBehavior;
use crate::direction::Direction;
use crate::knowledge::Knowledge;
use crate::parameters::Parameters;
use crate::scope::MoveScope;
use crate::tile::{Cost, TileIndex};

/// The opaque, host-defined types threaded through a `Map`'s lifetime.
/// Bundling them behind one trait (rather than four separate generic
/// parameters on every struct in the crate) keeps `Parameters<H>`,
/// `Callbacks<H>`, `NormalFinder<H>` etc. readable; it carries no behavior
/// of its own, the way `core/src/unique/state_for_conditionals.rs` in the
/// teacher bundles a flat bag of optional typed state instead of one field
/// per generic parameter.
pub trait HostTypes {
    type MapHandle;
    type ActorKind;
    type ActorOwner;
    /// Tag identifying a transport the actor may start aboard.
    type TransportTag;
}

/// The host-supplied callback contract. Modeled as an `Option<Box<dyn Fn>>`
/// per entry rather than a trait the host implements, because which finder
/// mode `create_map` selects is itself a runtime decision over which of
/// these are populated — a second, type-level mechanism for the same
/// question would just be duplicated bookkeeping.
pub struct Callbacks<H: HostTypes> {
    /// `step(tile, direction) -> tile | none`. Required.
    pub step: Box<dyn Fn(TileIndex, Direction, &H::MapHandle) -> Option<TileIndex>>,

    /// `get_MC(from, from_scope, to, to_scope, params) -> cost`. `None`
    /// stands in for the `IMPOSSIBLE` sentinel. Required unless the jumbo
    /// `get_costs` callback is supplied instead.
    pub get_mc: Option<
        Box<dyn Fn(TileIndex, MoveScope, TileIndex, MoveScope, &Parameters<H>) -> Option<Cost>>,
    >,

    /// `get_move_scope(tile, previous_scope, params) -> (scope, can_disembark)`.
    /// Required.
    pub get_move_scope: Box<dyn Fn(TileIndex, MoveScope, &Parameters<H>) -> (MoveScope, bool)>,

    /// `get_TB(tile, knowledge, params) -> behavior`. Optional; defaults to
    /// `TileBehavior::Normal`.
    pub get_tb: Option<Box<dyn Fn(TileIndex, Knowledge, &Parameters<H>) -> TileBehavior>>,

    /// `get_EC(tile, knowledge, params) -> extra cost`. Optional; defaults
    /// to `0`.
    pub get_ec: Option<Box<dyn Fn(TileIndex, Knowledge, &Parameters<H>) -> i64>>,

    /// `get_zoc(owner, tile, map) -> zoc_class`. Optional; when absent every
    /// tile is treated as `ZocClass::Mine`.
    ///
    /// Returns a classification rather than a bare ownership flag: only the
    /// host (which knows about units, cities and terrain) can tell a
    /// friendly-occupied tile apart from a merely unclaimed one, so the
    /// engine asks for that distinction directly instead of trying to infer
    /// it from a single boolean. See DESIGN.md.
    pub get_zoc: Option<Box<dyn Fn(&H::ActorOwner, TileIndex, &H::MapHandle) -> crate::zoc::ZocClass>>,

    /// `get_action(tile, knowledge, params) -> action`. Optional; defaults
    /// to `Action::None`.
    pub get_action: Option<Box<dyn Fn(TileIndex, Knowledge, &Parameters<H>) -> Action>>,

    /// `is_action_possible(from, from_scope, to, action, params) -> bool`.
    /// Optional; defaults to permitting the action.
    pub is_action_possible:
        Option<Box<dyn Fn(TileIndex, MoveScope, TileIndex, Action, &Parameters<H>) -> bool>>,

    /// `is_pos_dangerous(tile, knowledge, params) -> bool`. Required by, and
    /// only meaningful to, the danger finder.
    pub is_pos_dangerous: Option<Box<dyn Fn(TileIndex, Knowledge, &Parameters<H>) -> bool>>,

    /// `get_moves_left_req(tile, knowledge, params) -> mlr`. Required by,
    /// and only meaningful to, the fuel finder. `None` stands in for the
    /// `IMPOSSIBLE` sentinel (forbid entry); `Some(0)` marks a refuel point.
    pub get_moves_left_req:
        Option<Box<dyn Fn(TileIndex, Knowledge, &Parameters<H>) -> Option<i64>>>,

    /// `get_costs(from, dir, to, from_cost, from_ec, &mut to_cost, &mut
    /// to_ec, params) -> key | reject`. Jumbo variant; normal-mode only.
    /// Returns the new priority key, or `None` to reject the edge.
    #[allow(clippy::type_complexity)]
    pub get_costs: Option<
        Box<
            dyn Fn(
                TileIndex,
                Direction,
                TileIndex,
                Cost,
                i64,
                &mut Cost,
                &mut i64,
                &Parameters<H>,
            ) -> Option<i64>,
        >,
    >,

    /// What the actor's owner currently knows about a tile. Every other
    /// callback that takes a `Knowledge` argument needs this to supply it;
    /// a host typically derives the answer from the player's fog-of-war
    /// state and the `omniscience` flag. See DESIGN.md.
    pub knowledge_at: Box<dyn Fn(TileIndex, &Parameters<H>) -> Knowledge>,
}
