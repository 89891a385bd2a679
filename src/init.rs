use crate::action::Action;
use crate::behavior::TileBehavior;
use crate::callbacks::HostTypes;
use crate::knowledge::Knowledge;
use crate::parameters::Parameters;
use crate::scope::MoveScope;
use crate::tile::TileIndex;
use crate::zoc::ZocClass;

/// The attributes every finder caches on a node's first visit
/// shared across the normal, danger and fuel finders.
pub struct CommonAttrs {
    pub knowledge: Knowledge,
    pub behavior: TileBehavior,
    pub move_scope: MoveScope,
    pub can_disembark: bool,
    pub action: Action,
    pub zoc_class: ZocClass,
    pub extra_tile: i64,
}

/// Initializes the cached attributes for a tile, given the scope the
/// actor carries into it. Returns `None` when the tile cannot be used at
/// all (behavior `Ignore` on a non-start tile, an impossible action, or — if
/// `ignore_none_scopes` is set — no usable scope and no action), the signal
/// callers use to mark the node `Init` with `behavior = Ignore` and never
/// enqueue it.
pub fn init_common_attrs<H: HostTypes>(
    tile: TileIndex,
    is_start: bool,
    previous_scope: MoveScope,
    params: &Parameters<H>,
) -> Option<CommonAttrs> {
    let knowledge = (params.callbacks.knowledge_at)(tile, params);

    let behavior = params
        .callbacks
        .get_tb
        .as_ref()
        .map(|f| f(tile, knowledge, params))
        .unwrap_or_default();
    if behavior == TileBehavior::Ignore && !is_start {
        return None;
    }

    let (move_scope, can_disembark) = (params.callbacks.get_move_scope)(tile, previous_scope, params);

    let action = params
        .callbacks
        .get_action
        .as_ref()
        .map(|f| f(tile, knowledge, params))
        .unwrap_or_default();
    if action == Action::Impossible {
        return None;
    }

    if !is_start
        && params.ignore_none_scopes
        && move_scope == MoveScope::NONE
        && action.is_none()
    {
        return None;
    }

    let zoc_class = params
        .callbacks
        .get_zoc
        .as_ref()
        .map(|f| f(&params.actor_owner, tile, &params.map_handle))
        .unwrap_or_default();

    let extra_tile = params
        .callbacks
        .get_ec
        .as_ref()
        .map(|f| f(tile, knowledge, params))
        .unwrap_or(0);

    Some(CommonAttrs {
        knowledge,
        behavior,
        move_scope,
        can_disembark,
        action,
        zoc_class,
        extra_tile,
    })
}

/// The zone-of-control rule: moving from `u` into `v` is forbidden when `u`
/// is not `Mine` and `v` is `No`.
pub fn zoc_blocks(u_zoc: ZocClass, v_zoc: ZocClass) -> bool {
    u_zoc != ZocClass::Mine && v_zoc == ZocClass::No
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoc_blocks_non_mine_into_no() {
        assert!(zoc_blocks(ZocClass::No, ZocClass::No));
        assert!(zoc_blocks(ZocClass::Allied, ZocClass::No));
    }

    #[test]
    fn zoc_allows_mine_source() {
        assert!(!zoc_blocks(ZocClass::Mine, ZocClass::No));
    }

    #[test]
    fn zoc_allows_non_no_destination() {
        assert!(!zoc_blocks(ZocClass::No, ZocClass::Allied));
        assert!(!zoc_blocks(ZocClass::No, ZocClass::Mine));
    }
}
