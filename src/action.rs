/// An action the actor would perform at a tile, returned by the optional
/// `get_action` callback. The engine only ever distinguishes the four cases
/// below; anything the host considers a distinct action type beyond "an
/// attack" or "some other action" is folded into `Other` since the core's
/// the edge-expansion rules never need to tell two non-attack actions
/// apart.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    None,
    /// Forbids entry outright.
    Impossible,
    Attack,
    Other,
}

impl Action {
    pub fn is_none(self) -> bool {
        self == Action::None
    }
}
