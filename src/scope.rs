use bitflags::bitflags;

bitflags! {
    /// How the actor may occupy a tile. `get_move_scope` returns a mask
    /// combining these; `NONE` means the actor cannot occupy the tile at all
    /// (an action may still be possible there, see `Action`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MoveScope: u8 {
        const NONE = 0;
        const NATIVE = 1 << 0;
        const TRANSPORT = 1 << 1;
    }
}

impl Default for MoveScope {
    fn default() -> Self {
        MoveScope::NONE
    }
}
