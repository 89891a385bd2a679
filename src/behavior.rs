/// Caller policy on a tile, returned by the optional `get_tb` callback.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum TileBehavior {
    /// No special policy; the tile is usable like any other.
    #[default]
    Normal,
    /// The node is a sink: edges may enter it but none may leave it.
    DontLeave,
    /// The tile may not be used at all, unless it is the start tile.
    Ignore,
}
