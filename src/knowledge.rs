/// Whether the actor's owner currently knows a tile. The source consults a
/// richer per-player knowledge level, but the engine itself only ever
/// branches on "known vs. not" when deciding the unknown-move-cost rule —
/// any finer-grained fog-of-war distinction is the host's own business and
/// can be recovered from `map_handle` inside a callback, so it is not
/// threaded through the core as a separate generic parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Knowledge {
    #[default]
    Known,
    Unknown,
}

impl Knowledge {
    pub fn is_unknown(self) -> bool {
        self == Knowledge::Unknown
    }
}
