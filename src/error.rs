use crate::tile::TileIndex;
use thiserror::Error;

/// Errors the core can report. An unreachable tile is deliberately not a
/// variant here — it's a normal outcome, not an error — and is represented
/// as `None`/an empty `Path` at the call sites that can produce it.
/// Re-entrant use of a finder is likewise not a variant: it's a programming
/// error this crate only promises to catch in debug builds, via a
/// `debug_assert!` guard rather than a recoverable error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PfError {
    #[error("bad parameters: {0}")]
    BadParameters(String),

    /// The engine never learns the host's map bounds on its own — it only
    /// ever discovers tiles through `step` — so this variant is never
    /// constructed internally. It exists for hosts that want to bounds-check
    /// a query tile against their own map before calling in, using the same
    /// error type the rest of the contract reports through.
    #[error("tile {0:?} is outside the map")]
    InvalidTile(TileIndex),
}

pub type Result<T> = std::result::Result<T, PfError>;
