/// Zone-of-control classification of a tile for a given actor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ZocClass {
    /// The actor controls this tile's zone (cities, unit-free tiles, no-ZOC
    /// terrain, or `get_zoc` reports ownership).
    #[default]
    Mine,
    /// The tile holds a friendly unit.
    Allied,
    /// Contested: neither owned nor friendly-occupied.
    No,
}
