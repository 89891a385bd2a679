use crate::callbacks::{Callbacks, HostTypes};
use crate::error::PfError;
use crate::tile::TileIndex;

/// The immutable input record a `Map` is built from. Copied into the `Map`
/// at construction; the host is free to drop or reuse its own copy
/// afterwards.
pub struct Parameters<H: HostTypes> {
    pub start_tile: TileIndex,
    pub map_handle: H::MapHandle,
    pub actor_kind: H::ActorKind,
    pub actor_owner: H::ActorOwner,
    pub move_rate: i64,
    pub moves_left_initially: i64,
    /// Turns the actor may spend before requiring refuel. `1` means "no
    /// fuel rule" even when a fuel finder happens to be requested.
    pub fuel: i64,
    pub fuel_left_initially: i64,
    pub omniscience: bool,
    pub transported_by_initially: Option<H::TransportTag>,
    pub ignore_none_scopes: bool,
    /// Cost charged for a step onto a tile the actor's owner doesn't
    /// currently know, when no cost callback has a better answer. Defaults to
    /// `move_rate`, i.e. "assume it costs a full turn".
    pub unknown_move_cost: i64,
    pub callbacks: Callbacks<H>,
}

/// Builder for `Parameters`: one entry point with named setters instead of
/// several near-duplicate constructors, since required vs. optional fields
/// can be expressed once here.
pub struct ParametersBuilder<H: HostTypes> {
    start_tile: Option<TileIndex>,
    map_handle: Option<H::MapHandle>,
    actor_kind: Option<H::ActorKind>,
    actor_owner: Option<H::ActorOwner>,
    move_rate: i64,
    moves_left_initially: Option<i64>,
    fuel: i64,
    fuel_left_initially: Option<i64>,
    omniscience: bool,
    transported_by_initially: Option<H::TransportTag>,
    ignore_none_scopes: bool,
    unknown_move_cost: Option<i64>,
    callbacks: Option<Callbacks<H>>,
}

impl<H: HostTypes> ParametersBuilder<H> {
    pub fn new() -> Self {
        Self {
            start_tile: None,
            map_handle: None,
            actor_kind: None,
            actor_owner: None,
            move_rate: 1,
            moves_left_initially: None,
            fuel: 1,
            fuel_left_initially: None,
            omniscience: false,
            transported_by_initially: None,
            ignore_none_scopes: false,
            unknown_move_cost: None,
            callbacks: None,
        }
    }

    pub fn start_tile(mut self, tile: TileIndex) -> Self {
        self.start_tile = Some(tile);
        self
    }

    pub fn map_handle(mut self, handle: H::MapHandle) -> Self {
        self.map_handle = Some(handle);
        self
    }

    pub fn actor_kind(mut self, kind: H::ActorKind) -> Self {
        self.actor_kind = Some(kind);
        self
    }

    pub fn actor_owner(mut self, owner: H::ActorOwner) -> Self {
        self.actor_owner = Some(owner);
        self
    }

    pub fn move_rate(mut self, move_rate: i64) -> Self {
        self.move_rate = move_rate;
        self
    }

    pub fn moves_left_initially(mut self, moves: i64) -> Self {
        self.moves_left_initially = Some(moves);
        self
    }

    pub fn fuel(mut self, fuel: i64) -> Self {
        self.fuel = fuel;
        self
    }

    pub fn fuel_left_initially(mut self, fuel_left: i64) -> Self {
        self.fuel_left_initially = Some(fuel_left);
        self
    }

    pub fn omniscience(mut self, omniscience: bool) -> Self {
        self.omniscience = omniscience;
        self
    }

    pub fn transported_by_initially(mut self, tag: H::TransportTag) -> Self {
        self.transported_by_initially = Some(tag);
        self
    }

    pub fn ignore_none_scopes(mut self, ignore: bool) -> Self {
        self.ignore_none_scopes = ignore;
        self
    }

    pub fn unknown_move_cost(mut self, cost: i64) -> Self {
        self.unknown_move_cost = Some(cost);
        self
    }

    pub fn callbacks(mut self, callbacks: Callbacks<H>) -> Self {
        self.callbacks = Some(callbacks);
        self
    }

    pub fn build(self) -> Result<Parameters<H>, PfError> {
        let start_tile = self
            .start_tile
            .ok_or_else(|| PfError::BadParameters("start_tile is required".into()))?;
        let map_handle = self
            .map_handle
            .ok_or_else(|| PfError::BadParameters("map_handle is required".into()))?;
        let actor_kind = self
            .actor_kind
            .ok_or_else(|| PfError::BadParameters("actor_kind is required".into()))?;
        let actor_owner = self
            .actor_owner
            .ok_or_else(|| PfError::BadParameters("actor_owner is required".into()))?;
        let callbacks = self
            .callbacks
            .ok_or_else(|| PfError::BadParameters("callbacks are required".into()))?;
        let moves_left_initially = self.moves_left_initially.unwrap_or(self.move_rate);
        let fuel_left_initially = self.fuel_left_initially.unwrap_or(self.fuel);
        let unknown_move_cost = self.unknown_move_cost.unwrap_or(self.move_rate);
        if self.fuel < 1 {
            return Err(PfError::BadParameters("fuel must be >= 1".into()));
        }

        Ok(Parameters {
            start_tile,
            map_handle,
            actor_kind,
            actor_owner,
            move_rate: self.move_rate,
            moves_left_initially,
            fuel: self.fuel,
            fuel_left_initially,
            omniscience: self.omniscience,
            transported_by_initially: self.transported_by_initially,
            ignore_none_scopes: self.ignore_none_scopes,
            unknown_move_cost,
            callbacks,
        })
    }
}

impl<H: HostTypes> Default for ParametersBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HostTypes> Parameters<H> {
    pub fn builder() -> ParametersBuilder<H> {
        ParametersBuilder::new()
    }
}
