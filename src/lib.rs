//! Generic tile-graph path finding: a host supplies a tile-stepping callback
//! and a handful of cost/behavior callbacks, and this crate runs a Dijkstra-
//! family search over whatever graph those callbacks describe. The engine
//! never owns or inspects a map itself — it only ever asks the host "what's
//! next in this direction" and "what does it cost to get there".
//!
//! Three finder variants share the same node-lattice/priority-queue core:
//! [`normal::NormalFinder`] for plain shortest paths, [`danger::DangerFinder`]
//! for actors that must never end a turn on a dangerous tile, and
//! [`fuel::FuelFinder`] for actors with a limited range between refuel
//! points. [`map::create_map`] picks the right one from [`Parameters`] and
//! returns it behind the [`map::Map`] enum. [`reverse::ReverseMap`] caches
//! repeated "cost to reach one fixed tile" queries across many actors.

pub mod action;
pub mod behavior;
pub mod callbacks;
pub mod danger;
pub mod direction;
pub mod error;
pub mod fuel;
pub mod init;
pub mod knowledge;
pub mod lattice;
pub mod map;
pub mod normal;
pub mod parameters;
pub mod path;
pub mod position;
pub mod presets;
pub mod queue;
pub mod reverse;
pub mod route;
pub mod scope;
pub mod tile;
pub mod zoc;

pub use action::Action;
pub use behavior::TileBehavior;
pub use callbacks::{Callbacks, HostTypes};
pub use danger::DangerFinder;
pub use direction::Direction;
pub use error::{PfError, Result};
pub use fuel::FuelFinder;
pub use knowledge::Knowledge;
pub use map::{create_map, Map};
pub use normal::NormalFinder;
pub use parameters::{Parameters, ParametersBuilder};
pub use path::Path;
pub use position::Position;
pub use queue::PriorityQueue;
pub use reverse::ReverseMap;
pub use route::{Route, RouteNode};
pub use scope::MoveScope;
pub use tile::{Cost, TileIndex, IMPOSSIBLE};
pub use zoc::ZocClass;
