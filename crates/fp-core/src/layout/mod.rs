//! Floor layout graph
//!
//! Contains directions, cells, generation parameters, the generator and
//! the finished map.

mod cell;
mod constraint;
mod direction;
mod generation;
mod map;
mod params;

pub use cell::{Coord, MapCell, RoomKind};
pub use constraint::{door_probability, DirectionConstraint};
pub use direction::Direction;
pub use generation::{generate_layout, LayoutGenerator};
pub use map::{CellBounds, Grid, Map};
pub use params::{
    LayoutGenerationParams, RoomBudget, RoomCount, RoomTypeDescriptor, DEFAULT_MAX_ATTEMPTS,
    NORMAL_ROOM_TYPE, SPECIAL_ROOM_TYPE,
};
