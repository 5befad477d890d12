//! Layout cells

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::Direction;

/// Grid coordinate. `(0, 0)` is the bottom-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Step `distance` cells in `dir`, or `None` if that leaves `width` x `height`
    pub fn step(self, dir: Direction, distance: i32, width: usize, height: usize) -> Option<Coord> {
        let (dx, dy) = dir.offset();
        self.translate(dx * distance, dy * distance, width, height)
    }

    /// Offset by `(dx, dy)`, or `None` if that leaves `width` x `height`
    pub fn translate(self, dx: i32, dy: i32, width: usize, height: usize) -> Option<Coord> {
        let x = self.x as i64 + dx as i64;
        let y = self.y as i64 + dy as i64;
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            return None;
        }
        Some(Coord::new(x as usize, y as usize))
    }
}

/// What occupies a layout cell
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum RoomKind {
    #[default]
    None = 0,
    Normal = 1,
    Start = 2,
    Special = 3,
    Boss = 4,
    Exit = 5,
}

impl RoomKind {
    /// Check if a room was placed here
    pub const fn is_room(&self) -> bool {
        !matches!(self, RoomKind::None)
    }

    /// Get the glyph used by the layout dump
    pub const fn symbol(&self) -> char {
        match self {
            RoomKind::None => '-',
            RoomKind::Normal => '*',
            RoomKind::Start => 'P',
            RoomKind::Special => 'S',
            RoomKind::Boss => 'B',
            RoomKind::Exit => 'E',
        }
    }
}

/// A single layout cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapCell {
    pub location: Coord,

    /// Sides with a door
    pub doors: Direction,

    pub kind: RoomKind,

    /// Generation scratch; always false on a finished map
    #[serde(skip)]
    pub visited: bool,
}

impl MapCell {
    /// Create an empty cell at `location`
    pub const fn empty(location: Coord) -> Self {
        Self {
            location,
            doors: Direction::empty(),
            kind: RoomKind::None,
            visited: false,
        }
    }

    /// Check if a room was placed here
    ///
    /// Use this rather than `visited`, which is cleared once generation ends.
    pub const fn is_room(&self) -> bool {
        self.kind.is_room()
    }

    /// Check for a door on `dir`
    pub fn has_door(&self, dir: Direction) -> bool {
        self.doors.contains(dir)
    }
}
