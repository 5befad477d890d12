//! Layout grid and the finished map

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Coord, Direction, MapCell, RoomKind};
use crate::error::LayoutError;

/// Owns every cell of a layout, indexed `cells[x][y]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<MapCell>>,
}

impl Grid {
    /// Create a grid of empty cells
    pub fn new(width: usize, height: usize) -> Self {
        let cells = (0..width)
            .map(|x| (0..height).map(|y| MapCell::empty(Coord::new(x, y))).collect())
            .collect();
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, at: Coord) -> bool {
        at.x < self.width && at.y < self.height
    }

    pub fn get(&self, at: Coord) -> Option<&MapCell> {
        self.cells.get(at.x).and_then(|col| col.get(at.y))
    }

    pub fn get_mut(&mut self, at: Coord) -> Option<&mut MapCell> {
        self.cells.get_mut(at.x).and_then(|col| col.get_mut(at.y))
    }

    /// Coordinate `distance` cells away in `dir`, if on the grid
    pub fn step(&self, at: Coord, dir: Direction, distance: i32) -> Option<Coord> {
        at.step(dir, distance, self.width, self.height)
    }

    /// Adjacent cell in `dir`, if on the grid
    pub fn neighbour(&self, at: Coord, dir: Direction) -> Option<&MapCell> {
        self.step(at, dir, 1).and_then(|c| self.get(c))
    }

    /// All cells, column by column
    pub fn cells(&self) -> impl Iterator<Item = &MapCell> {
        self.cells.iter().flat_map(|col| col.iter())
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut MapCell> {
        self.cells.iter_mut().flat_map(|col| col.iter_mut())
    }
}

/// Grid as read from JSON, before its shape is checked
#[derive(Deserialize)]
struct RawGrid {
    width: usize,
    height: usize,
    cells: Vec<Vec<MapCell>>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = LayoutError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        if raw.cells.len() != raw.width {
            return Err(LayoutError::Config {
                reason: format!("grid has {} columns, width is {}", raw.cells.len(), raw.width),
            });
        }
        for (x, column) in raw.cells.iter().enumerate() {
            if column.len() != raw.height {
                return Err(LayoutError::Config {
                    reason: format!(
                        "grid column {} has {} cells, height is {}",
                        x,
                        column.len(),
                        raw.height
                    ),
                });
            }
            if let Some(y) = column
                .iter()
                .enumerate()
                .position(|(y, cell)| cell.location != Coord::new(x, y))
            {
                return Err(LayoutError::Config {
                    reason: format!("cell at ({},{}) records a different location", x, y),
                });
            }
        }
        Ok(Self {
            width: raw.width,
            height: raw.height,
            cells: raw.cells,
        })
    }
}

/// Inclusive bounding box of a group of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellBounds {
    pub min: Coord,
    pub max: Coord,
}

impl CellBounds {
    pub fn width(&self) -> usize {
        self.max.x - self.min.x + 1
    }

    pub fn height(&self) -> usize {
        self.max.y - self.min.y + 1
    }

    pub fn contains(&self, at: Coord) -> bool {
        (self.min.x..=self.max.x).contains(&at.x) && (self.min.y..=self.max.y).contains(&at.y)
    }
}

/// A finished floor layout
///
/// Read-only once returned: consumers look at each cell's `kind` and `doors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMap")]
pub struct Map {
    grid: Grid,
    start: Coord,
}

#[derive(Deserialize)]
struct RawMap {
    grid: Grid,
    start: Coord,
}

impl TryFrom<RawMap> for Map {
    type Error = LayoutError;

    fn try_from(raw: RawMap) -> Result<Self, Self::Error> {
        if !raw.grid.contains(raw.start) {
            return Err(LayoutError::Config {
                reason: format!("start ({},{}) is off the grid", raw.start.x, raw.start.y),
            });
        }
        Ok(Self::new(raw.grid, raw.start))
    }
}

impl Map {
    pub(crate) fn new(grid: Grid, start: Coord) -> Self {
        Self { grid, start }
    }

    /// `(width, height)` of the grid
    pub fn size(&self) -> (usize, usize) {
        (self.grid.width(), self.grid.height())
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Location of the start room
    pub fn start(&self) -> Coord {
        self.start
    }

    pub fn start_cell(&self) -> Option<&MapCell> {
        self.grid.get(self.start)
    }

    pub fn cell(&self, at: Coord) -> Option<&MapCell> {
        self.grid.get(at)
    }

    pub fn neighbour(&self, at: Coord, dir: Direction) -> Option<&MapCell> {
        self.grid.neighbour(at, dir)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cells(&self) -> impl Iterator<Item = &MapCell> {
        self.grid.cells()
    }

    /// Cells holding a room of any kind
    pub fn rooms(&self) -> impl Iterator<Item = &MapCell> {
        self.cells().filter(|c| c.is_room())
    }

    /// Number of cells of `kind`
    pub fn count(&self, kind: RoomKind) -> usize {
        self.cells().filter(|c| c.kind == kind).count()
    }

    /// Normal rooms bucketed by door count (index 0 to 4)
    pub fn door_histogram(&self) -> [usize; 5] {
        let mut histogram = [0; 5];
        for cell in self.cells().filter(|c| c.kind == RoomKind::Normal) {
            histogram[cell.doors.count() as usize] += 1;
        }
        histogram
    }

    /// Doors whose neighbour has no matching door back, or that lead off the grid
    ///
    /// Empty for every map the generator returns.
    pub fn asymmetric_doors(&self) -> Vec<(Coord, Direction)> {
        let mut broken = Vec::new();
        for cell in self.cells() {
            for dir in Direction::CARDINALS {
                let here = cell.has_door(dir);
                let there = self
                    .neighbour(cell.location, dir)
                    .is_some_and(|n| n.has_door(dir.opposite()));
                if here && !there {
                    broken.push((cell.location, dir));
                }
            }
        }
        broken
    }

    /// Bounding box of the boss cells, if any were placed
    pub fn boss_block(&self) -> Option<CellBounds> {
        let mut bosses = self.cells().filter(|c| c.kind == RoomKind::Boss);
        let first = bosses.next()?.location;
        let mut bounds = CellBounds {
            min: first,
            max: first,
        };
        for cell in bosses {
            let at = cell.location;
            bounds.min = Coord::new(bounds.min.x.min(at.x), bounds.min.y.min(at.y));
            bounds.max = Coord::new(bounds.max.x.max(at.x), bounds.max.y.max(at.y));
        }
        Some(bounds)
    }

    /// One glyph per cell, top row first
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width() + 1) * self.height());
        for y in (0..self.height()).rev() {
            for x in 0..self.width() {
                let kind = self.grid.get(Coord::new(x, y)).map_or(RoomKind::None, |c| c.kind);
                out.push(kind.symbol());
            }
            out.push('\n');
        }
        out
    }

    /// Write [`render_ascii`](Self::render_ascii) to `path`
    pub fn write_dump(&self, path: &Path) -> Result<(), LayoutError> {
        std::fs::write(path, self.render_ascii()).map_err(|e| LayoutError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        log::debug!("wrote layout dump to {}", path.display());
        Ok(())
    }

    /// Short human summary of what the map holds
    pub fn summary(&self) -> String {
        format!(
            "{}x{} start=({},{}) normal={} special={} boss={} exit={}",
            self.width(),
            self.height(),
            self.start.x,
            self.start.y,
            self.count(RoomKind::Normal),
            self.count(RoomKind::Special),
            self.count(RoomKind::Boss),
            self.count(RoomKind::Exit),
        )
    }
}
