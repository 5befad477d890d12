//! Floor layout generation
//!
//! Builds the room tree in phases: size the grid, place the start room,
//! grow normal rooms breadth-first, attach the boss block and its exit,
//! then hang special rooms off the tree. A placement that cannot be made
//! throws the whole attempt away and starts over with fresh draws.

use std::collections::VecDeque;

use thiserror::Error;

use super::constraint::DirectionConstraint;
use super::map::{Grid, Map};
use super::params::{LayoutGenerationParams, RoomBudget};
use super::{Coord, Direction, RoomKind};
use crate::error::LayoutError;
use crate::rng::RandomSource;

/// Why a single attempt was abandoned
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlacementFailure {
    #[error("growth stalled at {placed} of {target} normal rooms")]
    StalledGrowth { placed: usize, target: u32 },

    #[error("no normal room has space for the boss block")]
    NoBossSite,

    #[error("ran out of branch points after {placed} of {wanted} special rooms")]
    NoSpecialSite { placed: u32, wanted: u32 },
}

/// Cells claimed by the boss block, its corridor ends and the exit
#[derive(Debug, Clone, Copy)]
struct BossSite {
    block: [Coord; 9],
    /// Block cell touching the branch room
    near: Coord,
    /// Block cell touching the exit
    far: Coord,
    exit: Coord,
}

/// Generates floor layouts from parameters and a borrowed random stream
///
/// The stream is borrowed mutably for the generator's lifetime, so nothing
/// else can draw from it mid-generation.
pub struct LayoutGenerator<'a, R: RandomSource> {
    params: &'a LayoutGenerationParams,
    rng: &'a mut R,
    attempts_used: u32,
}

impl<'a, R: RandomSource> LayoutGenerator<'a, R> {
    pub fn new(params: &'a LayoutGenerationParams, rng: &'a mut R) -> Self {
        Self {
            params,
            rng,
            attempts_used: 0,
        }
    }

    /// Attempts consumed by the last call to [`generate`](Self::generate)
    pub fn attempts_used(&self) -> u32 {
        self.attempts_used
    }

    /// Generate a complete layout
    ///
    /// Invalid parameters fail before any random draw. Otherwise retries
    /// whole floors until one succeeds or `max_attempts` is spent.
    pub fn generate(&mut self) -> Result<Map, LayoutError> {
        self.params.validate()?;
        self.attempts_used = 0;

        for attempt in 1..=self.params.max_attempts {
            self.attempts_used = attempt;
            let budget = self.params.draw_budget(&mut *self.rng)?;
            log::debug!(
                "layout attempt {}: {} normal, {} dead-end, grid {}",
                attempt,
                budget.normal,
                budget.dead_end,
                budget.grid_side()
            );

            match self.try_floor(budget) {
                Ok(map) => {
                    log::info!("generated layout {} after {} attempt(s)", map.summary(), attempt);
                    return Ok(map);
                }
                Err(failure) => {
                    log::warn!("layout attempt {} abandoned: {}", attempt, failure);
                }
            }
        }

        Err(LayoutError::GenerationFailed {
            attempts: self.params.max_attempts,
        })
    }

    fn try_floor(&mut self, budget: RoomBudget) -> Result<Map, PlacementFailure> {
        let mut floor = FloorBuilder::new(budget);
        floor.grow_normal_rooms(
            self.params.preferred_num_doors,
            self.params.strictness_num_doors,
            &mut *self.rng,
        )?;
        floor.place_boss(&mut *self.rng)?;
        floor.place_special_rooms(&mut *self.rng)?;
        Ok(floor.finish())
    }
}

/// Generate a layout with a one-off [`LayoutGenerator`]
pub fn generate_layout<R: RandomSource>(
    params: &LayoutGenerationParams,
    rng: &mut R,
) -> Result<Map, LayoutError> {
    LayoutGenerator::new(params, rng).generate()
}

/// State of one generation attempt
struct FloorBuilder {
    grid: Grid,
    start: Coord,
    budget: RoomBudget,
    /// Normal rooms that rooms may still be attached to, in placement order
    branchable: Vec<Coord>,
}

impl FloorBuilder {
    /// Size the grid and place the start room
    fn new(budget: RoomBudget) -> Self {
        let side = budget.grid_side();
        let mut grid = Grid::new(side, side);
        let start = Coord::new((side + 1) / 2, (side + 1) / 2);
        if let Some(cell) = grid.get_mut(start) {
            cell.visited = true;
            cell.kind = RoomKind::Start;
            cell.doors = Direction::ALL;
        }
        Self {
            grid,
            start,
            budget,
            branchable: Vec::new(),
        }
    }

    /// Mark `at` as taken and return it, if it is on the grid
    fn claim(&mut self, at: Coord) -> Option<Coord> {
        let cell = self.grid.get_mut(at)?;
        cell.visited = true;
        Some(at)
    }

    fn is_free(&self, at: Coord) -> bool {
        self.grid.get(at).is_some_and(|c| !c.visited)
    }

    /// Breadth-first growth of the normal-room tree out of the start room
    fn grow_normal_rooms<R: RandomSource>(
        &mut self,
        preferred_num_doors: u8,
        strictness: f64,
        rng: &mut R,
    ) -> Result<(), PlacementFailure> {
        let target = self.budget.normal;
        let mut queue = VecDeque::new();
        let mut scheduled = 0u32;

        for dir in Direction::CARDINALS {
            if let Some(next) = self.grid.step(self.start, dir, 1).and_then(|c| self.claim(c)) {
                queue.push_back(next);
                scheduled += 1;
            }
        }

        while let Some(at) = queue.pop_front() {
            let constraint =
                DirectionConstraint::from_neighbours(&self.grid, at).with_budget(target, scheduled);
            let doors = constraint.choose(preferred_num_doors, strictness, rng);

            if let Some(cell) = self.grid.get_mut(at) {
                cell.doors = doors;
                cell.kind = RoomKind::Normal;
            }
            self.branchable.push(at);

            for dir in doors.difference(constraint.must_have).cardinals() {
                if let Some(next) = self.grid.step(at, dir, 1).and_then(|c| self.claim(c)) {
                    queue.push_back(next);
                    scheduled += 1;
                }
            }
        }

        log::debug!(
            "grew {} normal rooms (target {})",
            self.branchable.len(),
            target
        );
        if self.branchable.len() < target as usize {
            return Err(PlacementFailure::StalledGrowth {
                placed: self.branchable.len(),
                target,
            });
        }
        Ok(())
    }

    /// Where a boss block would go if attached to `at` on side `dir`
    ///
    /// The block is the 3x3 square centred two cells out; the exit sits four
    /// cells out. Every cell involved must be on the grid and unclaimed.
    fn boss_site(&self, at: Coord, dir: Direction) -> Option<BossSite> {
        let center = self.grid.step(at, dir, 2)?;
        let mut block = [center; 9];
        let offsets = (-1..=1).flat_map(|dx| (-1..=1).map(move |dy| (dx, dy)));
        for (slot, (dx, dy)) in block.iter_mut().zip(offsets) {
            let c = center.translate(dx, dy, self.grid.width(), self.grid.height())?;
            if !self.is_free(c) {
                return None;
            }
            *slot = c;
        }
        let exit = self.grid.step(at, dir, 4)?;
        if !self.is_free(exit) {
            return None;
        }
        Some(BossSite {
            block,
            near: self.grid.step(at, dir, 1)?,
            far: self.grid.step(at, dir, 3)?,
            exit,
        })
    }

    fn carve_boss(&mut self, branch: Coord, dir: Direction, site: BossSite) {
        for at in site.block {
            if let Some(cell) = self.grid.get_mut(at) {
                cell.visited = true;
                cell.kind = RoomKind::Boss;
            }
        }
        // Straight corridor through the block: in from the branch, out to the exit
        if let Some(cell) = self.grid.get_mut(site.near) {
            cell.doors = dir.opposite();
        }
        if let Some(cell) = self.grid.get_mut(site.far) {
            cell.doors = dir;
        }
        if let Some(cell) = self.grid.get_mut(site.exit) {
            cell.visited = true;
            cell.kind = RoomKind::Exit;
            cell.doors = dir.opposite();
        }
        if let Some(cell) = self.grid.get_mut(branch) {
            cell.doors |= dir;
        }
        log::debug!(
            "boss block attached to ({},{}) facing {:?}",
            branch.x,
            branch.y,
            dir
        );
    }

    /// Attach the boss block and exit to a random branchable room
    fn place_boss<R: RandomSource>(&mut self, rng: &mut R) -> Result<(), PlacementFailure> {
        while !self.branchable.is_empty() {
            let index = rng.next_index(self.branchable.len());
            let at = self.branchable[index];

            let mut dirs = Direction::CARDINALS;
            rng.shuffle(&mut dirs);
            let found = dirs
                .into_iter()
                .find_map(|dir| self.boss_site(at, dir).map(|site| (dir, site)));

            match found {
                Some((dir, site)) => {
                    self.carve_boss(at, dir, site);
                    return Ok(());
                }
                None => {
                    self.branchable.remove(index);
                }
            }
        }
        Err(PlacementFailure::NoBossSite)
    }

    /// Hang one single-door special room per dead-end room off the tree
    fn place_special_rooms<R: RandomSource>(
        &mut self,
        rng: &mut R,
    ) -> Result<(), PlacementFailure> {
        let wanted = self.budget.dead_end;
        for placed in 0..wanted {
            loop {
                if self.branchable.is_empty() {
                    return Err(PlacementFailure::NoSpecialSite { placed, wanted });
                }
                let index = rng.next_index(self.branchable.len());
                let at = self.branchable[index];

                let open: Vec<Direction> = Direction::CARDINALS
                    .into_iter()
                    .filter(|&dir| self.grid.step(at, dir, 1).is_some_and(|c| self.is_free(c)))
                    .collect();
                if open.is_empty() {
                    self.branchable.remove(index);
                    continue;
                }

                let dir = open[rng.next_index(open.len())];
                if let Some(cell) = self
                    .grid
                    .step(at, dir, 1)
                    .and_then(|c| self.grid.get_mut(c))
                {
                    cell.visited = true;
                    cell.kind = RoomKind::Special;
                    cell.doors = dir.opposite();
                }
                if let Some(cell) = self.grid.get_mut(at) {
                    cell.doors |= dir;
                }
                break;
            }
        }
        Ok(())
    }

    /// Clear scratch state and hand the grid over
    fn finish(mut self) -> Map {
        for cell in self.grid.cells_mut() {
            cell.visited = false;
        }
        let map = Map::new(self.grid, self.start);
        debug_assert!(map.asymmetric_doors().is_empty());
        map
    }
}
