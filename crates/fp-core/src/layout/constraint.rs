//! Per-cell door constraints used while growing the room tree

use std::f64::consts::PI;

use super::{Coord, Direction, Grid};
use crate::rng::RandomSource;

/// Doors a cell is forced to have, forced to lack, and may have at most
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectionConstraint {
    pub must_have: Direction,
    pub must_not_have: Direction,
    pub max_directions: i64,
}

impl DirectionConstraint {
    /// Derive the constraint for `at` from its already-visited neighbours
    ///
    /// A visited neighbour with a door toward `at` forces the matching door;
    /// a visited neighbour without one, or the grid edge, forbids it.
    pub fn from_neighbours(grid: &Grid, at: Coord) -> Self {
        let mut constraint = Self::default();
        for dir in Direction::CARDINALS {
            match grid.neighbour(at, dir) {
                None => constraint.must_not_have |= dir,
                Some(cell) if cell.visited => {
                    if cell.has_door(dir.opposite()) {
                        constraint.must_have |= dir;
                    } else {
                        constraint.must_not_have |= dir;
                    }
                }
                Some(_) => {}
            }
        }
        constraint
    }

    /// Cap the door count so growth never schedules more than `target` rooms
    ///
    /// Forced doors lead to rooms that were already counted, so they are free.
    pub fn with_budget(mut self, target: u32, scheduled: u32) -> Self {
        self.max_directions = target as i64 - scheduled as i64 + self.must_have.count() as i64;
        self
    }

    /// Pick the door set for a cell
    ///
    /// Starts from `must_have`, then offers each remaining direction in
    /// cardinal order with [`door_probability`], stopping at the cap.
    pub fn choose<R: RandomSource + ?Sized>(
        &self,
        preferred_num_doors: u8,
        strictness: f64,
        rng: &mut R,
    ) -> Direction {
        let mut doors = self.must_have;
        for dir in Direction::CARDINALS {
            if doors.contains(dir) || self.must_not_have.contains(dir) {
                continue;
            }
            if doors.count() as i64 >= self.max_directions {
                break;
            }
            let distance = preferred_num_doors as f64 - doors.count() as f64;
            if rng.next_double() < door_probability(distance, strictness) {
                doors |= dir;
            }
        }
        doors
    }
}

/// Chance of opening one more door when `distance` doors short of the preference
///
/// Strictness 0 gives a coin flip; high strictness approaches a step at the
/// preferred count.
pub fn door_probability(distance: f64, strictness: f64) -> f64 {
    let scale = 100.0 / PI;
    (scale * (strictness * (distance - 0.25)).atan() + 50.0) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RoomKind;
    use crate::rng::FloorRng;

    /// Replays a fixed list of doubles
    struct Scripted(Vec<f64>);

    impl RandomSource for Scripted {
        fn next_int(&mut self, min: i32, _max_exclusive: i32) -> i32 {
            min
        }

        fn next_double(&mut self) -> f64 {
            self.0.remove(0)
        }
    }

    #[test]
    fn test_probability_shape() {
        assert!((door_probability(1.0, 0.0) - 0.5).abs() < 1e-12);
        assert!((door_probability(-3.0, 0.0) - 0.5).abs() < 1e-12);
        assert!(door_probability(1.0, 100.0) > 0.99);
        assert!(door_probability(0.0, 100.0) < 0.02);
        assert!(door_probability(2.0, 50.0) > door_probability(1.0, 50.0));
    }

    #[test]
    fn test_constraint_from_visited_neighbours() {
        let mut grid = Grid::new(5, 5);
        let at = Coord::new(2, 2);

        let right = grid.get_mut(Coord::new(3, 2)).unwrap();
        right.visited = true;
        right.kind = RoomKind::Normal;
        right.doors = Direction::LEFT;

        let up = grid.get_mut(Coord::new(2, 3)).unwrap();
        up.visited = true;
        up.doors = Direction::RIGHT;

        let c = DirectionConstraint::from_neighbours(&grid, at);
        assert_eq!(c.must_have, Direction::RIGHT);
        assert_eq!(c.must_not_have, Direction::UP);
    }

    #[test]
    fn test_grid_edge_is_forbidden() {
        let grid = Grid::new(3, 3);
        let c = DirectionConstraint::from_neighbours(&grid, Coord::new(0, 0));
        assert_eq!(c.must_not_have, Direction::LEFT | Direction::DOWN);
        assert_eq!(c.must_have, Direction::empty());
    }

    #[test]
    fn test_budget_counts_forced_doors_as_free() {
        let c = DirectionConstraint {
            must_have: Direction::LEFT,
            ..Default::default()
        }
        .with_budget(10, 8);
        assert_eq!(c.max_directions, 3);

        let c = DirectionConstraint::default().with_budget(3, 4);
        assert_eq!(c.max_directions, -1);
    }

    #[test]
    fn test_choose_keeps_forced_doors_past_budget() {
        let c = DirectionConstraint {
            must_have: Direction::LEFT | Direction::UP,
            must_not_have: Direction::empty(),
            max_directions: 0,
        };
        let mut rng = FloorRng::new(5);
        assert_eq!(c.choose(4, 0.0, &mut rng), Direction::LEFT | Direction::UP);
    }

    #[test]
    fn test_choose_respects_forbidden_and_cap() {
        let c = DirectionConstraint {
            must_have: Direction::LEFT,
            must_not_have: Direction::RIGHT,
            max_directions: 2,
        };
        // First offered direction is UP; accept it, then the cap stops DOWN
        let mut rng = Scripted(vec![0.0]);
        assert_eq!(c.choose(4, 0.0, &mut rng), Direction::LEFT | Direction::UP);
        assert!(rng.0.is_empty());
    }

    #[test]
    fn test_choose_rejects_on_high_draw() {
        let c = DirectionConstraint {
            must_have: Direction::DOWN,
            must_not_have: Direction::empty(),
            max_directions: 4,
        };
        let mut rng = Scripted(vec![0.99, 0.99, 0.99]);
        assert_eq!(c.choose(2, 0.0, &mut rng), Direction::DOWN);
    }
}
