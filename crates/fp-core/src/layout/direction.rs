//! Door directions

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Set of sides a cell has doors on
    ///
    /// Right is +x, Up is +y.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Direction: u8 {
        const RIGHT = 0x01;
        const UP = 0x02;
        const LEFT = 0x04;
        const DOWN = 0x08;
        const ALL = Self::RIGHT.bits() | Self::UP.bits() | Self::LEFT.bits() | Self::DOWN.bits();
    }
}

// Stored as the raw bits, matching how downstream consumers read the grid
impl Serialize for Direction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(Direction::from_bits_truncate(bits))
    }
}

impl Direction {
    /// The four single directions, in the order growth considers them
    pub const CARDINALS: [Direction; 4] = [
        Direction::RIGHT,
        Direction::UP,
        Direction::LEFT,
        Direction::DOWN,
    ];

    /// The opposite side of every direction in the set
    pub const fn opposite(self) -> Direction {
        let bits = self.bits();
        // Rotating the nibble by two swaps RIGHT<->LEFT and UP<->DOWN
        Direction::from_bits_truncate(((bits << 2) | (bits >> 2)) & 0x0F)
    }

    /// Unit step for a single direction, `(0, 0)` for anything else
    pub const fn offset(self) -> (i32, i32) {
        match self.bits() {
            0x01 => (1, 0),
            0x02 => (0, 1),
            0x04 => (-1, 0),
            0x08 => (0, -1),
            _ => (0, 0),
        }
    }

    /// Number of doors in the set
    pub const fn count(self) -> u32 {
        self.bits().count_ones()
    }

    /// Iterate the single directions contained in this set, in cardinal order
    pub fn cardinals(self) -> impl Iterator<Item = Direction> {
        Direction::CARDINALS
            .into_iter()
            .filter(move |d| self.contains(*d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_pairs() {
        assert_eq!(Direction::RIGHT.opposite(), Direction::LEFT);
        assert_eq!(Direction::LEFT.opposite(), Direction::RIGHT);
        assert_eq!(Direction::UP.opposite(), Direction::DOWN);
        assert_eq!(Direction::DOWN.opposite(), Direction::UP);
        assert_eq!(Direction::ALL.opposite(), Direction::ALL);
        assert_eq!(Direction::empty().opposite(), Direction::empty());
        assert_eq!(
            (Direction::RIGHT | Direction::UP).opposite(),
            Direction::LEFT | Direction::DOWN
        );
    }

    #[test]
    fn test_complement_stays_in_four_bits() {
        assert_eq!(!Direction::RIGHT, Direction::UP | Direction::LEFT | Direction::DOWN);
        assert_eq!(!Direction::ALL, Direction::empty());
        assert_eq!(Direction::ALL.complement(), Direction::empty());
    }

    #[test]
    fn test_offsets_cancel_with_opposite() {
        for dir in Direction::CARDINALS {
            let (dx, dy) = dir.offset();
            let (ox, oy) = dir.opposite().offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
            assert_eq!(dx.abs() + dy.abs(), 1);
        }
        assert_eq!(Direction::ALL.offset(), (0, 0));
    }

    #[test]
    fn test_count_and_iteration() {
        let set = Direction::UP | Direction::DOWN;
        assert_eq!(set.count(), 2);
        assert_eq!(set.cardinals().collect::<Vec<_>>(), vec![Direction::UP, Direction::DOWN]);
        assert_eq!(Direction::ALL.count(), 4);
    }

    #[test]
    fn test_serde_as_bits() {
        let json = serde_json::to_string(&(Direction::RIGHT | Direction::DOWN)).unwrap();
        assert_eq!(json, "9");
        let back: Direction = serde_json::from_str("255").unwrap();
        assert_eq!(back, Direction::ALL);
    }
}
