//! Layout generation parameters
//!
//! Parameters are plain serde data so floors can be configured from JSON.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::rng::RandomSource;

/// Restart cap used when a configuration does not set one
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Name of the room type created by [`LayoutGenerationParams::simple`] for normal rooms
pub const NORMAL_ROOM_TYPE: &str = "normal";

/// Name of the room type created by [`LayoutGenerationParams::simple`] for special rooms
pub const SPECIAL_ROOM_TYPE: &str = "special";

/// Identity of a room type on this floor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTypeDescriptor {
    pub name: String,
    /// Dead-end rooms hang off the tree as single-door branches
    #[serde(default)]
    pub dead_end: bool,
}

impl RoomTypeDescriptor {
    pub fn new(name: impl Into<String>, dead_end: bool) -> Self {
        Self {
            name: name.into(),
            dead_end,
        }
    }
}

/// Target count for one room type: `base` plus or minus up to `variance`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoomCount {
    pub base: u32,
    #[serde(default)]
    pub variance: u32,
}

impl RoomCount {
    pub const fn new(base: u32, variance: u32) -> Self {
        Self { base, variance }
    }

    /// Draw an actual count, clamped at zero
    pub fn draw<R: RandomSource + ?Sized>(&self, rng: &mut R) -> u32 {
        let variance = i32::try_from(self.variance).unwrap_or(i32::MAX - 1);
        let delta = rng.next_int(-variance, variance + 1);
        (self.base as i64 + delta as i64).max(0) as u32
    }

    /// Smallest count a draw can produce
    pub const fn min(&self) -> u32 {
        self.base.saturating_sub(self.variance)
    }

    /// Largest count a draw can produce
    pub const fn max(&self) -> u32 {
        self.base.saturating_add(self.variance)
    }
}

fn default_preferred_num_doors() -> u8 {
    2
}

fn default_strictness() -> f64 {
    50.0
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

/// Everything the layout generator needs to know about a floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutGenerationParams {
    /// Room types present on this floor, in draw order
    pub room_types: Vec<RoomTypeDescriptor>,

    /// Target counts keyed by room type name
    pub room_counts: BTreeMap<String, RoomCount>,

    /// Door count growth steers each normal room toward (1..=4)
    ///
    /// A preference of 1 rarely opens a second door, so growth seldom
    /// reaches past the start room's four neighbours. With a normal-room
    /// target above 4 every attempt stalls and generation ends in
    /// [`LayoutError::GenerationFailed`] unless strictness is close to 0.
    #[serde(default = "default_preferred_num_doors")]
    pub preferred_num_doors: u8,

    /// How sharply growth favours `preferred_num_doors` (0..=100)
    #[serde(default = "default_strictness")]
    pub strictness_num_doors: f64,

    /// Whole-floor restarts allowed before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Room counts drawn for one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoomBudget {
    pub normal: u32,
    pub dead_end: u32,
}

impl RoomBudget {
    /// Side length of the square grid that fits this budget
    ///
    /// Large enough for a fully linear tree plus the boss block and exit.
    pub const fn grid_side(&self) -> usize {
        2 * (self.normal as usize + self.dead_end as usize) + 7
    }
}

impl LayoutGenerationParams {
    /// One normal room type and one dead-end special room type
    pub fn simple(
        num_normal_rooms: u32,
        variance: u32,
        num_special_rooms: u32,
        preferred_num_doors: u8,
        strictness_num_doors: f64,
    ) -> Self {
        let mut room_counts = BTreeMap::new();
        room_counts.insert(
            NORMAL_ROOM_TYPE.to_string(),
            RoomCount::new(num_normal_rooms, variance),
        );
        room_counts.insert(
            SPECIAL_ROOM_TYPE.to_string(),
            RoomCount::new(num_special_rooms, 0),
        );
        Self {
            room_types: vec![
                RoomTypeDescriptor::new(NORMAL_ROOM_TYPE, false),
                RoomTypeDescriptor::new(SPECIAL_ROOM_TYPE, true),
            ],
            room_counts,
            preferred_num_doors,
            strictness_num_doors,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Builder-style override of the restart cap
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Parse parameters from JSON and validate them
    pub fn from_json_str(json: &str) -> Result<Self, LayoutError> {
        let params: Self = serde_json::from_str(json).map_err(|e| LayoutError::Config {
            reason: e.to_string(),
        })?;
        params.validate()?;
        Ok(params)
    }

    /// Read parameters from a JSON file and validate them
    pub fn from_path(path: &Path) -> Result<Self, LayoutError> {
        let json = std::fs::read_to_string(path).map_err(|e| LayoutError::Config {
            reason: format!("{}: {}", path.display(), e),
        })?;
        Self::from_json_str(&json)
    }

    /// Check the parameters before any random draw is made
    pub fn validate(&self) -> Result<(), LayoutError> {
        for room_type in &self.room_types {
            if !self.room_counts.contains_key(&room_type.name) {
                return Err(LayoutError::MissingRoomCount {
                    room_type: room_type.name.clone(),
                });
            }
        }
        if !(1..=4).contains(&self.preferred_num_doors) {
            return Err(LayoutError::DoorPreferenceOutOfRange(self.preferred_num_doors));
        }
        if !(0.0..=100.0).contains(&self.strictness_num_doors) {
            return Err(LayoutError::StrictnessOutOfRange(self.strictness_num_doors));
        }
        if self.max_attempts == 0 {
            return Err(LayoutError::ZeroAttempts);
        }
        if self.normal_range().1 == 0 {
            return Err(LayoutError::NoNormalRooms);
        }
        Ok(())
    }

    /// Look up the count configured for `room_type`
    pub fn count_for(&self, room_type: &RoomTypeDescriptor) -> Result<RoomCount, LayoutError> {
        self.room_counts
            .get(&room_type.name)
            .copied()
            .ok_or_else(|| LayoutError::MissingRoomCount {
                room_type: room_type.name.clone(),
            })
    }

    /// Draw this attempt's room counts, one draw per room type in order
    pub fn draw_budget<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<RoomBudget, LayoutError> {
        let mut budget = RoomBudget::default();
        for room_type in &self.room_types {
            let count = self.count_for(room_type)?.draw(rng);
            if room_type.dead_end {
                budget.dead_end += count;
            } else {
                budget.normal += count;
            }
        }
        Ok(budget)
    }

    /// Smallest and largest normal-room target the draws can produce
    pub fn normal_range(&self) -> (u32, u32) {
        self.room_types
            .iter()
            .filter(|t| !t.dead_end)
            .filter_map(|t| self.room_counts.get(&t.name))
            .fold((0, 0), |(lo, hi), c| (lo + c.min(), hi + c.max()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::FloorRng;

    #[test]
    fn test_grid_side_formula() {
        let budget = RoomBudget {
            normal: 3,
            dead_end: 0,
        };
        assert_eq!(budget.grid_side(), 13);
        let budget = RoomBudget {
            normal: 5,
            dead_end: 1,
        };
        assert_eq!(budget.grid_side(), 19);
    }

    #[test]
    fn test_zero_variance_draw_is_exact() {
        let mut rng = FloorRng::new(9);
        let count = RoomCount::new(6, 0);
        for _ in 0..50 {
            assert_eq!(count.draw(&mut rng), 6);
        }
    }

    #[test]
    fn test_draw_stays_in_band() {
        let mut rng = FloorRng::new(9);
        let count = RoomCount::new(6, 2);
        for _ in 0..500 {
            let n = count.draw(&mut rng);
            assert!((4..=8).contains(&n), "draw {} outside band", n);
        }
    }

    #[test]
    fn test_draw_clamps_at_zero() {
        let mut rng = FloorRng::new(3);
        let count = RoomCount::new(1, 5);
        for _ in 0..200 {
            assert!(count.draw(&mut rng) <= 6);
        }
    }

    #[test]
    fn test_budget_partitions_dead_ends() {
        let mut rng = FloorRng::new(1);
        let params = LayoutGenerationParams::simple(7, 0, 2, 2, 50.0);
        let budget = params.draw_budget(&mut rng).unwrap();
        assert_eq!(budget, RoomBudget { normal: 7, dead_end: 2 });
    }

    #[test]
    fn test_missing_room_count_is_reported() {
        let mut params = LayoutGenerationParams::simple(7, 0, 2, 2, 50.0);
        params
            .room_types
            .push(RoomTypeDescriptor::new("shop", true));
        let err = params.validate().unwrap_err();
        assert_eq!(
            err,
            LayoutError::MissingRoomCount {
                room_type: "shop".to_string()
            }
        );
    }

    #[test]
    fn test_validate_ranges() {
        let params = LayoutGenerationParams::simple(7, 0, 2, 0, 50.0);
        assert_eq!(params.validate(), Err(LayoutError::DoorPreferenceOutOfRange(0)));

        let params = LayoutGenerationParams::simple(7, 0, 2, 5, 50.0);
        assert_eq!(params.validate(), Err(LayoutError::DoorPreferenceOutOfRange(5)));

        let params = LayoutGenerationParams::simple(7, 0, 2, 2, 101.0);
        assert_eq!(params.validate(), Err(LayoutError::StrictnessOutOfRange(101.0)));

        let params = LayoutGenerationParams::simple(7, 0, 2, 2, 50.0).with_max_attempts(0);
        assert_eq!(params.validate(), Err(LayoutError::ZeroAttempts));

        let params = LayoutGenerationParams::simple(7, 0, 2, 4, 0.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate_needs_a_normal_room() {
        let params = LayoutGenerationParams::simple(0, 0, 1, 2, 50.0);
        assert_eq!(params.validate(), Err(LayoutError::NoNormalRooms));

        // Draws may still land on zero; those attempts just restart
        let params = LayoutGenerationParams::simple(0, 1, 1, 2, 50.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_from_json_defaults() {
        let json = r#"{
            "room_types": [
                { "name": "combat" },
                { "name": "treasure", "dead_end": true }
            ],
            "room_counts": {
                "combat": { "base": 8, "variance": 2 },
                "treasure": { "base": 1 }
            }
        }"#;
        let params = LayoutGenerationParams::from_json_str(json).unwrap();
        assert_eq!(params.preferred_num_doors, 2);
        assert_eq!(params.strictness_num_doors, 50.0);
        assert_eq!(params.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert!(params.room_types[1].dead_end);
        assert_eq!(params.normal_range(), (6, 10));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = LayoutGenerationParams::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, LayoutError::Config { .. }));
    }
}
