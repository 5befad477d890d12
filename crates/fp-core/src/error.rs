//! Errors reported by layout generation

use thiserror::Error;

/// Everything that can go wrong while configuring or generating a layout
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("no room count configured for room type '{room_type}'")]
    MissingRoomCount { room_type: String },

    #[error("preferred door count {0} is outside 1..=4")]
    DoorPreferenceOutOfRange(u8),

    #[error("door-count strictness {0} is outside 0..=100")]
    StrictnessOutOfRange(f64),

    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("room counts allow no normal rooms, so the boss block has nowhere to attach")]
    NoNormalRooms,

    #[error("layout generation failed after {attempts} attempts")]
    GenerationFailed { attempts: u32 },

    #[error("invalid layout configuration: {reason}")]
    Config { reason: String },

    #[error("could not write '{path}': {reason}")]
    Io { path: String, reason: String },
}

impl LayoutError {
    /// True for errors caused by the parameters rather than by bad luck
    pub fn is_invalid_params(&self) -> bool {
        matches!(
            self,
            LayoutError::MissingRoomCount { .. }
                | LayoutError::DoorPreferenceOutOfRange(_)
                | LayoutError::StrictnessOutOfRange(_)
                | LayoutError::ZeroAttempts
                | LayoutError::NoNormalRooms
                | LayoutError::Config { .. }
        )
    }
}
