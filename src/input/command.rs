//! Logical player input
//!
//! The simulation never sees devices. Each tick it receives one
//! [`PlayerInput`]: an optional direction and whether the pump button was
//! pressed. Recording those values is enough to replay a whole run.
//!
//! # Example
//!
//! ```ignore
//! let mut recording = InputRecording::new();
//! let input = PlayerInput::moving(Direction::Left);
//! recording.push(input);
//! sim.tick(&input);
//! ```

use glam::IVec2;
use serde::{Deserialize, Serialize};

// ============================================================================
// Directions
// ============================================================================

/// One of the four grid directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// +y (grid rows count upwards)
    Up,
    /// -y
    Down,
    /// -x
    Left,
    /// +x
    Right,
}

impl Direction {
    /// All directions in neighbor order
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit block offset
    #[must_use]
    pub fn offset(self) -> IVec2 {
        match self {
            Self::Up => IVec2::Y,
            Self::Down => IVec2::NEG_Y,
            Self::Left => IVec2::NEG_X,
            Self::Right => IVec2::X,
        }
    }

    /// Direction of a unit offset
    #[must_use]
    pub fn from_offset(offset: IVec2) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.offset() == offset)
    }
}

// ============================================================================
// Per-tick input
// ============================================================================

/// Input for one simulation tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Held direction, if any
    pub direction: Option<Direction>,
    /// Pump button pressed this tick
    pub pump: bool,
}

impl PlayerInput {
    /// No input
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// Hold a direction
    #[must_use]
    pub fn moving(direction: Direction) -> Self {
        Self {
            direction: Some(direction),
            pump: false,
        }
    }

    /// Press the pump button
    #[must_use]
    pub fn pump() -> Self {
        Self {
            direction: None,
            pump: true,
        }
    }
}

// ============================================================================
// Recording
// ============================================================================

/// Sequence of per-tick inputs, serializable for replays
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecording {
    frames: Vec<PlayerInput>,
}

impl InputRecording {
    /// Create an empty recording
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the input of the next tick
    pub fn push(&mut self, input: PlayerInput) {
        self.frames.push(input);
    }

    /// Number of recorded ticks
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Recorded inputs in tick order
    pub fn iter(&self) -> impl Iterator<Item = PlayerInput> + '_ {
        self.frames.iter().copied()
    }
}

impl FromIterator<PlayerInput> for InputRecording {
    fn from_iter<I: IntoIterator<Item = PlayerInput>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_offsets() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_offset(dir.offset()), Some(dir));
            assert_eq!(dir.offset().abs().element_sum(), 1);
        }
        assert_eq!(Direction::from_offset(IVec2::ONE), None);
    }

    #[test]
    fn test_input_constructors() {
        assert_eq!(PlayerInput::idle().direction, None);
        assert!(!PlayerInput::idle().pump);
        assert_eq!(PlayerInput::moving(Direction::Up).direction, Some(Direction::Up));
        assert!(PlayerInput::pump().pump);
    }

    #[test]
    fn test_recording_serializes() {
        let recording: InputRecording = [
            PlayerInput::moving(Direction::Left),
            PlayerInput::idle(),
            PlayerInput::pump(),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&recording).unwrap();
        let loaded: InputRecording = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded, recording);
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.iter().nth(2), Some(PlayerInput::pump()));
    }
}
