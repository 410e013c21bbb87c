//! Fygar fire attack: sight check, charge, breath, recovery

use glam::IVec2;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::core::FygarTuning;
use crate::grid::Grid;
use crate::input::Direction;

/// Attack progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackPhase {
    /// Not attacking
    Ready,
    /// Building up, visibly blinking
    Charging {
        /// Seconds charged so far
        elapsed: f32,
        /// Side the fire will come out of
        facing: Direction,
    },
    /// Fire is out; waiting before moving again
    Firing {
        /// Seconds left
        remaining: f32,
    },
}

/// What an attack step produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackStep {
    /// Still charging or firing
    Busy,
    /// Charge finished: breathe fire this tick
    Breathe(Direction),
    /// Attack over, normal behavior resumes
    Done,
}

/// Per-Fygar attack state
#[derive(Debug, Clone, PartialEq)]
pub struct FygarAttack {
    phase: AttackPhase,
    cooldown: f32,
}

impl FygarAttack {
    /// Ready to attack, no cooldown pending
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: AttackPhase::Ready,
            cooldown: 0.0,
        }
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> AttackPhase {
        self.phase
    }

    /// Charging or firing
    #[must_use]
    pub fn is_attacking(&self) -> bool {
        self.phase != AttackPhase::Ready
    }

    /// Whether a new attack may start
    #[must_use]
    pub fn can_attack(&self) -> bool {
        self.phase == AttackPhase::Ready && self.cooldown <= 0.0
    }

    /// Seconds until the next attack is allowed
    #[must_use]
    pub fn cooldown(&self) -> f32 {
        self.cooldown.max(0.0)
    }

    /// Warning blink: on for the first half of every flash period
    #[must_use]
    pub fn is_flashing(&self, flash_period: f32) -> bool {
        match self.phase {
            AttackPhase::Charging { elapsed, .. } if flash_period > 0.0 => {
                elapsed % flash_period < flash_period * 0.5
            }
            _ => false,
        }
    }

    /// Cooldown runs regardless of what the Fygar is doing
    pub fn tick_cooldown(&mut self, dt: f32) {
        self.cooldown -= dt;
    }

    /// Begin charging towards `facing`
    pub fn start_charge(&mut self, facing: Direction) {
        self.phase = AttackPhase::Charging {
            elapsed: 0.0,
            facing,
        };
    }

    /// Drop any attack in progress
    pub fn abort(&mut self) {
        self.phase = AttackPhase::Ready;
    }

    /// Advance charge or recovery
    pub fn advance(&mut self, dt: f32, tuning: &FygarTuning) -> AttackStep {
        match self.phase {
            AttackPhase::Ready => AttackStep::Done,
            AttackPhase::Charging { elapsed, facing } => {
                let elapsed = elapsed + dt;
                if elapsed >= tuning.charge_time {
                    self.phase = AttackPhase::Firing {
                        remaining: tuning.fire_duration,
                    };
                    self.cooldown = tuning.attack_cooldown;
                    AttackStep::Breathe(facing)
                } else {
                    self.phase = AttackPhase::Charging { elapsed, facing };
                    AttackStep::Busy
                }
            }
            AttackPhase::Firing { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.phase = AttackPhase::Ready;
                    AttackStep::Done
                } else {
                    self.phase = AttackPhase::Firing { remaining };
                    AttackStep::Busy
                }
            }
        }
    }
}

impl Default for FygarAttack {
    fn default() -> Self {
        Self::new()
    }
}

/// Facing towards the player when they share a row within `range` blocks
/// and no rock sits between them.
#[must_use]
pub fn sees_player(
    block: IVec2,
    player_block: IVec2,
    range: i32,
    rocks: &FxHashSet<IVec2>,
) -> Option<Direction> {
    if player_block.y != block.y || (player_block.x - block.x).abs() > range {
        return None;
    }
    let (lo, hi) = if player_block.x < block.x {
        (player_block.x, block.x)
    } else {
        (block.x, player_block.x)
    };
    if (lo + 1..hi).any(|x| rocks.contains(&IVec2::new(x, block.y))) {
        return None;
    }
    Some(if player_block.x > block.x {
        Direction::Right
    } else {
        Direction::Left
    })
}

/// Blocks reached by fire: contiguous walkable, rock-free blocks in front
/// of the Fygar, at most `length` of them.
#[must_use]
pub fn fire_blocks(
    grid: &Grid,
    block: IVec2,
    facing: Direction,
    length: i32,
    rocks: &FxHashSet<IVec2>,
) -> SmallVec<[IVec2; 4]> {
    (1..=length)
        .map(|i| block + facing.offset() * i)
        .take_while(|b| grid.is_walkable(*b) && !rocks.contains(b))
        .collect()
}
