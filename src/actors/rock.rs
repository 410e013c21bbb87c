//! Falling rocks
//!
//! A rock rests until the block under it is opened, wobbles for a moment,
//! falls until the block under it is solid again, then crumbles.

use glam::{IVec2, Vec2};
use rand::Rng;

use crate::core::RockTuning;
use crate::ecs::Aabb;
use crate::grid::Grid;

/// Rock lifecycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RockPhase {
    /// Supported from below
    Resting,
    /// About to fall
    Wobbling {
        /// Seconds wobbled so far
        elapsed: f32,
    },
    /// Dropping
    Falling,
    /// Landed; crumbles when the timer runs out
    Settled {
        /// Seconds left
        remaining: f32,
    },
}

/// Result of a rock update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RockStep {
    /// Keep the rock
    Keep,
    /// The rock has crumbled and should be removed
    Remove,
}

/// One rock
#[derive(Debug, Clone)]
pub struct Rock {
    block: IVec2,
    anchor: Vec2,
    position: Vec2,
    phase: RockPhase,
}

impl Rock {
    /// Place a rock at the center of `block`
    #[must_use]
    pub fn new(block: IVec2, position: Vec2) -> Self {
        Self {
            block,
            anchor: position,
            position,
            phase: RockPhase::Resting,
        }
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> RockPhase {
        self.phase
    }

    /// Block the rock occupies
    #[must_use]
    pub fn block(&self) -> IVec2 {
        self.block
    }

    /// World position (includes the wobble offset)
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Falling or landed rocks crush what they touch
    #[must_use]
    pub fn is_dangerous(&self) -> bool {
        matches!(self.phase, RockPhase::Falling | RockPhase::Settled { .. })
    }

    /// Collision box
    #[must_use]
    pub fn collider(&self, half_extent: f32) -> Aabb {
        Aabb::new(self.position, half_extent)
    }

    /// Whether a resting rock should start to fall: the block below is
    /// walkable and the player is not standing exactly there.
    #[must_use]
    pub fn should_fall(&self, grid: &Grid, player_block: Option<IVec2>) -> bool {
        let below = self.block - IVec2::Y;
        grid.is_walkable(below) && player_block != Some(below)
    }

    /// Advance one tick
    pub fn update(
        &mut self,
        grid: &Grid,
        player_block: Option<IVec2>,
        tuning: &RockTuning,
        dt: f32,
        rng: &mut impl Rng,
    ) -> RockStep {
        match self.phase {
            RockPhase::Resting => {
                if self.should_fall(grid, player_block) {
                    log::debug!("Rock at ({}, {}) starts wobbling", self.block.x, self.block.y);
                    self.phase = RockPhase::Wobbling { elapsed: 0.0 };
                }
            }
            RockPhase::Wobbling { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= tuning.wobble_duration {
                    self.position = self.anchor;
                    self.phase = RockPhase::Falling;
                } else {
                    let amplitude = tuning.wobble_amplitude;
                    let offset = if amplitude > 0.0 {
                        rng.gen_range(-amplitude..amplitude)
                    } else {
                        0.0
                    };
                    self.position = self.anchor + Vec2::new(offset, 0.0);
                    self.phase = RockPhase::Wobbling { elapsed };
                }
            }
            RockPhase::Falling => self.fall(grid, tuning, dt),
            RockPhase::Settled { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    log::debug!("Rock at ({}, {}) crumbled", self.block.x, self.block.y);
                    return RockStep::Remove;
                }
                self.phase = RockPhase::Settled { remaining };
            }
        }
        RockStep::Keep
    }

    /// Move down, never more than half a block per sub-step, so every row
    /// crossed gets its support check.
    fn fall(&mut self, grid: &Grid, tuning: &RockTuning, dt: f32) {
        let max_step = grid.block_size() * 0.5;
        let mut remaining = tuning.fall_speed * dt;

        while remaining > 0.0 {
            let step = remaining.min(max_step);
            remaining -= step;
            self.position.y -= step;

            let block = grid.world_to_block(self.position);
            if block.y == self.block.y {
                continue;
            }
            self.block = block;
            if !grid.is_walkable(block - IVec2::Y) {
                self.position = grid.block_to_world(block);
                self.anchor = self.position;
                self.phase = RockPhase::Settled {
                    remaining: tuning.settle_delay,
                };
                return;
            }
        }
    }
}
