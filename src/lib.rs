//! A tunnel-digging arcade simulation core
//!
//! This crate provides:
//! - A block grid with 3x3 micro-cell digging
//! - A* pathfinding and steering for enemies
//! - Pooka and Fygar behavior state machines
//! - Falling rocks and the inflation pump
//! - A seeded Sidewinder level generator
//! - A fixed-step simulation context publishing gameplay events
//!
//! Rendering, audio and input devices are left to the host: it feeds one
//! [`input::PlayerInput`] per tick and reads [`core::GameEvent`]s back.

pub mod actors;
pub mod ai;
pub mod core;
pub mod ecs;
pub mod grid;
pub mod input;
pub mod level;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::actors::{Enemy, EnemyKind, EnemyState, Player, Pump, PumpPhase, Rock, RockPhase};
    pub use crate::core::{GameEvent, Outcome, ScoreKind, SimConfig, Simulation};
    pub use crate::ecs::World;
    pub use crate::grid::{BlockType, Grid};
    pub use crate::input::{Direction, InputRecording, PlayerInput};
    pub use crate::level::{EnemyType, LevelData, generate_endless, generate_sidewinder};
    pub use glam::{IVec2, Vec2};
}
