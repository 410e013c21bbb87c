//! Core simulation module
//!
//! Configuration, the fixed-step clock, the event queue and the
//! simulation context that ties every actor together.

mod config;
mod events;
mod simulation;
mod time;

pub use config::{
    ConfigError, EnemyTuning, FygarTuning, GridTuning, PlayerTuning, PumpTuning, RockTuning,
    SimConfig,
};
pub use events::{DefeatCause, EventQueue, GameEvent, ScoreKind};
pub use simulation::{Outcome, Simulation};
pub use time::Clock;
