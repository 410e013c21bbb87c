//! Actor module
//!
//! Enemies (Pooka and Fygar), falling rocks, the player and the pump.
//! Each actor keeps its own timers and phase and is advanced once per tick
//! by the simulation.

mod enemy;
mod fygar;
mod player;
mod pump;
mod rock;
mod transit;

pub use enemy::{Enemy, EnemyContext, EnemyKind, EnemyState, PlayerView};
pub use fygar::{AttackPhase, AttackStep, FygarAttack, fire_blocks, sees_player};
pub use player::{DamageOutcome, Player};
pub use pump::{Pump, PumpContext, PumpPhase};
pub use rock::{Rock, RockPhase, RockStep};
pub use transit::Transit;
