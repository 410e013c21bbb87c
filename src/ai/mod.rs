//! AI and navigation module
//!
//! Provides grid pathfinding, steering behaviors and the state machine used
//! by enemy behavior.

mod fsm;
mod pathfinding;
mod steering;

pub use fsm::{StateMachine, Transition};
pub use pathfinding::{NavGrid, find_path};
pub use steering::{Seek, SteeringBehavior, Wander};
