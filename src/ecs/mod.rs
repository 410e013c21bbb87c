//! Entity Component System module
//!
//! Built on top of the hecs ECS library

mod components;
mod world;

pub use components::{Aabb, FireHazard, Fruit};
pub use world::World;
