//! Level descriptions and the procedural level generator

mod data;
pub mod generator;

pub use data::{EnemySpawnData, EnemyType, LevelData, LevelError, LevelPoint};
pub use generator::{generate_endless, generate_sidewinder};
