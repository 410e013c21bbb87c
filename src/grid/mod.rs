//! Tunnel grid module
//!
//! Block types, micro-cell digging and block/world coordinate transforms.

mod block;
mod map;

pub use block::{BlockType, CELLS_PER_AXIS, DigMask, symbol};
pub use map::{DigOutcome, Grid, MicroCell};
