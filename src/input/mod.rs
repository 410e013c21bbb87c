//! Player input module
//!
//! Device-independent per-tick input values.

mod command;

pub use command::{Direction, InputRecording, PlayerInput};
