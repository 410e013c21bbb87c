//! Finite state machine for actor behavior
//!
//! States are plain enum values owned by the actor; the machine tracks the
//! current state, how long it has been active, and whether it already changed
//! during the current tick.
//!
//! # Example
//!
//! ```ignore
//! let mut fsm = StateMachine::new(Mood::Calm);
//! fsm.begin_tick(dt);
//! if fsm.time_in_state() > 2.0 {
//!     fsm.apply(Transition::To(Mood::Angry));
//! }
//! ```

use std::fmt;

// ============================================================================
// Transition
// ============================================================================

/// Represents a state transition decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<S> {
    /// Stay in the current state.
    None,
    /// Transition to a new state.
    To(S),
}

// ============================================================================
// State Machine
// ============================================================================

/// A finite state machine over a copyable state enum.
///
/// Behavior-driven transitions go through [`StateMachine::apply`], which
/// allows at most one change per tick. Commands from outside the actor
/// (being pumped, being crushed) use [`StateMachine::force`].
#[derive(Clone)]
pub struct StateMachine<S> {
    current: S,
    time_in_state: f32,
    changed_this_tick: bool,
}

impl<S: Copy + PartialEq + fmt::Debug> StateMachine<S> {
    /// Create a new state machine in an initial state.
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            time_in_state: 0.0,
            changed_this_tick: false,
        }
    }

    /// Start a new tick: advance the state timer and re-arm transitions.
    pub fn begin_tick(&mut self, dt: f32) {
        self.changed_this_tick = false;
        self.time_in_state += dt;
    }

    /// Apply a transition decision.
    ///
    /// Returns `true` if the state changed. Transitions to the current state
    /// and second transitions within one tick are ignored.
    pub fn apply(&mut self, transition: Transition<S>) -> bool {
        match transition {
            Transition::None => false,
            Transition::To(next) => {
                if self.changed_this_tick || next == self.current {
                    return false;
                }
                self.enter(next);
                true
            }
        }
    }

    /// Change state unconditionally (unless already there).
    pub fn force(&mut self, next: S) -> bool {
        if next == self.current {
            return false;
        }
        self.enter(next);
        true
    }

    fn enter(&mut self, next: S) {
        log::debug!("State change {:?} -> {:?}", self.current, next);
        self.current = next;
        self.time_in_state = 0.0;
        self.changed_this_tick = true;
    }

    /// Get the current state.
    #[must_use]
    pub fn current(&self) -> S {
        self.current
    }

    /// Check if the FSM is in the given state.
    #[must_use]
    pub fn is_in(&self, state: S) -> bool {
        self.current == state
    }

    /// Seconds since the last state change
    #[must_use]
    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    /// Whether the state already changed during this tick
    #[must_use]
    pub fn changed_this_tick(&self) -> bool {
        self.changed_this_tick
    }
}

impl<S: fmt::Debug> fmt::Debug for StateMachine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("time_in_state", &self.time_in_state)
            .finish()
    }
}
