//! Event queue for simulation outcomes
//!
//! Discrete things that happen during a tick (a block dug out, an enemy
//! popped, a fruit picked up) are pushed here instead of calling into
//! scoring, audio or UI code. The owner reads them after the tick.
//!
//! # Example
//!
//! ```ignore
//! sim.tick(&input);
//! for event in sim.events().iter() {
//!     if let Some(kind) = event.score_kind() {
//!         score.add(kind);
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::IVec2;
use hecs::Entity;

use crate::level::EnemyType;

// ============================================================================
// Event Types
// ============================================================================

/// Scoring category of an event. Point values are the consumer's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreKind {
    /// A ground block was fully dug
    Dig,
    /// An enemy was defeated
    EnemyDefeat,
    /// A falling rock crushed an enemy
    RockCrush,
    /// A fruit was collected
    FruitCollect,
    /// The last enemy of the level was defeated
    LevelComplete,
}

/// How an enemy was defeated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefeatCause {
    /// Inflated until it popped
    Pumped,
    /// Hit by a falling rock
    Crushed,
}

/// Simulation events.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GameEvent {
    // -------------------------------------------------------------------------
    // Grid Events
    // -------------------------------------------------------------------------
    /// All micro-cells of a ground block were dug.
    BlockDug {
        /// Block coordinate (bottom-up)
        block: IVec2,
    },

    // -------------------------------------------------------------------------
    // Combat Events
    // -------------------------------------------------------------------------
    /// An enemy reached the Dying state and was removed.
    EnemyDefeated {
        /// The defeated enemy
        enemy: Entity,
        /// Its species
        kind: EnemyType,
        /// What killed it
        cause: DefeatCause,
    },

    /// A falling rock crushed an enemy.
    RockCrush {
        /// The rock
        rock: Entity,
        /// The crushed enemy
        enemy: Entity,
    },

    /// The player lost a life and survived.
    PlayerDamaged {
        /// Lives remaining
        lives: u32,
    },

    /// The player lost the last life.
    PlayerDied,

    // -------------------------------------------------------------------------
    // Pickup / Level Events
    // -------------------------------------------------------------------------
    /// The player picked up a fruit.
    FruitCollected {
        /// Block the fruit was in
        block: IVec2,
    },

    /// Every enemy of the level has been defeated.
    LevelComplete,
}

impl GameEvent {
    /// Scoring category, if the event is worth points
    #[must_use]
    pub fn score_kind(&self) -> Option<ScoreKind> {
        match self {
            Self::BlockDug { .. } => Some(ScoreKind::Dig),
            Self::EnemyDefeated { .. } => Some(ScoreKind::EnemyDefeat),
            Self::RockCrush { .. } => Some(ScoreKind::RockCrush),
            Self::FruitCollected { .. } => Some(ScoreKind::FruitCollect),
            Self::LevelComplete => Some(ScoreKind::LevelComplete),
            Self::PlayerDamaged { .. } | Self::PlayerDied => None,
        }
    }
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue.
///
/// Events pushed during tick N become readable when `swap()` runs at the end
/// of tick N, and are dropped by the `swap()` at the end of tick N+1.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this tick
    pending: VecDeque<GameEvent>,
    /// Events from the previous tick, ready for processing
    processing: VecDeque<GameEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event, readable after the next `swap()`.
    #[inline]
    pub fn push(&mut self, event: GameEvent) {
        self.pending.push_back(event);
    }

    /// Publish pending events and drop the previously published ones.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over published events.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.processing.iter()
    }

    /// Drain published events.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.processing.drain(..)
    }

    /// Check if there are any published events.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Get the number of published events.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Get the number of events pushed during the current tick.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clear all events (both pending and published).
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entity() -> Entity {
        let mut world = hecs::World::new();
        world.spawn(())
    }

    #[test]
    fn test_event_queue_push_and_swap() {
        let mut queue = EventQueue::new();

        queue.push(GameEvent::LevelComplete);
        assert!(queue.is_empty(), "Events should not be visible before swap");
        assert_eq!(queue.pending_count(), 1);

        queue.swap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().next(), Some(&GameEvent::LevelComplete));
    }

    #[test]
    fn test_events_live_for_one_tick() {
        let mut queue = EventQueue::new();

        // Tick 1
        queue.push(GameEvent::BlockDug { block: IVec2::ONE });
        queue.swap();

        // Tick 2 writes while tick 1 events are readable
        queue.push(GameEvent::PlayerDied);
        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events, vec![&GameEvent::BlockDug { block: IVec2::ONE }]);

        // End of tick 2: tick 1 events are gone
        queue.swap();
        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events, vec![&GameEvent::PlayerDied]);

        // Quiet tick 3
        queue.swap();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_event_queue_drain_and_clear() {
        let mut queue = EventQueue::new();

        queue.push(GameEvent::PlayerDamaged { lives: 2 });
        queue.push(GameEvent::PlayerDied);
        queue.swap();

        let events: Vec<_> = queue.drain().collect();
        assert_eq!(events.len(), 2);
        assert!(queue.is_empty());

        queue.push(GameEvent::LevelComplete);
        queue.clear();
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn test_score_kinds() {
        let enemy = test_entity();

        assert_eq!(
            GameEvent::BlockDug { block: IVec2::ZERO }.score_kind(),
            Some(ScoreKind::Dig)
        );
        assert_eq!(
            GameEvent::EnemyDefeated {
                enemy,
                kind: EnemyType::Fygar,
                cause: DefeatCause::Pumped,
            }
            .score_kind(),
            Some(ScoreKind::EnemyDefeat)
        );
        assert_eq!(
            GameEvent::RockCrush { rock: enemy, enemy }.score_kind(),
            Some(ScoreKind::RockCrush)
        );
        assert_eq!(
            GameEvent::FruitCollected { block: IVec2::ZERO }.score_kind(),
            Some(ScoreKind::FruitCollect)
        );
        assert_eq!(GameEvent::LevelComplete.score_kind(), Some(ScoreKind::LevelComplete));
        assert_eq!(GameEvent::PlayerDied.score_kind(), None);
    }
}
