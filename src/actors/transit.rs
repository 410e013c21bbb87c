//! Timed block-to-block movement

use glam::{IVec2, Vec2};

/// A linear move from a world position to the center of a target block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transit {
    from: Vec2,
    to: Vec2,
    target: IVec2,
    elapsed: f32,
    duration: f32,
}

impl Transit {
    /// Start a move lasting `duration` seconds
    #[must_use]
    pub fn new(from: Vec2, to: Vec2, target: IVec2, duration: f32) -> Self {
        Self {
            from,
            to,
            target,
            elapsed: 0.0,
            duration,
        }
    }

    /// Advance by `dt`. Returns `true` once the target has been reached.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.is_done()
    }

    /// Whether the move has finished
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Interpolated position
    #[must_use]
    pub fn position(&self) -> Vec2 {
        if self.is_done() {
            return self.to;
        }
        self.from.lerp(self.to, (self.elapsed / self.duration).min(1.0))
    }

    /// Block being moved into
    #[must_use]
    pub fn target(&self) -> IVec2 {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transit_interpolates() {
        let mut t = Transit::new(Vec2::ZERO, Vec2::new(3.0, 0.0), IVec2::X, 0.3);

        assert!(!t.advance(0.1));
        assert!((t.position().x - 1.0).abs() < 1e-4);
        assert!(!t.advance(0.1));
        assert!(t.advance(0.15));
        assert_eq!(t.position(), Vec2::new(3.0, 0.0));
        assert_eq!(t.target(), IVec2::X);
    }

    #[test]
    fn test_zero_duration_arrives_at_once() {
        let mut t = Transit::new(Vec2::ZERO, Vec2::ONE, IVec2::ONE, 0.0);
        assert!(t.advance(0.0));
        assert_eq!(t.position(), Vec2::ONE);
    }
}
