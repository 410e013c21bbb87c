//! Steering behaviors for free-moving agents
//!
//! Used by ghosts, which drift through ground instead of following blocks.

use glam::Vec2;
use rand::Rng;

/// Trait for steering behaviors
pub trait SteeringBehavior {
    /// Desired velocity for an agent at `position`
    fn calculate(&self, position: Vec2) -> Vec2;
}

/// Seek behavior - move towards target
#[derive(Debug, Clone)]
pub struct Seek {
    /// Target position
    pub target: Vec2,
    /// Maximum speed
    pub max_speed: f32,
}

impl Seek {
    /// Create a new seek behavior
    #[must_use]
    pub fn new(target: Vec2, max_speed: f32) -> Self {
        Self { target, max_speed }
    }
}

impl SteeringBehavior for Seek {
    fn calculate(&self, position: Vec2) -> Vec2 {
        (self.target - position).normalize_or_zero() * self.max_speed
    }
}

/// Wander behavior - seek a point on a circle around the agent that drifts
/// a little every update
#[derive(Debug, Clone)]
pub struct Wander {
    /// Circle radius
    pub radius: f32,
    /// Maximum per-axis drift per update
    pub jitter: f32,
    /// Maximum speed
    pub max_speed: f32,
    /// Current offset from the agent, persists between updates
    target: Vec2,
}

impl Wander {
    /// Create a new wander behavior
    #[must_use]
    pub fn new(radius: f32, jitter: f32, max_speed: f32) -> Self {
        Self {
            radius,
            jitter,
            max_speed,
            target: Vec2::ZERO,
        }
    }

    /// Jitter the target (call once per tick)
    pub fn update(&mut self, rng: &mut impl Rng) {
        let jitter = Vec2::new(rng.gen_range(-1.0f32..1.0), rng.gen_range(-1.0f32..1.0)) * self.jitter;
        self.target = (self.target + jitter).normalize_or_zero() * self.radius;
    }

    /// Current offset of the wander target from the agent
    #[must_use]
    pub fn target(&self) -> Vec2 {
        self.target
    }
}

impl SteeringBehavior for Wander {
    fn calculate(&self, position: Vec2) -> Vec2 {
        Seek::new(position + self.target, self.max_speed).calculate(position)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn test_seek() {
        let seek = Seek::new(Vec2::new(10.0, 0.0), 5.0);
        let output = seek.calculate(Vec2::ZERO);

        assert!(output.x > 0.0);
        assert!((output.length() - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_seek_at_target_is_zero() {
        let seek = Seek::new(Vec2::ONE, 5.0);
        assert_eq!(seek.calculate(Vec2::ONE), Vec2::ZERO);
    }

    #[test]
    fn test_wander() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut wander = Wander::new(3.0, 1.0, 2.0);
        assert_eq!(wander.calculate(Vec2::ZERO), Vec2::ZERO);

        wander.update(&mut rng);
        assert!((wander.target().length() - 3.0).abs() < 0.01);

        let output = wander.calculate(Vec2::new(4.0, 4.0));
        assert!((output.length() - 2.0).abs() < 0.01);

        let before = wander.target();
        wander.update(&mut rng);
        assert!((wander.target() - before).length() > 0.0);
    }
}
