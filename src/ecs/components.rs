//! Shared components: collision boxes and the small passive actors

use glam::{IVec2, Vec2};
use hecs::Entity;
use smallvec::SmallVec;

/// Axis-aligned square collision box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Center in world space
    pub center: Vec2,
    /// Half of the side length
    pub half_extent: f32,
}

impl Aabb {
    /// Create a box
    #[must_use]
    pub fn new(center: Vec2, half_extent: f32) -> Self {
        Self {
            center,
            half_extent,
        }
    }

    /// Strict overlap test (touching edges do not count)
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        let reach = self.half_extent + other.half_extent;
        d.x < reach && d.y < reach
    }

    /// Whether a circle touches the box
    #[must_use]
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        let min = self.center - Vec2::splat(self.half_extent);
        let max = self.center + Vec2::splat(self.half_extent);
        center.clamp(min, max).distance_squared(center) <= radius * radius
    }
}

/// Pickup collected when the player enters its block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fruit {
    /// Block the fruit sits in
    pub block: IVec2,
}

/// A run of burning blocks left by a fire attack
#[derive(Debug, Clone, PartialEq)]
pub struct FireHazard {
    /// Enemy that breathed the fire
    pub source: Entity,
    /// Burning blocks, nearest to the source first
    pub blocks: SmallVec<[IVec2; 4]>,
    /// Seconds left
    pub remaining: f32,
}

impl FireHazard {
    /// Whether the fire covers a block
    #[must_use]
    pub fn covers(&self, block: IVec2) -> bool {
        self.blocks.contains(&block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::new(Vec2::ZERO, 1.2);

        assert!(a.overlaps(&Aabb::new(Vec2::new(2.0, 0.0), 1.2)));
        assert!(!a.overlaps(&Aabb::new(Vec2::new(3.0, 0.0), 1.2)));
        assert!(!a.overlaps(&Aabb::new(Vec2::new(2.4, 0.0), 1.2)));
        assert!(!a.overlaps(&Aabb::new(Vec2::new(1.0, 2.5), 1.2)));
    }

    #[test]
    fn test_aabb_circle() {
        let a = Aabb::new(Vec2::ZERO, 1.0);

        assert!(a.overlaps_circle(Vec2::ZERO, 0.1));
        assert!(a.overlaps_circle(Vec2::new(1.1, 0.0), 0.15));
        assert!(!a.overlaps_circle(Vec2::new(1.2, 0.0), 0.15));
        assert!(!a.overlaps_circle(Vec2::new(1.1, 1.1), 0.1));
    }

    #[test]
    fn test_fire_covers() {
        let mut world = hecs::World::new();
        let fire = FireHazard {
            source: world.spawn(()),
            blocks: SmallVec::from_slice(&[IVec2::new(2, 1), IVec2::new(3, 1)]),
            remaining: 0.5,
        };

        assert!(fire.covers(IVec2::new(3, 1)));
        assert!(!fire.covers(IVec2::new(1, 1)));
    }
}
