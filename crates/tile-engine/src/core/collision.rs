//! Collision records.
//!
//! A `Collision` is the value returned by one pairwise test. `separate` is the
//! exact translation that moves `sprite1` out of `sprite2` along the tested
//! axis; the other axis is never touched by a single record.

use glam::Vec2;

use crate::api::types::{Axis, ColliderRef};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// The collider being resolved.
    pub sprite1: ColliderRef,
    /// The collider it ran into.
    pub sprite2: ColliderRef,
    /// Signed penetration along the tested axis. Negative (or zero) for a hit.
    pub distance: f32,
    /// `abs(distance)`.
    pub magnitude: f32,
    /// Unit normal pointing from `sprite2` toward `sprite1`.
    pub normal: Vec2,
    /// `-distance * normal`.
    pub separate: Vec2,
    /// Axis the test measured.
    pub direction: Axis,
    /// Velocity component along `direction` when the test ran.
    pub direction_veloc: f32,
    /// Position of `sprite1` before the move that led to this test.
    pub original_pos: Vec2,
}

impl Collision {
    /// Build a record from its measured parts; derives `magnitude` and
    /// `separate`.
    pub fn new(
        sprite1: ColliderRef,
        sprite2: ColliderRef,
        distance: f32,
        normal: Vec2,
        direction: Axis,
        direction_veloc: f32,
        original_pos: Vec2,
    ) -> Self {
        Self {
            sprite1,
            sprite2,
            distance,
            magnitude: distance.abs(),
            normal,
            separate: -distance * normal,
            direction,
            direction_veloc,
            original_pos,
        }
    }

    /// The same collision seen from `sprite2`: roles swapped, normal,
    /// separation and direction velocity negated. `distance` and `magnitude`
    /// are unchanged.
    pub fn invert(&self) -> Self {
        Self {
            sprite1: self.sprite2,
            sprite2: self.sprite1,
            normal: -self.normal,
            separate: -self.separate,
            direction_veloc: -self.direction_veloc,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{EntityId, LayerId};

    fn sample() -> Collision {
        Collision::new(
            ColliderRef::Entity(EntityId(1)),
            ColliderRef::Tile { layer: LayerId(0), x: 1, y: 0 },
            -5.0,
            Vec2::new(-1.0, 0.0),
            Axis::X,
            100.0,
            Vec2::new(8.0, 0.0),
        )
    }

    #[test]
    fn separate_is_minus_distance_times_normal() {
        let col = sample();
        assert_eq!(col.separate, Vec2::new(-5.0, 0.0));
        assert_eq!(col.magnitude, 5.0);
    }

    #[test]
    fn invert_swaps_roles_and_negates() {
        let col = sample();
        let inv = col.invert();
        assert_eq!(inv.sprite1, col.sprite2);
        assert_eq!(inv.sprite2, col.sprite1);
        assert_eq!(inv.normal, Vec2::new(1.0, 0.0));
        assert_eq!(inv.separate, Vec2::new(5.0, 0.0));
        assert_eq!(inv.direction_veloc, -100.0);
        assert_eq!(inv.distance, col.distance);
        assert_eq!(inv.magnitude, col.magnitude);
        assert_eq!(inv.direction, col.direction);
    }

    #[test]
    fn double_invert_is_identity() {
        let col = sample();
        assert_eq!(col.invert().invert(), col);
    }
}
