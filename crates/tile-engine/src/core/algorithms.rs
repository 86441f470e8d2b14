//! Pairwise collision tests producing [`Collision`] records.

use glam::Vec2;

use crate::api::types::{Axis, ColliderRef};
use crate::core::collision::Collision;
use crate::core::rect::Rect;

/// One side of a pairwise test: who it is and where it currently is.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub collider: ColliderRef,
    pub rect: Rect,
}

impl Body {
    pub fn new(collider: ColliderRef, rect: Rect) -> Self {
        Self { collider, rect }
    }
}

/// Which pairwise test a stage uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Detector {
    #[default]
    Aabb,
    /// Separating-axis test. Experimental: ignores the travel direction and
    /// picks the axis of least penetration.
    #[cfg(feature = "sat")]
    Sat,
}

impl Detector {
    pub fn collide(
        self,
        mover: Body,
        other: Body,
        axis: Axis,
        veloc: f32,
        original_pos: Option<Vec2>,
    ) -> Option<Collision> {
        match self {
            Detector::Aabb => aabb_collide(mover, other, axis, veloc, original_pos),
            #[cfg(feature = "sat")]
            Detector::Sat => sat_collide(mover, other, veloc, original_pos),
        }
    }
}

/// Axis-aligned test of `mover` against `other` along `axis`.
///
/// Both projections must overlap for a hit. The sign of `veloc` decides which
/// face of `other` was hit; a zero velocity never reports a collision, so
/// callers test each axis right after moving along it.
pub fn aabb_collide(
    mover: Body,
    other: Body,
    axis: Axis,
    veloc: f32,
    original_pos: Option<Vec2>,
) -> Option<Collision> {
    let (r1, r2) = (&mover.rect, &other.rect);
    if !r1.intersects(r2) || veloc == 0.0 {
        return None;
    }

    let (distance, normal) = match axis {
        Axis::X if veloc > 0.0 => (-(r1.right() - r2.left()), Vec2::new(-1.0, 0.0)),
        Axis::X => (-(r2.right() - r1.left()), Vec2::new(1.0, 0.0)),
        Axis::Y if veloc > 0.0 => (-(r1.bottom() - r2.top()), Vec2::new(0.0, -1.0)),
        Axis::Y => (-(r2.bottom() - r1.top()), Vec2::new(0.0, 1.0)),
    };

    Some(Collision::new(
        mover.collider,
        other.collider,
        distance,
        normal,
        axis,
        veloc,
        original_pos.unwrap_or(r1.pos),
    ))
}

/// Separating-axis test over the rectangles' corner polygons.
///
/// Returns the minimum-penetration record, with `direction` set to the
/// dominant axis of the chosen normal.
#[cfg(feature = "sat")]
pub fn sat_collide(
    mover: Body,
    other: Body,
    veloc: f32,
    original_pos: Option<Vec2>,
) -> Option<Collision> {
    let p1 = mover.rect.corners();
    let p2 = other.rect.corners();

    let mut best: Option<(f32, Vec2)> = None;
    for n in edge_normals(&p1).into_iter().chain(edge_normals(&p2)) {
        let (min1, max1) = project(&p1, n);
        let (min2, max2) = project(&p2, n);
        // Pushing mover back along -n or forward along +n.
        let back = max1 - min2;
        let forward = max2 - min1;
        if back <= 0.0 || forward <= 0.0 {
            return None;
        }
        let (overlap, normal) = if back < forward { (back, -n) } else { (forward, n) };
        if best.map_or(true, |(o, _)| overlap < o) {
            best = Some((overlap, normal));
        }
    }

    let (overlap, normal) = best?;
    let direction = if normal.x.abs() >= normal.y.abs() { Axis::X } else { Axis::Y };
    Some(Collision::new(
        mover.collider,
        other.collider,
        -overlap,
        normal,
        direction,
        veloc,
        original_pos.unwrap_or(mover.rect.pos),
    ))
}

#[cfg(feature = "sat")]
fn edge_normals(points: &[Vec2; 4]) -> Vec<Vec2> {
    (0..points.len())
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            Vec2::new(-(b.y - a.y), b.x - a.x).normalize_or_zero()
        })
        .filter(|n| *n != Vec2::ZERO)
        .collect()
}

#[cfg(feature = "sat")]
fn project(points: &[Vec2; 4], axis: Vec2) -> (f32, f32) {
    points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
        let d = p.dot(axis);
        (lo.min(d), hi.max(d))
    })
}
