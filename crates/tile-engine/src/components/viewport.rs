use glam::Vec2;

use crate::api::types::EntityId;
use crate::core::rect::Rect;

/// Which axes a following viewport tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowAxes {
    pub x: bool,
    pub y: bool,
}

impl Default for FollowAxes {
    fn default() -> Self {
        Self { x: true, y: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Follow {
    pub target: EntityId,
    pub axes: FollowAxes,
}

/// Stage camera. `pos` is the world position of the visible area's
/// top-left corner; rendering translates everything by `-pos`.
#[derive(Debug, Clone)]
pub struct Viewport {
    pub pos: Vec2,
    /// Visible width in world units.
    pub width: f32,
    /// Visible height in world units.
    pub height: f32,
    /// Largest per-frame move while soft-following.
    pub max_speed: f32,
    /// The camera never shows anything outside this box while following.
    pub bounds: Option<Rect>,
    pub follow: Option<Follow>,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            width,
            height,
            max_speed: 10.0,
            bounds: None,
            follow: None,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    /// Pixel offset to apply when drawing world content.
    pub fn offset(&self) -> Vec2 {
        -self.pos
    }

    /// Whether a world-space rectangle overlaps the visible area.
    pub fn is_visible(&self, rect: &Rect) -> bool {
        self.rect().intersects(rect)
    }

    /// Move the top-left corner. `None` leaves that axis alone.
    pub fn move_to(&mut self, x: Option<f32>, y: Option<f32>) {
        if let Some(x) = x {
            self.pos.x = x;
        }
        if let Some(y) = y {
            self.pos.y = y;
        }
    }

    /// Center on a point immediately, ignoring `max_speed` and bounds.
    pub fn center_on(&mut self, x: Option<f32>, y: Option<f32>) {
        self.move_to(x.map(|x| x - self.width / 2.0), y.map(|y| y - self.height / 2.0));
    }

    /// Move a third of the way toward centering on the point, capped by
    /// `max_speed` and kept inside `bounds`.
    pub fn soft_center_on(&mut self, x: Option<f32>, y: Option<f32>) {
        let bounds = self.bounds;
        if let Some(x) = x {
            let dx = self.capped((x - self.width / 2.0 - self.pos.x) / 3.0);
            self.pos.x = match bounds {
                Some(b) => step_within(self.pos.x, dx, b.left(), b.right() - self.width),
                None => self.pos.x + dx,
            };
        }
        if let Some(y) = y {
            let dy = self.capped((y - self.height / 2.0 - self.pos.y) / 3.0);
            self.pos.y = match bounds {
                Some(b) => step_within(self.pos.y, dy, b.top(), b.bottom() - self.height),
                None => self.pos.y + dy,
            };
        }
    }

    fn capped(&self, d: f32) -> f32 {
        if d.abs() > self.max_speed {
            self.max_speed.copysign(d)
        } else {
            d
        }
    }

    /// Start following `target`. A non-positive `max_speed` snaps to the
    /// target right away on the first update.
    pub fn follow(&mut self, target: EntityId, axes: FollowAxes, bounds: Option<Rect>, max_speed: f32) {
        self.follow = Some(Follow { target, axes });
        self.bounds = bounds.or(Some(Rect::new(0.0, 0.0, self.width, self.height)));
        self.max_speed = max_speed;
    }

    pub fn unfollow(&mut self) {
        self.follow = None;
    }

    /// Track the followed entity's rectangle (called after each tick).
    pub fn update_follow(&mut self, target_rect: &Rect, first: bool) {
        let Some(follow) = self.follow else { return };
        let c = target_rect.center();
        let x = follow.axes.x.then_some(c.x);
        let y = follow.axes.y.then_some(c.y);
        if first {
            self.center_on(x, y);
        } else {
            self.soft_center_on(x, y);
        }
    }
}

fn step_within(pos: f32, delta: f32, min: f32, max: f32) -> f32 {
    if pos + delta < min {
        min
    } else if pos + delta > max {
        max
    } else {
        pos + delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_on_is_immediate() {
        let mut vp = Viewport::new(100.0, 50.0);
        vp.center_on(Some(300.0), None);
        assert_eq!(vp.pos, Vec2::new(250.0, 0.0));
        assert_eq!(vp.offset(), Vec2::new(-250.0, 0.0));
    }

    #[test]
    fn soft_center_moves_a_third_capped() {
        let mut vp = Viewport::new(100.0, 100.0);
        vp.max_speed = 1000.0;
        vp.soft_center_on(Some(80.0), None);
        // target top-left is 30, a third of that is 10
        assert!((vp.pos.x - 10.0).abs() < 1e-5);

        vp.max_speed = 2.0;
        vp.soft_center_on(Some(80.0), Some(-100.0));
        assert!((vp.pos.x - 12.0).abs() < 1e-5);
        assert!((vp.pos.y + 2.0).abs() < 1e-5);
    }

    #[test]
    fn soft_center_respects_bounds() {
        let mut vp = Viewport::new(100.0, 100.0);
        vp.max_speed = f32::INFINITY;
        vp.bounds = Some(Rect::new(0.0, 0.0, 300.0, 300.0));
        vp.soft_center_on(Some(-500.0), Some(5000.0));
        assert_eq!(vp.pos, Vec2::new(0.0, 200.0));
    }

    #[test]
    fn visibility() {
        let mut vp = Viewport::new(100.0, 100.0);
        assert!(vp.is_visible(&Rect::new(90.0, 90.0, 20.0, 20.0)));
        vp.move_to(Some(500.0), None);
        assert!(!vp.is_visible(&Rect::new(90.0, 90.0, 20.0, 20.0)));
    }

    #[test]
    fn follow_first_snaps_then_soft() {
        let mut vp = Viewport::new(100.0, 100.0);
        vp.follow(EntityId(1), FollowAxes::default(), Some(Rect::new(0.0, 0.0, 1000.0, 1000.0)), 5.0);
        vp.update_follow(&Rect::new(290.0, 290.0, 20.0, 20.0), true);
        assert_eq!(vp.pos, Vec2::new(250.0, 250.0));
        vp.update_follow(&Rect::new(390.0, 290.0, 20.0, 20.0), false);
        assert_eq!(vp.pos, Vec2::new(255.0, 250.0));
        vp.unfollow();
        vp.update_follow(&Rect::new(0.0, 0.0, 1.0, 1.0), false);
        assert_eq!(vp.pos, Vec2::new(255.0, 250.0));
    }
}
