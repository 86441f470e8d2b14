use glam::Vec2;

/// Axis-aligned rectangle in world pixels. `pos` is the top-left corner,
/// y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn left(&self) -> f32 {
        self.pos.x
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn top(&self) -> f32 {
        self.pos.y
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap on both axes. Rectangles that only share an edge do
    /// not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.right() > other.left()
            && self.left() < other.right()
            && self.bottom() > other.top()
            && self.top() < other.bottom()
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.pos += delta;
    }

    pub fn translated(mut self, delta: Vec2) -> Self {
        self.translate(delta);
        self
    }

    /// The four corners, clockwise from top-left.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.left(), self.top()),
            Vec2::new(self.right(), self.top()),
            Vec2::new(self.right(), self.bottom()),
            Vec2::new(self.left(), self.bottom()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), Vec2::new(25.0, 40.0));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        let c = Rect::new(9.5, 9.5, 10.0, 10.0);
        assert!(a.intersects(&c));
        assert!(c.intersects(&a));
    }

    #[test]
    fn translate_moves_position_only() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0).translated(Vec2::new(5.0, -2.0));
        assert_eq!(r, Rect::new(6.0, 0.0, 3.0, 4.0));
    }
}
