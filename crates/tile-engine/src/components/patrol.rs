use crate::api::types::Axis;

/// Back-and-forth movement along one axis between two positions, as used by
/// elevators and moving platforms.
#[derive(Debug, Clone, PartialEq)]
pub struct Patrol {
    pub axis: Axis,
    /// Signed speed along `axis` (px/s).
    pub veloc: f32,
    pub min_pos: f32,
    pub max_pos: f32,
}

impl Patrol {
    pub fn new(axis: Axis, veloc: f32, min_pos: f32, max_pos: f32) -> Self {
        Self {
            axis,
            veloc,
            min_pos,
            max_pos,
        }
    }

    /// Check a position after moving. Past either end the direction flips
    /// and the clamped position is returned.
    pub fn bounce(&mut self, pos: f32) -> Option<f32> {
        if pos < self.min_pos {
            self.veloc = self.veloc.abs();
            Some(self.min_pos)
        } else if pos > self.max_pos {
            self.veloc = -self.veloc.abs();
            Some(self.max_pos)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounces_at_both_ends() {
        let mut p = Patrol::new(Axis::Y, 50.0, 0.0, 100.0);
        assert_eq!(p.bounce(50.0), None);
        assert_eq!(p.bounce(101.0), Some(100.0));
        assert_eq!(p.veloc, -50.0);
        assert_eq!(p.bounce(-2.0), Some(0.0));
        assert_eq!(p.veloc, 50.0);
    }
}
