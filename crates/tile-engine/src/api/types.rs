use glam::Vec2;

/// Unique identifier for an entity within its stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Index of a tile layer within its stage (insertion order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub usize);

/// The axis a single collision test is resolved along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    #[default]
    X,
    Y,
}

impl Axis {
    /// Component of `v` along this axis.
    pub fn of(self, v: Vec2) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }

    /// Unit vector along this axis scaled by `amount`.
    pub fn vec(self, amount: f32) -> Vec2 {
        match self {
            Axis::X => Vec2::new(amount, 0.0),
            Axis::Y => Vec2::new(0.0, amount),
        }
    }
}

/// One participant of a collision: a stage entity, a single tile of a
/// tile layer, or the throwaway query rectangle used by `Stage::locate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColliderRef {
    Entity(EntityId),
    Tile { layer: LayerId, x: u32, y: u32 },
    Query,
}

impl ColliderRef {
    pub fn entity(self) -> Option<EntityId> {
        match self {
            ColliderRef::Entity(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_tile(self) -> bool {
        matches!(self, ColliderRef::Tile { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_projects_and_builds_vectors() {
        let v = Vec2::new(3.0, -4.0);
        assert_eq!(Axis::X.of(v), 3.0);
        assert_eq!(Axis::Y.of(v), -4.0);
        assert_eq!(Axis::Y.vec(2.0), Vec2::new(0.0, 2.0));
        assert_eq!(Axis::default(), Axis::X);
    }

    #[test]
    fn collider_ref_entity_accessor() {
        assert_eq!(ColliderRef::Entity(EntityId(7)).entity(), Some(EntityId(7)));
        let tile = ColliderRef::Tile { layer: LayerId(0), x: 1, y: 2 };
        assert!(tile.is_tile());
        assert_eq!(tile.entity(), None);
    }
}
