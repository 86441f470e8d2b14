use glam::Vec2;

use crate::api::collider_type;
use crate::api::error::EngineError;
use crate::api::types::Axis;
use crate::assets::registry::SpawnRequest;
use crate::components::dockable::Dockable;
use crate::components::entity::Entity;
use crate::components::patrol::Patrol;
use crate::core::rect::Rect;

pub const DEFAULT_VELOC: f32 = 50.0;
pub const DEFAULT_MIN_POS: f32 = 0.0;
pub const DEFAULT_MAX_POS: f32 = 500.0;
/// Size used when the map object carries no size of its own.
pub const DEFAULT_SIZE: Vec2 = Vec2::new(32.0, 8.0);

/// A moving platform that patrols one axis and carries whatever docks to it.
///
/// Object properties: `direction` (`x` or `y`, default `y`),
/// `initial_veloc` (px/s), `min_pos` and `max_pos` (world position bounds
/// of the top-left corner along that axis).
pub fn spawn(req: &SpawnRequest) -> Result<Entity, EngineError> {
    let axis = match req.prop_str("direction").unwrap_or("y") {
        "x" => Axis::X,
        "y" => Axis::Y,
        other => {
            return Err(EngineError::MalformedMap(format!(
                "elevator `{}` has unknown direction `{}`",
                req.name, other
            )))
        }
    };
    let veloc = req.prop_f32("initial_veloc").unwrap_or(DEFAULT_VELOC);
    let min_pos = req.prop_f32("min_pos").unwrap_or(DEFAULT_MIN_POS);
    let max_pos = req.prop_f32("max_pos").unwrap_or(DEFAULT_MAX_POS);

    let mut rect = req.rect;
    if rect.size.x <= 0.0 || rect.size.y <= 0.0 {
        rect = Rect { pos: rect.pos, size: DEFAULT_SIZE };
    }

    Entity::new(req.id)
        .with_tag("elevator")
        .with_rect(rect)
        .with_type(collider_type::DEFAULT | collider_type::DOCKABLE | collider_type::ONE_WAY_PLATFORM)
        .with_mask(collider_type::NONE)
        .with_velocity(axis.vec(veloc))
        .with_properties(req.properties.clone())
        .with_patrol(Patrol::new(axis, veloc, min_pos, max_pos))?
        .with_dockable(Dockable::new())
}
