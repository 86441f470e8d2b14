//! Patrol system: moves patrolling entities (elevators, moving platforms).

use crate::api::types::{Axis, EntityId};
use crate::core::stage::Stage;

/// Move a patrolling entity by one frame and bounce it at its bounds.
///
/// Movement goes through `Stage::move_entity`, so riders docked to the
/// entity are carried along.
pub fn tick_patrol(stage: &mut Stage, id: EntityId, dt: f32) {
    let Some((axis, veloc)) = stage.get(id).and_then(|e| e.patrol.as_ref()).map(|p| (p.axis, p.veloc)) else {
        return;
    };
    stage.move_entity(id, axis.vec(veloc * dt));

    let Some(entity) = stage.get_mut(id) else { return };
    let pos = axis.of(entity.pos());
    let Some(patrol) = entity.patrol.as_mut() else { return };
    let clamped = patrol.bounce(pos);
    entity.velocity = Some(axis.vec(patrol.veloc));

    if let Some(clamped) = clamped {
        match axis {
            Axis::X => stage.move_entity_to(id, Some(clamped), None),
            Axis::Y => stage.move_entity_to(id, None, Some(clamped)),
        }
    }
}
