//! Top-down physics system.
//!
//! Runs one entity's physics component for a frame: acceleration from its
//! brain, sub-stepped integration, and per-axis movement with collision
//! resolution against tile layers and other entities. The x axis is always
//! moved and resolved before y within a sub-step.

use glam::Vec2;
use log::info;

use crate::api::collider_type;
use crate::api::types::{Axis, ColliderRef, EntityId};
use crate::components::physics::{Bump, TopDownPhysics};
use crate::core::algorithms::{Body, Detector};
use crate::core::collision::Collision;
use crate::core::events::{EventKind, EventPayload, EventTarget};
use crate::core::stage::Stage;
use crate::core::time::Substeps;

fn bump_event(bump: Bump) -> EventKind {
    match bump {
        Bump::Top => EventKind::BumpTop,
        Bump::Bottom => EventKind::BumpBottom,
        Bump::Left => EventKind::BumpLeft,
        Bump::Right => EventKind::BumpRight,
    }
}

/// Tick the physics component of `id`, if it has one.
pub fn tick_physics(stage: &mut Stage, id: EntityId, dt: f32) {
    let Some(entity) = stage.get_mut(id) else { return };
    // Taken out for the frame so the stage can be borrowed mutably while
    // resolving; put back at the end.
    let Some(mut physics) = entity.physics.take() else { return };

    let commands = entity.brain.as_ref().map(|b| b.commands);
    let (accel, flip) = physics.compute_acceleration(commands.as_ref());
    if let Some(flip) = flip {
        entity.flip_x = flip;
    }
    if let Some(dockable) = entity.dockable.as_mut() {
        dockable.to_determine();
    }
    physics.touching = 0;

    let detector = stage.options.detector;
    for step in Substeps::new(dt, physics.max_substep) {
        physics.integrate(accel, step);
        physics.at_exit = false;

        let Some(original_pos) = stage.get(id).map(|e| e.pos()) else { break };
        if physics.vx != 0.0 {
            let veloc = physics.vx;
            stage.move_entity(id, Vec2::new(veloc * step, 0.0));
            collide_in_one_direction(stage, id, &mut physics, Axis::X, veloc, original_pos, detector);
        }
        if physics.vy != 0.0 {
            let veloc = physics.vy;
            stage.move_entity(id, Vec2::new(0.0, veloc * step));
            collide_in_one_direction(stage, id, &mut physics, Axis::Y, veloc, original_pos, detector);
        }
    }

    settle_docking(stage, id);
    if let Some(entity) = stage.get_mut(id) {
        entity.physics = Some(physics);
    }
}

/// Detect and resolve everything `id` ran into after moving along `axis`.
///
/// Tile layers come first (only when both the entity's mask and the layer
/// are `default`), each yielding at most one hit in scan order. Then every
/// other entity whose type the mask matches.
pub fn collide_in_one_direction(
    stage: &mut Stage,
    id: EntityId,
    physics: &mut TopDownPhysics,
    axis: Axis,
    veloc: f32,
    original_pos: Vec2,
    detector: Detector,
) {
    let Some(mask) = stage.get(id).map(|e| e.collision_mask) else { return };

    if mask & collider_type::DEFAULT != 0 {
        for idx in 0..stage.layers.len() {
            let Some(rect) = stage.get(id).map(|e| e.rect) else { return };
            let layer = &stage.layers[idx];
            if layer.collider_type & collider_type::DEFAULT == 0 {
                continue;
            }
            let mover = Body::new(ColliderRef::Entity(id), rect);
            if let Some(col) = layer.collide_along_axis(mover, axis, veloc, original_pos, detector) {
                let is_exit = stage.is_exit(col.sprite2);
                handle_collision(stage, id, physics, &col, is_exit);
            }
        }
    }

    for other in stage.scene.ids() {
        if other == id {
            continue;
        }
        let (Some(me), Some(them)) = (stage.get(id), stage.get(other)) else { continue };
        if !them.active || mask & them.collider_type == 0 {
            continue;
        }
        let mover = Body::new(ColliderRef::Entity(id), me.rect);
        let target = Body::new(ColliderRef::Entity(other), them.rect);
        if let Some(col) = detector.collide(mover, target, axis, veloc, Some(original_pos)) {
            handle_collision(stage, id, physics, &col, false);
        }
    }
}

/// Report a collision, apply the physics response and send bump/exit
/// events. Each side bumps at most once per tick; the first bottom bump
/// docks the entity to what it landed on.
fn handle_collision(
    stage: &mut Stage,
    id: EntityId,
    physics: &mut TopDownPhysics,
    col: &Collision,
    is_exit: bool,
) {
    let me = EventTarget::Entity(id);
    stage.events.emit(EventKind::Collision, me, EventPayload::Collision(*col));

    let touched_before = physics.touching;
    let res = physics.resolve(col, is_exit);
    if res.reached_exit {
        info!("stage `{}`: {:?} reached the exit", stage.name, id);
        stage.events.emit(EventKind::ReachedExit, EventTarget::Stage, EventPayload::Entity(id));
        return;
    }

    stage.move_entity(id, res.translate);
    // `touching` is cleared at the start of every tick, so a side already
    // set was bumped in an earlier sub-step and is reported once only.
    for bump in res.bumps {
        if touched_before & bump.touch_bit() != 0 {
            continue;
        }
        stage.events.emit(bump_event(bump), me, EventPayload::Collision(*col));
        if bump == Bump::Bottom {
            stage.dock_to(id, col.sprite2);
        }
    }
}

/// End of the frame: a docking state nobody confirmed is checked against
/// actual contact with the old mothership.
fn settle_docking(stage: &mut Stage, id: EntityId) {
    let Some(dockable) = stage.get(id).and_then(|e| e.dockable.as_ref()) else {
        return;
    };
    if !dockable.state_unsure() {
        return;
    }
    match dockable.docked_to {
        Some(target) if stage.rests_on(id, target) => {
            if let Some(d) = stage.get_mut(id).and_then(|e| e.dockable.as_mut()) {
                d.mark_docked(target);
            }
        }
        _ => {
            stage.undock(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::brain::Brain;
    use crate::components::dockable::Dockable;
    use crate::components::entity::Entity;
    use crate::components::tilemap::TileLayer;
    use crate::core::events::GameEvent;
    use crate::core::rect::Rect;
    use crate::core::stage::StageOptions;
    use crate::input::keyboard::KeyState;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    const EPSILON: f32 = 1e-3;

    struct Held(&'static [&'static str]);

    impl KeyState for Held {
        fn is_down(&self, key: &str) -> bool {
            self.0.contains(&key)
        }
    }

    fn layer(cells: &[(u32, u32)]) -> TileLayer {
        let none: HashMap<String, String> = HashMap::new();
        let mut layer = TileLayer::new("walls", 10, 10, 10.0, 10.0)
            .unwrap()
            .with_type(collider_type::DEFAULT);
        for &(x, y) in cells {
            layer = layer.with_tile(x, y, 1, &none);
        }
        layer
    }

    fn runner(stage: &mut Stage, rect: Rect, physics: TopDownPhysics) -> EntityId {
        let id = stage.next_id();
        let e = Entity::new(id)
            .with_rect(rect)
            .with_physics(physics)
            .unwrap()
            .with_brain(Brain::new())
            .unwrap();
        stage.add_entity(e, "actors")
    }

    fn events(stage: &mut Stage, kinds: &[EventKind]) -> Rc<RefCell<Vec<GameEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        for &kind in kinds {
            let sink = Rc::clone(&seen);
            stage
                .events
                .subscribe(kind, None, Box::new(move |e: &GameEvent| sink.borrow_mut().push(*e)))
                .unwrap();
        }
        seen
    }

    fn tick(stage: &mut Stage, keys: &Held, dt: f32) {
        let ids = stage.scene.ids();
        for id in ids {
            if let Some(brain) = stage.get_mut(id).and_then(|e| e.brain.as_mut()) {
                brain.tick(keys);
            }
            tick_physics(stage, id, dt);
        }
    }

    #[test]
    fn runs_into_a_wall_and_stops() {
        let mut stage = Stage::new("t", StageOptions::default());
        stage.add_tile_layer(layer(&[(3, 0)])).unwrap();
        let mut physics = TopDownPhysics::new();
        physics.vx = 150.0;
        let id = runner(&mut stage, Rect::new(17.0, 0.0, 10.0, 10.0), physics);
        let seen = events(&mut stage, &[EventKind::BumpRight, EventKind::Collision]);

        tick(&mut stage, &Held(&["right"]), 1.0 / 30.0);

        let e = stage.get(id).unwrap();
        assert!((e.rect.right() - 30.0).abs() < EPSILON);
        let p = e.physics.as_ref().unwrap();
        assert_eq!(p.vx, 0.0);
        assert_ne!(p.touching & crate::components::physics::TOUCH_RIGHT, 0);
        let kinds: Vec<EventKind> = seen.borrow().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Collision, EventKind::BumpRight]);
    }

    #[test]
    fn large_frames_are_substepped() {
        let mut stage = Stage::new("t", StageOptions::default());
        // a wall the runner would jump clean over in a single 1/15 s step
        stage.add_tile_layer(layer(&[(1, 0)])).unwrap();
        let mut physics = TopDownPhysics::new().with_v_max(300.0);
        physics.vx = 300.0;
        let id = runner(&mut stage, Rect::new(0.0, 0.0, 8.0, 10.0), physics);

        tick(&mut stage, &Held(&["right"]), 1.0 / 15.0);

        let e = stage.get(id).unwrap();
        assert!((e.rect.right() - 10.0).abs() < EPSILON, "stopped at the wall, not behind it");
    }

    #[test]
    fn moves_x_before_y() {
        let mut stage = Stage::new("t", StageOptions::default());
        let mut physics = TopDownPhysics::new();
        physics.vx = 30.0;
        physics.vy = 30.0;
        let id = runner(&mut stage, Rect::new(0.0, 0.0, 10.0, 10.0), physics);
        tick(&mut stage, &Held(&["right", "down"]), 1.0 / 30.0);
        let e = stage.get(id).unwrap();
        // v = 30 + 300/30 = 40 on both axes, moved 40/30 each
        assert!((e.pos().x - 4.0 / 3.0).abs() < EPSILON);
        assert!((e.pos().y - 4.0 / 3.0).abs() < EPSILON);
        assert!(!e.flip_x);
    }

    #[test]
    fn exit_tiles_report_and_do_not_block() {
        let mut stage = Stage::new("t", StageOptions::default());
        let exit: HashMap<String, String> = [("exit".to_string(), "true".to_string())].into();
        stage
            .add_tile_layer(layer(&[]).with_tile(2, 0, 2, &exit))
            .unwrap();
        let mut physics = TopDownPhysics::new();
        physics.vx = 150.0;
        let id = runner(&mut stage, Rect::new(8.0, 0.0, 10.0, 10.0), physics);
        let seen = events(&mut stage, &[EventKind::ReachedExit]);

        tick(&mut stage, &Held(&["right"]), 1.0 / 30.0);

        let e = stage.get(id).unwrap();
        assert!(e.rect.right() > 20.0, "no push back from an exit");
        assert!(e.physics.as_ref().unwrap().at_exit);
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].payload, EventPayload::Entity(id));
    }

    #[test]
    fn collides_with_entities_matching_the_mask() {
        let mut stage = Stage::new("t", StageOptions::default());
        let crate_id = stage.add_entity(
            Entity::new(EntityId(50)).with_rect(Rect::new(20.0, 0.0, 10.0, 10.0)),
            "props",
        );
        let mut physics = TopDownPhysics::new();
        physics.vx = 150.0;
        let id = runner(&mut stage, Rect::new(8.0, 0.0, 10.0, 10.0), physics);
        let seen = events(&mut stage, &[EventKind::Collision]);

        tick(&mut stage, &Held(&["right"]), 1.0 / 30.0);

        assert!((stage.get(id).unwrap().rect.right() - 20.0).abs() < EPSILON);
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].collision().unwrap().sprite2, ColliderRef::Entity(crate_id));
    }

    #[test]
    fn landing_on_a_dockable_entity_docks_and_leaving_undocks() {
        let mut stage = Stage::new("t", StageOptions::default());
        let lift = stage.add_entity(
            Entity::new(EntityId(50))
                .with_rect(Rect::new(0.0, 20.0, 40.0, 5.0))
                .with_type(collider_type::DEFAULT | collider_type::DOCKABLE)
                .with_mask(collider_type::NONE)
                .with_dockable(Dockable::new())
                .unwrap(),
            "lifts",
        );
        let mut physics = TopDownPhysics::new();
        physics.vy = 60.0;
        let id = runner(&mut stage, Rect::new(5.0, 9.0, 10.0, 10.0), physics);
        stage.get_mut(id).unwrap().attach_dockable(Dockable::new()).unwrap();
        let seen = events(&mut stage, &[EventKind::Docked, EventKind::Undocked]);

        tick(&mut stage, &Held(&["down"]), 1.0 / 30.0);
        assert!((stage.get(id).unwrap().rect.bottom() - 20.0).abs() < EPSILON);
        assert!(stage.get(id).unwrap().dockable.as_ref().unwrap().is_docked());
        assert!(stage.get(lift).unwrap().dockable.as_ref().unwrap().docked.contains(&id));

        // standing still keeps the docking
        tick(&mut stage, &Held(&[]), 1.0 / 30.0);
        assert!(stage.get(id).unwrap().dockable.as_ref().unwrap().is_docked());

        // walking up and away undocks
        tick(&mut stage, &Held(&["up"]), 0.1);
        assert!(!stage.get(id).unwrap().dockable.as_ref().unwrap().is_docked());
        let kinds: Vec<EventKind> = seen.borrow().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Docked, EventKind::Undocked]);
    }

    #[test]
    fn landing_bumps_once_per_tick_across_substeps() {
        let mut stage = Stage::new("t", StageOptions::default());
        stage.add_tile_layer(layer(&[(1, 3)])).unwrap();
        let mut physics = TopDownPhysics::new();
        physics.vy = 50.0;
        let id = runner(&mut stage, Rect::new(10.0, 19.0, 10.0, 10.0), physics);
        let seen = events(&mut stage, &[EventKind::BumpBottom, EventKind::Collision]);
        let count = |kind: EventKind| seen.borrow().iter().filter(|e| e.kind == kind).count();

        // two sub-steps, both end up resting on the tile
        tick(&mut stage, &Held(&["down"]), 1.0 / 15.0);
        assert_eq!(count(EventKind::Collision), 2);
        assert_eq!(count(EventKind::BumpBottom), 1);
        let e = stage.get(id).unwrap();
        assert!((e.rect.bottom() - 30.0).abs() < EPSILON);
        assert_ne!(e.physics.as_ref().unwrap().touching & crate::components::physics::TOUCH_BOTTOM, 0);

        tick(&mut stage, &Held(&["down"]), 1.0 / 15.0);
        assert_eq!(count(EventKind::BumpBottom), 2, "one more for the next tick");
    }

    #[test]
    fn entity_without_physics_is_untouched() {
        let mut stage = Stage::new("t", StageOptions::default());
        let id = stage.add_entity(Entity::new(EntityId(1)).with_pos(Vec2::new(1.0, 2.0)), "g");
        tick_physics(&mut stage, id, 1.0);
        assert_eq!(stage.get(id).unwrap().pos(), Vec2::new(1.0, 2.0));
    }
}
