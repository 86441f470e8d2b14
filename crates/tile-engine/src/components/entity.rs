use glam::Vec2;

use crate::api::collider_type;
use crate::api::error::EngineError;
use crate::api::types::EntityId;
use crate::assets::properties::Properties;
use crate::components::brain::Brain;
use crate::components::dockable::Dockable;
use crate::components::patrol::Patrol;
use crate::components::physics::TopDownPhysics;
use crate::core::rect::Rect;

/// Steps run after an entity's own translation, in attachment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveModifier {
    /// Move every rider docked to this entity by the same delta.
    CarryDocked,
}

/// Fat Entity: a single struct with optional components.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Unique identifier within the owning stage.
    pub id: EntityId,
    /// String tag for finding entities by name.
    pub tag: String,
    /// Inactive entities are neither ticked nor collided.
    pub active: bool,
    /// Position and size in world pixels.
    pub rect: Rect,
    /// What kind of collider this is (`collider_type` bits).
    pub collider_type: u32,
    /// Which collider types this entity tests against.
    pub collision_mask: u32,
    pub do_render: bool,
    pub render_order: i32,
    /// Frames left to tick while outside the viewport.
    pub ignore_after_n_ticks: u32,
    /// Entity-level velocity for entities without physics.
    pub velocity: Option<Vec2>,
    /// Facing left.
    pub flip_x: bool,
    /// Set by attaching physics: the entity resolves its own collisions and
    /// is skipped by the stage's global sweep.
    pub handles_own_collisions: bool,
    pub physics: Option<TopDownPhysics>,
    pub brain: Option<Brain>,
    pub dockable: Option<Dockable>,
    pub patrol: Option<Patrol>,
    /// Coerced properties from map data.
    pub properties: Properties,
    modifiers: Vec<MoveModifier>,
}

impl Entity {
    /// Create a new entity with the given ID at the origin.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            tag: String::new(),
            active: true,
            rect: Rect::default(),
            collider_type: collider_type::DEFAULT,
            collision_mask: collider_type::DEFAULT,
            do_render: true,
            render_order: 0,
            ignore_after_n_ticks: 0,
            velocity: None,
            flip_x: false,
            handles_own_collisions: false,
            physics: None,
            brain: None,
            dockable: None,
            patrol: None,
            properties: Properties::new(),
            modifiers: Vec::new(),
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.rect.pos = pos;
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.rect.size = size;
        self
    }

    pub fn with_type(mut self, collider_type: u32) -> Self {
        self.collider_type = collider_type;
        self
    }

    pub fn with_mask(mut self, collision_mask: u32) -> Self {
        self.collision_mask = collision_mask;
        self
    }

    pub fn with_render_order(mut self, render_order: i32) -> Self {
        self.render_order = render_order;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_physics(mut self, physics: TopDownPhysics) -> Result<Self, EngineError> {
        self.attach_physics(physics)?;
        Ok(self)
    }

    pub fn with_brain(mut self, brain: Brain) -> Result<Self, EngineError> {
        self.attach_brain(brain)?;
        Ok(self)
    }

    pub fn with_dockable(mut self, dockable: Dockable) -> Result<Self, EngineError> {
        self.attach_dockable(dockable)?;
        Ok(self)
    }

    pub fn with_patrol(mut self, patrol: Patrol) -> Result<Self, EngineError> {
        self.attach_patrol(patrol)?;
        Ok(self)
    }

    // -- Components --

    fn duplicate(&self, component: &'static str) -> EngineError {
        EngineError::DuplicateComponent {
            entity: self.id,
            component,
        }
    }

    pub fn attach_physics(&mut self, physics: TopDownPhysics) -> Result<(), EngineError> {
        if self.physics.is_some() {
            return Err(self.duplicate("physics"));
        }
        self.physics = Some(physics);
        self.handles_own_collisions = true;
        Ok(())
    }

    pub fn attach_brain(&mut self, brain: Brain) -> Result<(), EngineError> {
        if self.brain.is_some() {
            return Err(self.duplicate("brain"));
        }
        self.brain = Some(brain);
        Ok(())
    }

    pub fn attach_dockable(&mut self, dockable: Dockable) -> Result<(), EngineError> {
        if self.dockable.is_some() {
            return Err(self.duplicate("dockable"));
        }
        self.dockable = Some(dockable);
        self.modifiers.push(MoveModifier::CarryDocked);
        Ok(())
    }

    pub fn attach_patrol(&mut self, patrol: Patrol) -> Result<(), EngineError> {
        if self.patrol.is_some() {
            return Err(self.duplicate("patrol"));
        }
        self.patrol = Some(patrol);
        Ok(())
    }

    /// Names of the attached components.
    pub fn component_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.physics.is_some() {
            names.push("physics");
        }
        if self.brain.is_some() {
            names.push("brain");
        }
        if self.dockable.is_some() {
            names.push("dockable");
        }
        if self.patrol.is_some() {
            names.push("patrol");
        }
        names
    }

    pub fn modifiers(&self) -> &[MoveModifier] {
        &self.modifiers
    }

    /// Translate this entity only. Use `Stage::move_entity` to run the
    /// movement modifiers as well.
    pub fn translate(&mut self, delta: Vec2) {
        self.rect.translate(delta);
    }

    pub fn pos(&self) -> Vec2 {
        self.rect.pos
    }

    /// Velocity for direction estimation: physics first, then the entity's
    /// own velocity.
    pub fn current_velocity(&self) -> Option<Vec2> {
        self.physics
            .as_ref()
            .map(TopDownPhysics::velocity)
            .or(self.velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let e = Entity::new(EntityId(3))
            .with_tag("hero")
            .with_rect(Rect::new(1.0, 2.0, 16.0, 24.0))
            .with_type(collider_type::FRIENDLY)
            .with_mask(collider_type::DEFAULT | collider_type::ENEMY)
            .with_render_order(2);
        assert_eq!(e.tag, "hero");
        assert_eq!(e.pos(), Vec2::new(1.0, 2.0));
        assert_eq!(e.collider_type, collider_type::FRIENDLY);
        assert_eq!(e.render_order, 2);
        assert!(e.component_names().is_empty());
    }

    #[test]
    fn physics_makes_entity_self_resolving() {
        let e = Entity::new(EntityId(1))
            .with_physics(TopDownPhysics::new())
            .unwrap();
        assert!(e.handles_own_collisions);
        assert_eq!(e.component_names(), vec!["physics"]);
    }

    #[test]
    fn duplicate_component_is_an_error() {
        let mut e = Entity::new(EntityId(9)).with_brain(Brain::new()).unwrap();
        let err = e.attach_brain(Brain::new()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::DuplicateComponent { entity: EntityId(9), component: "brain" }
        ));
    }

    #[test]
    fn dockable_adds_carry_modifier() {
        let e = Entity::new(EntityId(1)).with_dockable(Dockable::new()).unwrap();
        assert_eq!(e.modifiers(), &[MoveModifier::CarryDocked]);
    }

    #[test]
    fn velocity_prefers_physics() {
        let mut e = Entity::new(EntityId(1)).with_velocity(Vec2::new(1.0, 0.0));
        assert_eq!(e.current_velocity(), Some(Vec2::new(1.0, 0.0)));
        let mut physics = TopDownPhysics::new();
        physics.vy = -4.0;
        e.attach_physics(physics).unwrap();
        assert_eq!(e.current_velocity(), Some(Vec2::new(0.0, -4.0)));
        assert_eq!(Entity::new(EntityId(2)).current_velocity(), None);
    }
}
