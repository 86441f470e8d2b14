use std::collections::HashMap;

use log::debug;

use crate::api::error::EngineError;
use crate::api::game::PhysicsConfig;
use crate::api::types::EntityId;
use crate::assets::properties::Properties;
use crate::components::entity::Entity;
use crate::components::tilemap::AutobuildRegion;
use crate::core::rect::Rect;

/// Everything a factory gets to build one entity from a map object.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    pub id: EntityId,
    /// Object name from the map (may be empty).
    pub name: String,
    /// The class the object resolved to.
    pub class: String,
    /// Name of the object layer the object came from.
    pub layer: String,
    pub rect: Rect,
    /// Coerced object properties.
    pub properties: Properties,
    pub physics: PhysicsConfig,
}

impl SpawnRequest {
    pub fn prop_f32(&self, key: &str) -> Option<f32> {
        self.properties.get(key).and_then(|v| v.as_f32())
    }

    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }
}

pub type SpawnFn = Box<dyn Fn(&SpawnRequest) -> Result<Entity, EngineError>>;
pub type AutobuildFn = Box<dyn Fn(&AutobuildRegion, EntityId) -> Result<Entity, EngineError>>;

/// Name → factory lookup used to turn map content into entities.
///
/// Map objects resolve through `spawners` (by their `class` property or
/// their type), autobuild regions through `autobuilders` (by the tile's
/// `autobuild_class`). A name missing from the registry is a content error.
pub struct EntityRegistry {
    spawners: HashMap<String, SpawnFn>,
    autobuilders: HashMap<String, AutobuildFn>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            spawners: HashMap::new(),
            autobuilders: HashMap::new(),
        }
    }

    /// Registry with the stock prefabs: `Ladder` and `LiquidBody` as
    /// autobuild classes, `Elevator` as a map object class.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.register_autobuild("Ladder", crate::prefabs::ladder::build);
        reg.register_autobuild("LiquidBody", crate::prefabs::liquid::build);
        reg.register("Elevator", crate::prefabs::elevator::spawn);
        reg
    }

    /// Register (or replace) a map object factory.
    pub fn register<F>(&mut self, class: impl Into<String>, factory: F)
    where
        F: Fn(&SpawnRequest) -> Result<Entity, EngineError> + 'static,
    {
        let class = class.into();
        debug!("registered spawn class `{}`", class);
        self.spawners.insert(class, Box::new(factory));
    }

    /// Register (or replace) an autobuild factory.
    pub fn register_autobuild<F>(&mut self, class: impl Into<String>, factory: F)
    where
        F: Fn(&AutobuildRegion, EntityId) -> Result<Entity, EngineError> + 'static,
    {
        let class = class.into();
        debug!("registered autobuild class `{}`", class);
        self.autobuilders.insert(class, Box::new(factory));
    }

    pub fn contains(&self, class: &str) -> bool {
        self.spawners.contains_key(class)
    }

    pub fn contains_autobuild(&self, class: &str) -> bool {
        self.autobuilders.contains_key(class)
    }

    /// Build an entity for a map object. `req.class` picks the factory.
    pub fn spawn(&self, req: &SpawnRequest) -> Result<Entity, EngineError> {
        let factory = self.spawners.get(&req.class).ok_or_else(|| EngineError::UnknownClass {
            name: req.class.clone(),
            layer: req.layer.clone(),
        })?;
        factory(req)
    }

    /// Build an entity for an autobuild region found on `layer`.
    pub fn autobuild(
        &self,
        region: &AutobuildRegion,
        id: EntityId,
        layer: &str,
    ) -> Result<Entity, EngineError> {
        let factory = self
            .autobuilders
            .get(&region.class)
            .ok_or_else(|| EngineError::UnknownClass {
                name: region.class.clone(),
                layer: layer.to_string(),
            })?;
        factory(region, id)
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::collider_type;
    use crate::assets::properties::PropertyValue;

    fn request(class: &str) -> SpawnRequest {
        SpawnRequest {
            id: EntityId(4),
            name: "thing".into(),
            class: class.into(),
            layer: "objects".into(),
            rect: Rect::new(10.0, 20.0, 16.0, 16.0),
            properties: Properties::new(),
            physics: PhysicsConfig::default(),
        }
    }

    #[test]
    fn registered_factory_builds_entity() {
        let mut reg = EntityRegistry::new();
        reg.register("Coin", |req: &SpawnRequest| {
            Ok(Entity::new(req.id)
                .with_tag("coin")
                .with_rect(req.rect)
                .with_type(collider_type::FRIENDLY))
        });
        assert!(reg.contains("Coin"));
        let coin = reg.spawn(&request("Coin")).unwrap();
        assert_eq!(coin.id, EntityId(4));
        assert_eq!(coin.tag, "coin");
        assert_eq!(coin.rect, Rect::new(10.0, 20.0, 16.0, 16.0));
    }

    #[test]
    fn unknown_class_names_layer() {
        let reg = EntityRegistry::new();
        match reg.spawn(&request("Dragon")) {
            Err(EngineError::UnknownClass { name, layer }) => {
                assert_eq!(name, "Dragon");
                assert_eq!(layer, "objects");
            }
            other => panic!("expected UnknownClass, got {:?}", other.map(|e| e.id)),
        }
    }

    #[test]
    fn builtins_are_present() {
        let reg = EntityRegistry::with_builtins();
        assert!(reg.contains_autobuild("Ladder"));
        assert!(reg.contains_autobuild("LiquidBody"));
        assert!(reg.contains("Elevator"));
        assert!(!reg.contains("Ladder"));
    }

    #[test]
    fn request_property_helpers() {
        let mut req = request("Coin");
        req.properties.insert("value".into(), PropertyValue::Int(5));
        req.properties.insert("kind".into(), PropertyValue::Str("gold".into()));
        assert_eq!(req.prop_f32("value"), Some(5.0));
        assert_eq!(req.prop_str("kind"), Some("gold"));
        assert_eq!(req.prop_f32("missing"), None);
    }
}
