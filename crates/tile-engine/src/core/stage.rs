//! Stage: one scene's entities, tile layers and per-frame bookkeeping.
//!
//! A stage owns everything it simulates. Systems are free functions that
//! take `&mut Stage` plus an entity id, so an entity can be moved, collided
//! and reported on without holding a borrow of the entity list across the
//! whole frame.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use log::{debug, info, warn};

use crate::api::collider_type;
use crate::api::error::EngineError;
use crate::api::game::{EngineConfig, PhysicsConfig};
use crate::api::types::{Axis, ColliderRef, EntityId, LayerId};
use crate::assets::properties::{coerce_all, PropertyValue};
use crate::assets::registry::{EntityRegistry, SpawnRequest};
use crate::assets::tilemap_data::{LayerData, ObjectLayerData, TileMapData};
use crate::components::dockable::Dockable;
use crate::components::entity::{Entity, MoveModifier};
use crate::components::tilemap::{TileLayer, AUTOBUILD_CLASS};
use crate::components::viewport::{FollowAxes, Viewport};
use crate::core::algorithms::{Body, Detector};
use crate::core::collision::Collision;
use crate::core::events::{EventBus, EventKind, EventPayload, EventTarget};
use crate::core::rect::Rect;
use crate::core::scene::Scene;
use crate::input::keyboard::KeyState;
use crate::renderer::{DrawItem, Surface};
use crate::systems;

/// Group that entities built from autobuild tiles are added to.
pub const AUTOBUILD_GROUP: &str = "autobuilds";

/// Velocity handed to the detector by `Stage::locate`. Any non-zero value
/// works; the query only asks whether something is there.
const QUERY_VELOC: f32 = 1.0;

/// Largest gap between a rider's bottom and its mothership's top that still
/// counts as standing on it.
pub const CONTACT_TOLERANCE: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct StageOptions {
    pub detector: Detector,
    pub tick_sprites_in_range_only: bool,
    pub tick_sprites_n_more_frames: u32,
    /// Tuning handed to factories spawning physics entities.
    pub physics: PhysicsConfig,
}

impl StageOptions {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            detector: Detector::default(),
            tick_sprites_in_range_only: config.tick_sprites_in_range_only,
            tick_sprites_n_more_frames: config.tick_sprites_n_more_frames,
            physics: config.physics.clone(),
        }
    }

    pub fn with_detector(mut self, detector: Detector) -> Self {
        self.detector = detector;
        self
    }
}

impl Default for StageOptions {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

pub struct Stage {
    pub name: String,
    pub options: StageOptions,
    pub events: EventBus,
    pub viewport: Option<Viewport>,
    pub(crate) scene: Scene,
    pub(crate) layers: Vec<TileLayer>,
    groups: BTreeMap<String, Vec<EntityId>>,
    /// Renderable layers and entities, ascending render order.
    draw_list: Vec<DrawItem>,
    remove_list: Vec<EntityId>,
    next_id: u32,
    paused: bool,
    hidden: bool,
    /// The next follow update snaps instead of easing.
    follow_pending: bool,
}

impl Stage {
    pub fn new(name: impl Into<String>, options: StageOptions) -> Self {
        Self {
            name: name.into(),
            options,
            events: EventBus::with_all_kinds(),
            viewport: None,
            scene: Scene::new(),
            layers: Vec::new(),
            groups: BTreeMap::new(),
            draw_list: Vec::new(),
            remove_list: Vec::new(),
            next_id: 1,
            paused: false,
            hidden: false,
            follow_pending: false,
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    /// Hand out a fresh entity id.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    // -- Queries --

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.scene.get(id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.scene.get_mut(id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.scene.contains(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.scene.iter()
    }

    pub fn entity_count(&self) -> usize {
        self.scene.len()
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<&Entity> {
        self.scene.find_by_tag(tag)
    }

    pub fn find_all_by_tag(&self, tag: &str) -> Vec<&Entity> {
        self.scene.find_all_by_tag(tag)
    }

    /// First entity the predicate accepts.
    pub fn find<P>(&self, mut predicate: P) -> Option<&Entity>
    where
        P: FnMut(&Entity) -> bool,
    {
        self.scene.iter().find(|e| predicate(e))
    }

    pub fn for_each<F>(&mut self, f: F)
    where
        F: FnMut(&mut Entity),
    {
        self.scene.iter_mut().for_each(f);
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&TileLayer> {
        self.layers.get(id.0)
    }

    pub fn layer_by_name(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn group(&self, name: &str) -> Option<&[EntityId]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    pub fn draw_list(&self) -> &[DrawItem] {
        &self.draw_list
    }

    /// Current rectangle of any collider the stage knows about.
    pub fn collider_rect(&self, collider: ColliderRef) -> Option<Rect> {
        match collider {
            ColliderRef::Entity(id) => self.scene.get(id).map(|e| e.rect),
            ColliderRef::Tile { layer, x, y } => {
                self.layers.get(layer.0).and_then(|l| l.get(x, y)).map(|t| t.rect)
            }
            ColliderRef::Query => None,
        }
    }

    pub fn collider_type(&self, collider: ColliderRef) -> Option<u32> {
        match collider {
            ColliderRef::Entity(id) => self.scene.get(id).map(|e| e.collider_type),
            ColliderRef::Tile { layer, x, y } => self
                .layers
                .get(layer.0)
                .and_then(|l| l.get(x, y))
                .map(|t| t.collider_type),
            ColliderRef::Query => None,
        }
    }

    /// Whether a tile collider is flagged as the level exit.
    pub fn is_exit(&self, collider: ColliderRef) -> bool {
        match collider {
            ColliderRef::Tile { layer, x, y } => self
                .layers
                .get(layer.0)
                .and_then(|l| l.get(x, y))
                .is_some_and(|t| t.is_exit()),
            _ => false,
        }
    }

    // -- Population --

    fn render_order_of(&self, item: DrawItem) -> i32 {
        match item {
            DrawItem::Layer(id) => self.layers.get(id.0).map_or(0, |l| l.render_order),
            DrawItem::Entity(id) => self.scene.get(id).map_or(0, |e| e.render_order),
        }
    }

    /// Insert after every item with the same or a lower render order.
    fn insert_draw(&mut self, item: DrawItem, order: i32) {
        let idx = self
            .draw_list
            .iter()
            .position(|it| self.render_order_of(*it) > order)
            .unwrap_or(self.draw_list.len());
        self.draw_list.insert(idx, item);
    }

    /// Add a tile layer. Layer names are unique per stage.
    pub fn add_tile_layer(&mut self, mut layer: TileLayer) -> Result<LayerId, EngineError> {
        if self.layer_by_name(&layer.name).is_some() {
            return Err(EngineError::DuplicateLayer(layer.name));
        }
        let id = LayerId(self.layers.len());
        layer.id = id;
        if layer.do_render {
            self.insert_draw(DrawItem::Layer(id), layer.render_order);
        }
        debug!(
            "stage `{}`: tile layer `{}` ({}x{}, order {})",
            self.name, layer.name, layer.width, layer.height, layer.render_order
        );
        self.layers.push(layer);
        Ok(id)
    }

    /// Build entities for the autobuild regions of a layer and add them to
    /// the `autobuilds` group.
    pub fn autobuild(
        &mut self,
        layer: LayerId,
        registry: &EntityRegistry,
    ) -> Result<Vec<EntityId>, EngineError> {
        let Some(tile_layer) = self.layers.get(layer.0) else {
            return Ok(Vec::new());
        };
        let layer_name = tile_layer.name.clone();
        let regions = tile_layer.autobuild_regions(AUTOBUILD_CLASS);
        let mut ids = Vec::with_capacity(regions.len());
        for region in &regions {
            let id = self.next_id();
            let entity = registry.autobuild(region, id, &layer_name)?;
            ids.push(self.add_entity(entity, AUTOBUILD_GROUP));
        }
        debug!("stage `{}`: {} autobuilds from `{}`", self.name, ids.len(), layer_name);
        Ok(ids)
    }

    /// Populate the stage from map data: tile layers in map order (with their
    /// autobuilds) and one entity group per object layer.
    pub fn load_map(&mut self, map: &TileMapData, registry: &EntityRegistry) -> Result<(), EngineError> {
        for data in &map.layers {
            match data {
                LayerData::Tiles(tiles) => {
                    let layer = TileLayer::from_map_layer(map, tiles)?;
                    let autobuild = layer.autobuild_objects;
                    let id = self.add_tile_layer(layer)?;
                    if autobuild {
                        self.autobuild(id, registry)?;
                    }
                }
                LayerData::Objects(group) => {
                    self.add_object_group(group, registry)?;
                }
            }
        }
        info!(
            "stage `{}`: loaded {}x{} map, {} tile layers, {} entities",
            self.name,
            map.width,
            map.height,
            self.layers.len(),
            self.scene.len()
        );
        Ok(())
    }

    /// Spawn every visible object of an object layer through the registry.
    /// The class is the object's `class` property, or else its type.
    pub fn add_object_group(
        &mut self,
        group: &ObjectLayerData,
        registry: &EntityRegistry,
    ) -> Result<Vec<EntityId>, EngineError> {
        if self.groups.contains_key(&group.name) {
            return Err(EngineError::DuplicateGroup(group.name.clone()));
        }
        self.groups.insert(group.name.clone(), Vec::new());

        let mut ids = Vec::with_capacity(group.objects.len());
        for obj in &group.objects {
            if !obj.visible {
                warn!("stage `{}`: skipping invisible object `{}` in `{}`", self.name, obj.name, group.name);
                continue;
            }
            let properties = coerce_all(&obj.properties);
            let class = properties
                .get("class")
                .and_then(PropertyValue::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| obj.kind.clone());
            let req = SpawnRequest {
                id: self.next_id(),
                name: obj.name.clone(),
                class,
                layer: group.name.clone(),
                rect: Rect::new(obj.x, obj.y, obj.width, obj.height),
                properties,
                physics: self.options.physics.clone(),
            };
            let entity = registry.spawn(&req)?;
            ids.push(self.add_entity(entity, &group.name));
        }
        Ok(ids)
    }

    /// Add an entity to the stage and to `group` (created on demand).
    /// An id already in use is replaced by a fresh one; the id the entity
    /// ends up with is returned.
    pub fn add_entity(&mut self, mut entity: Entity, group: &str) -> EntityId {
        if self.scene.contains(entity.id) {
            let fresh = self.next_id();
            warn!(
                "stage `{}`: entity id {:?} already taken, using {:?}",
                self.name, entity.id, fresh
            );
            entity.id = fresh;
        }
        self.next_id = self.next_id.max(entity.id.0 + 1);
        entity.ignore_after_n_ticks = self.options.tick_sprites_n_more_frames;

        let id = entity.id;
        if entity.do_render {
            self.insert_draw(DrawItem::Entity(id), entity.render_order);
        }
        self.groups.entry(group.to_string()).or_default().push(id);
        debug!("stage `{}`: added {:?} `{}` to `{}`", self.name, id, entity.tag, group);
        self.scene.spawn(entity);

        self.events.emit(EventKind::AddedToStage, EventTarget::Stage, EventPayload::Entity(id));
        self.events.emit(EventKind::AddedToStage, EventTarget::Entity(id), EventPayload::None);
        id
    }

    /// Queue an entity for removal at the end of the current tick.
    pub fn remove_entity(&mut self, id: EntityId) {
        if self.scene.contains(id) && !self.remove_list.contains(&id) {
            self.remove_list.push(id);
        }
    }

    /// Remove an entity right away. Unknown or already removed ids are
    /// ignored.
    pub fn force_remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        if !self.scene.contains(id) {
            return None;
        }
        self.undock(id);
        self.undock_all(id);
        let entity = self.scene.despawn(id)?;

        self.draw_list.retain(|it| *it != DrawItem::Entity(id));
        self.remove_list.retain(|r| *r != id);
        for members in self.groups.values_mut() {
            members.retain(|m| *m != id);
        }
        if let Some(vp) = self.viewport.as_mut() {
            if vp.follow.is_some_and(|f| f.target == id) {
                vp.unfollow();
            }
        }

        debug!("stage `{}`: removed {:?}", self.name, id);
        self.events.emit(EventKind::RemovedFromStage, EventTarget::Stage, EventPayload::Entity(id));
        self.events.emit(EventKind::RemovedFromStage, EventTarget::Entity(id), EventPayload::None);
        self.events.unsubscribe_target(EventTarget::Entity(id));
        Some(entity)
    }

    fn apply_removals(&mut self) {
        for id in std::mem::take(&mut self.remove_list) {
            self.force_remove_entity(id);
        }
    }

    // -- Movement --

    /// Translate an entity and run its movement modifiers: docked riders
    /// are carried along, transitively. Each entity moves at most once per
    /// call.
    pub fn move_entity(&mut self, id: EntityId, delta: Vec2) {
        let mut visited = BTreeSet::new();
        self.move_with_modifiers(id, delta, &mut visited);
    }

    fn move_with_modifiers(&mut self, id: EntityId, delta: Vec2, visited: &mut BTreeSet<EntityId>) {
        if delta == Vec2::ZERO || !visited.insert(id) {
            return;
        }
        let Some(entity) = self.scene.get_mut(id) else { return };
        entity.translate(delta);

        let mut carried = Vec::new();
        for modifier in entity.modifiers() {
            match modifier {
                MoveModifier::CarryDocked => {
                    if let Some(dockable) = &entity.dockable {
                        carried.extend(dockable.docked.iter().copied());
                    }
                }
            }
        }
        for rider in carried {
            self.move_with_modifiers(rider, delta, visited);
        }
    }

    /// Move an entity's top-left corner to `pos`; `None` keeps that axis.
    pub fn move_entity_to(&mut self, id: EntityId, x: Option<f32>, y: Option<f32>) {
        let Some(pos) = self.scene.get(id).map(Entity::pos) else { return };
        let target = Vec2::new(x.unwrap_or(pos.x), y.unwrap_or(pos.y));
        self.move_entity(id, target - pos);
    }

    // -- Docking --

    fn dockable_mut(&mut self, id: EntityId) -> Option<&mut Dockable> {
        self.scene.get_mut(id).and_then(|e| e.dockable.as_mut())
    }

    /// Dock `rider` to `target`. Only riders with a dockable component can
    /// dock, and only to `dockable`-typed colliders. Returns true when this
    /// starts a new docking (and a `Docked` event was sent).
    pub fn dock_to(&mut self, rider: EntityId, target: ColliderRef) -> bool {
        if target == ColliderRef::Entity(rider) {
            return false;
        }
        let Some(target_type) = self.collider_type(target) else {
            return false;
        };
        if target_type & collider_type::DOCKABLE == 0 {
            return false;
        }
        let previous = match self.scene.get(rider).and_then(|e| e.dockable.as_ref()) {
            Some(d) => d.docked_to,
            None => return false,
        };
        if previous == Some(target) {
            if let Some(d) = self.dockable_mut(rider) {
                d.mark_docked(target);
            }
            return false;
        }
        if previous.is_some() {
            self.undock(rider);
        }
        if let Some(d) = self.dockable_mut(rider) {
            d.mark_docked(target);
        }
        if let ColliderRef::Entity(mothership) = target {
            if let Some(d) = self.dockable_mut(mothership) {
                d.docked.insert(rider);
            }
        }
        debug!("stage `{}`: {:?} docked to {:?}", self.name, rider, target);
        let payload = target.entity().map_or(EventPayload::None, EventPayload::Entity);
        self.events.emit(EventKind::Docked, EventTarget::Entity(rider), payload);
        true
    }

    /// Undock `rider` from whatever it is docked to. Returns the old target.
    pub fn undock(&mut self, rider: EntityId) -> Option<ColliderRef> {
        let target = self.dockable_mut(rider)?.mark_undocked()?;
        if let ColliderRef::Entity(mothership) = target {
            if let Some(d) = self.dockable_mut(mothership) {
                d.docked.remove(&rider);
            }
        }
        debug!("stage `{}`: {:?} undocked from {:?}", self.name, rider, target);
        let payload = target.entity().map_or(EventPayload::None, EventPayload::Entity);
        self.events.emit(EventKind::Undocked, EventTarget::Entity(rider), payload);
        Some(target)
    }

    /// Undock every rider of `mothership`.
    pub fn undock_all(&mut self, mothership: EntityId) {
        let riders: Vec<EntityId> = match self.scene.get(mothership).and_then(|e| e.dockable.as_ref()) {
            Some(d) => d.docked.iter().copied().collect(),
            None => return,
        };
        for rider in riders {
            self.undock(rider);
        }
        if let Some(d) = self.dockable_mut(mothership) {
            d.docked.clear();
        }
    }

    /// Whether `rider` stands on top of `target`: bottom edge at the
    /// target's top edge and overlapping it horizontally.
    pub fn rests_on(&self, rider: EntityId, target: ColliderRef) -> bool {
        let (Some(r), Some(t)) = (self.scene.get(rider).map(|e| e.rect), self.collider_rect(target)) else {
            return false;
        };
        (r.bottom() - t.top()).abs() < CONTACT_TOLERANCE && r.left() < t.right() && r.right() > t.left()
    }

    // -- Camera --

    /// Make the viewport follow `target`. The first update after this snaps
    /// to the target; later ones ease toward it.
    pub fn follow(&mut self, target: EntityId, axes: FollowAxes, bounds: Option<Rect>, max_speed: f32) {
        if let Some(vp) = self.viewport.as_mut() {
            vp.follow(target, axes, bounds, max_speed);
            self.follow_pending = true;
        } else {
            warn!("stage `{}`: follow requested without a viewport", self.name);
        }
    }

    fn update_viewport(&mut self) {
        let Some(follow) = self.viewport.as_ref().and_then(|v| v.follow) else { return };
        let Some(rect) = self.scene.get(follow.target).map(|e| e.rect) else { return };
        let first = std::mem::take(&mut self.follow_pending);
        if let Some(vp) = self.viewport.as_mut() {
            vp.update_follow(&rect, first);
        }
    }

    // -- Frame --

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn unpause(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn hide(&mut self) {
        self.hidden = true;
    }

    pub fn show(&mut self) {
        self.hidden = false;
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Hide and pause.
    pub fn stop(&mut self) {
        self.hide();
        self.pause();
    }

    /// Show and unpause.
    pub fn start(&mut self) {
        self.show();
        self.unpause();
    }

    /// Refresh an entity's culling counter and report whether it ticks this
    /// frame. Visible entities reset to the maximum; the rest count down and
    /// stop ticking at zero.
    fn update_tick_counter(&mut self, id: EntityId) -> bool {
        let max = self.options.tick_sprites_n_more_frames;
        let view = match &self.viewport {
            Some(vp) if self.options.tick_sprites_in_range_only => Some(vp.rect()),
            _ => None,
        };
        let Some(entity) = self.scene.get_mut(id) else { return false };
        match view {
            Some(view) if !view.intersects(&entity.rect) => {
                entity.ignore_after_n_ticks = entity.ignore_after_n_ticks.saturating_sub(1);
                entity.ignore_after_n_ticks > 0
            }
            _ => {
                entity.ignore_after_n_ticks = max;
                true
            }
        }
    }

    fn tick_entity(&mut self, id: EntityId, dt: f32, keys: &dyn KeyState) {
        let Some(entity) = self.scene.get_mut(id) else { return };
        if !entity.active {
            return;
        }
        if let Some(brain) = entity.brain.as_mut() {
            brain.tick(keys);
        }
        systems::patrol::tick_patrol(self, id, dt);
        systems::physics::tick_physics(self, id, dt);
    }

    /// Advance one frame: tick entities in range, sweep collisions, apply
    /// removals and move the camera. Returns false when paused.
    ///
    /// Starts a new frame of the event log: whatever the previous frame
    /// published and nobody drained is dropped.
    pub fn tick(&mut self, dt: f32, keys: &dyn KeyState) -> bool {
        if self.paused {
            return false;
        }
        self.events.clear_log();
        self.events.emit(EventKind::PreTick, EventTarget::Stage, EventPayload::Frame { dt });

        for id in self.scene.ids() {
            if self.update_tick_counter(id) {
                self.tick_entity(id, dt, keys);
            }
        }

        self.events.emit(EventKind::PreCollisions, EventTarget::Stage, EventPayload::Frame { dt });
        self.solve_collisions();
        self.apply_removals();
        self.update_viewport();
        self.events.emit(EventKind::PostTick, EventTarget::Stage, EventPayload::Frame { dt });
        true
    }

    /// Global sweep for entities that do not resolve their own collisions.
    ///
    /// Each such entity is tested against every tile layer its mask matches,
    /// then against every other entity when both masks match the other's
    /// type. A pair hit is reported to both sides, the second one inverted.
    /// Nothing is resolved here; reactions belong to event subscribers.
    pub fn solve_collisions(&mut self) {
        let detector = self.options.detector;
        let sweepers: Vec<EntityId> = self
            .scene
            .iter()
            .filter(|e| e.active && e.ignore_after_n_ticks > 0 && !e.handles_own_collisions && e.collision_mask > 0)
            .map(|e| e.id)
            .collect();

        let mut hits: Vec<Collision> = Vec::new();
        for &id in &sweepers {
            let Some(entity) = self.scene.get(id) else { continue };
            let (axis, veloc) = estimate_direction(entity);
            let body = Body::new(ColliderRef::Entity(id), entity.rect);
            for layer in &self.layers {
                if entity.collision_mask & layer.collider_type == 0 {
                    continue;
                }
                if let Some(col) = layer.collide_simple(body, axis, veloc, detector) {
                    hits.push(col);
                }
            }
        }

        for &id in &sweepers {
            let Some(entity) = self.scene.get(id) else { continue };
            let (axis, veloc) = estimate_direction(entity);
            let body = Body::new(ColliderRef::Entity(id), entity.rect);
            for other in self.scene.iter() {
                if other.id == id
                    || !other.active
                    || other.collision_mask == 0
                    || entity.collision_mask & other.collider_type == 0
                    || other.collision_mask & entity.collider_type == 0
                {
                    continue;
                }
                let other_body = Body::new(ColliderRef::Entity(other.id), other.rect);
                if let Some(col) = detector.collide(body, other_body, axis, veloc, None) {
                    hits.push(col);
                    hits.push(col.invert());
                }
            }
        }

        for col in hits {
            if let Some(target) = col.sprite1.entity() {
                self.events.emit(EventKind::Collision, EventTarget::Entity(target), EventPayload::Collision(col));
            }
        }
    }

    /// First collision of a query rectangle with the stage, without
    /// resolving anything. Tile layers are tried before entities. `kind`
    /// and `mask` default to `default`.
    pub fn locate(&self, rect: Rect, kind: Option<u32>, mask: Option<u32>) -> Option<Collision> {
        let kind = kind.filter(|k| *k != 0).unwrap_or(collider_type::DEFAULT);
        let mask = mask.filter(|m| *m != 0).unwrap_or(collider_type::DEFAULT);
        let detector = self.options.detector;
        let query = Body::new(ColliderRef::Query, rect);

        for layer in &self.layers {
            if mask & layer.collider_type == 0 {
                continue;
            }
            if let Some(col) = layer.collide_simple(query, Axis::X, QUERY_VELOC, detector) {
                return Some(col);
            }
        }
        self.scene
            .iter()
            .filter(|e| mask & e.collider_type != 0 && e.collision_mask & kind != 0)
            .find_map(|e| {
                let body = Body::new(ColliderRef::Entity(e.id), e.rect);
                detector.collide(query, body, Axis::X, QUERY_VELOC, None)
            })
    }

    /// Draw the stage in render order, offset by the viewport. Entities that
    /// have been out of range for too long are skipped. Returns false when
    /// hidden.
    pub fn render(&mut self, surface: &mut dyn Surface) -> bool {
        if self.hidden {
            return false;
        }
        self.events.emit(EventKind::PreRender, EventTarget::Stage, EventPayload::None);
        let offset = self.viewport.as_ref().map_or(Vec2::ZERO, Viewport::offset);
        for item in &self.draw_list {
            match *item {
                DrawItem::Layer(id) => {
                    if let Some(layer) = self.layers.get(id.0) {
                        surface.draw_layer(layer, offset);
                    }
                }
                DrawItem::Entity(id) => {
                    if let Some(entity) = self.scene.get(id) {
                        if entity.ignore_after_n_ticks > 0 {
                            surface.draw_entity(entity, offset);
                        }
                    }
                }
            }
        }
        self.events.emit(EventKind::PostRender, EventTarget::Stage, EventPayload::None);
        true
    }
}

/// Axis and signed speed an entity is most likely moving along: physics
/// velocity first, then the entity's own. Ties go to y; standing still
/// reads as `(x, 0)`.
pub fn estimate_direction(entity: &Entity) -> (Axis, f32) {
    let v = entity.current_velocity().unwrap_or(Vec2::ZERO);
    if v.x.abs() > v.y.abs() {
        (Axis::X, v.x)
    } else if v.y != 0.0 {
        (Axis::Y, v.y)
    } else {
        (Axis::X, 0.0)
    }
}
