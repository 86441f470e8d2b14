use std::collections::HashMap;

use crate::api::types::EntityId;
use crate::components::entity::Entity;

/// Entity storage for one stage.
///
/// Entities live in a Vec in the order they were added, which is the order
/// they tick and collide in. A side index maps ids to slots, so the many
/// per-frame lookups by id done by the physics and collision passes do not
/// scan the list. Removal keeps the order of the rest and re-indexes the
/// tail.
#[derive(Default)]
pub struct Scene {
    entities: Vec<Entity>,
    slots: HashMap<EntityId, usize>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entity. An entity already stored under the same id is
    /// replaced in place and returned.
    pub fn spawn(&mut self, entity: Entity) -> Option<Entity> {
        if let Some(&slot) = self.slots.get(&entity.id) {
            return Some(std::mem::replace(&mut self.entities[slot], entity));
        }
        self.slots.insert(entity.id, self.entities.len());
        self.entities.push(entity);
        None
    }

    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self.slots.remove(&id)?;
        let entity = self.entities.remove(slot);
        for (offset, e) in self.entities[slot..].iter().enumerate() {
            self.slots.insert(e.id, slot + offset);
        }
        Some(entity)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(&id).map(|&slot| &self.entities[slot])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let slot = *self.slots.get(&id)?;
        self.entities.get_mut(slot)
    }

    /// Entities in tick order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Ids in tick order. A snapshot, so the caller may add or remove
    /// entities while walking it.
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(|e| e.id).collect()
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.tag == tag)
    }

    pub fn find_all_by_tag(&self, tag: &str) -> Vec<&Entity> {
        self.entities.iter().filter(|e| e.tag == tag).collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rect::Rect;

    fn tagged(n: u32, tag: &str) -> Entity {
        Entity::new(EntityId(n)).with_tag(tag)
    }

    #[test]
    fn lookups_follow_removals() {
        let mut scene = Scene::new();
        for n in 1..=4 {
            scene.spawn(tagged(n, "crate"));
        }
        assert!(scene.despawn(EntityId(2)).is_some());
        assert!(scene.despawn(EntityId(2)).is_none());
        assert_eq!(scene.ids(), vec![EntityId(1), EntityId(3), EntityId(4)]);
        // slots after the removed one were shifted
        assert_eq!(scene.get(EntityId(4)).unwrap().id, EntityId(4));
        scene.get_mut(EntityId(3)).unwrap().rect = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(scene.get(EntityId(3)).unwrap().rect, Rect::new(1.0, 2.0, 3.0, 4.0));
        assert!(!scene.contains(EntityId(2)));
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn respawning_an_id_replaces_in_place() {
        let mut scene = Scene::new();
        scene.spawn(tagged(1, "a"));
        scene.spawn(tagged(2, "b"));
        let old = scene.spawn(tagged(1, "c")).unwrap();
        assert_eq!(old.tag, "a");
        assert_eq!(scene.ids(), vec![EntityId(1), EntityId(2)]);
        assert_eq!(scene.find_by_tag("c").unwrap().id, EntityId(1));
    }

    #[test]
    fn tag_queries() {
        let mut scene = Scene::new();
        assert!(scene.is_empty());
        scene.spawn(tagged(1, "runner"));
        scene.spawn(tagged(2, "ladder"));
        scene.spawn(tagged(3, "ladder"));
        assert_eq!(scene.find_by_tag("runner").unwrap().id, EntityId(1));
        assert_eq!(scene.find_all_by_tag("ladder").len(), 2);
        assert!(scene.find_by_tag("elevator").is_none());
    }
}
