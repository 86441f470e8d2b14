//! Docking: riders standing on a mothership move along with it.
//!
//! The component tracks two things: what this entity is docked to (with a
//! small state machine that remembers the previous frame), and which riders
//! are currently docked to it. Cross-entity bookkeeping (adding the rider to
//! the mothership's set) is done by the stage, see `Stage::dock`.

use std::collections::BTreeSet;

use crate::api::types::{ColliderRef, EntityId};

pub const DEFINITELY_DOCKED: u8 = 0x1;
pub const DEFINITELY_NOT_DOCKED: u8 = 0x2;
pub const TO_BE_DETERMINED: u8 = 0x4;
pub const PREVIOUSLY_DOCKED: u8 = 0x8;

#[derive(Debug, Clone, Default)]
pub struct Dockable {
    pub docking_state: u8,
    pub docked_to: Option<ColliderRef>,
    /// Riders currently carried by this entity.
    pub docked: BTreeSet<EntityId>,
}

impl Dockable {
    pub fn new() -> Self {
        Self::default()
    }

    fn enter(&mut self, state: u8) {
        let prev = self.is_docked();
        self.docking_state = state;
        if prev {
            self.docking_state |= PREVIOUSLY_DOCKED;
        }
    }

    /// Record that this entity now stands on `target`.
    pub fn mark_docked(&mut self, target: ColliderRef) {
        self.enter(DEFINITELY_DOCKED);
        self.docked_to = Some(target);
    }

    /// Record that this entity left whatever it stood on. Returns the old
    /// target so the caller can detach from it.
    pub fn mark_undocked(&mut self) -> Option<ColliderRef> {
        self.enter(DEFINITELY_NOT_DOCKED);
        self.docked_to.take()
    }

    /// Start of a frame: the state is unknown until a collision confirms it.
    pub fn to_determine(&mut self) {
        self.enter(TO_BE_DETERMINED);
    }

    /// Definitely docked, or undetermined but docked last frame.
    pub fn is_docked(&self) -> bool {
        self.docking_state & DEFINITELY_DOCKED != 0
            || (self.docking_state & TO_BE_DETERMINED != 0
                && self.docking_state & PREVIOUSLY_DOCKED != 0)
    }

    pub fn state_unsure(&self) -> bool {
        self.docking_state & TO_BE_DETERMINED != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docking_remembers_previous_state() {
        let mut d = Dockable::new();
        assert!(!d.is_docked());

        d.mark_docked(ColliderRef::Entity(EntityId(2)));
        assert!(d.is_docked());
        assert_eq!(d.docking_state, DEFINITELY_DOCKED);

        d.to_determine();
        assert!(d.state_unsure());
        assert!(d.is_docked(), "undetermined but docked last frame");
        assert_eq!(d.docking_state, TO_BE_DETERMINED | PREVIOUSLY_DOCKED);

        let old = d.mark_undocked();
        assert_eq!(old, Some(ColliderRef::Entity(EntityId(2))));
        assert!(!d.is_docked());
        assert_eq!(d.docking_state, DEFINITELY_NOT_DOCKED | PREVIOUSLY_DOCKED);

        d.to_determine();
        assert!(!d.is_docked());
    }

    #[test]
    fn redocking_sets_previous_flag() {
        let mut d = Dockable::new();
        d.mark_docked(ColliderRef::Query);
        d.mark_docked(ColliderRef::Entity(EntityId(3)));
        assert_eq!(d.docking_state, DEFINITELY_DOCKED | PREVIOUSLY_DOCKED);
        assert_eq!(d.docked_to, Some(ColliderRef::Entity(EntityId(3))));
    }
}
