//! Typed event bus.
//!
//! Events are identified by an [`EventKind`] tag and carry a tagged payload.
//! Subscribers are called synchronously, in subscription order, from
//! `publish`. Every published event is also appended to a per-frame log that
//! the game loop drains once per frame.

use std::collections::HashSet;

use crate::api::error::EngineError;
use crate::api::types::EntityId;
use crate::core::collision::Collision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Collision,
    BumpTop,
    BumpBottom,
    BumpLeft,
    BumpRight,
    Docked,
    Undocked,
    AddedToStage,
    RemovedFromStage,
    ReachedExit,
    PreTick,
    PreCollisions,
    PostTick,
    PreRender,
    PostRender,
}

impl EventKind {
    pub const ALL: [EventKind; 15] = [
        EventKind::Collision,
        EventKind::BumpTop,
        EventKind::BumpBottom,
        EventKind::BumpLeft,
        EventKind::BumpRight,
        EventKind::Docked,
        EventKind::Undocked,
        EventKind::AddedToStage,
        EventKind::RemovedFromStage,
        EventKind::ReachedExit,
        EventKind::PreTick,
        EventKind::PreCollisions,
        EventKind::PostTick,
        EventKind::PreRender,
        EventKind::PostRender,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Collision => "collision",
            EventKind::BumpTop => "bump.top",
            EventKind::BumpBottom => "bump.bottom",
            EventKind::BumpLeft => "bump.left",
            EventKind::BumpRight => "bump.right",
            EventKind::Docked => "docked",
            EventKind::Undocked => "undocked",
            EventKind::AddedToStage => "added_to_stage",
            EventKind::RemovedFromStage => "removed_from_stage",
            EventKind::ReachedExit => "reached_exit",
            EventKind::PreTick => "pre_tick",
            EventKind::PreCollisions => "pre_collisions",
            EventKind::PostTick => "post_tick",
            EventKind::PreRender => "pre_render",
            EventKind::PostRender => "post_render",
        }
    }
}

/// Who an event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Stage,
    Entity(EntityId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventPayload {
    None,
    Collision(Collision),
    Entity(EntityId),
    Frame { dt: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameEvent {
    pub kind: EventKind,
    pub target: EventTarget,
    pub payload: EventPayload,
}

impl GameEvent {
    pub fn new(kind: EventKind, target: EventTarget, payload: EventPayload) -> Self {
        Self { kind, target, payload }
    }

    pub fn collision(&self) -> Option<&Collision> {
        match &self.payload {
            EventPayload::Collision(col) => Some(col),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Handler = Box<dyn FnMut(&GameEvent)>;

struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    target: Option<EventTarget>,
    handler: Handler,
}

#[derive(Default)]
pub struct EventBus {
    registered: HashSet<EventKind>,
    subscriptions: Vec<Subscription>,
    next_subscription: u64,
    frame_log: Vec<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus with every event kind registered.
    pub fn with_all_kinds() -> Self {
        let mut bus = Self::new();
        bus.register(&EventKind::ALL);
        bus
    }

    pub fn register(&mut self, kinds: &[EventKind]) {
        self.registered.extend(kinds.iter().copied());
    }

    pub fn is_registered(&self, kind: EventKind) -> bool {
        self.registered.contains(&kind)
    }

    /// Subscribe to `kind`. With a `target`, the handler only sees events
    /// about that target.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        target: Option<EventTarget>,
        handler: Handler,
    ) -> Result<SubscriptionId, EngineError> {
        if !self.is_registered(kind) {
            return Err(EngineError::UnregisteredEvent(kind.name()));
        }
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.push(Subscription {
            id,
            kind,
            target,
            handler,
        });
        Ok(id)
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Remove every subscription filtered on `target`.
    pub fn unsubscribe_target(&mut self, target: EventTarget) {
        self.subscriptions.retain(|s| s.target != Some(target));
    }

    pub fn publish(&mut self, event: GameEvent) {
        for sub in self.subscriptions.iter_mut() {
            if sub.kind != event.kind {
                continue;
            }
            if sub.target.is_some_and(|t| t != event.target) {
                continue;
            }
            (sub.handler)(&event);
        }
        self.frame_log.push(event);
    }

    pub fn emit(&mut self, kind: EventKind, target: EventTarget, payload: EventPayload) {
        self.publish(GameEvent::new(kind, target, payload));
    }

    /// Events published since the log was last drained or cleared.
    pub fn frame_log(&self) -> &[GameEvent] {
        &self.frame_log
    }

    pub fn clear_log(&mut self) {
        self.frame_log.clear();
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.frame_log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<GameEvent>>>, Handler) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, Box::new(move |e: &GameEvent| sink.borrow_mut().push(*e)))
    }

    #[test]
    fn names_match_wire_strings() {
        assert_eq!(EventKind::BumpBottom.name(), "bump.bottom");
        assert_eq!(EventKind::ReachedExit.name(), "reached_exit");
        assert_eq!(EventKind::ALL.len(), 15);
    }

    #[test]
    fn subscribe_requires_registration() {
        let mut bus = EventBus::new();
        let (_, handler) = recorder();
        let err = bus.subscribe(EventKind::PreTick, None, handler).unwrap_err();
        assert!(matches!(err, EngineError::UnregisteredEvent("pre_tick")));
    }

    #[test]
    fn publish_calls_matching_subscribers_in_order() {
        let mut bus = EventBus::with_all_kinds();
        let order = Rc::new(RefCell::new(Vec::new()));
        for n in 0..3 {
            let order = Rc::clone(&order);
            bus.subscribe(
                EventKind::PostTick,
                None,
                Box::new(move |_: &GameEvent| order.borrow_mut().push(n)),
            )
            .unwrap();
        }
        bus.emit(EventKind::PostTick, EventTarget::Stage, EventPayload::None);
        bus.emit(EventKind::PreTick, EventTarget::Stage, EventPayload::None);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
        assert_eq!(bus.frame_log().len(), 2);
    }

    #[test]
    fn target_filter_and_unsubscribe() {
        let mut bus = EventBus::with_all_kinds();
        let (seen, handler) = recorder();
        let me = EventTarget::Entity(EntityId(4));
        let id = bus.subscribe(EventKind::BumpTop, Some(me), handler).unwrap();

        bus.emit(EventKind::BumpTop, EventTarget::Entity(EntityId(5)), EventPayload::None);
        bus.emit(EventKind::BumpTop, me, EventPayload::None);
        assert_eq!(seen.borrow().len(), 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(EventKind::BumpTop, me, EventPayload::None);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn drain_empties_the_frame_log() {
        let mut bus = EventBus::with_all_kinds();
        bus.emit(EventKind::PreTick, EventTarget::Stage, EventPayload::Frame { dt: 0.016 });
        let events = bus.drain();
        assert_eq!(events.len(), 1);
        assert!(bus.frame_log().is_empty());
    }
}
