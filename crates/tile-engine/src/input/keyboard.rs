use std::collections::BTreeMap;

/// Input event types the engine understands.
/// Keys are identified by their lower-case names (`"left"`, `"space"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown { key: String },
    KeyUp { key: String },
}

/// Anything that can answer "is this key currently held".
pub trait KeyState {
    fn is_down(&self, key: &str) -> bool;
}

/// A queue of input events.
/// The platform pushes events; the game loop drains them each frame.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

/// Held/released state of a registered set of keys. Events for keys that
/// are not registered are ignored.
#[derive(Debug)]
pub struct KeyboardInputs {
    registry: BTreeMap<String, bool>,
    queue: InputQueue,
}

impl KeyboardInputs {
    pub const DEFAULT_KEYS: [&'static str; 4] = ["up", "down", "left", "right"];

    pub fn new<S: AsRef<str>>(keys: &[S]) -> Self {
        let mut inputs = Self {
            registry: BTreeMap::new(),
            queue: InputQueue::new(),
        };
        inputs.update_keys(keys);
        inputs
    }

    /// Replace the watched keys. All keys start released.
    pub fn update_keys<S: AsRef<str>>(&mut self, keys: &[S]) {
        self.registry = keys.iter().map(|k| (k.as_ref().to_string(), false)).collect();
    }

    pub fn push(&mut self, event: InputEvent) {
        self.queue.push(event);
    }

    /// Apply all queued events to the registry.
    pub fn tick(&mut self) {
        for event in self.queue.drain() {
            let (key, down) = match &event {
                InputEvent::KeyDown { key } => (key, true),
                InputEvent::KeyUp { key } => (key, false),
            };
            if let Some(state) = self.registry.get_mut(key.as_str()) {
                *state = down;
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }
}

impl Default for KeyboardInputs {
    fn default() -> Self {
        Self::new(&Self::DEFAULT_KEYS)
    }
}

impl KeyState for KeyboardInputs {
    fn is_down(&self, key: &str) -> bool {
        self.registry.get(key).copied().unwrap_or(false)
    }
}

/// A key state with nothing pressed.
pub struct NoKeys;

impl KeyState for NoKeys {
    fn is_down(&self, _key: &str) -> bool {
        false
    }
}
