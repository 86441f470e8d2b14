//! Game-wide key/value store.
//!
//! Holds values that outlive a single stage (score, lives, the level
//! reached). Writers choose whether a write is announced; listeners filter
//! on a key or see every announced change.

use std::collections::BTreeMap;

use log::debug;

use crate::api::error::EngineError;
use crate::assets::properties::PropertyValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type ChangeHandler = Box<dyn FnMut(&str, &PropertyValue)>;

struct Listener {
    id: ListenerId,
    key: Option<String>,
    handler: ChangeHandler,
}

#[derive(Default)]
pub struct State {
    values: BTreeMap<String, PropertyValue>,
    listeners: Vec<Listener>,
    next_listener: u64,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`. With `notify`, listeners on that key (and
    /// catch-all listeners) are called with the new value.
    pub fn set(&mut self, key: &str, value: PropertyValue, notify: bool) {
        self.values.insert(key.to_string(), value);
        if notify {
            self.announce(key);
        }
    }

    pub fn get(&self, key: &str) -> Result<&PropertyValue, EngineError> {
        self.values
            .get(key)
            .ok_or_else(|| EngineError::UnknownStateKey(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Add `amount` to a numeric value and announce the change. Ints stay
    /// ints; floats stay floats.
    pub fn inc(&mut self, key: &str, amount: i64) -> Result<&PropertyValue, EngineError> {
        let value = self
            .values
            .get_mut(key)
            .ok_or_else(|| EngineError::UnknownStateKey(key.to_string()))?;
        *value = match *value {
            PropertyValue::Int(v) => PropertyValue::Int(v + amount),
            PropertyValue::Float(v) => PropertyValue::Float(v + amount as f64),
            _ => return Err(EngineError::NonNumericState(key.to_string())),
        };
        self.announce(key);
        self.get(key)
    }

    pub fn dec(&mut self, key: &str, amount: i64) -> Result<&PropertyValue, EngineError> {
        self.inc(key, -amount)
    }

    /// Listen for announced changes of `key`, or of every key with `None`.
    pub fn on_change(&mut self, key: Option<&str>, handler: ChangeHandler) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push(Listener {
            id,
            key: key.map(str::to_string),
            handler,
        });
        id
    }

    /// Returns false if the listener was already gone.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    fn announce(&mut self, key: &str) {
        let Some(value) = self.values.get(key) else { return };
        debug!("state `{key}` changed to {value:?}");
        for listener in self.listeners.iter_mut() {
            if listener.key.as_deref().is_some_and(|k| k != key) {
                continue;
            }
            (listener.handler)(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Seen = Rc<RefCell<Vec<(String, PropertyValue)>>>;

    fn listen(state: &mut State, key: Option<&str>) -> (ListenerId, Seen) {
        let seen: Seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = state.on_change(
            key,
            Box::new(move |k: &str, v: &PropertyValue| sink.borrow_mut().push((k.to_string(), v.clone()))),
        );
        (id, seen)
    }

    #[test]
    fn quiet_writes_are_not_announced() {
        let mut state = State::new();
        let (_, seen) = listen(&mut state, None);
        state.set("level", PropertyValue::Int(1), false);
        assert!(seen.borrow().is_empty());
        assert_eq!(state.get("level").unwrap(), &PropertyValue::Int(1));

        state.set("level", PropertyValue::Int(2), true);
        assert_eq!(*seen.borrow(), vec![("level".to_string(), PropertyValue::Int(2))]);
    }

    #[test]
    fn listeners_filter_on_key() {
        let mut state = State::new();
        let (_, lives) = listen(&mut state, Some("lives"));
        let (_, all) = listen(&mut state, None);
        state.set("score", PropertyValue::Int(0), true);
        state.set("lives", PropertyValue::Int(3), true);
        assert_eq!(lives.borrow().len(), 1);
        assert_eq!(all.borrow().len(), 2);
    }

    #[test]
    fn inc_and_dec_keep_the_number_type() {
        let mut state = State::new();
        state.set("score", PropertyValue::Int(10), false);
        state.set("speed", PropertyValue::Float(1.5), false);
        let (_, seen) = listen(&mut state, Some("score"));

        assert_eq!(state.inc("score", 5).unwrap(), &PropertyValue::Int(15));
        assert_eq!(state.dec("score", 1).unwrap(), &PropertyValue::Int(14));
        assert_eq!(state.inc("speed", 2).unwrap(), &PropertyValue::Float(3.5));
        assert_eq!(seen.borrow().len(), 2, "counter changes are always announced");
    }

    #[test]
    fn missing_and_non_numeric_keys_are_errors() {
        let mut state = State::new();
        assert!(matches!(state.get("nope"), Err(EngineError::UnknownStateKey(k)) if k == "nope"));
        assert!(matches!(state.inc("nope", 1), Err(EngineError::UnknownStateKey(_))));

        state.set("name", PropertyValue::Str("maze".into()), false);
        assert!(matches!(state.inc("name", 1), Err(EngineError::NonNumericState(_))));
        assert_eq!(state.get("name").unwrap().as_str(), Some("maze"));
    }

    #[test]
    fn removed_listener_stops_hearing() {
        let mut state = State::new();
        let (id, seen) = listen(&mut state, None);
        assert!(state.remove_listener(id));
        assert!(!state.remove_listener(id));
        state.set("score", PropertyValue::Int(1), true);
        assert!(seen.borrow().is_empty());
        assert!(state.contains("score"));
    }
}
