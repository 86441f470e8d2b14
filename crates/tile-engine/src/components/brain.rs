use crate::input::keyboard::KeyState;

/// Movement commands for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Commands {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Commands {
    pub fn is(&self, command: &str) -> bool {
        match command {
            "up" => self.up,
            "down" => self.down,
            "left" => self.left,
            "right" => self.right,
            _ => false,
        }
    }
}

/// Steering component: translates key state into commands each tick.
#[derive(Debug, Clone)]
pub struct Brain {
    /// Key name bound to each command, in `up, down, left, right` order.
    pub bindings: [String; 4],
    pub commands: Commands,
    /// While paused, all commands read as released.
    pub paused: bool,
}

impl Brain {
    pub fn new() -> Self {
        Self {
            bindings: ["up", "down", "left", "right"].map(String::from),
            commands: Commands::default(),
            paused: false,
        }
    }

    pub fn with_bindings(mut self, up: &str, down: &str, left: &str, right: &str) -> Self {
        self.bindings = [up, down, left, right].map(String::from);
        self
    }

    pub fn tick(&mut self, keys: &dyn KeyState) {
        if self.paused {
            self.commands = Commands::default();
            return;
        }
        let [up, down, left, right] = &self.bindings;
        self.commands = Commands {
            up: keys.is_down(up),
            down: keys.is_down(down),
            left: keys.is_down(left),
            right: keys.is_down(right),
        };
    }
}

impl Default for Brain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Held(HashSet<&'static str>);

    impl KeyState for Held {
        fn is_down(&self, key: &str) -> bool {
            self.0.contains(key)
        }
    }

    #[test]
    fn snapshots_bound_keys() {
        let keys = Held(["left", "w"].into_iter().collect());
        let mut brain = Brain::new();
        brain.tick(&keys);
        assert!(brain.commands.left);
        assert!(!brain.commands.up);
        assert!(brain.commands.is("left"));
        assert!(!brain.commands.is("jump"));

        let mut wasd = Brain::new().with_bindings("w", "s", "a", "d");
        wasd.tick(&keys);
        assert!(wasd.commands.up);
        assert!(!wasd.commands.left);
    }

    #[test]
    fn paused_brain_issues_nothing() {
        let keys = Held(["right"].into_iter().collect());
        let mut brain = Brain::new();
        brain.paused = true;
        brain.tick(&keys);
        assert_eq!(brain.commands, Commands::default());
    }
}
