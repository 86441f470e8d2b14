use std::cell::Cell;
use std::rc::Rc;

use serde::Deserialize;

use crate::api::error::EngineError;
use crate::assets::registry::EntityRegistry;

/// Physics tuning shared by every top-down physics component a stage creates.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Largest integration step in seconds. Longer frames are split into
    /// several sub-steps of at most this size.
    pub max_substep: f32,
    /// Acceleration applied while a direction command is held (px/s²).
    pub run_acceleration: f32,
    /// Speed cap per axis (px/s).
    pub v_max: f32,
    /// Zero the velocity first when the opposite direction is pressed.
    pub stops_abruptly_on_direction_change: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_substep: 1.0 / 30.0,
            run_acceleration: 300.0,
            v_max: 150.0,
            stops_abruptly_on_direction_change: true,
        }
    }
}

/// Engine configuration. Every field has a default, so a JSON config only
/// needs to list what it overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Frame-rate cap handed to the platform clock.
    pub max_fps: u32,
    /// Lower clamp for a frame's elapsed time (seconds).
    pub min_dt: f32,
    /// Upper clamp for a frame's elapsed time (seconds).
    pub max_dt: f32,
    /// Number of stage slots a game loop drives.
    pub max_stages: usize,
    /// Display size in pixels (viewport size).
    pub display_width: f32,
    pub display_height: f32,
    /// Only tick entities inside (or recently inside) the viewport.
    pub tick_sprites_in_range_only: bool,
    /// Grace period in frames for entities that left the viewport.
    pub tick_sprites_n_more_frames: u32,
    pub physics: PhysicsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_fps: 60,
            min_dt: 1.0 / 60.0,
            max_dt: 1.0 / 15.0,
            max_stages: 10,
            display_width: 800.0,
            display_height: 600.0,
            tick_sprites_in_range_only: true,
            tick_sprites_n_more_frames: 500,
            physics: PhysicsConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Explicitly owned engine state: configuration, the class registry used to
/// populate stages from map data, and the bookkeeping that allows at most one
/// live game loop.
pub struct EngineContext {
    pub config: EngineConfig,
    pub registry: EntityRegistry,
    loop_alive: Rc<Cell<bool>>,
}

impl EngineContext {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: EntityRegistry::with_builtins(),
            loop_alive: Rc::new(Cell::new(false)),
        }
    }

    /// Claim the single game-loop slot of this context. The returned guard
    /// releases the slot when dropped.
    pub(crate) fn claim_loop(&self) -> Result<LoopGuard, EngineError> {
        if self.loop_alive.get() {
            return Err(EngineError::DuplicateLoop);
        }
        self.loop_alive.set(true);
        Ok(LoopGuard(Rc::clone(&self.loop_alive)))
    }

    /// Whether a game loop created from this context is still alive.
    pub fn has_loop(&self) -> bool {
        self.loop_alive.get()
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

pub(crate) struct LoopGuard(Rc<Cell<bool>>);

impl Drop for LoopGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
