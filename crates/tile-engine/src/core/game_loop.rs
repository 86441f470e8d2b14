//! The game loop: owns the stage slots, the frame clock, the keyboard
//! state and the game-wide key/value state, and drives every stage through
//! tick then render once per frame.
//!
//! Everything runs on the calling thread. The only blocking point is
//! `Platform::wait_frame`; stopping takes effect between frames.

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::api::error::EngineError;
use crate::api::game::{EngineConfig, EngineContext, LoopGuard};
use crate::core::events::GameEvent;
use crate::core::stage::Stage;
use crate::core::state::State;
use crate::core::time::FrameClock;
use crate::input::keyboard::{InputEvent, KeyboardInputs};
use crate::renderer::traits::Surface;

/// Something the platform reports between frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    Quit,
    Input(InputEvent),
}

/// The outside world as the loop sees it: a clock, an event source and a
/// surface to draw on.
pub trait Platform {
    /// Wait until the next frame may start (capped at `max_fps`) and
    /// return the seconds elapsed since the previous call.
    fn wait_frame(&mut self, max_fps: u32) -> f32;

    /// Events received since the last poll.
    fn poll_events(&mut self) -> Vec<PlatformEvent>;

    fn surface(&mut self) -> &mut dyn Surface;

    /// Show the finished frame.
    fn present(&mut self) {}
}

/// Cloneable switch that ends `GameLoop::play` after the current frame.
#[derive(Debug, Clone)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.0.get()
    }
}

pub struct GameLoop {
    stages: Vec<Option<Stage>>,
    /// Slot of the stage currently being ticked or rendered, or the last
    /// one staged when outside a frame.
    pub active_stage: usize,
    clock: FrameClock,
    inputs: KeyboardInputs,
    config: EngineConfig,
    running: Rc<Cell<bool>>,
    /// Events published by the stages during the last frame, tagged with
    /// their slot.
    events: Vec<(usize, GameEvent)>,
    /// Values that outlive any one stage.
    pub state: State,
    _guard: LoopGuard,
}

impl GameLoop {
    /// Create the loop for `ctx`. Only one loop may be alive per context.
    pub fn new(ctx: &EngineContext) -> Result<Self, EngineError> {
        let guard = ctx.claim_loop()?;
        let config = ctx.config.clone();
        debug!("game loop created with {} stage slots", config.max_stages);
        Ok(Self {
            stages: (0..config.max_stages).map(|_| None).collect(),
            active_stage: 0,
            clock: FrameClock::new(config.min_dt, config.max_dt),
            inputs: KeyboardInputs::default(),
            config,
            running: Rc::new(Cell::new(false)),
            events: Vec::new(),
            state: State::new(),
            _guard: guard,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // -- Stages --

    /// Put `stage` into slot `index`, replacing whatever was there, and make
    /// it the active stage.
    pub fn stage_screen(&mut self, index: usize, stage: Stage) -> Result<&mut Stage, EngineError> {
        let max = self.stages.len();
        let slot = self
            .stages
            .get_mut(index)
            .ok_or(EngineError::StageSlotOutOfRange { index, max })?;
        if let Some(old) = slot.as_ref() {
            warn!("stage slot {}: replacing `{}` with `{}`", index, old.name, stage.name);
        }
        info!("staged `{}` in slot {}", stage.name, index);
        self.active_stage = index;
        Ok(slot.insert(stage))
    }

    /// Empty slot `index`, returning the stage that was there.
    pub fn clear_stage(&mut self, index: usize) -> Option<Stage> {
        let stage = self.stages.get_mut(index)?.take();
        if let Some(stage) = &stage {
            debug!("cleared `{}` from slot {}", stage.name, index);
        }
        stage
    }

    pub fn clear_stages(&mut self) {
        for index in 0..self.stages.len() {
            self.clear_stage(index);
        }
    }

    pub fn get_stage(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)?.as_ref()
    }

    pub fn get_stage_mut(&mut self, index: usize) -> Option<&mut Stage> {
        self.stages.get_mut(index)?.as_mut()
    }

    /// The stage in the active slot, if any.
    pub fn active(&self) -> Option<&Stage> {
        self.get_stage(self.active_stage)
    }

    // -- Input --

    pub fn inputs(&self) -> &KeyboardInputs {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut KeyboardInputs {
        &mut self.inputs
    }

    // -- Frames --

    /// Run one frame with a measured elapsed time: apply queued input, tick
    /// every stage in slot order, then clear the surface and render every
    /// stage in slot order.
    pub fn advance(&mut self, raw_dt: f32, surface: &mut dyn Surface) {
        let dt = self.clock.begin_frame(raw_dt);
        let staged = self.active_stage;
        self.inputs.tick();
        self.events.clear();

        for (index, slot) in self.stages.iter_mut().enumerate() {
            if let Some(stage) = slot {
                self.active_stage = index;
                stage.tick(dt, &self.inputs);
            }
        }

        surface.clear();
        for (index, slot) in self.stages.iter_mut().enumerate() {
            if let Some(stage) = slot {
                self.active_stage = index;
                stage.render(surface);
                self.events.extend(stage.events.drain().into_iter().map(|e| (index, e)));
            }
        }
        self.active_stage = staged;
    }

    /// Wait for the platform clock, handle its events and run one frame.
    ///
    /// A quit event stops the loop and surfaces as
    /// `EngineError::QuitRequested`. While stopped, events are still
    /// polled but no frame is run.
    pub fn tick(&mut self, platform: &mut dyn Platform) -> Result<(), EngineError> {
        let raw_dt = platform.wait_frame(self.config.max_fps);
        for event in platform.poll_events() {
            match event {
                PlatformEvent::Quit => {
                    info!("quit requested after {} frames", self.clock.frame());
                    self.running.set(false);
                    return Err(EngineError::QuitRequested);
                }
                PlatformEvent::Input(input) => self.inputs.push(input),
            }
        }
        if !self.running.get() {
            return Ok(());
        }
        self.advance(raw_dt, platform.surface());
        platform.present();
        Ok(())
    }

    /// Run frames until stopped or the platform quits. A quit is a normal
    /// way to end and returns `Ok`.
    pub fn play(&mut self, platform: &mut dyn Platform) -> Result<(), EngineError> {
        self.running.set(true);
        info!("game loop started");
        while self.running.get() {
            match self.tick(platform) {
                Ok(()) => {}
                Err(EngineError::QuitRequested) => break,
                Err(err) => {
                    self.running.set(false);
                    return Err(err);
                }
            }
        }
        info!("game loop stopped at frame {}", self.clock.frame());
        Ok(())
    }

    pub fn stop(&mut self) {
        self.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// A handle that can stop the loop from inside an event handler.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Rc::clone(&self.running))
    }

    /// Frames run so far.
    pub fn frame(&self) -> u64 {
        self.clock.frame()
    }

    /// Clamped delta of the last frame.
    pub fn dt(&self) -> f32 {
        self.clock.dt()
    }

    /// Events the stages published during the last frame.
    pub fn events(&self) -> &[(usize, GameEvent)] {
        &self.events
    }
}
