//! Top-down physics component.
//!
//! Holds velocity and tuning for an entity steered in four directions. The
//! component itself is pure bookkeeping: acceleration from commands,
//! integration with a speed cap, and the reaction to a single collision
//! record. Moving the entity and querying the stage happens in
//! `systems::physics`.

use glam::Vec2;

use crate::api::game::PhysicsConfig;
use crate::components::brain::Commands;
use crate::core::collision::Collision;

/// Normal components above this magnitude count as "mostly along" that axis.
pub const BUMP_THRESHOLD: f32 = 0.3;

pub const TOUCH_TOP: u8 = 0x1;
pub const TOUCH_BOTTOM: u8 = 0x2;
pub const TOUCH_LEFT: u8 = 0x4;
pub const TOUCH_RIGHT: u8 = 0x8;

/// Which side of the entity bumped into something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bump {
    Top,
    Bottom,
    Left,
    Right,
}

impl Bump {
    pub fn touch_bit(self) -> u8 {
        match self {
            Bump::Top => TOUCH_TOP,
            Bump::Bottom => TOUCH_BOTTOM,
            Bump::Left => TOUCH_LEFT,
            Bump::Right => TOUCH_RIGHT,
        }
    }
}

/// Outcome of resolving one collision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Translation to apply to the entity.
    pub translate: Vec2,
    /// Bumps to announce, vertical first.
    pub bumps: Vec<Bump>,
    pub reached_exit: bool,
}

#[derive(Debug, Clone)]
pub struct TopDownPhysics {
    pub vx: f32,
    pub vy: f32,
    pub run_acceleration: f32,
    pub v_max: f32,
    pub stops_abruptly_on_direction_change: bool,
    pub max_substep: f32,
    /// Sides touched during the current tick (`TOUCH_*` bits).
    pub touching: u8,
    pub at_exit: bool,
}

impl TopDownPhysics {
    pub fn new() -> Self {
        Self::from_config(&PhysicsConfig::default())
    }

    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self {
            vx: 0.0,
            vy: 0.0,
            run_acceleration: config.run_acceleration,
            v_max: config.v_max,
            stops_abruptly_on_direction_change: config.stops_abruptly_on_direction_change,
            max_substep: config.max_substep,
            touching: 0,
            at_exit: false,
        }
    }

    pub fn with_v_max(mut self, v_max: f32) -> Self {
        self.v_max = v_max;
        self
    }

    pub fn with_acceleration(mut self, run_acceleration: f32) -> Self {
        self.run_acceleration = run_acceleration;
        self
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.vx, self.vy)
    }

    /// Acceleration for this tick. Releasing a direction (or holding both
    /// opposite keys) stops that axis immediately; reversing may stop it
    /// first. Without commands the entity stands still.
    ///
    /// Returns `(acceleration, flip_x)` where `flip_x` is `Some` when the
    /// sprite should face a new horizontal direction.
    pub fn compute_acceleration(&mut self, commands: Option<&Commands>) -> (Vec2, Option<bool>) {
        let Some(cmd) = commands else {
            self.vx = 0.0;
            self.vy = 0.0;
            return (Vec2::ZERO, None);
        };

        let mut accel = Vec2::ZERO;
        let mut flip = None;
        let abrupt = self.stops_abruptly_on_direction_change;

        match (cmd.left, cmd.right) {
            (true, false) => {
                if abrupt && self.vx > 0.0 {
                    self.vx = 0.0;
                }
                accel.x = -self.run_acceleration;
                flip = Some(true);
            }
            (false, true) => {
                if abrupt && self.vx < 0.0 {
                    self.vx = 0.0;
                }
                accel.x = self.run_acceleration;
                flip = Some(false);
            }
            _ => self.vx = 0.0,
        }

        match (cmd.up, cmd.down) {
            (true, false) => {
                if abrupt && self.vy > 0.0 {
                    self.vy = 0.0;
                }
                accel.y = -self.run_acceleration;
            }
            (false, true) => {
                if abrupt && self.vy < 0.0 {
                    self.vy = 0.0;
                }
                accel.y = self.run_acceleration;
            }
            _ => self.vy = 0.0,
        }

        (accel, flip)
    }

    /// Integrate velocity over one sub-step and clamp each axis to `v_max`.
    pub fn integrate(&mut self, accel: Vec2, dt: f32) {
        self.vx = (self.vx + accel.x * dt).clamp(-self.v_max, self.v_max);
        self.vy = (self.vy + accel.y * dt).clamp(-self.v_max, self.v_max);
    }

    /// React to a collision in which this entity is `sprite1`.
    ///
    /// Exit tiles only raise the exit flag. Otherwise the entity is pushed
    /// out by `separate`; a mostly-vertical normal stops opposing vertical
    /// motion and bumps top/bottom, a mostly-horizontal one does the same
    /// for left/right.
    pub fn resolve(&mut self, col: &Collision, is_exit: bool) -> Resolution {
        if is_exit {
            self.at_exit = true;
            return Resolution {
                reached_exit: true,
                ..Resolution::default()
            };
        }

        let mut res = Resolution {
            translate: col.separate,
            ..Resolution::default()
        };

        if col.normal.y.abs() > BUMP_THRESHOLD {
            if self.vy * col.normal.y < 0.0 {
                self.vy = 0.0;
            }
            res.bumps.push(if col.normal.y < 0.0 { Bump::Bottom } else { Bump::Top });
        }
        if col.normal.x.abs() > BUMP_THRESHOLD {
            if self.vx * col.normal.x < 0.0 {
                self.vx = 0.0;
            }
            res.bumps.push(if col.normal.x < 0.0 { Bump::Right } else { Bump::Left });
        }
        for bump in &res.bumps {
            self.touching |= bump.touch_bit();
        }
        res
    }
}

impl Default for TopDownPhysics {
    fn default() -> Self {
        Self::new()
    }
}
