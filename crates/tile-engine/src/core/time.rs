/// Clamp a measured frame time into `[min, max]`.
/// Non-finite or non-positive input counts as the shortest frame.
pub fn clamp_dt(raw: f32, min: f32, max: f32) -> f32 {
    if !raw.is_finite() || raw <= 0.0 {
        return min;
    }
    raw.clamp(min, max)
}

/// Splits a frame's elapsed time into integration steps no longer than
/// `max_step`. The last step carries the remainder.
#[derive(Debug, Clone, Copy)]
pub struct Substeps {
    remaining: f32,
    max_step: f32,
}

impl Substeps {
    pub fn new(dt: f32, max_step: f32) -> Self {
        Self {
            remaining: dt.max(0.0),
            max_step,
        }
    }
}

impl Iterator for Substeps {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        // Guard against float dust left over from repeated subtraction.
        if self.remaining <= f32::EPSILON || self.max_step <= 0.0 {
            return None;
        }
        let step = self.remaining.min(self.max_step);
        self.remaining -= step;
        Some(step)
    }
}

/// Frame clock: clamps raw elapsed times and counts frames.
pub struct FrameClock {
    min_dt: f32,
    max_dt: f32,
    /// The clamped delta of the last frame.
    dt: f32,
    frame: u64,
}

impl FrameClock {
    pub fn new(min_dt: f32, max_dt: f32) -> Self {
        Self {
            min_dt,
            max_dt,
            dt: min_dt,
            frame: 0,
        }
    }

    /// Start a new frame with the measured elapsed time. Returns the
    /// clamped delta.
    pub fn begin_frame(&mut self, raw_dt: f32) -> f32 {
        self.dt = clamp_dt(raw_dt, self.min_dt, self.max_dt);
        self.frame += 1;
        self.dt
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Number of frames started so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}
