use tile_engine::{InputEvent, NullSurface, Platform, PlatformEvent, Surface};

/// One scripted key change: at `frame`, press or release `key`.
pub struct KeyCue {
    pub frame: u64,
    pub key: &'static str,
    pub down: bool,
}

/// A platform with no window: a fixed clock, key presses replayed from a
/// script, and a quit signal once the frame budget is spent.
pub struct HeadlessPlatform {
    script: Vec<KeyCue>,
    frame: u64,
    max_frames: u64,
    surface: NullSurface,
}

impl HeadlessPlatform {
    pub fn new(script: Vec<KeyCue>, max_frames: u64) -> Self {
        Self {
            script,
            frame: 0,
            max_frames,
            surface: NullSurface,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frame
    }
}

impl Platform for HeadlessPlatform {
    fn wait_frame(&mut self, max_fps: u32) -> f32 {
        1.0 / max_fps.max(1) as f32
    }

    fn poll_events(&mut self) -> Vec<PlatformEvent> {
        if self.frame >= self.max_frames {
            return vec![PlatformEvent::Quit];
        }
        let frame = self.frame;
        self.frame += 1;
        self.script
            .iter()
            .filter(|cue| cue.frame == frame)
            .map(|cue| {
                let key = cue.key.to_string();
                PlatformEvent::Input(if cue.down {
                    InputEvent::KeyDown { key }
                } else {
                    InputEvent::KeyUp { key }
                })
            })
            .collect()
    }

    fn surface(&mut self) -> &mut dyn Surface {
        &mut self.surface
    }
}
