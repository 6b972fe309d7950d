/// Last known pointer position, canvas-relative. Updates are throttled by the
/// mousemove handler (~16 ms) so repulsion math does not run per DOM event.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
    pub active: bool,
    pub last_update_ms: f64,
}

impl Pointer {
    pub const THROTTLE_MS: f64 = 16.0;

    /// Records a new position if the throttle window has elapsed.
    pub fn update(&mut self, x: f64, y: f64, now_ms: f64) -> bool {
        if now_ms - self.last_update_ms < Self::THROTTLE_MS {
            return false;
        }
        self.x = x;
        self.y = y;
        self.active = true;
        self.last_update_ms = now_ms;
        true
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        self.active.then_some((self.x, self.y))
    }
}
