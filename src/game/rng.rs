/// Small xorshift32 generator so simulation code stays deterministic under
/// native `cargo test`. The browser host seeds it from the wall clock.
#[derive(Clone, Debug)]
pub struct Rng {
    state: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    /// Uniform f64 in [0, 1).
    pub fn next(&mut self) -> f64 {
        // xorshift32
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        (self.state as f64) / (u32::MAX as f64 + 1.0)
    }

    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next() * (max - min)
    }

    /// Uniform index in [0, len). `len` must be > 0.
    pub fn next_index(&mut self, len: usize) -> usize {
        ((self.next() * len as f64) as usize).min(len - 1)
    }
}
