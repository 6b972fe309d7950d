//! Ambient particle swarm rendered behind the page. Owns a fixed-size,
//! index-stable pool; the snake layer only sees it through [`FoodSource`].

use web_sys::CanvasRenderingContext2d;

use super::palette::{Palette, Rgb};
use super::rng::Rng;
use super::snake::FoodSource;

/// Pool sizes per viewport class.
const COUNT_NARROW: usize = 45;
const COUNT_WIDE: usize = 85;
const NARROW_BREAKPOINT: f64 = 768.0;

/// Spring coefficient pulling a particle back to its anchor.
const SPRING: f64 = 0.003;
/// Pointer repulsion radius and force cap.
const POINTER_RADIUS: f64 = 100.0;
const MAX_REPULSION: f64 = 2.0;
/// Per-frame chance of picking a new target color.
const RETARGET_CHANCE: f64 = 0.001;
/// Connection line reach and per-particle link cap.
const LINK_RADIUS: f64 = 100.0;
const MAX_LINKS: usize = 5;

#[derive(Clone, Debug)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub origin_x: f64,
    pub origin_y: f64,
    pub size: f64,
    pub base_size: f64,
    pub color: Rgb,
    pub target: Rgb,
    /// Drift speed multiplier for the sinusoidal wander.
    pub speed: f64,
    /// Per-frame color interpolation rate.
    pub transition: f64,
    /// Glow blur radius at full pulse.
    pub glow: f64,
    /// Oscillation phase offset so particles do not move in lockstep.
    pub phase: f64,
}

pub struct ParticleField {
    particles: Vec<Particle>,
    width: f64,
    height: f64,
    palette: Palette,
    rng: Rng,
    elapsed: f64,
    frame: u64,
    /// Cached (i, j, alpha) connection pairs, rebuilt every other frame.
    links: Vec<(usize, usize, f64)>,
}

impl ParticleField {
    pub fn new(width: f64, height: f64, palette: Palette, rng: Rng) -> Self {
        let mut field = Self {
            particles: Vec::new(),
            width,
            height,
            palette,
            rng,
            elapsed: 0.0,
            frame: 0,
            links: Vec::new(),
        };
        field.populate();
        field
    }

    /// Regenerates the whole pool for the new canvas size.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.populate();
    }

    fn populate(&mut self) {
        let count = if self.width < NARROW_BREAKPOINT {
            COUNT_NARROW
        } else {
            COUNT_WIDE
        };
        self.particles.clear();
        self.links.clear();
        for _ in 0..count {
            let x = self.rng.next() * self.width;
            let y = self.rng.next() * self.height;
            let base_size = self.rng.next_range(1.0, 3.0);
            self.particles.push(Particle {
                x,
                y,
                origin_x: x,
                origin_y: y,
                size: base_size,
                base_size,
                color: self.palette.random(&mut self.rng),
                target: self.palette.random(&mut self.rng),
                speed: self.rng.next_range(0.3, 1.2),
                transition: self.rng.next_range(0.01, 0.05),
                glow: self.rng.next_range(4.0, 14.0),
                phase: self.rng.next_range(0.0, std::f64::consts::TAU),
            });
        }
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Advances drift, spring pull, pointer repulsion, color and size for
    /// every particle. `dt` is in seconds; `pointer` is canvas-relative.
    pub fn advance(&mut self, dt: f64, pointer: Option<(f64, f64)>) {
        // Normalize per-frame magnitudes against a 60 Hz baseline so a slow
        // tab does not slow the swarm down; clamp so a resumed tab cannot
        // fling particles.
        let step = (dt * 60.0).min(3.0);
        self.elapsed += dt;
        let (w, h) = (self.width, self.height);
        for p in &mut self.particles {
            let t = self.elapsed * p.speed + p.phase;
            p.x += t.sin() * 0.3 * step;
            p.y += (t * 1.3).cos() * 0.3 * step;

            p.x += (p.origin_x - p.x) * SPRING * step;
            p.y += (p.origin_y - p.y) * SPRING * step;

            if let Some((mx, my)) = pointer {
                let dx = p.x - mx;
                let dy = p.y - my;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist > 1e-3 && dist < POINTER_RADIUS {
                    let force = (POINTER_RADIUS / dist * 0.6).min(MAX_REPULSION);
                    p.x += dx / dist * force * step;
                    p.y += dy / dist * force * step;
                }
            }

            let pulse = (self.elapsed * 2.0 + p.phase).sin() * 0.5 + 0.5;
            p.size = p.base_size * (0.85 + 0.3 * pulse);

            p.color.step_toward(p.target, p.transition);
            if self.rng.next() < RETARGET_CHANCE {
                p.target = self.palette.random(&mut self.rng);
            }

            // Toroidal wrap; the anchor moves with the particle so the
            // spring keeps acting locally instead of across the canvas.
            if p.x < 0.0 {
                p.x += w;
                p.origin_x += w;
            } else if p.x > w {
                p.x -= w;
                p.origin_x -= w;
            }
            if p.y < 0.0 {
                p.y += h;
                p.origin_y += h;
            } else if p.y > h {
                p.y -= h;
                p.origin_y -= h;
            }
        }
    }

    /// Draws connection lines first, then glowing particle dots.
    pub fn render(&mut self, ctx: &CanvasRenderingContext2d) {
        self.frame += 1;
        if self.frame % 2 == 0 || self.links.is_empty() {
            self.rebuild_links();
        }

        let line_color = self.palette.primary();
        ctx.set_line_width(0.6);
        for &(i, j, alpha) in &self.links {
            let a = &self.particles[i];
            let b = &self.particles[j];
            ctx.set_stroke_style_str(&line_color.to_css(alpha));
            ctx.begin_path();
            ctx.move_to(a.x, a.y);
            ctx.line_to(b.x, b.y);
            ctx.stroke();
        }

        let pulse = (self.elapsed * 1.5).sin() * 0.5 + 0.5;
        for p in &self.particles {
            let css = p.color.to_css(0.9);
            ctx.set_shadow_color(&css);
            ctx.set_shadow_blur(p.glow * (0.4 + 0.6 * pulse));
            ctx.set_fill_style_str(&css);
            ctx.begin_path();
            let _ = ctx.arc(p.x, p.y, p.size, 0.0, std::f64::consts::TAU);
            ctx.fill();
        }
        ctx.set_shadow_blur(0.0);
    }

    fn rebuild_links(&mut self) {
        self.links.clear();
        let n = self.particles.len();
        for i in 0..n {
            let mut made = 0usize;
            for j in (i + 1)..n {
                if made >= MAX_LINKS {
                    break;
                }
                let dx = self.particles[i].x - self.particles[j].x;
                let dy = self.particles[i].y - self.particles[j].y;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist < LINK_RADIUS {
                    let alpha = 0.15 * (1.0 - dist / LINK_RADIUS);
                    self.links.push((i, j, alpha));
                    made += 1;
                }
            }
        }
    }

    /// Respawns the particle at `index` at a fresh random position with new
    /// colors. Out-of-range indices are a silent no-op.
    pub fn relocate(&mut self, index: usize) {
        if index >= self.particles.len() {
            return;
        }
        let x = self.rng.next() * self.width;
        let y = self.rng.next() * self.height;
        let color = self.palette.random(&mut self.rng);
        let target = self.palette.random(&mut self.rng);
        let p = &mut self.particles[index];
        p.x = x;
        p.y = y;
        p.origin_x = x;
        p.origin_y = y;
        p.color = color;
        p.target = target;
    }
}

impl FoodSource for ParticleField {
    fn count(&self) -> usize {
        self.particles.len()
    }

    fn position(&self, index: usize) -> (f64, f64) {
        let p = &self.particles[index];
        (p.x, p.y)
    }

    fn size(&self, index: usize) -> f64 {
        self.particles[index].size
    }

    fn relocate(&mut self, index: usize) {
        ParticleField::relocate(self, index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(width: f64, height: f64) -> ParticleField {
        ParticleField::new(width, height, Palette::default(), Rng::new(1234))
    }

    #[test]
    fn pool_size_follows_viewport_class() {
        assert_eq!(field(480.0, 800.0).particle_count(), COUNT_NARROW);
        assert_eq!(field(1440.0, 900.0).particle_count(), COUNT_WIDE);
    }

    #[test]
    fn resize_regenerates_pool() {
        let mut f = field(1440.0, 900.0);
        f.resize(480.0, 800.0);
        assert_eq!(f.particle_count(), COUNT_NARROW);
        for p in f.particles() {
            assert!(p.x >= 0.0 && p.x <= 480.0);
            assert!(p.y >= 0.0 && p.y <= 800.0);
        }
    }

    #[test]
    fn relocate_preserves_pool_size_and_rehomes_anchor() {
        let mut f = field(1440.0, 900.0);
        let before = f.particle_count();
        f.relocate(3);
        assert_eq!(f.particle_count(), before);
        let p = &f.particles()[3];
        assert_eq!(p.x, p.origin_x);
        assert_eq!(p.y, p.origin_y);
    }

    #[test]
    fn relocate_out_of_range_is_a_noop() {
        let mut f = field(1440.0, 900.0);
        let snapshot: Vec<(f64, f64)> = f.particles().iter().map(|p| (p.x, p.y)).collect();
        f.relocate(usize::MAX);
        f.relocate(f.particle_count());
        let after: Vec<(f64, f64)> = f.particles().iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(snapshot, after);
    }

    #[test]
    fn advance_keeps_positions_inside_canvas() {
        let mut f = field(600.0, 400.0);
        for _ in 0..600 {
            f.advance(1.0 / 60.0, Some((300.0, 200.0)));
        }
        for p in f.particles() {
            assert!(p.x >= 0.0 && p.x <= 600.0, "x escaped: {}", p.x);
            assert!(p.y >= 0.0 && p.y <= 400.0, "y escaped: {}", p.y);
        }
    }

    #[test]
    fn spring_pulls_displaced_particle_home() {
        let mut f = field(2000.0, 2000.0);
        // Displace well beyond the drift envelope so the decay is visible.
        f.particles[0].x = f.particles[0].origin_x + 300.0;
        for _ in 0..300 {
            f.advance(1.0 / 60.0, None);
        }
        let p = &f.particles[0];
        let dist = (p.x - p.origin_x).abs();
        assert!(dist < 200.0, "still {dist} px from anchor");
    }

    #[test]
    fn size_pulses_around_base_size() {
        let mut f = field(600.0, 400.0);
        for _ in 0..120 {
            f.advance(1.0 / 60.0, None);
            for p in f.particles() {
                assert!(p.size >= p.base_size * 0.85 - 1e-9);
                assert!(p.size <= p.base_size * 1.15 + 1e-9);
            }
        }
    }
}
