//! Grid snake minigame sharing the particle canvas. The engine owns the
//! snake exclusively; it reaches the particle pool only through the narrow
//! [`FoodSource`] capability (read positions/sizes, respawn one index).

use serde::{Deserialize, Serialize};
use web_sys::CanvasRenderingContext2d;

use super::{GRID_SIZE, SIDE_PANEL_WIDTH};

/// Starting speed in moves per second.
pub const BASE_SPEED: f64 = 10.0;
/// Speed gain applied on every third point.
const SPEED_INCREMENT: f64 = 2.0;
const SPEED_STEP_SCORE: u32 = 3;
const INITIAL_SEGMENTS: usize = 3;
/// Wall-clock dwell time in GAME_OVER before the engine goes idle again.
const GAME_OVER_COOLDOWN_MS: f64 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn delta(self) -> (f64, f64) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum GamePhase {
    Inactive,
    Active,
    /// Cooldown is a timestamp, not a scheduled timer, so repeated ticks can
    /// never queue duplicate resets and unmount has nothing to cancel.
    GameOver { since_ms: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x: f64,
    pub y: f64,
}

/// Access the snake gets to the food pool. Indices must stay stable across
/// `relocate` calls; the snake never grows or reorders the pool.
pub trait FoodSource {
    fn count(&self) -> usize;
    fn position(&self, index: usize) -> (f64, f64);
    fn size(&self, index: usize) -> f64;
    fn relocate(&mut self, index: usize);
}

pub struct SnakeEngine {
    segments: Vec<Segment>,
    direction: Direction,
    pending: Direction,
    speed: f64,
    score: u32,
    phase: GamePhase,
    last_move_ms: f64,
    width: f64,
    height: f64,
}

impl SnakeEngine {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            segments: Vec::new(),
            direction: Direction::Right,
            pending: Direction::Right,
            speed: BASE_SPEED,
            score: 0,
            phase: GamePhase::Inactive,
            last_move_ms: 0.0,
            width,
            height,
        }
    }

    pub fn set_bounds(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True while the game-over cooldown has not elapsed yet.
    pub fn is_resetting(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver { .. })
    }

    fn snap(v: f64) -> f64 {
        (v / GRID_SIZE).floor() * GRID_SIZE
    }

    /// Begins a run: three cells, horizontally centered in the playable area
    /// (right of the side panel), facing right. No-op unless idle.
    pub fn start(&mut self, now_ms: f64) {
        if self.phase != GamePhase::Inactive {
            return;
        }
        let cx = Self::snap(SIDE_PANEL_WIDTH + (self.width - SIDE_PANEL_WIDTH) / 2.0);
        let cy = Self::snap(self.height / 2.0);
        self.segments = (0..INITIAL_SEGMENTS)
            .map(|i| Segment {
                x: cx - i as f64 * GRID_SIZE,
                y: cy,
            })
            .collect();
        self.direction = Direction::Right;
        self.pending = Direction::Right;
        self.speed = BASE_SPEED;
        self.score = 0;
        self.last_move_ms = now_ms;
        self.phase = GamePhase::Active;
    }

    /// Hard stop back to idle (used when the host disables the minigame).
    pub fn abort(&mut self) {
        self.segments.clear();
        self.score = 0;
        self.phase = GamePhase::Inactive;
    }

    /// Queues a turn for the next move. Reversing 180° is rejected so the
    /// snake cannot collide with its own neck.
    pub fn change_direction(&mut self, dir: Direction) {
        if self.phase != GamePhase::Active {
            return;
        }
        if dir == self.direction.opposite() {
            return;
        }
        self.pending = dir;
    }

    /// Per-frame entry point. Movement is throttled against wall-clock time
    /// (one step per `1000/speed` ms) so frame rate never changes game speed.
    pub fn tick(&mut self, now_ms: f64, food: &mut dyn FoodSource) {
        match self.phase {
            GamePhase::Inactive => {}
            GamePhase::GameOver { since_ms } => {
                if now_ms - since_ms >= GAME_OVER_COOLDOWN_MS {
                    self.segments.clear();
                    self.phase = GamePhase::Inactive;
                }
            }
            GamePhase::Active => {
                if now_ms - self.last_move_ms < 1000.0 / self.speed {
                    return;
                }
                self.last_move_ms = now_ms;
                self.step(now_ms, food);
            }
        }
    }

    fn step(&mut self, now_ms: f64, food: &mut dyn FoodSource) {
        self.direction = self.pending;
        let (dx, dy) = self.direction.delta();
        let head = self.segments[0];
        let nx = head.x + dx * GRID_SIZE;
        let ny = head.y + dy * GRID_SIZE;

        // Boundary: right/top/bottom canvas edges always; the left bound is
        // the side panel, and only applies while travelling left.
        let out = nx + GRID_SIZE > self.width
            || ny < 0.0
            || ny + GRID_SIZE > self.height
            || (self.direction == Direction::Left && nx < SIDE_PANEL_WIDTH);
        if out {
            self.phase = GamePhase::GameOver { since_ms: now_ms };
            return;
        }

        if self.segments.iter().any(|s| s.x == nx && s.y == ny) {
            self.phase = GamePhase::GameOver { since_ms: now_ms };
            return;
        }

        // Food: first index within range wins, in pool order.
        let mut eaten = None;
        for i in 0..food.count() {
            let (px, py) = food.position(i);
            let dist = ((px - nx).powi(2) + (py - ny).powi(2)).sqrt();
            if dist < GRID_SIZE + food.size(i) {
                eaten = Some(i);
                break;
            }
        }

        self.segments.insert(0, Segment { x: nx, y: ny });
        match eaten {
            Some(i) => {
                self.score += 1;
                if self.score % SPEED_STEP_SCORE == 0 {
                    self.speed += SPEED_INCREMENT;
                }
                food.relocate(i);
            }
            None => {
                self.segments.pop();
            }
        }
    }

    /// Draws the snake, or the one-shot explosion while in cooldown.
    pub fn draw(&self, ctx: &CanvasRenderingContext2d, now_ms: f64) {
        match self.phase {
            GamePhase::Inactive => {}
            GamePhase::Active => {
                let len = self.segments.len().max(1) as f64;
                for (i, s) in self.segments.iter().enumerate() {
                    if i == 0 {
                        ctx.set_shadow_color("#64ffda");
                        ctx.set_shadow_blur(12.0);
                        ctx.set_fill_style_str("#64ffda");
                    } else {
                        ctx.set_shadow_blur(0.0);
                        let fade = 0.85 - (i as f64 / len) * 0.45;
                        ctx.set_fill_style_str(&format!("rgba(100,255,218,{fade:.2})"));
                    }
                    ctx.fill_rect(s.x + 1.0, s.y + 1.0, GRID_SIZE - 2.0, GRID_SIZE - 2.0);
                }
                ctx.set_shadow_blur(0.0);
            }
            GamePhase::GameOver { since_ms } => {
                let progress = ((now_ms - since_ms) / GAME_OVER_COOLDOWN_MS).clamp(0.0, 1.0);
                let alpha = 1.0 - progress;
                let radius = GRID_SIZE * 0.5 * (1.0 + progress * 2.5);
                ctx.set_fill_style_str(&format!("rgba(248,81,73,{alpha:.2})"));
                for s in &self.segments {
                    ctx.begin_path();
                    let _ = ctx.arc(
                        s.x + GRID_SIZE / 2.0,
                        s.y + GRID_SIZE / 2.0,
                        radius,
                        0.0,
                        std::f64::consts::TAU,
                    );
                    ctx.fill();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubFood {
        items: Vec<(f64, f64, f64)>,
        relocated: Vec<usize>,
    }

    impl StubFood {
        fn new(items: Vec<(f64, f64, f64)>) -> Self {
            Self {
                items,
                relocated: Vec::new(),
            }
        }

        fn none() -> Self {
            Self::new(Vec::new())
        }
    }

    impl FoodSource for StubFood {
        fn count(&self) -> usize {
            self.items.len()
        }
        fn position(&self, index: usize) -> (f64, f64) {
            (self.items[index].0, self.items[index].1)
        }
        fn size(&self, index: usize) -> f64 {
            self.items[index].2
        }
        fn relocate(&mut self, index: usize) {
            self.relocated.push(index);
            self.items[index].0 = -10_000.0;
            self.items[index].1 = -10_000.0;
        }
    }

    fn active_engine(segments: Vec<Segment>, direction: Direction) -> SnakeEngine {
        let mut e = SnakeEngine::new(2000.0, 1000.0);
        e.segments = segments;
        e.direction = direction;
        e.pending = direction;
        e.phase = GamePhase::Active;
        e.last_move_ms = 0.0;
        e
    }

    fn row(head_x: f64, y: f64) -> Vec<Segment> {
        (0..3)
            .map(|i| Segment {
                x: head_x - i as f64 * GRID_SIZE,
                y,
            })
            .collect()
    }

    #[test]
    fn tick_is_a_noop_while_inactive() {
        let mut e = SnakeEngine::new(800.0, 600.0);
        let mut food = StubFood::none();
        e.tick(1000.0, &mut food);
        assert_eq!(e.phase(), GamePhase::Inactive);
        assert!(e.segments().is_empty());
    }

    #[test]
    fn start_centers_three_segments_in_playable_area() {
        let mut e = SnakeEngine::new(1080.0, 600.0);
        e.start(0.0);
        assert_eq!(e.phase(), GamePhase::Active);
        assert_eq!(e.segments().len(), 3);
        let head = e.segments()[0];
        // Playable span is [280, 1080]; center 680, snapped to the grid.
        assert_eq!(head.x, 680.0);
        assert_eq!(head.y, 300.0);
        assert_eq!(e.segments()[1].x, 670.0);
        assert_eq!(e.segments()[2].x, 660.0);
        assert_eq!(e.score(), 0);
        assert_eq!(e.speed(), BASE_SPEED);
    }

    #[test]
    fn start_is_idempotent_while_active() {
        let mut e = SnakeEngine::new(1080.0, 600.0);
        let mut food = StubFood::none();
        e.start(0.0);
        e.tick(150.0, &mut food);
        let segments = e.segments().to_vec();
        let (score, speed) = (e.score(), e.speed());
        e.start(151.0);
        assert_eq!(e.segments(), segments.as_slice());
        assert_eq!(e.score(), score);
        assert_eq!(e.speed(), speed);
    }

    #[test]
    fn start_is_rejected_during_game_over_cooldown() {
        let mut e = active_engine(row(100.0, 100.0), Direction::Up);
        let mut food = StubFood::none();
        // Head at y=100 moving up: crosses the top edge on the 11th move.
        for i in 1..=11 {
            e.tick(i as f64 * 200.0, &mut food);
        }
        assert!(e.is_resetting());
        let phase = e.phase();
        e.start(2300.0);
        assert_eq!(e.phase(), phase);
    }

    #[test]
    fn reverse_direction_is_rejected() {
        let mut e = active_engine(row(400.0, 100.0), Direction::Right);
        e.change_direction(Direction::Left);
        assert_eq!(e.pending, Direction::Right);
        e.change_direction(Direction::Up);
        assert_eq!(e.pending, Direction::Up);
    }

    #[test]
    fn movement_is_throttled_by_wall_clock() {
        let mut e = active_engine(row(400.0, 100.0), Direction::Right);
        let mut food = StubFood::none();
        e.tick(50.0, &mut food); // < 100 ms at speed 10: no move
        assert_eq!(e.segments()[0].x, 400.0);
        e.tick(100.0, &mut food);
        assert_eq!(e.segments()[0].x, 410.0);
    }

    #[test]
    fn eats_particle_in_range_keeps_tail_and_scores() {
        // Head steps to (110,100); food at (112,100) size 2 is 2 px away,
        // inside the 10 + 2 eat radius.
        let mut e = active_engine(row(100.0, 100.0), Direction::Right);
        let mut food = StubFood::new(vec![(112.0, 100.0, 2.0)]);
        e.tick(100.0, &mut food);
        assert_eq!(e.segments()[0], Segment { x: 110.0, y: 100.0 });
        assert_eq!(e.segments().len(), 4); // tail kept
        assert_eq!(e.score(), 1);
        assert_eq!(food.relocated, vec![0]);
    }

    #[test]
    fn moves_drop_tail_when_nothing_is_eaten() {
        let mut e = active_engine(row(400.0, 100.0), Direction::Right);
        let mut food = StubFood::new(vec![(900.0, 900.0, 2.0)]);
        e.tick(100.0, &mut food);
        assert_eq!(e.segments().len(), 3);
        assert_eq!(e.score(), 0);
        assert!(food.relocated.is_empty());
    }

    #[test]
    fn first_matching_particle_wins_regardless_of_distance() {
        let mut e = active_engine(row(100.0, 100.0), Direction::Right);
        // Both in range of the new head (110,100); index 1 is far closer.
        let mut food = StubFood::new(vec![(130.0, 100.0, 15.0), (111.0, 100.0, 5.0)]);
        e.tick(100.0, &mut food);
        assert_eq!(food.relocated, vec![0]);
    }

    #[test]
    fn left_boundary_is_the_side_panel() {
        // Head at x = 280 moving left steps to 270, inside the panel: the
        // game ends even with food in range.
        let mut e = active_engine(
            vec![
                Segment { x: 280.0, y: 100.0 },
                Segment { x: 290.0, y: 100.0 },
                Segment { x: 300.0, y: 100.0 },
            ],
            Direction::Left,
        );
        let mut food = StubFood::new(vec![(272.0, 100.0, 5.0)]);
        e.tick(100.0, &mut food);
        assert!(matches!(e.phase(), GamePhase::GameOver { .. }));
        assert!(food.relocated.is_empty());
    }

    #[test]
    fn right_edge_ends_the_game() {
        let mut e = active_engine(row(1990.0, 100.0), Direction::Right);
        let mut food = StubFood::none();
        e.tick(100.0, &mut food);
        assert!(matches!(e.phase(), GamePhase::GameOver { .. }));
    }

    #[test]
    fn self_collision_ends_the_game() {
        // Head curls back into the fourth segment.
        let mut e = active_engine(
            vec![
                Segment { x: 400.0, y: 100.0 },
                Segment { x: 400.0, y: 110.0 },
                Segment { x: 410.0, y: 110.0 },
                Segment { x: 410.0, y: 100.0 },
            ],
            Direction::Right,
        );
        let mut food = StubFood::none();
        e.tick(100.0, &mut food);
        assert!(matches!(e.phase(), GamePhase::GameOver { .. }));
    }

    #[test]
    fn segments_stay_unique_while_growing() {
        let mut e = active_engine(row(400.0, 500.0), Direction::Right);
        // Food everywhere: a giant-radius particle that is always in range.
        let mut food = StubFood::new(vec![(0.0, 0.0, 1e9)]);
        let mut now = 0.0;
        for _ in 0..20 {
            now += 1000.0 / e.speed() + 1.0;
            e.tick(now, &mut food);
            if e.phase() != GamePhase::Active {
                break;
            }
            let mut seen = std::collections::HashSet::new();
            for s in e.segments() {
                assert!(
                    seen.insert((s.x.to_bits(), s.y.to_bits())),
                    "duplicate segment at ({}, {})",
                    s.x,
                    s.y
                );
            }
        }
    }

    #[test]
    fn score_is_monotonic_and_speed_steps_every_third_point() {
        let mut e = active_engine(row(400.0, 500.0), Direction::Right);
        let mut food = StubFood::new(vec![(0.0, 0.0, 1e9)]);
        let mut now = 0.0;
        let mut last_score = 0;
        for _ in 0..6 {
            now += 1000.0 / e.speed() + 1.0;
            e.tick(now, &mut food);
            assert!(e.score() >= last_score);
            assert_eq!(e.score(), last_score + 1);
            last_score = e.score();
            let expected = BASE_SPEED + (e.score() / 3) as f64 * 2.0;
            assert_eq!(e.speed(), expected);
        }
        assert_eq!(e.score(), 6);
        assert_eq!(e.speed(), 14.0); // 10 -> 12 at score 3 -> 14 at score 6
    }

    #[test]
    fn game_over_cooldown_resets_exactly_once_after_one_second() {
        let mut e = active_engine(row(100.0, 100.0), Direction::Right);
        let mut food = StubFood::none();
        e.phase = GamePhase::GameOver { since_ms: 5000.0 };
        for t in [5100.0, 5500.0, 5999.0] {
            e.tick(t, &mut food);
            assert!(e.is_resetting(), "reset too early at {t}");
        }
        e.tick(6000.0, &mut food);
        assert_eq!(e.phase(), GamePhase::Inactive);
        assert!(e.segments().is_empty());
        // Further ticks stay idle; the engine can start a new run again.
        e.tick(6100.0, &mut food);
        assert_eq!(e.phase(), GamePhase::Inactive);
        e.start(6200.0);
        assert_eq!(e.phase(), GamePhase::Active);
    }

    #[test]
    fn abort_clears_the_run() {
        let mut e = SnakeEngine::new(1080.0, 600.0);
        e.start(0.0);
        e.abort();
        assert_eq!(e.phase(), GamePhase::Inactive);
        assert!(e.segments().is_empty());
        assert_eq!(e.score(), 0);
    }
}
