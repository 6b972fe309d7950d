pub mod palette;
pub mod particles;
pub mod rng;
pub mod snake;

pub use palette::{Palette, Rgb};
pub use particles::ParticleField;
pub use rng::Rng;
pub use snake::{Direction, FoodSource, GamePhase, SnakeEngine};

/// Width in px of the side panel reserved on the left edge of the canvas.
/// The snake's playable area starts to the right of it.
pub const SIDE_PANEL_WIDTH: f64 = 280.0;

/// Snake grid cell size in px.
pub const GRID_SIZE: f64 = 10.0;
