pub mod pointer;
pub mod session;

pub use pointer::Pointer;
pub use session::{GameSession, SessionAction};
