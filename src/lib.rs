//! Ambient particle field with an embedded snake minigame, rendered on one
//! full-window canvas inside a yew page. Simulation logic lives in [`game`]
//! and is host-independent; [`components`] wires it to the DOM.

pub mod components;
pub mod game;
pub mod state;
pub mod util;
