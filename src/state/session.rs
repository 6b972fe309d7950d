//! Page-level minigame session state, shared between the canvas host and the
//! side-panel chrome through a reducer handle.

use std::rc::Rc;
use yew::Reducible;

/// UI-facing session flags and the mirrored score. Lives for the page mount;
/// nothing here is persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSession {
    /// Whether the minigame may be triggered at all.
    pub enabled: bool,
    /// Last score reported by the engine; 0 whenever the engine is idle.
    pub score: u32,
    /// True while a text-input-like element holds focus; arrow keys must not
    /// start or steer the game then.
    pub input_focused: bool,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            enabled: true,
            score: 0,
            input_focused: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionAction {
    Toggle,
    SetEnabled(bool),
    SetScore(u32),
    SetInputFocused(bool),
}

impl Reducible for GameSession {
    type Action = SessionAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut new = (*self).clone();
        match action {
            SessionAction::Toggle => {
                new.enabled = !new.enabled;
                if !new.enabled {
                    new.score = 0;
                }
            }
            SessionAction::SetEnabled(on) => {
                new.enabled = on;
                if !on {
                    new.score = 0;
                }
            }
            SessionAction::SetScore(score) => {
                new.score = score;
            }
            SessionAction::SetInputFocused(focused) => {
                new.input_focused = focused;
            }
        }
        Rc::new(new)
    }
}
